// Pipeline steps for recipe creation
//
// Verify runs first, the three extraction steps (02_*) run concurrently,
// finalize closes the run. Cleanup is not a step; see `pipeline::cleanup`.

#[path = "01_verify.rs"]
pub mod verify;
#[path = "02_1_detail.rs"]
pub mod detail;
#[path = "02_2_instruction.rs"]
pub mod instruction;
#[path = "02_3_briefing.rs"]
pub mod briefing;
#[path = "03_finalize.rs"]
pub mod finalize;

pub use briefing::BriefingStep;
pub use detail::DetailStep;
pub use finalize::FinalizeStep;
pub use instruction::InstructionStep;
pub use verify::VerifyStep;
