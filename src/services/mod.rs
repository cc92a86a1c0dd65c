//! Remote collaborators of the recipe creation pipeline
//!
//! The pipeline only sees the traits in this module. `HttpServiceClient`
//! talks to the real extraction service; `MockServices` is an in-process
//! double used by tests.

mod http;
mod mock;
mod traits;
mod types;

pub use http::{HttpProgressTracker, HttpServiceClient};
pub use mock::{MockServices, Operation, ServiceCall};
pub use traits::{
    BriefingService, Collaborators, DetailExtractor, DetailMetaStore, IngredientStore,
    InstructionExtractor, RecipeInfoService, TagStore, VideoVerifier,
};
pub use types::{
    Briefing, Caption, DetailMeta, Ingredient, RecipeDetail, RecipeId, VerifiedMedia,
};
