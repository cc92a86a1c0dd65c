//! Error types for recipe creation
//!
//! Two layers: [`ServiceError`] describes why a remote collaborator call
//! failed, [`CreationError`] tags that failure with the pipeline stage that
//! owns the call. Collaborators return `CreationError` directly so pipeline
//! steps can re-raise them untouched.

use crate::pipeline::StepKind;
use thiserror::Error;

/// Failure of a single call to a remote extraction or persistence service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Service answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Request did not complete within the client timeout
    #[error("Request timed out")]
    Timeout,

    /// Connection-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Service understood the request but refused the input
    #[error("Rejected: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout
        } else if err.is_decode() {
            ServiceError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ServiceError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

/// Stage-tagged failure of a recipe creation run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreationError {
    #[error("Video verification failed: {0}")]
    VerifyFailed(#[source] ServiceError),

    #[error("Recipe detail extraction failed: {0}")]
    DetailFailed(#[source] ServiceError),

    #[error("Instruction extraction failed: {0}")]
    InstructionFailed(#[source] ServiceError),

    #[error("Briefing generation failed: {0}")]
    BriefingFailed(#[source] ServiceError),

    #[error("Recipe finalization failed: {0}")]
    FinalizeFailed(#[source] ServiceError),

    /// A step was invoked before the fields it depends on were populated
    #[error("{stage} step cannot run: execution context has no {missing}")]
    MissingContext {
        stage: StepKind,
        missing: &'static str,
    },

    /// A parallel step terminated without producing a result
    #[error("{stage} step aborted: {message}")]
    Aborted { stage: StepKind, message: String },
}

impl CreationError {
    /// Tag a service failure with the stage that issued the call.
    ///
    /// Cleanup has no failure variant of its own; its calls belong to the
    /// verification service and are tagged as such, though the pipeline
    /// never propagates them.
    pub fn for_stage(stage: StepKind, error: ServiceError) -> Self {
        match stage {
            StepKind::Verify | StepKind::Cleanup => CreationError::VerifyFailed(error),
            StepKind::Detail => CreationError::DetailFailed(error),
            StepKind::Instruction => CreationError::InstructionFailed(error),
            StepKind::Briefing => CreationError::BriefingFailed(error),
            StepKind::Finalize => CreationError::FinalizeFailed(error),
        }
    }

    pub fn missing(stage: StepKind, missing: &'static str) -> Self {
        CreationError::MissingContext { stage, missing }
    }

    /// The stage this failure is attributed to
    pub fn stage(&self) -> StepKind {
        match self {
            CreationError::VerifyFailed(_) => StepKind::Verify,
            CreationError::DetailFailed(_) => StepKind::Detail,
            CreationError::InstructionFailed(_) => StepKind::Instruction,
            CreationError::BriefingFailed(_) => StepKind::Briefing,
            CreationError::FinalizeFailed(_) => StepKind::Finalize,
            CreationError::MissingContext { stage, .. } | CreationError::Aborted { stage, .. } => {
                *stage
            }
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            CreationError::VerifyFailed(_) => "RECIPE_VERIFY_FAIL",
            CreationError::DetailFailed(_) => "RECIPE_DETAIL_FAIL",
            CreationError::InstructionFailed(_) => "RECIPE_INSTRUCTION_FAIL",
            CreationError::BriefingFailed(_) => "RECIPE_BRIEFING_FAIL",
            CreationError::FinalizeFailed(_) => "RECIPE_FINALIZE_FAIL",
            CreationError::MissingContext { .. } => "RECIPE_CONTEXT_MISSING",
            CreationError::Aborted { .. } => "RECIPE_STEP_ABORTED",
        }
    }

    /// Underlying service failure, if the error came from a collaborator
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            CreationError::VerifyFailed(e)
            | CreationError::DetailFailed(e)
            | CreationError::InstructionFailed(e)
            | CreationError::BriefingFailed(e)
            | CreationError::FinalizeFailed(e) => Some(e),
            CreationError::MissingContext { .. } | CreationError::Aborted { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_for_stage_tags_each_stage() {
        let err = ServiceError::Timeout;
        assert_eq!(
            CreationError::for_stage(StepKind::Verify, err.clone()),
            CreationError::VerifyFailed(err.clone())
        );
        assert_eq!(
            CreationError::for_stage(StepKind::Detail, err.clone()),
            CreationError::DetailFailed(err.clone())
        );
        assert_eq!(
            CreationError::for_stage(StepKind::Instruction, err.clone()),
            CreationError::InstructionFailed(err.clone())
        );
        assert_eq!(
            CreationError::for_stage(StepKind::Briefing, err.clone()),
            CreationError::BriefingFailed(err.clone())
        );
        assert_eq!(
            CreationError::for_stage(StepKind::Finalize, err.clone()),
            CreationError::FinalizeFailed(err)
        );
    }

    #[test]
    fn test_stage_round_trips_through_for_stage() {
        for stage in [
            StepKind::Verify,
            StepKind::Detail,
            StepKind::Instruction,
            StepKind::Briefing,
            StepKind::Finalize,
        ] {
            let err = CreationError::for_stage(stage, ServiceError::Network("down".into()));
            assert_eq!(err.stage(), stage);
        }
    }

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            CreationError::VerifyFailed(ServiceError::Timeout),
            CreationError::DetailFailed(ServiceError::Timeout),
            CreationError::InstructionFailed(ServiceError::Timeout),
            CreationError::BriefingFailed(ServiceError::Timeout),
            CreationError::FinalizeFailed(ServiceError::Timeout),
            CreationError::missing(StepKind::Detail, "file URI"),
            CreationError::Aborted {
                stage: StepKind::Briefing,
                message: "panicked".into(),
            },
        ];
        let codes: std::collections::HashSet<_> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_missing_context_display() {
        let err = CreationError::missing(StepKind::Instruction, "MIME type");
        assert_eq!(
            err.to_string(),
            "instruction step cannot run: execution context has no MIME type"
        );
        assert!(err.service_error().is_none());
    }

    #[test]
    fn test_service_error_is_source() {
        let err = CreationError::DetailFailed(ServiceError::Api {
            status: 502,
            message: "bad gateway".into(),
        });
        let source = err.source().expect("service error should be the source");
        assert_eq!(source.to_string(), "API error (502): bad gateway");
        assert_eq!(
            err.to_string(),
            "Recipe detail extraction failed: API error (502): bad gateway"
        );
    }
}
