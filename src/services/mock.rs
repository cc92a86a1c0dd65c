use super::traits::{
    BriefingService, Collaborators, DetailExtractor, DetailMetaStore, IngredientStore,
    InstructionExtractor, RecipeInfoService, TagStore, VideoVerifier,
};
use super::types::{
    Briefing, Caption, DetailMeta, Ingredient, RecipeDetail, RecipeId, VerifiedMedia,
};
use crate::error::{CreationError, ServiceError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Collaborator operations, used to configure failures and delays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Verify,
    Cleanup,
    GetDetails,
    CreateIngredients,
    CreateTags,
    CreateDetailMeta,
    CreateInstructions,
    CreateBriefing,
    GetBriefing,
    MarkSuccess,
}

/// A recorded collaborator call with its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    Verify {
        video_id: String,
    },
    Cleanup {
        file_uri: String,
    },
    GetDetails {
        video_id: String,
        file_uri: String,
        mime_type: String,
        title: String,
    },
    CreateIngredients {
        recipe_id: RecipeId,
        ingredients: Vec<Ingredient>,
    },
    CreateTags {
        recipe_id: RecipeId,
        tags: Vec<String>,
    },
    CreateDetailMeta {
        recipe_id: RecipeId,
        meta: DetailMeta,
    },
    CreateInstructions {
        recipe_id: RecipeId,
        file_uri: String,
        mime_type: String,
    },
    CreateBriefing {
        video_id: String,
        recipe_id: RecipeId,
    },
    GetBriefing {
        recipe_id: RecipeId,
    },
    MarkSuccess {
        recipe_id: RecipeId,
    },
}

impl ServiceCall {
    pub fn operation(&self) -> Operation {
        match self {
            ServiceCall::Verify { .. } => Operation::Verify,
            ServiceCall::Cleanup { .. } => Operation::Cleanup,
            ServiceCall::GetDetails { .. } => Operation::GetDetails,
            ServiceCall::CreateIngredients { .. } => Operation::CreateIngredients,
            ServiceCall::CreateTags { .. } => Operation::CreateTags,
            ServiceCall::CreateDetailMeta { .. } => Operation::CreateDetailMeta,
            ServiceCall::CreateInstructions { .. } => Operation::CreateInstructions,
            ServiceCall::CreateBriefing { .. } => Operation::CreateBriefing,
            ServiceCall::GetBriefing { .. } => Operation::GetBriefing,
            ServiceCall::MarkSuccess { .. } => Operation::MarkSuccess,
        }
    }
}

/// In-process stand-in for every collaborator.
///
/// Records each call before acting on it, so failed calls are visible too.
pub struct MockServices {
    calls: Mutex<Vec<ServiceCall>>,
    failures: Mutex<HashMap<Operation, CreationError>>,
    cleanup_failure: Mutex<Option<ServiceError>>,
    delays: Mutex<HashMap<Operation, Duration>>,
    media: Mutex<VerifiedMedia>,
    detail: Mutex<RecipeDetail>,
    briefing: Mutex<Briefing>,
}

impl MockServices {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            cleanup_failure: Mutex::new(None),
            delays: Mutex::new(HashMap::new()),
            media: Mutex::new(VerifiedMedia::new(
                "s3://mock-bucket/video.mp4",
                "video/mp4",
            )),
            detail: Mutex::new(RecipeDetail {
                ingredients: vec![Ingredient::new("rice", 300.0, "g")],
                tags: vec!["mock".to_string()],
                cook_time: 20,
                servings: 1,
                description: "Mock recipe".to_string(),
            }),
            briefing: Mutex::new(Briefing {
                caption: Caption::new("mock-caption"),
                content: vec!["Mock briefing".to_string()],
            }),
        }
    }

    /// Bundle this mock as every collaborator
    pub fn collaborators(self: &Arc<Self>) -> Collaborators {
        Collaborators::from_client(self.clone())
    }

    /// Make `operation` fail with `error` from now on
    pub fn fail(&self, operation: Operation, error: CreationError) {
        self.failures.lock().unwrap().insert(operation, error);
    }

    pub fn fail_cleanup(&self, error: ServiceError) {
        *self.cleanup_failure.lock().unwrap() = Some(error);
    }

    /// Make `operation` sleep before answering
    pub fn delay(&self, operation: Operation, duration: Duration) {
        self.delays.lock().unwrap().insert(operation, duration);
    }

    pub fn set_media(&self, media: VerifiedMedia) {
        *self.media.lock().unwrap() = media;
    }

    pub fn set_detail(&self, detail: RecipeDetail) {
        *self.detail.lock().unwrap() = detail;
    }

    pub fn set_briefing(&self, briefing: Briefing) {
        *self.briefing.lock().unwrap() = briefing;
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, operation: Operation) -> Vec<ServiceCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation() == operation)
            .cloned()
            .collect()
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.calls_to(operation).len()
    }

    async fn enter(&self, call: ServiceCall) -> Result<(), CreationError> {
        let operation = call.operation();
        self.calls.lock().unwrap().push(call);

        let delay = self.delays.lock().unwrap().get(&operation).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.failures.lock().unwrap().get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Default for MockServices {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoVerifier for MockServices {
    async fn verify(&self, video_id: &str) -> Result<VerifiedMedia, CreationError> {
        self.enter(ServiceCall::Verify {
            video_id: video_id.to_string(),
        })
        .await?;
        Ok(self.media.lock().unwrap().clone())
    }

    async fn cleanup(&self, file_uri: &str) -> Result<(), ServiceError> {
        self.calls.lock().unwrap().push(ServiceCall::Cleanup {
            file_uri: file_uri.to_string(),
        });
        match self.cleanup_failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DetailExtractor for MockServices {
    async fn get_details(
        &self,
        video_id: &str,
        file_uri: &str,
        mime_type: &str,
        title: &str,
    ) -> Result<RecipeDetail, CreationError> {
        self.enter(ServiceCall::GetDetails {
            video_id: video_id.to_string(),
            file_uri: file_uri.to_string(),
            mime_type: mime_type.to_string(),
            title: title.to_string(),
        })
        .await?;
        Ok(self.detail.lock().unwrap().clone())
    }
}

#[async_trait]
impl IngredientStore for MockServices {
    async fn create(
        &self,
        recipe_id: RecipeId,
        ingredients: &[Ingredient],
    ) -> Result<(), CreationError> {
        self.enter(ServiceCall::CreateIngredients {
            recipe_id,
            ingredients: ingredients.to_vec(),
        })
        .await
    }
}

#[async_trait]
impl TagStore for MockServices {
    async fn create(&self, recipe_id: RecipeId, tags: &[String]) -> Result<(), CreationError> {
        self.enter(ServiceCall::CreateTags {
            recipe_id,
            tags: tags.to_vec(),
        })
        .await
    }
}

#[async_trait]
impl DetailMetaStore for MockServices {
    async fn create(&self, recipe_id: RecipeId, meta: &DetailMeta) -> Result<(), CreationError> {
        self.enter(ServiceCall::CreateDetailMeta {
            recipe_id,
            meta: meta.clone(),
        })
        .await
    }
}

#[async_trait]
impl InstructionExtractor for MockServices {
    async fn create(
        &self,
        recipe_id: RecipeId,
        file_uri: &str,
        mime_type: &str,
    ) -> Result<(), CreationError> {
        self.enter(ServiceCall::CreateInstructions {
            recipe_id,
            file_uri: file_uri.to_string(),
            mime_type: mime_type.to_string(),
        })
        .await
    }
}

#[async_trait]
impl BriefingService for MockServices {
    async fn create(&self, video_id: &str, recipe_id: RecipeId) -> Result<(), CreationError> {
        self.enter(ServiceCall::CreateBriefing {
            video_id: video_id.to_string(),
            recipe_id,
        })
        .await
    }

    async fn get(&self, recipe_id: RecipeId) -> Result<Briefing, CreationError> {
        self.enter(ServiceCall::GetBriefing { recipe_id }).await?;
        Ok(self.briefing.lock().unwrap().clone())
    }
}

#[async_trait]
impl RecipeInfoService for MockServices {
    async fn success(&self, recipe_id: RecipeId) -> Result<(), CreationError> {
        self.enter(ServiceCall::MarkSuccess { recipe_id }).await
    }
}
