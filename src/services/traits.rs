//! Contracts of the remote collaborators driven by the pipeline
//!
//! Every operation that belongs to a pipeline stage fails with a
//! stage-tagged [`CreationError`]. Media cleanup is best-effort and reports
//! a plain [`ServiceError`].

use super::types::{Briefing, DetailMeta, Ingredient, RecipeDetail, RecipeId, VerifiedMedia};
use crate::error::{CreationError, ServiceError};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait VideoVerifier: Send + Sync {
    /// Check the video is usable and download it for extraction
    async fn verify(&self, video_id: &str) -> Result<VerifiedMedia, CreationError>;

    /// Release a file previously produced by `verify`
    async fn cleanup(&self, file_uri: &str) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait DetailExtractor: Send + Sync {
    async fn get_details(
        &self,
        video_id: &str,
        file_uri: &str,
        mime_type: &str,
        title: &str,
    ) -> Result<RecipeDetail, CreationError>;
}

#[async_trait]
pub trait IngredientStore: Send + Sync {
    async fn create(&self, recipe_id: RecipeId, ingredients: &[Ingredient])
        -> Result<(), CreationError>;
}

#[async_trait]
pub trait TagStore: Send + Sync {
    async fn create(&self, recipe_id: RecipeId, tags: &[String]) -> Result<(), CreationError>;
}

#[async_trait]
pub trait DetailMetaStore: Send + Sync {
    async fn create(&self, recipe_id: RecipeId, meta: &DetailMeta) -> Result<(), CreationError>;
}

/// Step-by-step instruction extraction; results are persisted remotely
#[async_trait]
pub trait InstructionExtractor: Send + Sync {
    async fn create(
        &self,
        recipe_id: RecipeId,
        file_uri: &str,
        mime_type: &str,
    ) -> Result<(), CreationError>;
}

#[async_trait]
pub trait BriefingService: Send + Sync {
    /// Ask the service to generate a briefing for the recipe
    async fn create(&self, video_id: &str, recipe_id: RecipeId) -> Result<(), CreationError>;

    /// Fetch the generated briefing and its caption handle
    async fn get(&self, recipe_id: RecipeId) -> Result<Briefing, CreationError>;
}

#[async_trait]
pub trait RecipeInfoService: Send + Sync {
    /// Mark the recipe record as fully created
    async fn success(&self, recipe_id: RecipeId) -> Result<(), CreationError>;
}

/// Every collaborator the pipeline needs, supplied by the caller
#[derive(Clone)]
pub struct Collaborators {
    pub verifier: Arc<dyn VideoVerifier>,
    pub details: Arc<dyn DetailExtractor>,
    pub ingredients: Arc<dyn IngredientStore>,
    pub tags: Arc<dyn TagStore>,
    pub detail_meta: Arc<dyn DetailMetaStore>,
    pub instructions: Arc<dyn InstructionExtractor>,
    pub briefings: Arc<dyn BriefingService>,
    pub recipe_info: Arc<dyn RecipeInfoService>,
}

impl Collaborators {
    /// Use one client that implements every contract
    pub fn from_client<C>(client: Arc<C>) -> Self
    where
        C: VideoVerifier
            + DetailExtractor
            + IngredientStore
            + TagStore
            + DetailMetaStore
            + InstructionExtractor
            + BriefingService
            + RecipeInfoService
            + 'static,
    {
        Self {
            verifier: client.clone(),
            details: client.clone(),
            ingredients: client.clone(),
            tags: client.clone(),
            detail_meta: client.clone(),
            instructions: client.clone(),
            briefings: client.clone(),
            recipe_info: client,
        }
    }
}
