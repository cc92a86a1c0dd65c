//! HTTP client for the recipe extraction service
//!
//! One client speaks to the extraction API and implements every
//! collaborator contract. Transport failures are tagged with the pipeline
//! stage that owns the call.
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |---|---|
//! | verify | `POST /videos/{video_id}/verify` |
//! | cleanup | `DELETE /files?uri={file_uri}` |
//! | detail extraction | `POST /videos/{video_id}/details` |
//! | ingredients / tags / detail meta | `POST /recipes/{id}/ingredients`, `/tags`, `/detail-meta` |
//! | instructions | `POST /recipes/{id}/steps` |
//! | briefing | `POST /recipes/{id}/briefings`, then `GET /recipes/{id}/briefings` |
//! | finalize | `POST /recipes/{id}/success` |
//! | progress | `POST /recipes/{id}/progress` |
//!
//! # Example
//!
//! ```no_run
//! use cookbox::services::{Collaborators, HttpServiceClient};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(HttpServiceClient::new("http://localhost:8080")?);
//! if client.health_check().await? {
//!     let collaborators = Collaborators::from_client(client);
//! }
//! # Ok(())
//! # }
//! ```

use super::traits::{
    BriefingService, DetailExtractor, DetailMetaStore, IngredientStore, InstructionExtractor,
    RecipeInfoService, TagStore, VideoVerifier,
};
use super::types::{Briefing, DetailMeta, Ingredient, RecipeDetail, RecipeId, VerifiedMedia};
use crate::error::{CreationError, ServiceError};
use crate::pipeline::StepKind;
use crate::progress::{ProgressDetail, ProgressStatus, ProgressStep, ProgressTracker};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default request timeout for API calls
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct HttpServiceClient {
    /// Base URL without trailing slash
    base_url: String,

    /// Shared HTTP client with connection pooling
    http_client: Client,

    timeout: Duration,
}

#[derive(Serialize)]
struct DetailRequest<'a> {
    file_uri: &'a str,
    mime_type: &'a str,
    title: &'a str,
}

#[derive(Serialize)]
struct MediaRequest<'a> {
    file_uri: &'a str,
    mime_type: &'a str,
}

#[derive(Serialize)]
struct IngredientsRequest<'a> {
    ingredients: &'a [Ingredient],
}

#[derive(Serialize)]
struct TagsRequest<'a> {
    tags: &'a [String],
}

#[derive(Serialize)]
struct BriefingRequest<'a> {
    video_id: &'a str,
}

#[derive(Serialize)]
struct ProgressRequest {
    step: ProgressStep,
    detail: ProgressDetail,
    status: ProgressStatus,
}

impl HttpServiceClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServiceError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Checks whether the extraction service is reachable and healthy.
    ///
    /// `Ok(false)` means the service is down or unreachable; `Err` is
    /// reserved for unexpected transport errors.
    pub async fn health_check(&self) -> Result<bool, ServiceError> {
        let url = self.url("/health");
        debug!("Checking service health at {}", url);

        match self.http_client.get(&url).send().await {
            Ok(response) => {
                let is_healthy = response.status().is_success();
                if is_healthy {
                    info!("Service health check successful");
                } else {
                    warn!("Service health check failed with status: {}", response.status());
                }
                Ok(is_healthy)
            }
            Err(e) if e.is_timeout() => {
                warn!("Service health check timed out");
                Ok(false)
            }
            Err(e) if e.is_connect() => {
                warn!("Cannot connect to service at {}", self.base_url);
                Ok(false)
            }
            Err(e) => {
                error!("Service health check error: {}", e);
                Err(ServiceError::Network(format!("Health check failed: {}", e)))
            }
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ServiceError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_for_status(status.as_u16(), &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ServiceError> {
        self.send(request).await.map(|_| ())
    }
}

/// Map a non-success response to a service error.
///
/// 422 means the service understood the request and refused the input.
fn error_for_status(status: u16, body: &str) -> ServiceError {
    let message = response_message(body);
    match status {
        422 => ServiceError::Rejected(message),
        _ => ServiceError::Api { status, message },
    }
}

/// Pull a human-readable message out of an error body
fn response_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "error", "detail"] {
            if let Some(text) = value.get(field).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no response body".to_string()
    } else {
        trimmed.to_string()
    }
}

fn tag(stage: StepKind) -> impl Fn(ServiceError) -> CreationError {
    move |e| CreationError::for_stage(stage, e)
}

#[async_trait]
impl VideoVerifier for HttpServiceClient {
    async fn verify(&self, video_id: &str) -> Result<VerifiedMedia, CreationError> {
        let request = self
            .http_client
            .post(self.url(&format!("/videos/{}/verify", video_id)));
        self.send_json(request).await.map_err(tag(StepKind::Verify))
    }

    async fn cleanup(&self, file_uri: &str) -> Result<(), ServiceError> {
        let request = self
            .http_client
            .delete(self.url("/files"))
            .query(&[("uri", file_uri)]);
        self.send_empty(request).await
    }
}

#[async_trait]
impl DetailExtractor for HttpServiceClient {
    async fn get_details(
        &self,
        video_id: &str,
        file_uri: &str,
        mime_type: &str,
        title: &str,
    ) -> Result<RecipeDetail, CreationError> {
        let request = self
            .http_client
            .post(self.url(&format!("/videos/{}/details", video_id)))
            .json(&DetailRequest {
                file_uri,
                mime_type,
                title,
            });
        self.send_json(request).await.map_err(tag(StepKind::Detail))
    }
}

#[async_trait]
impl IngredientStore for HttpServiceClient {
    async fn create(
        &self,
        recipe_id: RecipeId,
        ingredients: &[Ingredient],
    ) -> Result<(), CreationError> {
        let request = self
            .http_client
            .post(self.url(&format!("/recipes/{}/ingredients", recipe_id)))
            .json(&IngredientsRequest { ingredients });
        self.send_empty(request).await.map_err(tag(StepKind::Detail))
    }
}

#[async_trait]
impl TagStore for HttpServiceClient {
    async fn create(&self, recipe_id: RecipeId, tags: &[String]) -> Result<(), CreationError> {
        let request = self
            .http_client
            .post(self.url(&format!("/recipes/{}/tags", recipe_id)))
            .json(&TagsRequest { tags });
        self.send_empty(request).await.map_err(tag(StepKind::Detail))
    }
}

#[async_trait]
impl DetailMetaStore for HttpServiceClient {
    async fn create(&self, recipe_id: RecipeId, meta: &DetailMeta) -> Result<(), CreationError> {
        let request = self
            .http_client
            .post(self.url(&format!("/recipes/{}/detail-meta", recipe_id)))
            .json(meta);
        self.send_empty(request).await.map_err(tag(StepKind::Detail))
    }
}

#[async_trait]
impl InstructionExtractor for HttpServiceClient {
    async fn create(
        &self,
        recipe_id: RecipeId,
        file_uri: &str,
        mime_type: &str,
    ) -> Result<(), CreationError> {
        let request = self
            .http_client
            .post(self.url(&format!("/recipes/{}/steps", recipe_id)))
            .json(&MediaRequest {
                file_uri,
                mime_type,
            });
        self.send_empty(request)
            .await
            .map_err(tag(StepKind::Instruction))
    }
}

#[async_trait]
impl BriefingService for HttpServiceClient {
    async fn create(&self, video_id: &str, recipe_id: RecipeId) -> Result<(), CreationError> {
        let request = self
            .http_client
            .post(self.url(&format!("/recipes/{}/briefings", recipe_id)))
            .json(&BriefingRequest { video_id });
        self.send_empty(request).await.map_err(tag(StepKind::Briefing))
    }

    async fn get(&self, recipe_id: RecipeId) -> Result<Briefing, CreationError> {
        let request = self
            .http_client
            .get(self.url(&format!("/recipes/{}/briefings", recipe_id)));
        self.send_json(request).await.map_err(tag(StepKind::Briefing))
    }
}

#[async_trait]
impl RecipeInfoService for HttpServiceClient {
    async fn success(&self, recipe_id: RecipeId) -> Result<(), CreationError> {
        let request = self
            .http_client
            .post(self.url(&format!("/recipes/{}/success", recipe_id)));
        self.send_empty(request).await.map_err(tag(StepKind::Finalize))
    }
}

/// Reports progress transitions to the extraction service.
///
/// Failures are logged and dropped; progress reporting never fails a run.
#[derive(Clone)]
pub struct HttpProgressTracker {
    client: Arc<HttpServiceClient>,
}

impl HttpProgressTracker {
    pub fn new(client: Arc<HttpServiceClient>) -> Self {
        Self { client }
    }

    async fn report(
        &self,
        recipe_id: RecipeId,
        step: ProgressStep,
        detail: ProgressDetail,
        status: ProgressStatus,
    ) {
        let request = self
            .client
            .http_client
            .post(self.client.url(&format!("/recipes/{}/progress", recipe_id)))
            .json(&ProgressRequest {
                step,
                detail,
                status,
            });

        if let Err(e) = self.client.send_empty(request).await {
            warn!(
                recipe_id = %recipe_id,
                step = %step,
                detail = %detail,
                status = %status,
                error = %e,
                "Failed to report progress"
            );
        }
    }
}

#[async_trait]
impl ProgressTracker for HttpProgressTracker {
    async fn start(&self, recipe_id: RecipeId, step: ProgressStep, detail: ProgressDetail) {
        self.report(recipe_id, step, detail, ProgressStatus::Started)
            .await;
    }

    async fn success(&self, recipe_id: RecipeId, step: ProgressStep, detail: ProgressDetail) {
        self.report(recipe_id, step, detail, ProgressStatus::Succeeded)
            .await;
    }

    async fn failed(&self, recipe_id: RecipeId, step: ProgressStep, detail: ProgressDetail) {
        self.report(recipe_id, step, detail, ProgressStatus::Failed)
            .await;
    }
}
