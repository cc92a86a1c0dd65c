//! Per-run state threaded through pipeline steps

use super::step::StepKind;
use crate::error::CreationError;
use crate::services::{Caption, RecipeId};
use crate::video::VideoRef;

/// Downloaded media location; both parts are always present together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub file_uri: String,
    pub mime_type: String,
}

/// Immutable snapshot of one recipe creation run.
///
/// Derivations return a new value and leave the receiver untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    recipe_id: RecipeId,
    video_id: String,
    video_url: String,
    title: String,
    media: Option<MediaFile>,
    caption: Option<Caption>,
}

impl ExecutionContext {
    /// Initial context for a submission, before any stage has run
    pub fn of(
        recipe_id: RecipeId,
        video_id: impl Into<String>,
        video_url: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            recipe_id,
            video_id: video_id.into(),
            video_url: video_url.into(),
            title: title.into(),
            media: None,
            caption: None,
        }
    }

    pub fn for_video(recipe_id: RecipeId, video: &VideoRef, title: impl Into<String>) -> Self {
        Self::of(recipe_id, video.id(), video.canonical_url(), title)
    }

    pub fn with_file_info(&self, file_uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            media: Some(MediaFile {
                file_uri: file_uri.into(),
                mime_type: mime_type.into(),
            }),
            ..self.clone()
        }
    }

    pub fn with_caption(&self, caption: Caption) -> Self {
        Self {
            caption: Some(caption),
            ..self.clone()
        }
    }

    /// Fold the results of concurrently run steps back into this context.
    ///
    /// Only `caption` can be contributed by a concurrent step. The first
    /// output that carries one wins; every other field comes from `self`.
    pub fn merge_outputs<'a, I>(&self, outputs: I) -> Self
    where
        I: IntoIterator<Item = &'a ExecutionContext>,
    {
        match self.caption {
            Some(_) => self.clone(),
            None => outputs
                .into_iter()
                .find_map(|output| output.caption.clone())
                .map(|caption| self.with_caption(caption))
                .unwrap_or_else(|| self.clone()),
        }
    }

    pub fn recipe_id(&self) -> RecipeId {
        self.recipe_id
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn video_url(&self) -> &str {
        &self.video_url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn media(&self) -> Option<&MediaFile> {
        self.media.as_ref()
    }

    pub fn file_uri(&self) -> Option<&str> {
        self.media.as_ref().map(|m| m.file_uri.as_str())
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.media.as_ref().map(|m| m.mime_type.as_str())
    }

    pub fn caption(&self) -> Option<&Caption> {
        self.caption.as_ref()
    }

    /// Media required by `stage`; blank parts count as missing
    pub fn require_media(&self, stage: StepKind) -> Result<&MediaFile, CreationError> {
        let media = self
            .media
            .as_ref()
            .ok_or_else(|| CreationError::missing(stage, "downloaded media"))?;
        if is_blank(&media.file_uri) {
            return Err(CreationError::missing(stage, "file URI"));
        }
        if is_blank(&media.mime_type) {
            return Err(CreationError::missing(stage, "MIME type"));
        }
        Ok(media)
    }

    pub fn require_video_id(&self, stage: StepKind) -> Result<&str, CreationError> {
        if is_blank(&self.video_id) {
            return Err(CreationError::missing(stage, "video id"));
        }
        Ok(&self.video_id)
    }

    pub fn require_caption(&self, stage: StepKind) -> Result<&Caption, CreationError> {
        match &self.caption {
            Some(caption) if !caption.is_blank() => Ok(caption),
            _ => Err(CreationError::missing(stage, "caption")),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
