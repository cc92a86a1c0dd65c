//! Parsing of submitted video references
//!
//! Submissions arrive as whatever URL the user pasted. Extraction services
//! only understand the bare video id, so the URL is reduced to a
//! [`VideoRef`] before a run starts.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

const VIDEO_ID_LEN: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VideoUrlError {
    #[error("Video URL is empty")]
    Empty,

    #[error("Unsupported video URL: {0}")]
    Unsupported(String),
}

/// A recognised video and its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    id: String,
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?x)
            ^(?:https?://)?
            (?:
                (?:www\.|m\.|music\.)?youtube\.com/
                (?:
                    watch\?(?:[^\#]*&)?v=
                  | shorts/
                  | embed/
                  | live/
                  | v/
                )
              | youtu\.be/
            )
            (?P<id>[A-Za-z0-9_-]{11})
            (?:[?&\#/].*)?$",
        )
        .expect("valid regex")
    })
}

impl VideoRef {
    /// Recognise a YouTube watch, short, embed, live or youtu.be URL
    pub fn parse(url: &str) -> Result<Self, VideoUrlError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(VideoUrlError::Empty);
        }

        url_pattern()
            .captures(url)
            .and_then(|caps| caps.name("id"))
            .map(|id| Self {
                id: id.as_str().to_string(),
            })
            .ok_or_else(|| VideoUrlError::Unsupported(url.to_string()))
    }

    /// Accept either a full URL or a bare video id
    pub fn parse_or_id(input: &str) -> Result<Self, VideoUrlError> {
        let input = input.trim();
        if input.len() == VIDEO_ID_LEN
            && input
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Ok(Self {
                id: input.to_string(),
            });
        }
        Self::parse(input)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn canonical_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        watch = { "https://www.youtube.com/watch?v=dQw4w9WgXcQ" },
        watch_extra_params = { "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42s" },
        no_scheme = { "youtube.com/watch?v=dQw4w9WgXcQ" },
        mobile = { "https://m.youtube.com/watch?v=dQw4w9WgXcQ" },
        short_link = { "https://youtu.be/dQw4w9WgXcQ?si=abcdef" },
        shorts = { "https://www.youtube.com/shorts/dQw4w9WgXcQ" },
        embed = { "https://www.youtube.com/embed/dQw4w9WgXcQ" },
        live = { "https://www.youtube.com/live/dQw4w9WgXcQ?feature=shared" },
        surrounding_whitespace = { "  https://youtu.be/dQw4w9WgXcQ \n" },
    )]
    fn test_parse_supported_urls(url: &str) {
        let video = VideoRef::parse(url).unwrap();
        assert_eq!(video.id(), "dQw4w9WgXcQ");
    }

    #[parameterized(
        other_host = { "https://vimeo.com/123456789" },
        short_id = { "https://youtu.be/abc123" },
        long_id = { "https://www.youtube.com/watch?v=dQw4w9WgXcQx" },
        channel = { "https://www.youtube.com/@somechef" },
        lookalike_host = { "https://notyoutube.com/watch?v=dQw4w9WgXcQ" },
    )]
    fn test_parse_rejects_unsupported_urls(url: &str) {
        assert!(matches!(
            VideoRef::parse(url),
            Err(VideoUrlError::Unsupported(_))
        ));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(VideoRef::parse("   "), Err(VideoUrlError::Empty));
    }

    #[test]
    fn test_parse_or_id_accepts_bare_id() {
        let video = VideoRef::parse_or_id("dQw4w9WgXcQ").unwrap();
        assert_eq!(video.id(), "dQw4w9WgXcQ");
        assert_eq!(
            video.canonical_url(),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }
}
