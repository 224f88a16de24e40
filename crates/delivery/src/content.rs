//! Motivational content generation.
//!
//! The real generator is an HTTP service (an LLM gateway) reached through
//! [`HttpContentGenerator`]. When it is unconfigured or fails, callers fall
//! back to [`fallback_content`], so a content outage degrades message
//! quality rather than dropping the day's delivery.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stride_core::types::Tone;

/// Error type for content generation failures.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Content service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Content service returned malformed payload: {0}")]
    Malformed(String),
}

/// What the generator needs to know about a goal.
#[derive(Debug, Clone, Serialize)]
pub struct ContentRequest {
    pub goal_title: String,
    pub goal_description: Option<String>,
    pub tone: Tone,
    pub streak_count: i32,
    pub target_date: Option<NaiveDate>,
}

/// A generated motivational message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotivationContent {
    /// The main motivational message body.
    pub message: String,
    /// Two or three concrete steps for today.
    pub micro_plan: Vec<String>,
    /// A one-line stretch challenge.
    pub challenge: String,
}

/// Generates motivational content for a goal.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, request: &ContentRequest) -> Result<MotivationContent, ContentError>;
}

// ---------------------------------------------------------------------------
// HTTP generator
// ---------------------------------------------------------------------------

/// Calls the external content-generation service over HTTP.
pub struct HttpContentGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpContentGenerator {
    /// Build from environment. Returns `None` if `CONTENT_API_URL` is not
    /// set, signalling that generation is unconfigured and the static
    /// fallback should be used exclusively.
    ///
    /// | Variable          | Required | Purpose                      |
    /// |-------------------|----------|------------------------------|
    /// | `CONTENT_API_URL` | yes      | Base URL of the service      |
    /// | `CONTENT_API_KEY` | no       | Bearer token, if required    |
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("CONTENT_API_URL").ok()?;
        Some(Self {
            client: reqwest::Client::new(),
            base_url,
            api_key: std::env::var("CONTENT_API_KEY").ok(),
        })
    }
}

#[async_trait]
impl ContentGenerator for HttpContentGenerator {
    async fn generate(&self, request: &ContentRequest) -> Result<MotivationContent, ContentError> {
        let url = format!("{}/v1/motivation", self.base_url.trim_end_matches('/'));
        let mut builder = self.client.post(&url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let content: MotivationContent = builder
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if content.message.is_empty() {
            return Err(ContentError::Malformed("empty message body".to_string()));
        }
        Ok(content)
    }
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// Static message used when the content service is down or unconfigured.
pub fn fallback_content(goal_title: &str, streak_count: i32) -> MotivationContent {
    let message = if streak_count > 0 {
        format!(
            "You're {streak_count} day(s) into \"{goal_title}\". Keep the chain going. Show up today."
        )
    } else {
        format!("Today is a good day to make progress on \"{goal_title}\". Start small, start now.")
    };
    MotivationContent {
        message,
        micro_plan: vec![
            "Pick the smallest next step".to_string(),
            "Do it before anything else".to_string(),
        ],
        challenge: "Check in as soon as you're done.".to_string(),
    }
}

/// A generator that always serves [`fallback_content`]. Used when no
/// content service is configured.
pub struct FallbackGenerator;

#[async_trait]
impl ContentGenerator for FallbackGenerator {
    async fn generate(&self, request: &ContentRequest) -> Result<MotivationContent, ContentError> {
        Ok(fallback_content(&request.goal_title, request.streak_count))
    }
}
