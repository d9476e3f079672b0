//! Gemini `generateContent` client.
//!
//! Three call shapes, all over the same endpoint:
//! - **grounded search** — maps-grounding tool enabled, optional location
//!   bias, free-text answer plus grounding chunks
//! - **free text** — google_search-grounded one-shot prose (historical
//!   context)
//! - **structured** — JSON constrained by a response schema (itinerary)
//!
//! Calls are single-attempt: a service failure is terminal for the one
//! user action that triggered it.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::GroundingChunk;
use crate::geo::LatLng;

/// Maps grounding is only supported in Gemini 2.5 series models.
pub const DEFAULT_SEARCH_MODEL: &str = "gemini-2.5-flash";

/// Model for the auxiliary one-shot calls (context, itinerary).
pub const DEFAULT_AUX_MODEL: &str = "gemini-3-flash-preview";

// ============================================================================
// Error types
// ============================================================================

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Missing API key")]
    MissingApiKey,
}

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub search_model: String,
    pub aux_model: String,
    pub timeout_seconds: u64,
}

impl GeminiConfig {
    pub fn new(api_key: Option<String>, search_model: String, aux_model: String) -> Self {
        let api_key = api_key
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .unwrap_or_default();

        Self {
            api_key,
            search_model,
            aux_model,
            timeout_seconds: 30,
        }
    }
}

// ============================================================================
// Wire structs
// ============================================================================

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self { parts }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::text(text)],
        }
    }
}

/// One content part: either text or inline binary data, never both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(Blob {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
        }
    }
}

/// Base64-encoded media payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_maps: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<serde_json::Value>,
}

impl Tool {
    pub fn google_maps() -> Self {
        Self {
            google_maps: Some(serde_json::json!({})),
            google_search: None,
        }
    }

    pub fn google_search() -> Self {
        Self {
            google_maps: None,
            google_search: Some(serde_json::json!({})),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub retrieval_config: RetrievalConfig,
}

impl ToolConfig {
    /// Geographic retrieval hint biasing grounded results toward the user.
    pub fn location_bias(location: LatLng) -> Self {
        Self {
            retrieval_config: RetrievalConfig { lat_lng: location },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalConfig {
    pub lat_lng: LatLng,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    code: u16,
    message: String,
}

// ============================================================================
// Reply
// ============================================================================

/// Flattened reply: first-candidate text (empty when the model returned
/// none) plus the grounding citations.
#[derive(Debug, Clone, Default)]
pub struct GenerateReply {
    pub text: String,
    pub grounding_chunks: Vec<GroundingChunk>,
}

// ============================================================================
// GeminiClient
// ============================================================================

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        Self::with_base_url(
            config,
            "https://generativelanguage.googleapis.com/v1beta".to_string(),
        )
    }

    /// Create a client with a custom base URL (for testing / integration)
    pub fn with_base_url(config: GeminiConfig, base_url: String) -> Result<Self, GeminiError> {
        if config.api_key.is_empty() {
            return Err(GeminiError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    pub fn search_model(&self) -> &str {
        &self.config.search_model
    }

    pub fn aux_model(&self) -> &str {
        &self.config.aux_model
    }

    /// One `generateContent` call. Single attempt; any failure propagates.
    pub async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateReply, GeminiError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.config.api_key
        );

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let error_detail = serde_json::from_str::<GeminiErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error);

            let (code, message) = error_detail
                .map(|e| (e.code, e.message))
                .unwrap_or((status.as_u16(), error_body));

            tracing::error!(code = code, message = %message, "Gemini API error");

            return Err(GeminiError::Api { code, message });
        }

        let body: GenerateContentResponse = response.json().await?;
        Ok(flatten_response(body))
    }
}

fn flatten_response(body: GenerateContentResponse) -> GenerateReply {
    let mut reply = GenerateReply::default();

    let Some(candidate) = body.candidates.into_iter().next() else {
        return reply;
    };

    if let Some(content) = candidate.content {
        reply.text = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("");
    }

    if let Some(metadata) = candidate.grounding_metadata {
        reply.grounding_chunks = metadata.grounding_chunks;
    }

    reply
}

// ============================================================================
// TESTS
// ============================================================================
