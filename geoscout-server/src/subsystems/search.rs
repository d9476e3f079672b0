//! Search orchestrator — one grounded `generateContent` call per search.
//!
//! Builds a text or image+text request, attaches the location bias when
//! known, enables maps grounding, and scrapes the reply into a
//! [`SearchResult`]. Any service failure propagates to the caller; there
//! is no retry and no partial result.

use geoscout_core::extract;
use geoscout_core::gemini::{
    Content, GeminiClient, GeminiError, GenerateContentRequest, Part, Tool, ToolConfig,
};
use geoscout_core::geo::LatLng;
use geoscout_core::models::SearchResult;

pub const SYSTEM_INSTRUCTION: &str = "You are a Global Local Expert.
1. Focus on specific locations found via Google Maps.
2. For every place, extract or infer:
   - Full Address
   - 'Vibe' (e.g., Cozy, Modern, Historic)
   - 'Crowd Level' (Quiet, Moderate, Busy)
   - 'Price Range' (e.g., $, $$, $$$)
   - 'Weather Advisory' (e.g., Good for rain, Best in sun)
3. If an image is provided, identify the landmark/storefront and search for details.
4. Always ground your response using the Google Maps tool.";

/// Prompt prefix for the visual-search path.
pub const VISUAL_QUERY_PREFIX: &str = "Identify this location and find similar or related spots: ";

/// Query substituted when an image arrives with no text.
pub const DEFAULT_VISUAL_QUERY: &str = "Identify this";

/// Base64 image payload from the visual-search path.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub data_base64: String,
    pub mime_type: String,
}

pub async fn run_search(
    client: &GeminiClient,
    query: &str,
    location: Option<LatLng>,
    image: Option<&ImagePayload>,
) -> Result<SearchResult, GeminiError> {
    let contents = match image {
        Some(image) => vec![Content::from_parts(vec![
            Part::inline_data(&image.mime_type, &image.data_base64),
            Part::text(format!("{}{}", VISUAL_QUERY_PREFIX, query)),
        ])],
        None => vec![Content::text(query)],
    };

    let request = GenerateContentRequest {
        contents,
        system_instruction: Some(Content::text(SYSTEM_INSTRUCTION)),
        tools: vec![Tool::google_maps()],
        tool_config: location.map(ToolConfig::location_bias),
        generation_config: None,
    };

    let reply = client.generate(client.search_model(), &request).await?;

    tracing::info!(
        chunks = reply.grounding_chunks.len(),
        chars = reply.text.len(),
        "Grounded search reply received"
    );

    Ok(extract::extract_search_result(
        &reply.text,
        &reply.grounding_chunks,
    ))
}
