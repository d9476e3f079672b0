//! Historical-context subsystem: one google_search-grounded prose call
//! for a single place name.

use geoscout_core::gemini::{Content, GeminiClient, GeminiError, GenerateContentRequest, Tool};

/// Shown while the model has nothing to say about a place's past.
pub const CONTEXT_FALLBACK: &str = "History is still being grounded...";

pub async fn historical_context(
    client: &GeminiClient,
    place_name: &str,
) -> Result<String, GeminiError> {
    let prompt = format!(
        "Give me the historical context of {} from 100 years ago. \
         Focus on architectural changes or cultural significance. \
         Keep it concise (3-4 sentences).",
        place_name
    );

    let request = GenerateContentRequest {
        contents: vec![Content::text(prompt)],
        tools: vec![Tool::google_search()],
        ..Default::default()
    };

    let reply = client.generate(client.aux_model(), &request).await?;

    if reply.text.is_empty() {
        Ok(CONTEXT_FALLBACK.to_string())
    } else {
        Ok(reply.text)
    }
}
