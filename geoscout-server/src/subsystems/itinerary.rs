//! Day-itinerary subsystem: a schema-constrained JSON call over the
//! user's saved places.
//!
//! Malformed structured output is swallowed into an empty itinerary (the
//! loading flag is the only user-visible difference from "nothing
//! generated yet"); a service failure still propagates.

use geoscout_core::gemini::{
    Content, GeminiClient, GeminiError, GenerateContentRequest, GenerationConfig,
};
use geoscout_core::models::{ItineraryStep, Place};

/// Response schema for the itinerary steps array.
pub fn itinerary_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "time": { "type": "STRING" },
                "placeName": { "type": "STRING" },
                "activity": { "type": "STRING" }
            },
            "required": ["time", "placeName", "activity"]
        }
    })
}

pub async fn generate(
    client: &GeminiClient,
    places: &[Place],
) -> Result<Vec<ItineraryStep>, GeminiError> {
    let names = places
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let prompt = format!(
        "Generate a one-day itinerary using these places: {}. Optimize for route efficiency.",
        names
    );

    let request = GenerateContentRequest {
        contents: vec![Content::text(prompt)],
        generation_config: Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(itinerary_schema()),
        }),
        ..Default::default()
    };

    let reply = client.generate(client.aux_model(), &request).await?;

    let steps = match serde_json::from_str::<Vec<ItineraryStep>>(&reply.text) {
        Ok(steps) => steps,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed itinerary JSON, returning empty itinerary");
            Vec::new()
        }
    };

    Ok(steps)
}
