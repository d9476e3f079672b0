use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

/// One discovered location, assembled from the model answer and its
/// grounding citation.
///
/// The id embeds a timestamp plus the citation index, so it is not stable
/// across searches; favorites membership keys on `url` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<LatLng>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub review_snippets: Vec<ReviewSnippet>,
    pub vibe: String,
    #[serde(default)]
    pub crowd_level: CrowdLevel,
    pub price_range: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_advisory: Option<String>,
}

impl Place {
    /// Per-result identifier: `place-{index}-{unix-millis}`.
    pub fn result_id(index: usize) -> String {
        format!("place-{}-{}", index, Utc::now().timestamp_millis())
    }
}

/// A review excerpt surfaced by the grounding citation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSnippet {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Categorical crowd level. Extraction only ever produces the first three
/// variants; `Unknown` exists for payloads that omit the field entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrowdLevel {
    Quiet,
    #[default]
    Moderate,
    Busy,
    Unknown,
}

impl CrowdLevel {
    /// Case-insensitive parse constrained to the three literal values.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "quiet" => Some(Self::Quiet),
            "moderate" => Some(Self::Moderate),
            "busy" => Some(Self::Busy),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crowd_level_parse_is_closed_over_three_literals() {
        assert_eq!(CrowdLevel::parse("Quiet"), Some(CrowdLevel::Quiet));
        assert_eq!(CrowdLevel::parse("  busy "), Some(CrowdLevel::Busy));
        assert_eq!(CrowdLevel::parse("MODERATE"), Some(CrowdLevel::Moderate));
        assert_eq!(CrowdLevel::parse("packed"), None);
        assert_eq!(CrowdLevel::parse(""), None);
    }

    #[test]
    fn result_id_embeds_index() {
        let id = Place::result_id(3);
        assert!(id.starts_with("place-3-"));
    }
}
