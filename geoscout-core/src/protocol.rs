use serde::{Deserialize, Serialize};

use crate::mapsync::MapTheme;
use crate::models::Place;

/// One shell operation, as carried over the HTTP API.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScoutRequest {
    Ping,
    Health,
    Search {
        query: String,
        #[serde(default)]
        latitude: Option<f64>,
        #[serde(default)]
        longitude: Option<f64>,
        /// Base64 JPEG/PNG payload for the visual-search path.
        #[serde(default)]
        image_base64: Option<String>,
        #[serde(default)]
        image_mime_type: Option<String>,
    },
    Context {
        place_name: String,
    },
    Itinerary,
    ToggleFavorite {
        place: Place,
    },
    Favorites,
    RecentSearches,
    SetLocation {
        latitude: f64,
        longitude: f64,
    },
    Select {
        #[serde(default)]
        place_id: Option<String>,
    },
    SetTheme {
        theme: MapTheme,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScoutResponse {
    pub status: String,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub version: String,
}

impl ScoutResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            status: "ok".to_string(),
            data: Some(data),
            error: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            error: Some(msg.into()),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn pong() -> Self {
        Self::ok(serde_json::json!({"pong": true}))
    }
}
