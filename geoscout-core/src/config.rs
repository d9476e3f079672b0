use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::gemini::{DEFAULT_AUX_MODEL, DEFAULT_SEARCH_MODEL};

#[derive(Debug, Deserialize, Clone)]
pub struct ScoutConfig {
    pub service: ServiceConfig,
    #[serde(default)]
    pub gemini: GeminiSection,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiSection {
    pub search_model: String,
    pub aux_model: String,
    pub timeout_seconds: u64,
}

impl Default for GeminiSection {
    fn default() -> Self {
        Self {
            search_model: DEFAULT_SEARCH_MODEL.to_string(),
            aux_model: DEFAULT_AUX_MODEL.to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProfileConfig {
    pub path: String,
    pub recent_limit: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            path: "geoscout-profile.json".to_string(),
            recent_limit: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapConfig {
    /// Zoom level used when flying to a selected place.
    pub select_zoom: u8,
    /// Pixel padding around fitted bounds.
    pub fit_padding: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            select_zoom: 16,
            fit_padding: 80,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8765,
        }
    }
}

impl ScoutConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .build()?;
        s.try_deserialize()
    }
}
