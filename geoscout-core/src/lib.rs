pub mod config;
pub mod error;
pub mod extract;
pub mod gemini;
pub mod geo;
pub mod mapsync;
pub mod models;
pub mod profile;
pub mod protocol;
pub mod state;

pub use config::ScoutConfig;
pub use error::ScoutError;
pub use gemini::{GeminiClient, GeminiConfig, GeminiError, DEFAULT_AUX_MODEL, DEFAULT_SEARCH_MODEL};
pub use geo::{coords_from_maps_url, LatLng, LatLngBounds};
pub use mapsync::{MapTheme, MapView, Viewport};
pub use models::{CrowdLevel, GroundingLink, ItineraryStep, Place, ReviewSnippet, SearchResult};
pub use profile::ProfileStore;
pub use state::{Action, AppState};
