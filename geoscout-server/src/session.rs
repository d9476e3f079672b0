//! Shared session: the application shell's state, profile, and map view
//! behind async locks.
//!
//! The original is a single-user app, so one session per process is the
//! whole shell; all mutation funnels through the state reducer, and the
//! map view is re-synced after every state change that can move markers.

use tokio::sync::{Mutex, RwLock};

use geoscout_core::mapsync::SyncReport;
use geoscout_core::models::Place;
use geoscout_core::{AppState, GeminiClient, MapView, ProfileStore, ScoutConfig, ScoutError};

pub struct Session {
    pub config: ScoutConfig,
    pub client: GeminiClient,
    pub state: RwLock<AppState>,
    pub profile: Mutex<ProfileStore>,
    pub map: Mutex<MapView>,
}

impl Session {
    pub fn new(config: ScoutConfig, client: GeminiClient) -> Result<Self, ScoutError> {
        let profile = ProfileStore::open(&config.profile.path, config.profile.recent_limit)?;
        let map = MapView::new(&config.map, None);

        Ok(Self {
            config,
            client,
            state: RwLock::new(AppState::default()),
            profile: Mutex::new(profile),
            map: Mutex::new(map),
        })
    }

    /// Places currently shown in the list panel: the favorites collection
    /// when the favorites view is open, otherwise the search results.
    pub async fn displayed_places(&self) -> Vec<Place> {
        let state = self.state.read().await;
        if state.show_favorites {
            self.profile.lock().await.favorites().to_vec()
        } else {
            state.places().to_vec()
        }
    }

    /// Reconcile the map with the current shell state.
    pub async fn sync_map(&self) -> SyncReport {
        let places = self.displayed_places().await;
        let (user, selected) = {
            let state = self.state.read().await;
            (
                state.user_location,
                state.selected_place_id().map(str::to_string),
            )
        };

        let mut map = self.map.lock().await;
        map.sync(&places, user, selected.as_deref())
    }
}
