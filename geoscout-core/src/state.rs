//! Application-shell state: one explicit struct driven through a
//! unidirectional update cycle.
//!
//! Search settlement is sequence-guarded: every started search takes a
//! monotonic sequence number, and a completion or failure carrying a stale
//! number is dropped. Overlapping searches therefore resolve
//! latest-issued-wins instead of last-to-settle-wins.

use serde::Serialize;

use crate::geo::LatLng;
use crate::mapsync::MapTheme;
use crate::models::{ItineraryStep, Place, SearchResult};

/// User-facing message for any search failure.
pub const SEARCH_FAILED_MESSAGE: &str = "Exploration failed. Check connection.";

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub query: String,
    pub loading: bool,
    pub result: Option<SearchResult>,
    pub selected_place: Option<Place>,
    /// Last place opened in the detail panel; survives deselection.
    pub active_place: Option<Place>,
    pub user_location: Option<LatLng>,
    pub theme: MapTheme,
    pub show_favorites: bool,
    pub itinerary: Vec<ItineraryStep>,
    pub itinerary_loading: bool,
    pub history_mode: bool,
    pub error: Option<String>,
    seq: u64,
}

#[derive(Debug, Clone)]
pub enum Action {
    /// One-shot geolocation read; ignored once a location is set.
    SetUserLocation(LatLng),
    SearchStarted { query: String },
    SearchCompleted { seq: u64, result: SearchResult },
    SearchFailed { seq: u64, message: String },
    Select { place: Option<Place> },
    SetTheme(MapTheme),
    ToggleFavoritesView,
    ItineraryStarted,
    ItineraryCompleted(Vec<ItineraryStep>),
    /// Historical context fetched for the active place.
    ContextLoaded { text: String },
    ToggleHistoryMode,
}

impl AppState {
    /// Sequence number of the most recently started search.
    pub fn current_seq(&self) -> u64 {
        self.seq
    }

    /// Start a search and return its sequence number, which the caller
    /// must echo back in the settlement action.
    pub fn begin_search(&mut self, query: &str) -> u64 {
        self.apply(Action::SearchStarted {
            query: query.to_string(),
        });
        self.seq
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::SetUserLocation(location) => {
                if self.user_location.is_none() {
                    self.user_location = Some(location);
                }
            }
            Action::SearchStarted { query } => {
                self.seq += 1;
                self.query = query;
                self.loading = true;
                self.error = None;
                self.selected_place = None;
                self.show_favorites = false;
            }
            Action::SearchCompleted { seq, result } => {
                if seq != self.seq {
                    tracing::debug!(stale = seq, current = self.seq, "Dropping stale search result");
                    return;
                }
                self.result = Some(result);
                self.loading = false;
            }
            Action::SearchFailed { seq, message } => {
                if seq != self.seq {
                    tracing::debug!(stale = seq, current = self.seq, "Dropping stale search failure");
                    return;
                }
                self.loading = false;
                self.error = Some(message);
            }
            Action::Select { place } => {
                if let Some(place) = &place {
                    self.active_place = Some(place.clone());
                    self.history_mode = false;
                }
                self.selected_place = place;
            }
            Action::SetTheme(theme) => self.theme = theme,
            Action::ToggleFavoritesView => {
                self.show_favorites = !self.show_favorites;
            }
            Action::ItineraryStarted => {
                self.itinerary_loading = true;
            }
            Action::ItineraryCompleted(steps) => {
                self.itinerary = steps;
                self.itinerary_loading = false;
            }
            Action::ContextLoaded { text } => {
                if let Some(active) = &mut self.active_place {
                    active.historical_context = Some(text.clone());
                }
                if let Some(selected) = &mut self.selected_place {
                    selected.historical_context = Some(text);
                }
            }
            Action::ToggleHistoryMode => {
                self.history_mode = !self.history_mode;
            }
        }
    }

    /// Places currently shown in the list panel (search results; the
    /// favorites view substitutes the profile's list at the session layer).
    pub fn places(&self) -> &[Place] {
        self.result.as_ref().map(|r| r.places.as_slice()).unwrap_or(&[])
    }

    pub fn selected_place_id(&self) -> Option<&str> {
        self.selected_place.as_ref().map(|p| p.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CrowdLevel;

    fn result_with(names: &[&str]) -> SearchResult {
        SearchResult {
            text: String::new(),
            places: names
                .iter()
                .enumerate()
                .map(|(i, name)| Place {
                    id: format!("place-{}-0", i),
                    name: name.to_string(),
                    description: String::new(),
                    address: None,
                    rating: None,
                    coordinates: None,
                    url: None,
                    review_snippets: Vec::new(),
                    vibe: "Authentic".to_string(),
                    crowd_level: CrowdLevel::Moderate,
                    price_range: "$$".to_string(),
                    historical_context: None,
                    weather_advisory: None,
                })
                .collect(),
            grounding_links: Vec::new(),
        }
    }

    #[test]
    fn stale_search_settlement_is_dropped() {
        let mut state = AppState::default();

        let first = state.begin_search("cafes");
        let second = state.begin_search("bars");

        // The older search settles late; it must not clobber the newer one.
        state.apply(Action::SearchCompleted {
            seq: first,
            result: result_with(&["Old Cafe"]),
        });
        assert!(state.loading, "stale completion must not clear loading");
        assert!(state.result.is_none());

        state.apply(Action::SearchCompleted {
            seq: second,
            result: result_with(&["New Bar"]),
        });
        assert!(!state.loading);
        assert_eq!(state.places()[0].name, "New Bar");
    }

    #[test]
    fn stale_failure_does_not_surface_an_error() {
        let mut state = AppState::default();
        let first = state.begin_search("cafes");
        let second = state.begin_search("bars");

        state.apply(Action::SearchFailed {
            seq: first,
            message: SEARCH_FAILED_MESSAGE.to_string(),
        });
        assert!(state.error.is_none());

        state.apply(Action::SearchFailed {
            seq: second,
            message: SEARCH_FAILED_MESSAGE.to_string(),
        });
        assert_eq!(state.error.as_deref(), Some(SEARCH_FAILED_MESSAGE));
    }

    #[test]
    fn search_start_clears_selection_and_favorites_view() {
        let mut state = AppState::default();
        state.apply(Action::ToggleFavoritesView);
        state.apply(Action::Select {
            place: result_with(&["Spot"]).places.pop(),
        });
        assert!(state.show_favorites);
        assert!(state.selected_place.is_some());

        state.begin_search("parks");
        assert!(!state.show_favorites);
        assert!(state.selected_place.is_none());
        assert_eq!(state.query, "parks");
    }

    #[test]
    fn user_location_is_one_shot() {
        let mut state = AppState::default();
        state.apply(Action::SetUserLocation(LatLng::new(1.0, 1.0)));
        state.apply(Action::SetUserLocation(LatLng::new(9.0, 9.0)));
        assert_eq!(state.user_location, Some(LatLng::new(1.0, 1.0)));
    }

    #[test]
    fn selecting_a_place_exits_history_mode() {
        let mut state = AppState::default();
        state.apply(Action::ToggleHistoryMode);
        assert!(state.history_mode);

        let place = result_with(&["Spot"]).places.remove(0);
        state.apply(Action::Select { place: Some(place) });
        assert!(!state.history_mode);
        assert!(state.active_place.is_some());

        // Deselecting keeps the active place for the detail panel.
        state.apply(Action::Select { place: None });
        assert!(state.selected_place.is_none());
        assert!(state.active_place.is_some());
    }

    #[test]
    fn context_loads_onto_active_place() {
        let mut state = AppState::default();
        let place = result_with(&["Old Fort"]).places.remove(0);
        state.apply(Action::Select { place: Some(place) });
        state.apply(Action::ContextLoaded {
            text: "Built a century ago.".to_string(),
        });
        assert_eq!(
            state
                .active_place
                .as_ref()
                .and_then(|p| p.historical_context.as_deref()),
            Some("Built a century ago.")
        );
    }
}
