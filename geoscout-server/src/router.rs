//! Request dispatch: one `ScoutRequest` in, one `ScoutResponse` out.
//!
//! Every shell operation funnels through here so the reducer, profile,
//! and map view stay consistent regardless of which surface issued the
//! request.

use geoscout_core::geo::LatLng;
use geoscout_core::protocol::{ScoutRequest, ScoutResponse};
use geoscout_core::state::{Action, SEARCH_FAILED_MESSAGE};

use crate::session::Session;
use crate::subsystems::{context, itinerary, search};

/// User-facing message when the itinerary precondition is not met.
pub const ITINERARY_MIN_FAVORITES_MESSAGE: &str =
    "Add at least 2 places to your Saved list first.";

pub async fn handle_request(request: ScoutRequest, session: &Session) -> ScoutResponse {
    match request {
        ScoutRequest::Ping => ScoutResponse::pong(),

        ScoutRequest::Health => ScoutResponse::ok(serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "search_model": session.client.search_model(),
        })),

        ScoutRequest::Search {
            query,
            latitude,
            longitude,
            image_base64,
            image_mime_type,
        } => {
            let image = image_base64.map(|data_base64| search::ImagePayload {
                data_base64,
                mime_type: image_mime_type.unwrap_or_else(|| "image/jpeg".to_string()),
            });

            if query.trim().is_empty() && image.is_none() {
                return ScoutResponse::err("query field is required");
            }

            handle_search(session, query, latitude, longitude, image).await
        }

        ScoutRequest::Context { place_name } => handle_context(session, place_name).await,

        ScoutRequest::Itinerary => handle_itinerary(session).await,

        ScoutRequest::ToggleFavorite { place } => {
            let name = place.name.clone();
            let mut profile = session.profile.lock().await;
            match profile.toggle_favorite(place) {
                Ok(favorited) => ScoutResponse::ok(serde_json::json!({
                    "name": name,
                    "favorited": favorited,
                    "count": profile.favorites().len(),
                })),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to persist favorites");
                    ScoutResponse::err(e.to_string())
                }
            }
        }

        ScoutRequest::Favorites => {
            let profile = session.profile.lock().await;
            ScoutResponse::ok(serde_json::json!({
                "favorites": profile.favorites(),
                "count": profile.favorites().len(),
            }))
        }

        ScoutRequest::RecentSearches => {
            let profile = session.profile.lock().await;
            ScoutResponse::ok(serde_json::json!({
                "recent_searches": profile.recent_searches(),
            }))
        }

        ScoutRequest::SetLocation {
            latitude,
            longitude,
        } => {
            session
                .state
                .write()
                .await
                .apply(Action::SetUserLocation(LatLng::new(latitude, longitude)));
            let sync = session.sync_map().await;
            ScoutResponse::ok(serde_json::json!({ "sync": sync }))
        }

        ScoutRequest::Select { place_id } => handle_select(session, place_id).await,

        ScoutRequest::SetTheme { theme } => {
            session.state.write().await.apply(Action::SetTheme(theme));
            let tile_url = session.map.lock().await.set_theme(theme);
            ScoutResponse::ok(serde_json::json!({ "theme": theme, "tile_url": tile_url }))
        }
    }
}

async fn handle_search(
    session: &Session,
    query: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    image: Option<search::ImagePayload>,
) -> ScoutResponse {
    if let (Some(latitude), Some(longitude)) = (latitude, longitude) {
        session
            .state
            .write()
            .await
            .apply(Action::SetUserLocation(LatLng::new(latitude, longitude)));
    }

    // History records typed queries up front, before the call settles.
    // The substituted image-only query is not history.
    let query = if query.trim().is_empty() {
        search::DEFAULT_VISUAL_QUERY.to_string()
    } else {
        if let Err(e) = session.profile.lock().await.record_search(&query) {
            tracing::warn!(error = %e, "Failed to persist recent search");
        }
        query
    };

    let (seq, bias) = {
        let mut state = session.state.write().await;
        let seq = state.begin_search(&query);
        (seq, state.user_location)
    };

    match search::run_search(&session.client, &query, bias, image.as_ref()).await {
        Ok(result) => {
            session.state.write().await.apply(Action::SearchCompleted {
                seq,
                result: result.clone(),
            });
            let sync = session.sync_map().await;
            ScoutResponse::ok(serde_json::json!({ "result": result, "sync": sync }))
        }
        Err(e) => {
            tracing::error!(error = %e, "Grounded search failed");
            session.state.write().await.apply(Action::SearchFailed {
                seq,
                message: SEARCH_FAILED_MESSAGE.to_string(),
            });
            ScoutResponse::err(SEARCH_FAILED_MESSAGE)
        }
    }
}

async fn handle_context(session: &Session, place_name: String) -> ScoutResponse {
    // Fetch once per place; re-entering history mode reuses the text
    // already attached to the active place.
    let cached = {
        let state = session.state.read().await;
        state
            .active_place
            .as_ref()
            .filter(|p| p.name == place_name)
            .and_then(|p| p.historical_context.clone())
    };

    let text = match cached {
        Some(text) => text,
        None => match context::historical_context(&session.client, &place_name).await {
            Ok(text) => {
                session
                    .state
                    .write()
                    .await
                    .apply(Action::ContextLoaded { text: text.clone() });
                text
            }
            Err(e) => {
                tracing::error!(error = %e, "Historical context fetch failed");
                return ScoutResponse::err("Could not travel back in time.");
            }
        },
    };

    let history_mode = {
        let mut state = session.state.write().await;
        state.apply(Action::ToggleHistoryMode);
        state.history_mode
    };

    ScoutResponse::ok(serde_json::json!({
        "place_name": place_name,
        "historical_context": text,
        "history_mode": history_mode,
    }))
}

async fn handle_itinerary(session: &Session) -> ScoutResponse {
    let favorites = session.profile.lock().await.favorites().to_vec();
    if favorites.len() < 2 {
        return ScoutResponse::err(ITINERARY_MIN_FAVORITES_MESSAGE);
    }

    session.state.write().await.apply(Action::ItineraryStarted);

    match itinerary::generate(&session.client, &favorites).await {
        Ok(steps) => {
            let count = steps.len();
            session
                .state
                .write()
                .await
                .apply(Action::ItineraryCompleted(steps.clone()));
            ScoutResponse::ok(serde_json::json!({
                "steps": steps,
                "count": count,
            }))
        }
        Err(e) => {
            tracing::error!(error = %e, "Itinerary generation failed");
            session
                .state
                .write()
                .await
                .apply(Action::ItineraryCompleted(Vec::new()));
            ScoutResponse::err("Itinerary failed.")
        }
    }
}

async fn handle_select(session: &Session, place_id: Option<String>) -> ScoutResponse {
    let place = match &place_id {
        Some(id) => {
            let candidates = session.displayed_places().await;
            match candidates.into_iter().find(|p| &p.id == id) {
                Some(place) => Some(place),
                None => return ScoutResponse::err(format!("Unknown place id: {}", id)),
            }
        }
        None => None,
    };

    session.state.write().await.apply(Action::Select { place });
    let sync = session.sync_map().await;
    let selected = session.state.read().await.selected_place.clone();

    ScoutResponse::ok(serde_json::json!({
        "selected": selected,
        "sync": sync,
    }))
}
