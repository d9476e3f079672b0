//! GeoScout HTTP REST API.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to a
//! pure inner function. The inner functions are directly testable without
//! axum dispatch machinery.
//!
//! Endpoints:
//! - GET  /health           — service health and active search model
//! - GET  /version          — server version info
//! - GET  /favorites        — the saved-places collection
//! - GET  /recent           — recent search queries
//! - POST /search           — grounded place discovery (text or image)
//! - POST /context          — historical context for the active place
//! - POST /itinerary        — one-day itinerary over saved places
//! - POST /favorites/toggle — save or unsave a place
//! - POST /location         — set the user location
//! - POST /select           — select or deselect a place
//! - POST /theme            — switch the basemap theme

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use geoscout_core::mapsync::MapTheme;
use geoscout_core::models::Place;
use geoscout_core::protocol::{ScoutRequest, ScoutResponse};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::router::handle_request;
use crate::session::Session;

/// Build the Axum router with all endpoints
pub fn build_router(session: Arc<Session>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/favorites", get(favorites_handler))
        .route("/recent", get(recent_handler))
        .route("/search", post(search_handler))
        .route("/context", post(context_handler))
        .route("/itinerary", post(itinerary_handler))
        .route("/favorites/toggle", post(toggle_favorite_handler))
        .route("/location", post(location_handler))
        .route("/select", post(select_handler))
        .route("/theme", post(theme_handler))
        .with_state(session)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    session: Arc<Session>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", session.config.http.host, session.config.http.port);

    let app = build_router(session);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("GeoScout HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub query: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub image_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContextBody {
    pub place_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LocationBody {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize, Default)]
pub struct SelectBody {
    pub place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ThemeBody {
    pub theme: MapTheme,
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner health check — reports the service as up with its search model.
pub async fn health_inner(session: &Session) -> (StatusCode, serde_json::Value) {
    let response = handle_request(ScoutRequest::Health, session).await;
    match response_to_http(response) {
        Ok(data) => (StatusCode::OK, data),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({ "status": "unhealthy", "error": e }),
        ),
    }
}

/// Inner version — returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "geoscout/1",
    })
}

/// Inner search — validates the query and dispatches to the router.
pub async fn search_inner(session: &Session, body: SearchBody) -> (StatusCode, serde_json::Value) {
    let has_image = body.image_base64.is_some();
    let query = match body.query {
        Some(q) if !q.trim().is_empty() => q,
        _ if has_image => String::new(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": "query field is required",
                    "status": "error",
                }),
            );
        }
    };

    let start = Instant::now();

    let request = ScoutRequest::Search {
        query,
        latitude: body.latitude,
        longitude: body.longitude,
        image_base64: body.image_base64,
        image_mime_type: body.image_mime_type,
    };

    let response = handle_request(request, session).await;
    let took_ms = start.elapsed().as_millis() as u64;

    match response_to_http(response) {
        Ok(mut data) => {
            if let Some(obj) = data.as_object_mut() {
                obj.insert("took_ms".to_string(), serde_json::json!(took_ms));
            }
            (StatusCode::OK, data)
        }
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            serde_json::json!({
                "error": e,
                "status": "error",
            }),
        ),
    }
}

pub async fn context_inner(session: &Session, body: ContextBody) -> (StatusCode, serde_json::Value) {
    if body.place_name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            serde_json::json!({
                "error": "place_name field is required",
                "status": "error",
            }),
        );
    }

    let response = handle_request(
        ScoutRequest::Context {
            place_name: body.place_name,
        },
        session,
    )
    .await;

    match response_to_http(response) {
        Ok(data) => (StatusCode::OK, data),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            serde_json::json!({ "error": e, "status": "error" }),
        ),
    }
}

pub async fn itinerary_inner(session: &Session) -> (StatusCode, serde_json::Value) {
    let response = handle_request(ScoutRequest::Itinerary, session).await;
    match response_to_http(response) {
        Ok(data) => (StatusCode::OK, data),
        Err(e) => {
            // The precondition failure is a client error, not a gateway one.
            let status = if e == crate::router::ITINERARY_MIN_FAVORITES_MESSAGE {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                StatusCode::BAD_GATEWAY
            };
            (status, serde_json::json!({ "error": e, "status": "error" }))
        }
    }
}

pub async fn toggle_favorite_inner(
    session: &Session,
    place: Place,
) -> (StatusCode, serde_json::Value) {
    let response = handle_request(ScoutRequest::ToggleFavorite { place }, session).await;
    match response_to_http(response) {
        Ok(data) => (StatusCode::OK, data),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({ "error": e, "status": "error" }),
        ),
    }
}

pub async fn favorites_inner(session: &Session) -> (StatusCode, serde_json::Value) {
    let response = handle_request(ScoutRequest::Favorites, session).await;
    match response_to_http(response) {
        Ok(data) => (StatusCode::OK, data),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({ "error": e, "status": "error" }),
        ),
    }
}

pub async fn recent_inner(session: &Session) -> (StatusCode, serde_json::Value) {
    let response = handle_request(ScoutRequest::RecentSearches, session).await;
    match response_to_http(response) {
        Ok(data) => (StatusCode::OK, data),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({ "error": e, "status": "error" }),
        ),
    }
}

pub async fn location_inner(
    session: &Session,
    body: LocationBody,
) -> (StatusCode, serde_json::Value) {
    let response = handle_request(
        ScoutRequest::SetLocation {
            latitude: body.latitude,
            longitude: body.longitude,
        },
        session,
    )
    .await;

    match response_to_http(response) {
        Ok(data) => (StatusCode::OK, data),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({ "error": e, "status": "error" }),
        ),
    }
}

pub async fn select_inner(session: &Session, body: SelectBody) -> (StatusCode, serde_json::Value) {
    let response = handle_request(
        ScoutRequest::Select {
            place_id: body.place_id,
        },
        session,
    )
    .await;

    match response_to_http(response) {
        Ok(data) => (StatusCode::OK, data),
        Err(e) => (
            StatusCode::NOT_FOUND,
            serde_json::json!({ "error": e, "status": "error" }),
        ),
    }
}

pub async fn theme_inner(session: &Session, body: ThemeBody) -> (StatusCode, serde_json::Value) {
    let response = handle_request(ScoutRequest::SetTheme { theme: body.theme }, session).await;
    match response_to_http(response) {
        Ok(data) => (StatusCode::OK, data),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({ "error": e, "status": "error" }),
        ),
    }
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn health_handler(State(session): State<Arc<Session>>) -> impl IntoResponse {
    let (status, body) = health_inner(&session).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn search_handler(
    State(session): State<Arc<Session>>,
    Json(body): Json<SearchBody>,
) -> impl IntoResponse {
    let (status, body) = search_inner(&session, body).await;
    (status, Json(body))
}

pub async fn context_handler(
    State(session): State<Arc<Session>>,
    Json(body): Json<ContextBody>,
) -> impl IntoResponse {
    let (status, body) = context_inner(&session, body).await;
    (status, Json(body))
}

pub async fn itinerary_handler(State(session): State<Arc<Session>>) -> impl IntoResponse {
    let (status, body) = itinerary_inner(&session).await;
    (status, Json(body))
}

pub async fn toggle_favorite_handler(
    State(session): State<Arc<Session>>,
    Json(place): Json<Place>,
) -> impl IntoResponse {
    let (status, body) = toggle_favorite_inner(&session, place).await;
    (status, Json(body))
}

pub async fn favorites_handler(State(session): State<Arc<Session>>) -> impl IntoResponse {
    let (status, body) = favorites_inner(&session).await;
    (status, Json(body))
}

pub async fn recent_handler(State(session): State<Arc<Session>>) -> impl IntoResponse {
    let (status, body) = recent_inner(&session).await;
    (status, Json(body))
}

pub async fn location_handler(
    State(session): State<Arc<Session>>,
    Json(body): Json<LocationBody>,
) -> impl IntoResponse {
    let (status, body) = location_inner(&session, body).await;
    (status, Json(body))
}

pub async fn select_handler(
    State(session): State<Arc<Session>>,
    Json(body): Json<SelectBody>,
) -> impl IntoResponse {
    let (status, body) = select_inner(&session, body).await;
    (status, Json(body))
}

pub async fn theme_handler(
    State(session): State<Arc<Session>>,
    Json(body): Json<ThemeBody>,
) -> impl IntoResponse {
    let (status, body) = theme_inner(&session, body).await;
    (status, Json(body))
}

// ============================================================================
// Helpers
// ============================================================================

/// Convert a `ScoutResponse` into an HTTP body value, or an error string.
pub fn response_to_http(response: ScoutResponse) -> std::result::Result<serde_json::Value, String> {
    if response.status == "ok" {
        Ok(response.data.unwrap_or(serde_json::json!({})))
    } else {
        Err(response
            .error
            .unwrap_or_else(|| "unknown error".to_string()))
    }
}

// ============================================================================
// Unit Tests — call inner functions directly
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use geoscout_core::gemini::{GeminiClient, GeminiConfig};
    use geoscout_core::geo::LatLng;
    use geoscout_core::models::CrowdLevel;
    use geoscout_core::ScoutConfig;

    fn make_session(dir: &tempfile::TempDir) -> Session {
        let config: ScoutConfig = serde_json::from_value(serde_json::json!({
            "service": { "log_level": "info" },
            "profile": {
                "path": dir.path().join("profile.json").to_string_lossy(),
                "recent_limit": 5
            }
        }))
        .unwrap();

        let gemini = GeminiConfig {
            api_key: "test-api-key".to_string(),
            search_model: "gemini-2.5-flash".to_string(),
            aux_model: "gemini-3-flash-preview".to_string(),
            timeout_seconds: 5,
        };
        let client =
            GeminiClient::with_base_url(gemini, "http://127.0.0.1:9".to_string()).unwrap();

        Session::new(config, client).unwrap()
    }

    fn place(id: &str, name: &str) -> Place {
        Place {
            id: id.to_string(),
            name: name.to_string(),
            description: "Verified location via Google Maps.".to_string(),
            address: None,
            rating: None,
            coordinates: Some(LatLng::new(40.0, -74.0)),
            url: Some(format!("https://maps.google.com/?cid={}", id)),
            review_snippets: Vec::new(),
            vibe: "Authentic".to_string(),
            crowd_level: CrowdLevel::Moderate,
            price_range: "$".to_string(),
            historical_context: None,
            weather_advisory: None,
        }
    }

    #[test]
    fn test_version_inner_pure() {
        let v = version_inner();
        assert!(v["version"].is_string(), "version must be string");
        assert_eq!(v["protocol"], "geoscout/1");
    }

    #[test]
    fn test_response_to_http_ok() {
        let resp = ScoutResponse::ok(serde_json::json!({"count": 0}));
        let data = response_to_http(resp).unwrap();
        assert_eq!(data["count"], 0);
    }

    #[test]
    fn test_response_to_http_error() {
        let resp = ScoutResponse::err("something went wrong");
        let result = response_to_http(resp);
        assert_eq!(result.unwrap_err(), "something went wrong");
    }

    #[test]
    fn test_response_to_http_error_no_message() {
        let mut resp = ScoutResponse::err("x");
        resp.error = None;
        assert_eq!(response_to_http(resp).unwrap_err(), "unknown error");
    }

    #[tokio::test]
    async fn test_health_inner_reports_search_model() {
        let dir = tempfile::tempdir().unwrap();
        let session = make_session(&dir);

        let (status, body) = health_inner(&session).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["search_model"], "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_search_inner_empty_query_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let session = make_session(&dir);

        let body = SearchBody {
            query: Some("   ".to_string()),
            latitude: None,
            longitude: None,
            image_base64: None,
            image_mime_type: None,
        };

        let (status, body) = search_inner(&session, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_search_inner_missing_query_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let session = make_session(&dir);

        let body = SearchBody {
            query: None,
            latitude: None,
            longitude: None,
            image_base64: None,
            image_mime_type: None,
        };

        let (status, _) = search_inner(&session, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_itinerary_inner_requires_two_favorites() {
        let dir = tempfile::tempdir().unwrap();
        let session = make_session(&dir);

        let (status, body) = itinerary_inner(&session).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["error"],
            crate::router::ITINERARY_MIN_FAVORITES_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_toggle_favorite_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let session = make_session(&dir);

        let (status, body) = toggle_favorite_inner(&session, place("p1", "Joe's Cafe")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["favorited"], true);
        assert_eq!(body["count"], 1);

        let (_, body) = favorites_inner(&session).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["favorites"][0]["name"], "Joe's Cafe");

        let (_, body) = toggle_favorite_inner(&session, place("p1", "Joe's Cafe")).await;
        assert_eq!(body["favorited"], false);
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn test_select_inner_unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let session = make_session(&dir);

        let body = SelectBody {
            place_id: Some("no-such-place".to_string()),
        };
        let (status, body) = select_inner(&session, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_theme_inner_returns_tile_url() {
        let dir = tempfile::tempdir().unwrap();
        let session = make_session(&dir);

        let (status, body) = theme_inner(&session, ThemeBody { theme: MapTheme::Dark }).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "dark");
        assert!(body["tile_url"].as_str().unwrap().contains("dark_all"));
    }

    #[tokio::test]
    async fn test_location_inner_syncs_user_marker() {
        let dir = tempfile::tempdir().unwrap();
        let session = make_session(&dir);

        let (status, _) = location_inner(
            &session,
            LocationBody {
                latitude: 40.7128,
                longitude: -74.0060,
            },
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            session.map.lock().await.user_marker(),
            Some(LatLng::new(40.7128, -74.0060))
        );
    }
}
