//! JSON HTTP API over the simulation engine.
//!
//! All routes live under `/api`. Only `GET /api/energy` mutates the energy
//! stream; every other route reads stored state or is a pure calculation.

mod error;
mod handlers;
mod types;

pub use error::ApiError;
pub use handlers::{HISTORY_LIMIT, MONTHLY_WINDOW_DAYS};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use chrono::FixedOffset;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AuthConfig;
use crate::sim::Engine;
use crate::site::ConfigStore;
use crate::telemetry::shutdown_signal;
use crate::weather::WeatherProvider;

/// Application state shared across all request handlers.
///
/// The engine sits behind a single mutex: a tick and its history append are
/// one critical section. Configuration has its own store and lock.
pub struct AppState {
    pub config_store: Arc<dyn ConfigStore>,
    pub engine: Mutex<Engine<StdRng>>,
    pub weather: Arc<dyn WeatherProvider>,
    pub auth: AuthConfig,
    /// Site-local offset for labels and hour-of-day logic.
    pub offset: FixedOffset,
}

impl AppState {
    pub fn new(
        config_store: Arc<dyn ConfigStore>,
        engine: Engine<StdRng>,
        weather: Arc<dyn WeatherProvider>,
        auth: AuthConfig,
    ) -> Self {
        let offset = engine.settings().offset;
        Self {
            config_store,
            engine: Mutex::new(engine),
            weather,
            auth,
            offset,
        }
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/energy", get(handlers::get_energy))
        .route(
            "/api/config",
            get(handlers::get_config).post(handlers::update_config),
        )
        .route("/api/weather", get(handlers::get_weather))
        .route("/api/history", get(handlers::get_history))
        .route("/api/monthly", get(handlers::get_monthly))
        .route("/api/optimization", get(handlers::get_optimization))
        .route("/api/prediction", get(handlers::get_prediction))
        .route("/api/calculate-solar", post(handlers::calculate_solar))
        .route("/api/login", post(handlers::login))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds to `addr` and serves until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use rand::SeedableRng;
    use tower::util::ServiceExt;

    use super::*;
    use crate::sim::EngineSettings;
    use crate::site::{InMemoryConfigStore, SiteConfig};
    use crate::weather::OfflineWeather;

    fn make_test_state(seeded: bool) -> Arc<AppState> {
        let settings = EngineSettings::default();
        let mut engine = Engine::new(settings, 1000, StdRng::seed_from_u64(42));
        if seeded {
            engine
                .seed_history(&SiteConfig::default(), 30, Utc::now())
                .unwrap();
        }
        Arc::new(AppState::new(
            Arc::new(InMemoryConfigStore::new(SiteConfig::default())),
            engine,
            Arc::new(OfflineWeather::new(settings.offset)),
            AuthConfig::default(),
        ))
    }

    async fn call(state: Arc<AppState>, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = router(state).oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn energy_ticks_and_appends() {
        let state = make_test_state(false);
        let (status, json) = call(state.clone(), get("/api/energy")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(json.get("performance_score").is_some());
        assert!(json.get("weather_icon").is_some());
        assert_eq!(json["city"], "Mumbai");
        assert_eq!(state.engine.lock().history().len(), 1);
    }

    #[tokio::test]
    async fn history_is_capped_at_fifty() {
        let state = make_test_state(true);
        let (status, json) = call(state, get("/api/history")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().map(Vec::len), Some(HISTORY_LIMIT));
    }

    #[tokio::test]
    async fn monthly_covers_seeded_days() {
        let state = make_test_state(true);
        let (status, json) = call(state, get("/api/monthly")).await;
        assert_eq!(status, StatusCode::OK);
        let days = json.as_array().map(Vec::len).unwrap_or(0);
        assert!((30..=31).contains(&days), "got {days} days");
    }

    #[tokio::test]
    async fn invalid_config_update_returns_400() {
        let state = make_test_state(false);
        let (status, json) = call(
            state.clone(),
            post_json("/api/config", r#"{"battery_size": 0}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(state.config_store.get().battery_size_kwh, 10.0);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let state = make_test_state(false);
        let (status, json) = call(
            state,
            post_json("/api/login", r#"{"username":"admin","password":"nope"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn malformed_json_is_a_client_error() {
        let state = make_test_state(false);
        let (status, json) = call(state, post_json("/api/calculate-solar", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "BadRequest");
    }
}
