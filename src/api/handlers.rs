//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{Timelike, Utc};
use tracing::info;

use super::AppState;
use super::error::ApiError;
use super::types::{
    ConfigResponse, ConfigUpdateResponse, EnergyResponse, HistoryPoint, LoginRequest,
    LoginResponse, WeatherQuery, WeatherResponse, WeatherView,
};
use crate::advice::{OptimizationPlan, optimization_plan};
use crate::devices::battery::INITIAL_CHARGE_PERCENT;
use crate::devices::sunlight_factor;
use crate::forecast::{ForecastPoint, forecast_next_day};
use crate::sim::aggregate::{DailySummary, daily_rollup};
use crate::sim::kpi::EnergyMetrics;
use crate::site::SiteConfigUpdate;
use crate::sizing::{SizingReport, SizingRequest, size_system};

/// Records returned by the history endpoint.
pub const HISTORY_LIMIT: usize = 50;
/// Window of the monthly roll-up, in days.
pub const MONTHLY_WINDOW_DAYS: u32 = 30;

/// Runs one live tick and returns the enriched record.
///
/// `GET /api/energy` → 200 + `EnergyResponse`
///
/// Weather is fetched before the engine lock is taken, so concurrent reads
/// never wait on the network.
pub async fn get_energy(State(state): State<Arc<AppState>>) -> Result<Json<EnergyResponse>, ApiError> {
    let site = state.config_store.get();
    let now = Utc::now();
    let report = state.weather.fetch(&site.city, now).await;

    let outcome = state.engine.lock().tick(&site, &report.snapshot, now)?;
    let metrics = EnergyMetrics::derive(&outcome, &site, &mut rand::rng());

    Ok(Json(EnergyResponse::new(&outcome, metrics, state.offset)))
}

/// `GET /api/config` → 200 + `ConfigResponse`
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        success: true,
        config: state.config_store.get().into(),
    })
}

/// Applies a partial configuration update.
///
/// `POST /api/config` → 200 + `ConfigUpdateResponse`
/// invalid values → 400, configuration unchanged
pub async fn update_config(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SiteConfigUpdate>, JsonRejection>,
) -> Result<Json<ConfigUpdateResponse>, ApiError> {
    let Json(update) = payload?;
    let site = state.config_store.update(&update)?;
    info!(city = %site.city, "site configuration updated");

    Ok(Json(ConfigUpdateResponse {
        success: true,
        message: "Configuration updated successfully",
        config: site.into(),
    }))
}

/// One-shot weather lookup with the sunlight factor, independent of ticking.
///
/// `GET /api/weather?city=X` → 200 + `WeatherResponse`
/// lookup failure → 500 with `success: false` and the fallback weather
pub async fn get_weather(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> impl IntoResponse {
    let city = query
        .city
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| state.config_store.get().city);
    let now = Utc::now();
    let report = state.weather.fetch(&city, now).await;

    let sunlight = sunlight_factor(&report.snapshot, now);
    let status = if report.is_live() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let body = WeatherResponse {
        success: report.is_live(),
        error: report.error.map(|e| e.to_string()),
        weather: WeatherView::new(report.snapshot, sunlight),
    };
    (status, Json(body))
}

/// `GET /api/history` → last 50 records, oldest first
pub async fn get_history(State(state): State<Arc<AppState>>) -> Json<Vec<HistoryPoint>> {
    let recent = state.engine.lock().history().recent(HISTORY_LIMIT);
    Json(
        recent
            .iter()
            .map(|r| HistoryPoint::new(r, state.offset))
            .collect(),
    )
}

/// `GET /api/monthly` → daily roll-up over the last 30 days
pub async fn get_monthly(State(state): State<Arc<AppState>>) -> Json<Vec<DailySummary>> {
    let now = Utc::now();
    let engine = state.engine.lock();
    Json(daily_rollup(
        engine.history().iter(),
        MONTHLY_WINDOW_DAYS,
        now,
        state.offset,
    ))
}

/// `GET /api/optimization` → advice for the current hour and battery level
pub async fn get_optimization(State(state): State<Arc<AppState>>) -> Json<OptimizationPlan> {
    let hour = Utc::now().with_timezone(&state.offset).hour();
    let battery = state
        .engine
        .lock()
        .history()
        .last()
        .map_or(INITIAL_CHARGE_PERCENT, |r| r.battery_percent);
    Json(optimization_plan(hour, battery, &mut rand::rng()))
}

/// `GET /api/prediction` → 24 projected hours from now
pub async fn get_prediction(State(state): State<Arc<AppState>>) -> Json<Vec<ForecastPoint>> {
    let capacity = state.config_store.get().solar_capacity_kw;
    Json(forecast_next_day(
        capacity,
        Utc::now(),
        state.offset,
        &mut rand::rng(),
    ))
}

/// Standalone sizing calculator.
///
/// `POST /api/calculate-solar` → 200 + `SizingReport`
/// non-positive load → 400
pub async fn calculate_solar(
    payload: Result<Json<SizingRequest>, JsonRejection>,
) -> Result<Json<SizingReport>, ApiError> {
    let Json(request) = payload?;
    let report = size_system(request.daily_load)
        .map_err(|e| ApiError::BadRequest(e.message))?;
    Ok(Json(report))
}

/// Static credential check.
///
/// `POST /api/login` → 200 + token, or 401
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    if request.username == state.auth.username && request.password == state.auth.password {
        Ok(Json(LoginResponse {
            success: true,
            token: state.auth.token.clone(),
        }))
    } else {
        Err(ApiError::Unauthorized)
    }
}
