use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;

use crate::api::models::{
    Envelope, HealthBody, HistoryQuery, LatestPrice, NO_DATA_IN_WINDOW, NO_QUOTE_AVAILABLE,
};
use crate::api::state::AppState;
use crate::engine::{HistoryWindow, WindowStats};
use crate::error::AppError;

pub async fn latest(
    State(state): State<AppState>,
) -> Result<Json<Envelope<LatestPrice>>, AppError> {
    let body = match state.repo.latest().await? {
        Some(obs) => Envelope::ok(LatestPrice::from(obs)),
        None => Envelope::empty(NO_QUOTE_AVAILABLE),
    };

    Ok(Json(body))
}

pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Envelope<WindowStats>>, AppError> {
    let token = query
        .window
        .filter(|w| !w.is_empty())
        .ok_or_else(|| AppError::BadRequest("query parameter \"window\" is required".into()))?;

    let window: HistoryWindow = token.parse().map_err(AppError::BadRequest)?;

    let body = match state.aggregator.query(window.duration(), Utc::now()).await? {
        Some(stats) => Envelope::ok(stats),
        None => Envelope::empty(NO_DATA_IN_WINDOW),
    };

    Ok(Json(body))
}

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthBody>, AppError> {
    let report = state.health.check(Utc::now()).await?;
    Ok(Json(HealthBody::from(report)))
}
