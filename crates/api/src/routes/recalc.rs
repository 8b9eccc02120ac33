//! Constance recalculation routes

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::error::{ApiResult, DbResultExt};
use crate::state::AppState;

#[derive(Serialize)]
pub struct RecalcResponse {
    pub status: String,
    pub users_checked: usize,
    pub users_updated: usize,
    pub streaks_broken: usize,
}

pub async fn trigger(State(state): State<Arc<AppState>>) -> ApiResult<Json<RecalcResponse>> {
    info!("Recalculation triggered via API");

    let stats = processor::recalculate_all_constance(&state.pool, Utc::now().date_naive())
        .await
        .db_err()?;

    Ok(Json(RecalcResponse {
        status: "complete".to_string(),
        users_checked: stats.users_checked,
        users_updated: stats.users_updated,
        streaks_broken: stats.streaks_broken,
    }))
}
