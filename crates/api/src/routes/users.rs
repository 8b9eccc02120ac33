//! User routes

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::ActingUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ConstanceQuery {
    /// Reference date, defaults to today
    pub date: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct ConstanceResponse {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub constance: i32,
    pub max_constance: i32,
    pub completed_days: usize,
}

pub async fn constance(
    State(state): State<Arc<AppState>>,
    ActingUser(user_id): ActingUser,
    Query(query): Query<ConstanceQuery>,
) -> ApiResult<Json<ConstanceResponse>> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let (user, constance) = state.checks.current_constance(user_id, date).await?;

    Ok(Json(ConstanceResponse {
        user_id: user.id,
        date,
        constance,
        max_constance: user.max_constance,
        completed_days: user.completed_days.len(),
    }))
}
