//! Goal completion routes

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use common::models::Goal;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::ActingUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CompleteQuery {
    /// Completion date, defaults to today
    pub date: Option<NaiveDate>,
}

pub async fn complete(
    State(state): State<Arc<AppState>>,
    ActingUser(user_id): ActingUser,
    Path(goal_id): Path<Uuid>,
    Query(query): Query<CompleteQuery>,
) -> ApiResult<Json<Goal>> {
    let completed_on = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let goal = state
        .checks
        .complete_goal(user_id, goal_id, completed_on)
        .await?;

    Ok(Json(goal))
}

pub async fn uncomplete(
    State(state): State<Arc<AppState>>,
    ActingUser(user_id): ActingUser,
    Path(goal_id): Path<Uuid>,
) -> ApiResult<Json<Goal>> {
    let goal = state.checks.uncomplete_goal(user_id, goal_id).await?;
    Ok(Json(goal))
}
