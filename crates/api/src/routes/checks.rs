//! Check/uncheck/skip routes

use axum::{
    extract::{Path, State},
    Json,
};
use common::models::{CheckRequest, GroupRef, RefreshSnapshot};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::ActingUser;
use crate::error::ApiResult;
use crate::state::AppState;

/// Request body; the routine comes from the path
#[derive(Debug, Deserialize)]
pub struct CheckBody {
    #[serde(default)]
    pub task_group: Option<GroupRef>,
    #[serde(default)]
    pub habit_group: Option<GroupRef>,
    #[serde(default)]
    pub skip: Option<bool>,
}

impl CheckBody {
    fn into_request(self, routine_id: Uuid) -> CheckRequest {
        CheckRequest {
            routine_id,
            task_group: self.task_group,
            habit_group: self.habit_group,
            skip: self.skip,
        }
    }
}

pub async fn check(
    State(state): State<Arc<AppState>>,
    ActingUser(user_id): ActingUser,
    Path(routine_id): Path<Uuid>,
    Json(body): Json<CheckBody>,
) -> ApiResult<Json<RefreshSnapshot>> {
    let snapshot = state
        .checks
        .check_item(user_id, body.into_request(routine_id))
        .await?;

    Ok(Json(snapshot))
}
