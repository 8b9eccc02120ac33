//! Application state

use processor::CheckItemService;
use sqlx::PgPool;

/// Shared application state
pub struct AppState {
    pub pool: PgPool,
    pub checks: CheckItemService,
}

impl AppState {
    pub fn new(pool: PgPool, checks: CheckItemService) -> Self {
        Self { pool, checks }
    }
}
