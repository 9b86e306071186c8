//! Application state shared across handlers

use common::token::TokenService;
use sqlx::PgPool;

use crate::repositories::{GroupRepository, ScheduleRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub token_service: TokenService,
    pub schedule_repository: ScheduleRepository,
    pub group_repository: GroupRepository,
}
