//! Application state shared across handlers

use common::session::{SessionConfig, SessionRepository};
use sqlx::PgPool;

use crate::repositories::{
    console::ConsoleRepository, orders::OrderRepository, reports::ReportRepository,
    returns::ReturnRepository, search::SearchRepository, statistics::StatisticsRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub session_repository: SessionRepository,
    pub search_repository: SearchRepository,
    pub order_repository: OrderRepository,
    pub return_repository: ReturnRepository,
    pub statistics_repository: StatisticsRepository,
    pub report_repository: ReportRepository,
    pub console_repository: ConsoleRepository,
}

impl AppState {
    pub fn new(db_pool: PgPool, session_config: &SessionConfig) -> Self {
        Self {
            session_repository: SessionRepository::new(db_pool.clone(), session_config),
            search_repository: SearchRepository::new(db_pool.clone()),
            order_repository: OrderRepository::new(db_pool.clone()),
            return_repository: ReturnRepository::new(db_pool.clone()),
            statistics_repository: StatisticsRepository::new(db_pool.clone()),
            report_repository: ReportRepository::new(db_pool.clone()),
            console_repository: ConsoleRepository::new(db_pool),
        }
    }
}
