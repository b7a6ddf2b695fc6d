// src/services/dashboard_service.rs

use crate::{
    common::{clock, error::AppError},
    db::DashboardRepository,
    models::dashboard::DashboardSummary,
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn get_summary(&self) -> Result<DashboardSummary, AppError> {
        let today = clock::today();
        let (day_start, day_end) = clock::local_day_bounds(today, today);
        self.repo.get_summary(today, day_start, day_end).await
    }
}
