// src/services/report_service.rs

use serde_json::Value;

use crate::{
    common::error::AppError,
    db::ReportRepository,
    models::{
        audit::MovementKind,
        reports::{DashboardMetrics, DateRange, ExpiryQuery},
    },
};

const DASHBOARD_EXPIRY_DAYS: i32 = 30;

#[derive(Clone)]
pub struct ReportService {
    repo: ReportRepository,
}

impl ReportService {
    pub fn new(repo: ReportRepository) -> Self {
        Self { repo }
    }

    // --- Dashboard ---

    pub async fn metrics(&self) -> Result<DashboardMetrics, AppError> {
        Ok(self.repo.dashboard_metrics().await?)
    }

    pub async fn expiring_reagents(&self) -> Result<Vec<Value>, AppError> {
        Ok(self.repo.reagents_expiring_within(DASHBOARD_EXPIRY_DAYS).await?)
    }

    // --- Reportes ---

    pub async fn inventory(&self) -> Result<Vec<Value>, AppError> {
        Ok(self.repo.inventory().await?)
    }

    pub async fn movements(&self, kind: MovementKind, range: &DateRange) -> Result<Vec<Value>, AppError> {
        Ok(self.repo.movements(kind.as_str(), range.bounds()).await?)
    }

    pub async fn expirations(&self, query: &ExpiryQuery) -> Result<Vec<Value>, AppError> {
        Ok(self.repo.expirations(query.days()).await?)
    }
}
