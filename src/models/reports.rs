// src/models/reports.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_insumos: i64,
    pub total_reactivos: i64,
    pub total_solicitudes: i64,
    pub total_clientes: i64,
    pub total_papeleria: i64,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRange {
    pub fecha_desde: Option<NaiveDate>,
    pub fecha_hasta: Option<NaiveDate>,
}

impl DateRange {
    /// El filtro solo aplica cuando vienen ambos extremos.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.fecha_desde.zip(self.fecha_hasta)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpiryQuery {
    pub dias: Option<i32>,
}

impl ExpiryQuery {
    pub fn days(&self) -> i32 {
        self.dias.filter(|d| *d > 0).unwrap_or(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_needs_both_ends() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(DateRange { fecha_desde: Some(d), fecha_hasta: None }.bounds(), None);
        assert_eq!(
            DateRange { fecha_desde: Some(d), fecha_hasta: Some(d) }.bounds(),
            Some((d, d))
        );
    }

    #[test]
    fn expiry_defaults_to_thirty_days() {
        assert_eq!(ExpiryQuery::default().days(), 30);
        assert_eq!(ExpiryQuery { dias: Some(-2) }.days(), 30);
        assert_eq!(ExpiryQuery { dias: Some(7) }.days(), 7);
    }
}
