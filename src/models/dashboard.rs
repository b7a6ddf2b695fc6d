// src/models/dashboard.rs

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::checkin::CheckinKind;

// 1. Os cards + gráficos da tela inicial do administrador
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub active_promoters: i64,
    pub total_stores: i64,
    pub reports_today: i64,
    pub checkins_today: i64,
    pub reports_by_day: Vec<DailyCount>,
    pub checkins_by_kind: Vec<KindCount>,
}

// 2. Relatórios por dia (últimos 7 dias)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub day: NaiveDate,
    pub total: i64,
}

// 3. Check-ins de hoje por tipo
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KindCount {
    pub kind: CheckinKind,
    pub total: i64,
}
