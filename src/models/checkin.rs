// src/models/checkin.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// Mapeia o CREATE TYPE checkin_kind do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "checkin_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CheckinKind {
    Checkin,
    Checkout,
}

impl CheckinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckinKind::Checkin => "checkin",
            CheckinKind::Checkout => "checkout",
        }
    }

    /// Rótulo exibido nas mensagens ("Checkin registado com sucesso!").
    pub fn display_name(&self) -> &'static str {
        match self {
            CheckinKind::Checkin => "Checkin",
            CheckinKind::Checkout => "Checkout",
        }
    }
}

impl fmt::Display for CheckinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckinKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().replace('-', "").as_str() {
            "checkin" => Ok(CheckinKind::Checkin),
            "checkout" => Ok(CheckinKind::Checkout),
            _ => Err(format!("Tipo de registro inválido: '{}'", raw)),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Checkin {
    pub id: i32,
    pub user_id: i32,
    pub store_id: i32,
    pub kind: CheckinKind,
    pub recorded_at: DateTime<Utc>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_path: String,
}

// Histórico da própria promotora
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckinEntry {
    pub id: i32,
    pub kind: CheckinKind,
    pub recorded_at: DateTime<Utc>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_path: String,
    pub store_name: String,
}

// Histórico administrativo
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckinHistoryEntry {
    pub recorded_at: DateTime<Utc>,
    pub kind: CheckinKind,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_path: String,
    pub promoter_name: Option<String>,
    pub store_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CheckinFilter {
    pub promoter_id: Option<i32>,
    pub store_id: Option<i32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl CheckinFilter {
    /// Período efetivo: padrão dos últimos 7 dias até hoje.
    pub fn period(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let to = self.date_to.unwrap_or(today);
        let from = self.date_from.unwrap_or(today - chrono::Duration::days(7));
        (from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parsing_is_lenient() {
        assert_eq!("checkin".parse(), Ok(CheckinKind::Checkin));
        assert_eq!(" Check-Out ".parse(), Ok(CheckinKind::Checkout));
        assert!("almoço".parse::<CheckinKind>().is_err());
    }

    #[test]
    fn period_defaults_to_last_week() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let (from, to) = CheckinFilter::default().period(today);
        assert_eq!(from, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(to, today);
    }
}
