// src/services/checkin_service.rs

use chrono::Local;

use crate::{
    common::{
        clock,
        error::AppError,
        spreadsheet::{write_workbook, Cell, ExportFile},
        uploads::{allowed_extension, checkin_file_name, UploadStore, UploadedFile, IMAGE_EXTENSIONS},
    },
    db::{checkin_repo::NewCheckin, CheckinRepository, StoreRepository},
    models::checkin::{Checkin, CheckinEntry, CheckinFilter, CheckinHistoryEntry, CheckinKind},
    services::report_service::NO_DATA_TO_EXPORT,
};

const LIST_LIMIT: i64 = 100;

/// O que chega do formulário multipart de check-in/check-out.
#[derive(Debug, Default)]
pub struct CheckinSubmission {
    pub store_id: Option<i32>,
    pub kind: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub image: Option<UploadedFile>,
}

#[derive(Clone)]
pub struct CheckinService {
    repo: CheckinRepository,
    store_repo: StoreRepository,
    uploads: UploadStore,
}

fn parse_coordinate(raw: Option<&str>) -> Result<Option<f64>, AppError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .replace(',', ".")
            .parse::<f64>()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Coordenada inválida: '{}'", v))),
    }
}

impl CheckinService {
    pub fn new(repo: CheckinRepository, store_repo: StoreRepository, uploads: UploadStore) -> Self {
        Self { repo, store_repo, uploads }
    }

    // --- Promotora ---

    pub async fn record(&self, user_id: i32, submission: CheckinSubmission) -> Result<Checkin, AppError> {
        let stores = self.store_repo.list_assigned(user_id).await?;
        if stores.is_empty() {
            return Err(AppError::Warning(
                "Você não está associada a nenhuma loja para fazer check-in.".into(),
            ));
        }

        let (Some(store_id), Some(kind), Some(image)) =
            (submission.store_id, submission.kind.as_deref(), submission.image)
        else {
            return Err(AppError::BadRequest("Todos os campos são obrigatórios.".into()));
        };

        let kind: CheckinKind = kind.parse().map_err(AppError::BadRequest)?;
        if !stores.iter().any(|s| s.id == store_id) {
            return Err(AppError::Forbidden);
        }

        let latitude = parse_coordinate(submission.latitude.as_deref())?;
        let longitude = parse_coordinate(submission.longitude.as_deref())?;

        let ext = allowed_extension(&image.file_name, IMAGE_EXTENSIONS)?;
        let file_name = checkin_file_name(kind, user_id, Local::now(), &ext);
        let saved = self.uploads.save(&file_name, &image.bytes).await?;

        let checkin = self
            .repo
            .create(NewCheckin {
                user_id,
                store_id,
                kind,
                latitude,
                longitude,
                image_path: &saved,
            })
            .await?;

        tracing::info!("📍 {} registrado (promotora {}, loja {})", kind.display_name(), user_id, store_id);
        Ok(checkin)
    }

    pub async fn list(&self, user_id: i32) -> Result<Vec<CheckinEntry>, AppError> {
        self.repo.recent_for_promoter(user_id, LIST_LIMIT).await
    }

    // --- Administração ---

    pub async fn history(&self, filter: &CheckinFilter) -> Result<Vec<CheckinHistoryEntry>, AppError> {
        let (from, to) = filter.period(clock::today());
        let (start, end) = clock::local_day_bounds(from, to);
        self.repo
            .history(start, end, filter.promoter_id, filter.store_id)
            .await
    }

    pub async fn export(&self, filter: &CheckinFilter) -> Result<ExportFile, AppError> {
        let (from, to) = filter.period(clock::today());
        let (start, end) = clock::local_day_bounds(from, to);
        let entries = self
            .repo
            .history(start, end, filter.promoter_id, filter.store_id)
            .await?;
        if entries.is_empty() {
            return Err(AppError::NotFound(NO_DATA_TO_EXPORT.into()));
        }

        let headers: Vec<String> = ["Data/Hora", "Promotora", "Loja", "Tipo", "Latitude", "Longitude"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let rows: Vec<Vec<Cell>> = entries
            .into_iter()
            .map(|e| {
                vec![
                    Cell::Text(e.recorded_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()),
                    Cell::from(e.promoter_name),
                    Cell::Text(e.store_name),
                    Cell::Text(e.kind.display_name().to_string()),
                    e.latitude.map(Cell::Number).unwrap_or(Cell::Empty),
                    e.longitude.map(Cell::Number).unwrap_or(Cell::Empty),
                ]
            })
            .collect();

        Ok(ExportFile {
            file_name: format!(
                "historico_checkins_{}_a_{}.xlsx",
                from.format("%Y-%m-%d"),
                to.format("%Y-%m-%d")
            ),
            bytes: write_workbook("Historico_Checkins", &headers, &rows)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_accept_comma_and_blank() {
        assert_eq!(parse_coordinate(Some("-23,55")).unwrap(), Some(-23.55));
        assert_eq!(parse_coordinate(Some("  ")).unwrap(), None);
        assert_eq!(parse_coordinate(None).unwrap(), None);
        assert!(parse_coordinate(Some("norte")).is_err());
    }
}
