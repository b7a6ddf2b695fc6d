// src/common/uploads.rs

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    str::FromStr,
};

use axum::{body::Bytes, extract::Multipart};
use chrono::{DateTime, Local};

use crate::{common::error::AppError, models::checkin::CheckinKind};

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv"];

// ---
// Formulário multipart já lido em memória
// ---

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    /// Consome o multipart inteiro. Partes com nome de arquivo viram `files`,
    /// o resto vira texto em `fields`. Arquivos vazios (input sem seleção) são ignorados.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match field.file_name().map(str::to_owned) {
                Some(file_name) if !file_name.is_empty() => {
                    let bytes = field.bytes().await?;
                    if !bytes.is_empty() {
                        form.files.insert(name, UploadedFile { file_name, bytes });
                    }
                }
                _ => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// Campo de texto não vazio (já sem espaços nas pontas).
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Campo de texto convertido (ex: ids). Ausente/vazio -> `None`; inválido -> 400.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>, AppError> {
        self.text(name)
            .map(|v| {
                v.parse::<T>()
                    .map_err(|_| AppError::BadRequest(format!("Valor inválido para '{}': '{}'", name, v)))
            })
            .transpose()
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

// ---
// Nomes de arquivo
// ---

/// Extensão em minúsculas, sem o ponto.
pub fn file_extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_lowercase())
        .filter(|ext| !ext.is_empty())
}

pub fn allowed_extension(file_name: &str, allowed: &[&str]) -> Result<String, AppError> {
    match file_extension(file_name) {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(ext),
        _ => Err(AppError::InvalidFileType(file_name.to_string())),
    }
}

/// Mantém só ASCII alfanumérico, '.', '_' e '-'; o resto vira '_'.
pub fn secure_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    cleaned.trim_start_matches(['.', '_']).to_string()
}

pub fn invoice_file_name(cnpj: Option<&str>, at: DateTime<Local>, ext: &str) -> String {
    let cnpj = cnpj.filter(|c| !c.trim().is_empty()).unwrap_or("sem_cnpj");
    let timestamp = at.format("%Y-%m-%d_%H-%M-%S-%3f");
    secure_filename(&format!("{cnpj}_{timestamp}.{ext}"))
}

pub fn checkin_file_name(kind: CheckinKind, user_id: i32, at: DateTime<Local>, ext: &str) -> String {
    let timestamp = at.format("%Y-%m-%d_%H-%M-%S-%3f");
    secure_filename(&format!("{}_{}_{}.{}", kind.as_str(), user_id, timestamp, ext))
}

// ---
// Gravação em disco
// ---

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Grava o arquivo e devolve o nome salvo (o que vai para o banco).
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        let file_name = secure_filename(file_name);
        if file_name.is_empty() {
            return Err(AppError::InvalidFileType("nome de arquivo vazio".into()));
        }

        tokio::fs::write(self.dir.join(&file_name), bytes).await?;
        tracing::info!("📎 Arquivo salvo: {}", file_name);
        Ok(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 3, 9, 14, 5, 7)
            .single()
            .expect("horário local válido")
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(file_extension("Nota.JPG").as_deref(), Some("jpg"));
        assert_eq!(file_extension("arquivo.tar.gz").as_deref(), Some("gz"));
        assert_eq!(file_extension("sem_extensao"), None);
        assert_eq!(file_extension("ponto."), None);
    }

    #[test]
    fn allow_list_rejects_other_types() {
        assert_eq!(allowed_extension("foto.png", IMAGE_EXTENSIONS).unwrap(), "png");
        assert!(matches!(
            allowed_extension("script.exe", IMAGE_EXTENSIONS),
            Err(AppError::InvalidFileType(_))
        ));
        assert!(allowed_extension("lojas.xlsx", IMAGE_EXTENSIONS).is_err());
        assert!(allowed_extension("lojas.xlsx", SPREADSHEET_EXTENSIONS).is_ok());
    }

    #[test]
    fn secure_filename_strips_path_separators() {
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("12.345.678/0001-90 a.png"), "12.345.678_0001-90_a.png");
    }

    #[test]
    fn invoice_name_uses_cnpj_and_millis() {
        let name = invoice_file_name(Some("12345678000190"), fixed_time(), "png");
        assert_eq!(name, "12345678000190_2025-03-09_14-05-07-000.png");
    }

    #[test]
    fn invoice_name_without_cnpj() {
        let name = invoice_file_name(None, fixed_time(), "jpg");
        assert!(name.starts_with("sem_cnpj_2025-03-09"));
        let blank = invoice_file_name(Some("  "), fixed_time(), "jpg");
        assert!(blank.starts_with("sem_cnpj_"));
    }

    #[test]
    fn checkin_name_has_kind_and_user() {
        let name = checkin_file_name(CheckinKind::Checkout, 42, fixed_time(), "jpeg");
        assert_eq!(name, "checkout_42_2025-03-09_14-05-07-000.jpeg");
    }

    #[test]
    fn checkins_in_the_same_second_get_distinct_names() {
        let first = fixed_time();
        let second = first + chrono::Duration::milliseconds(250);

        let a = checkin_file_name(CheckinKind::Checkin, 7, first, "png");
        let b = checkin_file_name(CheckinKind::Checkin, 7, second, "png");

        assert_eq!(b, "checkin_7_2025-03-09_14-05-07-250.png");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn save_writes_sanitised_file() {
        let dir = std::env::temp_dir().join(format!("hub-uploads-{}", std::process::id()));
        let store = UploadStore::new(&dir);
        store.ensure_dir().await.unwrap();

        let saved = store.save("a b.png", b"conteudo").await.unwrap();
        assert_eq!(saved, "a_b.png");
        let written = tokio::fs::read(dir.join(&saved)).await.unwrap();
        assert_eq!(written, b"conteudo");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
