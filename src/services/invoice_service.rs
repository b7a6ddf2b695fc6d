// src/services/invoice_service.rs

use chrono::Local;

use crate::{
    common::{
        error::AppError,
        uploads::{allowed_extension, invoice_file_name, UploadStore, UploadedFile, IMAGE_EXTENSIONS},
    },
    db::{InvoiceRepository, StoreRepository},
    models::invoice::{Invoice, InvoiceEntry},
};

const LIST_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct InvoiceService {
    repo: InvoiceRepository,
    store_repo: StoreRepository,
    uploads: UploadStore,
}

impl InvoiceService {
    pub fn new(repo: InvoiceRepository, store_repo: StoreRepository, uploads: UploadStore) -> Self {
        Self { repo, store_repo, uploads }
    }

    /// Salva a imagem (nome = CNPJ da loja + horário) e registra a nota.
    /// O arquivo é gravado antes do INSERT; se o INSERT falhar o arquivo fica órfão.
    pub async fn submit(
        &self,
        user_id: i32,
        store_id: Option<i32>,
        file: Option<UploadedFile>,
    ) -> Result<Invoice, AppError> {
        let stores = self.store_repo.list_assigned(user_id).await?;
        if stores.is_empty() {
            return Err(AppError::Warning(
                "Você não está associada a nenhuma loja para enviar notas.".into(),
            ));
        }

        let (Some(store_id), Some(file)) = (store_id, file) else {
            return Err(AppError::BadRequest(
                "É necessário selecionar uma loja e um arquivo.".into(),
            ));
        };
        let store = stores.iter().find(|s| s.id == store_id).ok_or(AppError::Forbidden)?;

        let ext = allowed_extension(&file.file_name, IMAGE_EXTENSIONS)?;
        let file_name = invoice_file_name(store.cnpj.as_deref(), Local::now(), &ext);
        let saved = self.uploads.save(&file_name, &file.bytes).await?;

        let invoice = self.repo.create(user_id, store_id, &saved).await?;
        tracing::info!("🧾 Nota fiscal {} enviada (promotora {}, loja {})", invoice.id, user_id, store_id);
        Ok(invoice)
    }

    pub async fn list(&self, user_id: i32) -> Result<Vec<InvoiceEntry>, AppError> {
        self.repo.recent_for_promoter(user_id, LIST_LIMIT).await
    }
}
