pub mod auth;
pub mod checkin;
pub mod dashboard;
pub mod group;
pub mod invoice;
pub mod promoter;
pub mod report;
pub mod store;

use serde::Serialize;
use utoipa::ToSchema;

// Resposta de sucesso das ações que não devolvem uma entidade (o "flash" de sucesso)
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
