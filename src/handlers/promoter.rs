// src/handlers/promoter.rs

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use utoipa::ToSchema;

use crate::{
    common::{error::AppError, uploads::MultipartForm},
    config::AppState,
    middleware::auth::RequirePromoter,
    models::{
        checkin::{Checkin, CheckinEntry},
        invoice::{Invoice, InvoiceEntry},
        report::{Report, ReportForm, ReportFormQuery, ReportWithValues, SubmitReportPayload},
        store::AssignedStore,
    },
    services::checkin_service::CheckinSubmission,
};

// =============================================================================
//  FORMULÁRIOS MULTIPART (só para a documentação)
// =============================================================================

#[derive(ToSchema)]
#[allow(dead_code)]
#[schema(rename_all = "camelCase")]
pub struct InvoiceUploadForm {
    store_id: i32,
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[derive(ToSchema)]
#[allow(dead_code)]
#[schema(rename_all = "camelCase")]
pub struct CheckinUploadForm {
    store_id: i32,
    #[schema(example = "checkin")]
    kind: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

// =============================================================================
//  LOJAS E RELATÓRIO
// =============================================================================

// GET /api/promoter/stores
#[utoipa::path(
    get,
    path = "/api/promoter/stores",
    tag = "Promotora",
    responses((status = 200, description = "Lojas associadas à promotora", body = Vec<AssignedStore>)),
    security(("session_cookie" = []))
)]
pub async fn list_stores(
    State(app_state): State<AppState>,
    RequirePromoter(user): RequirePromoter,
) -> Result<impl IntoResponse, AppError> {
    let stores = app_state.store_service.assigned(user.id).await?;
    Ok(Json(stores))
}

// GET /api/promoter/report-form
#[utoipa::path(
    get,
    path = "/api/promoter/report-form",
    tag = "Promotora",
    params(ReportFormQuery),
    responses(
        (status = 200, description = "Campos do relatório do grupo da loja", body = ReportForm),
        (status = 422, description = "Promotora sem lojas associadas")
    ),
    security(("session_cookie" = []))
)]
pub async fn report_form(
    State(app_state): State<AppState>,
    RequirePromoter(user): RequirePromoter,
    Query(query): Query<ReportFormQuery>,
) -> Result<impl IntoResponse, AppError> {
    let form = app_state.report_service.form(user.id, query.store_id).await?;
    Ok(Json(form))
}

// POST /api/promoter/reports
#[utoipa::path(
    post,
    path = "/api/promoter/reports",
    tag = "Promotora",
    request_body = SubmitReportPayload,
    responses(
        (status = 201, description = "Relatório enviado com sucesso!", body = Report),
        (status = 403, description = "Loja não associada à promotora"),
        (status = 422, description = "Loja sem grupo com relatório configurado")
    ),
    security(("session_cookie" = []))
)]
pub async fn submit_report(
    State(app_state): State<AppState>,
    RequirePromoter(user): RequirePromoter,
    Json(payload): Json<SubmitReportPayload>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.report_service.submit(user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

// GET /api/promoter/reports
#[utoipa::path(
    get,
    path = "/api/promoter/reports",
    tag = "Promotora",
    responses((status = 200, description = "Últimos 10 relatórios enviados", body = Vec<ReportWithValues>)),
    security(("session_cookie" = []))
)]
pub async fn report_history(
    State(app_state): State<AppState>,
    RequirePromoter(user): RequirePromoter,
) -> Result<impl IntoResponse, AppError> {
    let reports = app_state.report_service.history(user.id).await?;
    Ok(Json(reports))
}

// =============================================================================
//  NOTAS FISCAIS
// =============================================================================

// POST /api/promoter/invoices
#[utoipa::path(
    post,
    path = "/api/promoter/invoices",
    tag = "Promotora",
    request_body(content = InvoiceUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Nota fiscal enviada com sucesso!", body = Invoice),
        (status = 400, description = "Loja/arquivo ausente ou tipo de arquivo não permitido")
    ),
    security(("session_cookie" = []))
)]
pub async fn submit_invoice(
    State(app_state): State<AppState>,
    RequirePromoter(user): RequirePromoter,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = MultipartForm::read(multipart).await?;
    let store_id = form.parse::<i32>("storeId")?;
    let file = form.take_file("file");

    let invoice = app_state.invoice_service.submit(user.id, store_id, file).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

// GET /api/promoter/invoices
#[utoipa::path(
    get,
    path = "/api/promoter/invoices",
    tag = "Promotora",
    responses((status = 200, description = "Notas enviadas pela promotora", body = Vec<InvoiceEntry>)),
    security(("session_cookie" = []))
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    RequirePromoter(user): RequirePromoter,
) -> Result<impl IntoResponse, AppError> {
    let invoices = app_state.invoice_service.list(user.id).await?;
    Ok(Json(invoices))
}

// =============================================================================
//  CHECK-IN / CHECKOUT
// =============================================================================

// POST /api/promoter/checkins
#[utoipa::path(
    post,
    path = "/api/promoter/checkins",
    tag = "Promotora",
    request_body(content = CheckinUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Registro gravado", body = Checkin),
        (status = 400, description = "Todos os campos são obrigatórios.")
    ),
    security(("session_cookie" = []))
)]
pub async fn submit_checkin(
    State(app_state): State<AppState>,
    RequirePromoter(user): RequirePromoter,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = MultipartForm::read(multipart).await?;

    let submission = CheckinSubmission {
        store_id: form.parse::<i32>("storeId")?,
        kind: form.text("kind").map(str::to_owned),
        latitude: form.text("latitude").map(str::to_owned),
        longitude: form.text("longitude").map(str::to_owned),
        image: form.take_file("image"),
    };

    let checkin = app_state.checkin_service.record(user.id, submission).await?;
    Ok((StatusCode::CREATED, Json(checkin)))
}

// GET /api/promoter/checkins
#[utoipa::path(
    get,
    path = "/api/promoter/checkins",
    tag = "Promotora",
    responses((status = 200, description = "Check-ins da promotora", body = Vec<CheckinEntry>)),
    security(("session_cookie" = []))
)]
pub async fn list_checkins(
    State(app_state): State<AppState>,
    RequirePromoter(user): RequirePromoter,
) -> Result<impl IntoResponse, AppError> {
    let entries = app_state.checkin_service.list(user.id).await?;
    Ok(Json(entries))
}
