// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use crate::handlers;
use crate::middleware::session::SESSION_COOKIE_NAME;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,

        // --- Promotora ---
        handlers::promoter::list_stores,
        handlers::promoter::report_form,
        handlers::promoter::submit_report,
        handlers::promoter::report_history,
        handlers::promoter::submit_invoice,
        handlers::promoter::list_invoices,
        handlers::promoter::submit_checkin,
        handlers::promoter::list_checkins,

        // --- Grupos ---
        handlers::groups::list_groups,
        handlers::groups::create_group,
        handlers::groups::get_group,
        handlers::groups::delete_group,
        handlers::groups::add_field,
        handlers::groups::delete_field,
        handlers::groups::group_fields,

        // --- Lojas ---
        handlers::stores::list_stores,
        handlers::stores::get_store,
        handlers::stores::create_store,
        handlers::stores::update_store,
        handlers::stores::import_stores,
        handlers::stores::export_stores,

        // --- Promotoras ---
        handlers::promoters::list_promoters,
        handlers::promoters::get_promoter,
        handlers::promoters::create_promoter,
        handlers::promoters::update_promoter,
        handlers::promoters::toggle_active,
        handlers::promoters::import_promoters,
        handlers::promoters::export_promoters,

        // --- Relatórios ---
        handlers::reports::advanced_report,
        handlers::reports::advanced_report_view,
        handlers::reports::advanced_report_export,
        handlers::reports::daily_reports,
        handlers::reports::daily_reports_export,

        // --- Check-ins ---
        handlers::checkins::checkin_history,
        handlers::checkins::checkin_export,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            models::MessageResponse,

            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::CurrentUser,
            models::auth::LoginPayload,

            // --- Grupos ---
            models::group::Group,
            models::group::ReportField,
            models::group::FieldOption,
            models::group::GroupDetail,
            models::group::CreateGroupPayload,
            models::group::CreateFieldPayload,

            // --- Lojas ---
            models::store::Store,
            models::store::StoreListEntry,
            models::store::AssignedStore,
            models::store::StorePayload,

            // --- Promotoras ---
            models::promoter::PromoterSummary,
            models::promoter::PromoterDetail,
            models::promoter::PromoterPayload,
            models::promoter::ToggleActiveResponse,

            // --- Relatórios ---
            models::report::Report,
            models::report::SubmitReportPayload,
            models::report::ReportForm,
            models::report::ReportValueEntry,
            models::report::ReportWithValues,
            models::report::AggregationMode,
            models::report::AdvancedReportFilter,
            models::report::AggregationRow,
            models::report::AggregationTable,

            // --- Notas e check-ins ---
            models::invoice::Invoice,
            models::invoice::InvoiceEntry,
            models::checkin::CheckinKind,
            models::checkin::Checkin,
            models::checkin::CheckinEntry,
            models::checkin::CheckinHistoryEntry,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::DailyCount,
            models::dashboard::KindCount,

            // --- Formulários multipart ---
            handlers::promoter::InvoiceUploadForm,
            handlers::promoter::CheckinUploadForm,
            handlers::stores::StoreImportForm,
            handlers::promoters::PromoterImportForm,
        )
    ),
    tags(
        (name = "Auth", description = "Login e sessão"),
        (name = "Promotora", description = "Lojas, relatórios, notas fiscais e check-ins da promotora"),
        (name = "Grupos", description = "Grupos de lojas e campos do relatório"),
        (name = "Lojas", description = "Cadastro, importação e exportação de lojas"),
        (name = "Promotoras", description = "Cadastro, importação e exportação de promotoras"),
        (name = "Relatórios", description = "Relatório avançado e relatório diário"),
        (name = "Check-ins", description = "Histórico de check-in/checkout"),
        (name = "Dashboard", description = "Indicadores do administrador")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE_NAME))),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/promoter/checkins",
            "/api/admin/reports/advanced/view",
            "/api/groups/{id}/fields",
            "/api/admin/dashboard",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} ausente");
        }
        let schemes = doc.components.as_ref().map(|c| c.security_schemes.len()).unwrap_or(0);
        assert_eq!(schemes, 1);
    }
}
