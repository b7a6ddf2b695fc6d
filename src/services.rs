pub mod auth;
pub use auth::AuthService;
pub mod report_service;
pub use report_service::ReportService;
pub mod group_service;
pub use group_service::GroupService;
pub mod store_service;
pub use store_service::StoreService;
pub mod promoter_service;
pub use promoter_service::PromoterService;
pub mod import_service;
pub use import_service::ImportService;
pub mod invoice_service;
pub use invoice_service::InvoiceService;
pub mod checkin_service;
pub use checkin_service::CheckinService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
