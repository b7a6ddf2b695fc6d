pub mod user_repo;
pub use user_repo::UserRepository;
pub mod store_repo;
pub use store_repo::StoreRepository;
pub mod group_repo;
pub use group_repo::GroupRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
pub mod invoice_repo;
pub use invoice_repo::InvoiceRepository;
pub mod checkin_repo;
pub use checkin_repo::CheckinRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
