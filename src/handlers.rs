pub mod auth;
pub mod checkins;
pub mod dashboard;
pub mod groups;
pub mod promoter;
pub mod promoters;
pub mod reports;
pub mod stores;
