pub mod clock;
pub mod error;
pub mod spreadsheet;
pub mod text;
pub mod uploads;
