pub mod api;
pub mod dashboard;
pub mod import_export;
pub mod index;
