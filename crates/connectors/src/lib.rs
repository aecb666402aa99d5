pub mod api;
pub mod error;
pub mod file;
pub mod retry;
