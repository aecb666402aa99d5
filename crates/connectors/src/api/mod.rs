pub mod auth;
pub mod cache;
pub mod client;
pub mod params;
pub mod settings;
pub mod source;
