pub mod config;
pub mod decoder;
pub mod signals;
pub mod templates;
