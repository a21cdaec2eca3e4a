pub mod app;
pub mod layout;
