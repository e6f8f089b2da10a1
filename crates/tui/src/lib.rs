pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod filters;
pub mod forms;
pub mod logging;
pub mod session;
pub mod ui;
