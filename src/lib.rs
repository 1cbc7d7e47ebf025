pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod selection;
pub mod ui;
pub mod utils;
