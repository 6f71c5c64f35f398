pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use app::{app, serve, serve_on};
pub use config::AppConfig;
