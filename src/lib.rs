pub mod app;
pub mod assets;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod generation;
pub mod handlers;
pub mod middleware;
pub mod providers;
pub mod state;
pub mod toolgen;

pub use app::app;
pub use state::AppState;
