pub mod models;
pub mod config;
pub mod resolver;
pub mod render;
pub mod activity;
pub mod server;
pub mod utils;

pub use models::{BadgeError, ResolvedIdentity, TokenActivity, Result};
pub use config::Settings;
pub use server::{router, AppState};
