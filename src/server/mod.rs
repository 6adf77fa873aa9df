//! HTTP surface.
//!
//! - `GET /` and `GET /api` - badge PNG for `?address=0x...`
//! - `GET /health` - liveness (JSON)

pub mod badge;
pub mod error;
pub mod health;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;

pub use error::ApiError;
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(badge::badge_handler))
        .route("/api", get(badge::badge_handler))
        .route("/health", get(health::health_check))
        .with_state(state)
        .layer(CatchPanicLayer::custom(error::panic_response))
}
