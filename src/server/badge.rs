//! `GET /api?address=0x...` badge endpoint.

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::utils::{parse_address, truncate_address};

#[derive(Debug, Deserialize)]
pub struct BadgeParams {
    pub address: Option<String>,
}

pub async fn badge_handler(
    State(state): State<AppState>,
    Query(params): Query<BadgeParams>,
) -> Result<Response, ApiError> {
    let raw = params
        .address
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidAddress(String::new()))?;
    let address = parse_address(&raw)?;

    tracing::debug!(address = %truncate_address(&raw), "rendering badge");

    let identity = state.resolver.resolve(address).await?;
    let png = state
        .renderer
        .render_ref(&state.loader, identity.name.as_deref(), &identity.avatar_ref)
        .await?;

    Ok(png_response(png))
}

fn png_response(png: Vec<u8>) -> Response {
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("image/png")),
        (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
    ];

    (StatusCode::OK, headers, png).into_response()
}
