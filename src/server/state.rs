//! Shared per-process state for request handlers.
//!
//! Built once at startup: the font is registered and the ENS client
//! constructed before the first request. Nothing request-specific is kept.

use std::sync::Arc;

use crate::{
    config::Settings,
    models::Result,
    render::{AvatarLoader, BadgeFont, BadgeRenderer},
    resolver::{EnsClient, NameService, Resolver},
};

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    pub loader: AvatarLoader,
    pub renderer: Arc<BadgeRenderer>,
    pub version: String,
}

impl AppState {
    pub fn new(
        names: Arc<dyn NameService>,
        loader: AvatarLoader,
        renderer: BadgeRenderer,
        version: impl Into<String>,
    ) -> Self {
        Self {
            resolver: Arc::new(Resolver::new(names)),
            loader,
            renderer: Arc::new(renderer),
            version: version.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let font = BadgeFont::load(&settings.badge.font_path, &settings.badge.font_family)?;
        let names = EnsClient::new(&settings.ens)?;
        let loader = AvatarLoader::new(&settings.badge)?;

        tracing::info!(
            rpc_url = %settings.ens.rpc_url,
            font_path = %settings.badge.font_path,
            "application state initialized"
        );

        Ok(Self::new(
            Arc::new(names),
            loader,
            BadgeRenderer::new(Arc::new(font)),
            settings.app.version.clone(),
        ))
    }
}
