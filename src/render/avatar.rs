//! Loading avatar references into decoded, badge-sized images.
//!
//! Accepts `data:` URIs (identicons, inline SVG), `http(s)` URLs and
//! `ipfs://` references. Any failure here is a render failure: the fallback
//! to an identicon already happened during resolution.

use base64::Engine;
use image::{imageops::FilterType, ImageFormat};
use percent_encoding::percent_decode_str;
use resvg::usvg;
use std::io::Cursor;
use std::time::Duration;
use tracing::debug;

use crate::{
    config::BadgeSettings,
    models::{BadgeError, Result},
    render::layout::AVATAR_SIZE,
};

const IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";

/// An avatar ready to be embedded in the badge scene.
#[derive(Debug, Clone)]
pub struct AvatarImage {
    mime: &'static str,
    bytes: Vec<u8>,
}

impl AvatarImage {
    pub fn mime(&self) -> &'static str {
        self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

#[derive(Clone)]
pub struct AvatarLoader {
    http_client: reqwest::Client,
    max_bytes: usize,
}

impl AvatarLoader {
    pub fn new(settings: &BadgeSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.avatar_timeout_seconds))
            .build()
            .map_err(|e| BadgeError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            max_bytes: settings.max_avatar_bytes,
        })
    }

    pub async fn load(&self, uri: &str) -> Result<AvatarImage> {
        let raw = self.fetch(uri).await?;
        decode_avatar(&raw, AVATAR_SIZE)
    }

    async fn fetch(&self, uri: &str) -> Result<Vec<u8>> {
        if let Some(rest) = uri.strip_prefix("data:") {
            return decode_data_uri(rest);
        }

        let url = gateway_url(uri);
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(BadgeError::render(format!("unsupported avatar URI: {}", uri)));
        }

        debug!(url = %url, "fetching avatar");

        let response = self.http_client.get(&url).send().await
            .map_err(|e| BadgeError::render(format!("avatar fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(BadgeError::render(format!(
                "avatar fetch returned {} for {}",
                response.status(),
                url
            )));
        }

        if response.content_length().map_or(false, |len| len as usize > self.max_bytes) {
            return Err(BadgeError::render("avatar exceeds size limit"));
        }

        let bytes = response.bytes().await
            .map_err(|e| BadgeError::render(format!("avatar read failed: {}", e)))?;

        if bytes.len() > self.max_bytes {
            return Err(BadgeError::render("avatar exceeds size limit"));
        }

        Ok(bytes.to_vec())
    }
}

/// Rewrite `ipfs://` references onto a public HTTP gateway.
pub fn gateway_url(uri: &str) -> String {
    match uri.strip_prefix("ipfs://") {
        Some(path) => format!("{}{}", IPFS_GATEWAY, path.trim_start_matches("ipfs/")),
        None => uri.to_string(),
    }
}

/// Decode the part of a `data:` URI after the scheme.
fn decode_data_uri(rest: &str) -> Result<Vec<u8>> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| BadgeError::render("malformed data URI"))?;

    if meta.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| BadgeError::render(format!("invalid base64 avatar: {}", e)))
    } else {
        Ok(percent_decode_str(payload).collect())
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let trimmed = text.trim_start();
    trimmed.starts_with("<svg") || (trimmed.starts_with("<?xml") && text.contains("<svg"))
}

/// Decode raw avatar bytes, scaling raster images to a `size` square
/// (non-square images are stretched, not cropped).
pub fn decode_avatar(bytes: &[u8], size: u32) -> Result<AvatarImage> {
    if looks_like_svg(bytes) {
        usvg::Tree::from_data(bytes, &usvg::Options::default())
            .map_err(|e| BadgeError::render(format!("undecodable SVG avatar: {}", e)))?;
        return Ok(AvatarImage {
            mime: "image/svg+xml",
            bytes: bytes.to_vec(),
        });
    }

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| BadgeError::render(format!("undecodable avatar image: {}", e)))?;
    let resized = decoded.resize_exact(size, size, FilterType::Lanczos3);

    let mut png = Vec::new();
    resized
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| BadgeError::render(format!("avatar re-encode failed: {}", e)))?;

    Ok(AvatarImage {
        mime: "image/png",
        bytes: png,
    })
}
