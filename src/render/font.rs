use resvg::usvg::fontdb;
use rusttype::{point, Font, Scale};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::models::{BadgeError, Result};

/// Horizontal text measurement at a CSS-style font size (pixels per em).
pub trait TextMeasure: Send + Sync {
    fn text_width(&self, text: &str, font_size: f32) -> f32;
}

/// The badge typeface, registered once before any measuring or drawing.
///
/// Holds the parsed font for measurement and a font database containing the
/// same face for the SVG rasteriser, so both agree on metrics.
pub struct BadgeFont {
    font: Font<'static>,
    fontdb: Arc<fontdb::Database>,
    family: String,
}

impl BadgeFont {
    pub fn load<P: AsRef<Path>>(path: P, family: &str) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| BadgeError::ConfigError(format!("Failed to read font {}: {}", path.display(), e)))?;

        let font = Self::from_bytes(bytes, family)?;
        info!(path = %path.display(), family = %family, "badge font registered");
        Ok(font)
    }

    pub fn from_bytes(bytes: Vec<u8>, family: &str) -> Result<Self> {
        let font = Font::try_from_vec(bytes.clone())
            .ok_or_else(|| BadgeError::ConfigError("Font data is not a valid TrueType/OpenType font".to_string()))?;

        let mut db = fontdb::Database::new();
        db.load_font_data(bytes);

        // Let the configured alias resolve to the embedded face through the
        // sans-serif fallback, whatever the font's internal family name is.
        let internal_family = db
            .faces()
            .next()
            .and_then(|face| face.families.first().map(|(name, _)| name.clone()));
        if let Some(name) = internal_family {
            db.set_sans_serif_family(name);
        }

        Ok(Self {
            font,
            fontdb: Arc::new(db),
            family: family.to_string(),
        })
    }

    pub fn fontdb(&self) -> Arc<fontdb::Database> {
        Arc::clone(&self.fontdb)
    }

    /// Value for an SVG `font-family` attribute.
    pub fn css_family(&self) -> String {
        format!("{}, sans-serif", self.family)
    }
}

impl TextMeasure for BadgeFont {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }

        // rusttype scales by ascent-descent height; convert from em size.
        let units_per_em = self.font.units_per_em() as f32;
        let unscaled = self.font.v_metrics_unscaled();
        let height_units = unscaled.ascent - unscaled.descent;
        let scale = Scale::uniform(font_size * height_units / units_per_em);

        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }
}

/// Fixed per-character advance; for layouts that must not depend on a font file.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvance(pub f32);

impl TextMeasure for FixedAdvance {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * self.0 * font_size / 48.0
    }
}
