//! Badge composition.
//!
//! The scene is described as SVG and rasterised with resvg:
//! - blue pill-shaped card with a soft drop shadow
//! - white border stroke (no shadow)
//! - avatar clipped to a circle on the left, vertically centred
//! - white medium-weight name to the right of the avatar, if any

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, fontdb};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;

use crate::{
    models::{BadgeError, Result},
    render::{
        avatar::{AvatarImage, AvatarLoader},
        font::{BadgeFont, TextMeasure},
        layout::{BadgeLayout, BORDER_WIDTH, FONT_SIZE, FONT_WEIGHT},
    },
};

const CARD_FILL: &str = "#5386ff";
const FOREGROUND: &str = "#ffffff";

pub struct BadgeRenderer {
    measure: Arc<dyn TextMeasure>,
    fontdb: Arc<fontdb::Database>,
    font_family: String,
}

impl BadgeRenderer {
    pub fn new(font: Arc<BadgeFont>) -> Self {
        let fontdb = font.fontdb();
        let font_family = font.css_family();
        Self {
            measure: font,
            fontdb,
            font_family,
        }
    }

    /// Renderer with an explicit measurer and font database.
    pub fn with_measure(
        measure: Arc<dyn TextMeasure>,
        fontdb: Arc<fontdb::Database>,
        font_family: impl Into<String>,
    ) -> Self {
        Self {
            measure,
            fontdb,
            font_family: font_family.into(),
        }
    }

    pub fn layout_for(&self, name: Option<&str>) -> BadgeLayout {
        BadgeLayout::compute(name.map(|n| self.measure.text_width(n, FONT_SIZE)))
    }

    /// Load `avatar_ref` and render. Loading failures propagate unchanged.
    pub async fn render_ref(
        &self,
        loader: &AvatarLoader,
        name: Option<&str>,
        avatar_ref: &str,
    ) -> Result<Vec<u8>> {
        let avatar = loader.load(avatar_ref).await?;
        self.render(name, &avatar)
    }

    pub fn render(&self, name: Option<&str>, avatar: &AvatarImage) -> Result<Vec<u8>> {
        let layout = self.layout_for(name);
        let svg = self.compose_svg(&layout, name, avatar);

        let mut options = usvg::Options::default();
        options.fontdb = Arc::clone(&self.fontdb);

        let tree = usvg::Tree::from_str(&svg, &options)
            .map_err(|e| BadgeError::render(format!("SVG parse error: {}", e)))?;

        let mut pixmap = Pixmap::new(layout.total_width, layout.total_height)
            .ok_or_else(|| BadgeError::render("failed to create pixmap"))?;

        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        let png = pixmap
            .encode_png()
            .map_err(|e| BadgeError::render(format!("PNG encode error: {}", e)))?;

        debug!(
            width = layout.total_width,
            height = layout.total_height,
            bytes = png.len(),
            "badge rendered"
        );

        Ok(png)
    }

    fn compose_svg(&self, layout: &BadgeLayout, name: Option<&str>, avatar: &AvatarImage) -> String {
        let w = layout.total_width;
        let h = layout.total_height;
        let x = layout.outer_padding;
        let y = layout.outer_padding;
        let r = layout.corner_radius();
        let avatar_r = layout.avatar_size as f32 / 2.0;
        let avatar_cx = layout.avatar_x() + avatar_r;
        let cy = layout.center_y();

        let mut svg = String::with_capacity(4096 + avatar.bytes().len() * 4 / 3);

        // Writing into a String cannot fail.
        let _ = write!(
            svg,
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"##,
        );

        let _ = write!(
            svg,
            r##"<defs><filter id="shadow" x="-50%" y="-50%" width="200%" height="200%" color-interpolation-filters="sRGB"><feDropShadow dx="0" dy="4" stdDeviation="5" flood-color="#000000" flood-opacity="0.3"/></filter><clipPath id="avatar-clip"><circle cx="{avatar_cx}" cy="{cy}" r="{avatar_r}"/></clipPath></defs>"##,
        );

        let _ = write!(
            svg,
            r##"<rect x="{x}" y="{y}" width="{cw}" height="{ch}" rx="{r}" ry="{r}" fill="{CARD_FILL}" filter="url(#shadow)"/>"##,
            cw = layout.content_width,
            ch = layout.content_height,
        );

        let _ = write!(
            svg,
            r##"<rect x="{x}" y="{y}" width="{cw}" height="{ch}" rx="{r}" ry="{r}" fill="none" stroke="{FOREGROUND}" stroke-width="{BORDER_WIDTH}"/>"##,
            cw = layout.content_width,
            ch = layout.content_height,
        );

        let _ = write!(
            svg,
            r##"<image href="{href}" x="{ax}" y="{ay}" width="{size}" height="{size}" clip-path="url(#avatar-clip)" preserveAspectRatio="none"/>"##,
            href = avatar.data_uri(),
            ax = layout.avatar_x(),
            ay = layout.avatar_y(),
            size = layout.avatar_size,
        );

        if let Some(name) = name {
            let _ = write!(
                svg,
                r##"<text x="{tx}" y="{cy}" text-anchor="start" dominant-baseline="central" font-family="{family}" font-size="{FONT_SIZE}" font-weight="{FONT_WEIGHT}" fill="{FOREGROUND}">{text}</text>"##,
                tx = layout.text_x(),
                family = escape_xml(&self.font_family),
                text = escape_xml(name),
            );
        }

        svg.push_str("</svg>");
        svg
    }
}

fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
