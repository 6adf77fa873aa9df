//! Deterministic "blockies" avatars derived from an address.
//!
//! Follows the widely used Ethereum blockies scheme: a xorshift generator is
//! seeded from the lower-cased address string, three HSL colours are drawn,
//! then an 8x8 grid is filled column-mirrored. Same address, same image.

use base64::Engine;
use resvg::tiny_skia::{Color, Paint, Pixmap, Rect, Transform};

use crate::models::{BadgeError, Result};

/// Grid cells per side.
const GRID_SIZE: usize = 8;

/// Pixels per grid cell.
const CELL_SCALE: u32 = 16;

struct SeedRandom {
    state: [i32; 4],
}

impl SeedRandom {
    fn new(seed: &str) -> Self {
        let mut state = [0i32; 4];
        for (i, unit) in seed.encode_utf16().enumerate() {
            let slot = &mut state[i % 4];
            *slot = (*slot << 5).wrapping_sub(*slot).wrapping_add(unit as i32);
        }
        Self { state }
    }

    fn next(&mut self) -> f64 {
        let t = self.state[0] ^ (self.state[0] << 11);
        self.state[0] = self.state[1];
        self.state[1] = self.state[2];
        self.state[2] = self.state[3];
        self.state[3] = self.state[3] ^ (self.state[3] >> 19) ^ t ^ (t >> 8);
        (self.state[3] as u32) as f64 / 2_147_483_648.0
    }

    /// Hue, saturation, lightness in `[0, 1]`.
    fn next_color(&mut self) -> (f64, f64, f64) {
        let h = (self.next() * 360.0).floor();
        let s = self.next() * 60.0 + 40.0;
        let l = (self.next() + self.next() + self.next() + self.next()) * 25.0;
        (h / 360.0, s / 100.0, l / 100.0)
    }
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 0.5 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

fn hsl_to_rgb((h, s, l): (f64, f64, f64)) -> [u8; 3] {
    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
        )
    };
    let channel = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    [channel(r), channel(g), channel(b)]
}

/// Colours and cell pattern for one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blockie {
    pub color: [u8; 3],
    pub background: [u8; 3],
    pub spot: [u8; 3],
    /// Row-major cells: 0 background, 1 colour, 2 spot.
    pub cells: Vec<u8>,
}

impl Blockie {
    pub fn for_address(address: &str) -> Self {
        let mut rng = SeedRandom::new(&address.to_lowercase());

        let color = hsl_to_rgb(rng.next_color());
        let background = hsl_to_rgb(rng.next_color());
        let spot = hsl_to_rgb(rng.next_color());

        let data_width = (GRID_SIZE + 1) / 2;
        let mirror_width = GRID_SIZE - data_width;
        let mut cells = Vec::with_capacity(GRID_SIZE * GRID_SIZE);

        for _ in 0..GRID_SIZE {
            let row: Vec<u8> = (0..data_width)
                .map(|_| (rng.next() * 2.3).floor() as u8)
                .collect();
            cells.extend_from_slice(&row);
            cells.extend(row[..mirror_width].iter().rev());
        }

        Self { color, background, spot, cells }
    }

    fn fill_for(&self, cell: u8) -> [u8; 3] {
        match cell {
            0 => self.background,
            1 => self.color,
            _ => self.spot,
        }
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        let side = GRID_SIZE as u32 * CELL_SCALE;
        let mut pixmap = Pixmap::new(side, side)
            .ok_or_else(|| BadgeError::render("failed to create identicon pixmap"))?;

        let mut paint = Paint::default();
        for (i, &cell) in self.cells.iter().enumerate() {
            let [r, g, b] = self.fill_for(cell);
            paint.set_color(Color::from_rgba8(r, g, b, 255));

            let x = (i % GRID_SIZE) as u32 * CELL_SCALE;
            let y = (i / GRID_SIZE) as u32 * CELL_SCALE;
            if let Some(rect) = Rect::from_xywh(x as f32, y as f32, CELL_SCALE as f32, CELL_SCALE as f32) {
                pixmap.fill_rect(rect, &paint, Transform::identity(), None);
            }
        }

        pixmap.encode_png().map_err(BadgeError::render)
    }
}

/// PNG identicon for `address` as a `data:` URI.
pub fn identicon_data_uri(address: &str) -> Result<String> {
    let png = Blockie::for_address(address).to_png()?;
    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR_A: &str = "0x742d35cc6634c0532925a3b844bc9e7595f6e842";
    const ADDR_B: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";

    #[test]
    fn test_same_address_same_image() {
        assert_eq!(identicon_data_uri(ADDR_A).unwrap(), identicon_data_uri(ADDR_A).unwrap());
    }

    #[test]
    fn test_seed_is_case_insensitive() {
        let upper = "0x742d35Cc6634C0532925a3b844Bc9e7595f6e842";
        assert_eq!(Blockie::for_address(upper), Blockie::for_address(ADDR_A));
    }

    #[test]
    fn test_different_addresses_differ() {
        assert_ne!(Blockie::for_address(ADDR_A), Blockie::for_address(ADDR_B));
        assert_ne!(identicon_data_uri(ADDR_A).unwrap(), identicon_data_uri(ADDR_B).unwrap());
    }

    #[test]
    fn test_grid_is_mirrored() {
        let blockie = Blockie::for_address(ADDR_B);
        assert_eq!(blockie.cells.len(), GRID_SIZE * GRID_SIZE);
        for row in blockie.cells.chunks(GRID_SIZE) {
            for x in 0..GRID_SIZE / 2 {
                assert_eq!(row[x], row[GRID_SIZE - 1 - x]);
            }
            assert!(row.iter().all(|&c| c <= 2));
        }
    }

    #[test]
    fn test_png_dimensions() {
        let png = Blockie::for_address(ADDR_A).to_png().unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!(img.width(), GRID_SIZE as u32 * CELL_SCALE);
        assert_eq!(img.height(), GRID_SIZE as u32 * CELL_SCALE);
    }

    #[test]
    fn test_hsl_conversion() {
        assert_eq!(hsl_to_rgb((0.0, 0.0, 1.0)), [255, 255, 255]);
        assert_eq!(hsl_to_rgb((0.0, 1.0, 0.5)), [255, 0, 0]);
    }
}
