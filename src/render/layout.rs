/// Avatar circle diameter.
pub const AVATAR_SIZE: u32 = 100;

/// Gap between the card edge, avatar and name.
pub const PADDING: u32 = 10;

/// Name font size (medium weight).
pub const FONT_SIZE: f32 = 48.0;
pub const FONT_WEIGHT: u16 = 500;

/// Margin around the card, leaving room for the drop shadow.
pub const OUTER_PADDING: u32 = 10;

pub const BORDER_WIDTH: f32 = 6.0;

/// Geometry of one badge, derived from the measured name width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadgeLayout {
    pub avatar_size: u32,
    pub padding: u32,
    pub font_size: f32,
    pub outer_padding: u32,
    pub content_width: u32,
    pub content_height: u32,
    pub total_width: u32,
    pub total_height: u32,
}

impl BadgeLayout {
    /// `text_width` is `None` for an avatar-only badge. Fractional widths are
    /// rounded up so the name is never clipped.
    pub fn compute(text_width: Option<f32>) -> Self {
        let content_height = AVATAR_SIZE + PADDING * 2;
        let content_width = match text_width {
            Some(width) => AVATAR_SIZE + PADDING * 3 + width.max(0.0).ceil() as u32,
            None => AVATAR_SIZE + PADDING * 2,
        };

        Self {
            avatar_size: AVATAR_SIZE,
            padding: PADDING,
            font_size: FONT_SIZE,
            outer_padding: OUTER_PADDING,
            content_width,
            content_height,
            total_width: content_width + OUTER_PADDING * 2,
            total_height: content_height + OUTER_PADDING * 2,
        }
    }

    /// Pill shape: half the content height.
    pub fn corner_radius(&self) -> f32 {
        self.content_height as f32 / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.total_height as f32 / 2.0
    }

    pub fn avatar_x(&self) -> f32 {
        (self.outer_padding + self.padding) as f32
    }

    pub fn avatar_y(&self) -> f32 {
        self.center_y() - self.avatar_size as f32 / 2.0
    }

    pub fn text_x(&self) -> f32 {
        (self.outer_padding + self.padding * 2 + self.avatar_size) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_only_layout() {
        let layout = BadgeLayout::compute(None);
        assert_eq!(layout.content_width, 120);
        assert_eq!(layout.content_height, 120);
        assert_eq!(layout.total_width, 140);
        assert_eq!(layout.total_height, 140);
        assert_eq!(layout.corner_radius(), 60.0);
    }

    #[test]
    fn test_named_layout() {
        let layout = BadgeLayout::compute(Some(200.0));
        assert_eq!(layout.content_width, 100 + 30 + 200);
        assert_eq!(layout.total_width, 350);
        assert_eq!(layout.total_height, 140);
        assert_eq!(layout.text_x(), 130.0);
    }

    #[test]
    fn test_fractional_width_rounds_up() {
        assert_eq!(BadgeLayout::compute(Some(100.2)).content_width, 231);
    }

    #[test]
    fn test_avatar_centered_without_name() {
        let layout = BadgeLayout::compute(None);
        let left_gap = layout.avatar_x() - layout.outer_padding as f32;
        let right_gap = (layout.outer_padding + layout.content_width) as f32
            - (layout.avatar_x() + layout.avatar_size as f32);
        assert_eq!(left_gap, right_gap);
        assert_eq!(layout.avatar_y(), 20.0);
    }

    #[test]
    fn test_width_monotonic_in_text_width() {
        let mut previous = 0;
        for width in [0.0, 1.0, 12.5, 99.9, 480.0, 4800.0] {
            let total = BadgeLayout::compute(Some(width)).total_width;
            assert!(total >= previous);
            previous = total;
        }
    }
}
