pub mod avatar;
pub mod badge;
pub mod font;
pub mod layout;

pub use avatar::{AvatarImage, AvatarLoader};
pub use badge::BadgeRenderer;
pub use font::{BadgeFont, FixedAdvance, TextMeasure};
pub use layout::BadgeLayout;
