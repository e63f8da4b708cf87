/// Family tried after every requested family fails to resolve.
pub const FALLBACK_FONT_FAMILY: &str = "sans-serif";

/// Text alignment values accepted by [`crate::TextAlign::parse`].
pub const TEXT_ALIGN_VALUES: &str = "left, center or right";
