//! Background color parsing for the command line.
//!
//! Accepts a handful of color names and `#RRGGBB` / `#RRGGBBAA` hex. Anything
//! else falls back to transparent white, the engine's default background.

use crate::imaging::Background;

const NAMED: &[(&str, [u8; 4])] = &[
    ("transparent", [255, 255, 255, 0]),
    ("white", [255, 255, 255, 255]),
    ("black", [0, 0, 0, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("gray", [128, 128, 128, 255]),
    ("grey", [128, 128, 128, 255]),
];

/// Parse a color name or hex string into a [`Background`].
pub fn parse_color(input: &str) -> Background {
    let s = input.trim().to_ascii_lowercase();
    if let Some(&(_, rgba)) = NAMED.iter().find(|(name, _)| *name == s) {
        return Background(rgba);
    }
    if let Some(rgba) = s.strip_prefix('#').and_then(parse_hex) {
        return Background(rgba);
    }
    tracing::warn!(color = input, "unrecognized color, using transparent");
    Background::TRANSPARENT
}

fn parse_hex(hex: &str) -> Option<[u8; 4]> {
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Some([channel(0)?, channel(2)?, channel(4)?, alpha])
}
