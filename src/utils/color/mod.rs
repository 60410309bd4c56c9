//! Hex color helpers for appointment boxes.

/// Fallback fill for appointments without a color
pub const DEFAULT_EVENT_COLOR: &str = "#3788d8";

/// Parse `#RRGGBB` (or `RRGGBB`) into its channels.
pub fn parse_hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Parse `#RRGGBB` or `#RRGGBBAA`; a missing alpha channel is opaque.
pub fn parse_hex_rgba(hex: &str) -> Option<(u8, u8, u8, u8)> {
    let trimmed = hex.trim().trim_start_matches('#');
    match trimmed.len() {
        6 => parse_hex_rgb(trimmed).map(|(r, g, b)| (r, g, b, 255)),
        8 if trimmed.is_ascii() => {
            let (r, g, b) = parse_hex_rgb(&trimmed[..6])?;
            let a = u8::from_str_radix(&trimmed[6..8], 16).ok()?;
            Some((r, g, b, a))
        }
        _ => None,
    }
}

pub fn to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Darken every channel by `amount`, saturating at zero. Used for the end
/// stop of an appointment's gradient.
pub fn darken(hex: &str, amount: u8) -> Option<String> {
    let (r, g, b) = parse_hex_rgb(hex)?;
    Some(to_hex(
        r.saturating_sub(amount),
        g.saturating_sub(amount),
        b.saturating_sub(amount),
    ))
}

/// Append an alpha channel (`#RRGGBBAA`).
pub fn with_alpha(hex: &str, alpha: u8) -> Option<String> {
    let (r, g, b) = parse_hex_rgb(hex)?;
    Some(format!("{}{:02x}", to_hex(r, g, b), alpha))
}

/// Black or white text, whichever reads better on `background`.
pub fn contrast_text_color(background: &str) -> &'static str {
    let Some((r, g, b)) = parse_hex_rgb(background) else {
        return "#FFFFFF";
    };
    let brightness = (u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000;
    if brightness > 128 {
        "#000000"
    } else {
        "#FFFFFF"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_rgb() {
        assert_eq!(parse_hex_rgb("#FF5500"), Some((255, 85, 0)));
        assert_eq!(parse_hex_rgb("00ff00"), Some((0, 255, 0)));
        assert_eq!(parse_hex_rgb("#F50"), None);
        assert_eq!(parse_hex_rgb("GGGGGG"), None);
        assert_eq!(parse_hex_rgb(""), None);
    }

    #[test]
    fn test_parse_hex_rgba() {
        assert_eq!(parse_hex_rgba("#3788d880"), Some((0x37, 0x88, 0xd8, 0x80)));
        assert_eq!(parse_hex_rgba("#3788d8"), Some((0x37, 0x88, 0xd8, 0xff)));
        assert_eq!(parse_hex_rgba("#3788d8f"), None);
    }

    #[test]
    fn test_darken_saturates() {
        assert_eq!(darken("#3788d8", 20).as_deref(), Some("#2374c4"));
        assert_eq!(darken("#0a0a0a", 20).as_deref(), Some("#000000"));
        assert_eq!(darken("nope", 20), None);
    }

    #[test]
    fn test_with_alpha() {
        assert_eq!(with_alpha("#3788D8", 0x80).as_deref(), Some("#3788d880"));
    }

    #[test]
    fn test_contrast_text_color() {
        assert_eq!(contrast_text_color("#ffffff"), "#000000");
        assert_eq!(contrast_text_color("#fde047"), "#000000");
        assert_eq!(contrast_text_color("#1e3a8a"), "#FFFFFF");
        assert_eq!(contrast_text_color("invalid"), "#FFFFFF");
    }
}
