#![forbid(unsafe_code)]

//! The `--header-offset` CSS variable.
//!
//! The fixed site header publishes its rendered height as a custom property
//! on the root element. Scroll comparisons read it back so a section counts
//! as reached once its top clears the header.

/// Name of the custom property holding the header height.
pub const HEADER_OFFSET_VAR: &str = "--header-offset";

/// Rounded header height and the CSS value to publish for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderOffset {
    pub px: u32,
    pub css_value: String,
}

impl HeaderOffset {
    /// Round a measured header height up to whole pixels.
    #[must_use]
    pub fn from_height(height: f64) -> Self {
        let px = if height.is_finite() && height > 0.0 {
            height.ceil().min(f64::from(u32::MAX)) as u32
        } else {
            0
        };
        Self {
            px,
            css_value: format!("{px}px"),
        }
    }
}

/// Pixel count and CSS value for a measured header height.
#[must_use]
pub fn header_offset_css_value(height: f64) -> (u32, String) {
    let HeaderOffset { px, css_value } = HeaderOffset::from_height(height);
    (px, css_value)
}

/// Parse a header offset value the way `parseInt(value, 10)` would.
///
/// Leading whitespace is skipped, an optional sign and the longest run of
/// decimal digits are read, everything after is ignored. Anything without a
/// leading integer is `0`.
#[must_use]
pub fn parse_header_offset(raw: &str) -> i32 {
    let s = raw.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut any = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        any = true;
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    if !any {
        return 0;
    }
    let value = if negative { -value } else { value };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_value_pairs_pixels_with_suffix() {
        assert_eq!(header_offset_css_value(63.2), (64, "64px".to_owned()));
        assert_eq!(header_offset_css_value(f64::NAN), (0, "0px".to_owned()));
    }

    #[test]
    fn parses_pixel_values() {
        assert_eq!(parse_header_offset("80px"), 80);
        assert_eq!(parse_header_offset("  64px "), 64);
        assert_eq!(parse_header_offset("72"), 72);
    }

    #[test]
    fn truncates_fractions() {
        assert_eq!(parse_header_offset("12.7px"), 12);
    }

    #[test]
    fn reads_signs() {
        assert_eq!(parse_header_offset("-5px"), -5);
        assert_eq!(parse_header_offset("+3px"), 3);
    }

    #[test]
    fn unparsable_is_zero() {
        assert_eq!(parse_header_offset(""), 0);
        assert_eq!(parse_header_offset("px"), 0);
        assert_eq!(parse_header_offset("calc(4rem)"), 0);
        assert_eq!(parse_header_offset("-"), 0);
    }

    #[test]
    fn huge_values_saturate() {
        assert_eq!(parse_header_offset("99999999999999999999px"), i32::MAX);
    }

    #[test]
    fn height_rounds_up() {
        let offset = HeaderOffset::from_height(63.2);
        assert_eq!(offset.px, 64);
        assert_eq!(offset.css_value, "64px");
    }

    #[test]
    fn degenerate_heights_are_zero() {
        assert_eq!(HeaderOffset::from_height(f64::NAN).px, 0);
        assert_eq!(HeaderOffset::from_height(-3.0).css_value, "0px");
    }
}
