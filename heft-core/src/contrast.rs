//! Contrast - WCAG Relative Luminance
//!
//! Pure color math used by the advisory contrast check.

use crate::value::{FieldValue, Scalar};

/// Ratios below this are reported.
pub const MIN_CONTRAST_RATIO: f64 = 4.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Read the first three channels of a style literal.
    ///
    /// Accepts a list of numbers or a space-separated string such as
    /// `"255 255 255 200"`. Anything else is not a color.
    pub fn from_value(value: &FieldValue) -> Option<Self> {
        let channels: Vec<String> = match value {
            FieldValue::Scalar(Scalar::Text(text)) => {
                text.split_whitespace().map(str::to_string).collect()
            }
            FieldValue::Scalar(_) => return None,
            FieldValue::List(items) => items.iter().map(|s| s.to_string()).collect(),
        };
        if channels.len() < 3 {
            return None;
        }
        let channel = |i: usize| channels[i].parse::<u8>().ok();
        Some(Self::new(channel(0)?, channel(1)?, channel(2)?))
    }
}

fn linearize(channel: u8) -> f64 {
    let v = channel as f64 / 255.0;
    if v <= 0.03928 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

pub fn relative_luminance(color: Color) -> f64 {
    0.2126 * linearize(color.r) + 0.7152 * linearize(color.g) + 0.0722 * linearize(color.b)
}

/// Contrast ratio between two colors, always >= 1.
pub fn contrast_ratio(fg: Color, bg: Color) -> f64 {
    let ratio = (relative_luminance(fg) + 0.05) / (relative_luminance(bg) + 0.05);
    if ratio >= 1.0 {
        ratio
    } else {
        1.0 / ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    #[test]
    fn test_white_on_black() {
        assert!((contrast_ratio(WHITE, BLACK) - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_symmetric() {
        assert!((contrast_ratio(WHITE, BLACK) - contrast_ratio(BLACK, WHITE)).abs() < 1e-9);
    }

    #[test]
    fn test_near_grays_below_threshold() {
        let ratio = contrast_ratio(Color::new(120, 120, 120), Color::new(128, 128, 128));
        assert!(ratio >= 1.0);
        assert!(ratio < MIN_CONTRAST_RATIO);
    }

    #[test]
    fn test_luminance_bounds() {
        assert_eq!(relative_luminance(BLACK), 0.0);
        assert!((relative_luminance(WHITE) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_color_from_string_with_alpha() {
        let value: FieldValue = "255 0 128 200".into();
        assert_eq!(Color::from_value(&value), Some(Color::new(255, 0, 128)));
    }

    #[test]
    fn test_color_from_list() {
        let value = FieldValue::List(vec![10i64.into(), 20i64.into(), 30i64.into()]);
        assert_eq!(Color::from_value(&value), Some(Color::new(10, 20, 30)));
    }

    #[test]
    fn test_not_a_color() {
        assert_eq!(Color::from_value(&"red".into()), None);
        assert_eq!(Color::from_value(&"255 255".into()), None);
        assert_eq!(Color::from_value(&"300 0 0".into()), None);
        assert_eq!(Color::from_value(&45i64.into()), None);
    }
}
