use palette::white_point::D65;
use palette::{Hsl, IntoColor, Srgb};

/// CIELAB coordinates relative to the D65 reference white.
pub type Lab = palette::Lab<D65, f64>;

/// sRGB (D65) to CIE XYZ.
const SRGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

/// D65 reference white.
const WHITE_X: f64 = 0.95047;
const WHITE_Y: f64 = 1.0;
const WHITE_Z: f64 = 1.08883;

const LAB_EPSILON: f64 = 0.008856;
const LAB_KAPPA: f64 = 903.3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("invalid color format: {input:?} ({reason})")]
    InvalidFormat { input: String, reason: String },
}

impl ColorError {
    fn invalid(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Core color type used throughout the crate.
/// Wraps sRGB u8 components and provides the derived color-space values the
/// catalog stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// HSL in the units the family rules are written in: hue in degrees
/// `[0, 360)`, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HslPercent {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse any color notation found in brand source files: `#rrggbb`,
    /// `rrggbb` or `rgb(r, g, b)`.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let trimmed = input.trim();
        if trimmed
            .get(..4)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("rgb("))
        {
            Self::from_rgb_function(trimmed)
        } else {
            Self::from_hex(trimmed)
        }
    }

    /// Parse a hex color string like `#ff8800` or `FF8800`.
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 {
            return Err(ColorError::invalid(
                hex,
                format!("expected 6 hex digits, got {}", digits.len()),
            ));
        }
        // `from_str_radix` tolerates a leading `+`, so check digits up front.
        if !digits.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::invalid(hex, "non-hexadecimal digit"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|e| ColorError::invalid(hex, e.to_string()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Parse the CSS-style `rgb(r, g, b)` form.
    fn from_rgb_function(input: &str) -> Result<Self, ColorError> {
        let inner = input[4..]
            .strip_suffix(')')
            .ok_or_else(|| ColorError::invalid(input, "missing closing parenthesis"))?;
        let channels: Vec<&str> = inner.split(',').map(str::trim).collect();
        if channels.len() != 3 {
            return Err(ColorError::invalid(
                input,
                format!("expected 3 channels, got {}", channels.len()),
            ));
        }
        let mut rgb = [0u8; 3];
        for (slot, raw) in rgb.iter_mut().zip(&channels) {
            let value: u16 = raw
                .parse()
                .map_err(|_| ColorError::invalid(input, format!("bad channel {raw:?}")))?;
            *slot = u8::try_from(value)
                .map_err(|_| ColorError::invalid(input, format!("channel {value} > 255")))?;
        }
        Ok(Self::new(rgb[0], rgb[1], rgb[2]))
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Convert to CIELAB at full precision.
    ///
    /// The matrix and thresholds are fixed: stored Lab values and every
    /// ranked Delta E depend on reproducing them exactly.
    pub fn to_lab(self) -> Lab {
        let linear = [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ];
        let [x, y, z] = SRGB_TO_XYZ.map(|row| {
            row[0] * linear[0] + row[1] * linear[1] + row[2] * linear[2]
        });

        let fx = lab_f(x / WHITE_X);
        let fy = lab_f(y / WHITE_Y);
        let fz = lab_f(z / WHITE_Z);

        Lab::new(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
    }

    /// Light Reflectance Value in `[0, 100]`.
    pub fn lrv(self) -> f64 {
        let weighted =
            0.2126 * f64::from(self.r) + 0.7152 * f64::from(self.g) + 0.0722 * f64::from(self.b);
        weighted / 255.0 * 100.0
    }

    pub fn to_hsl(self) -> HslPercent {
        let srgb: Srgb<f64> = Srgb::new(self.r, self.g, self.b).into_format();
        let hsl: Hsl<palette::encoding::Srgb, f64> = srgb.into_color();
        HslPercent {
            hue: hsl.hue.into_positive_degrees(),
            saturation: hsl.saturation * 100.0,
            lightness: hsl.lightness * 100.0,
        }
    }

    /// Squared Euclidean distance in raw RGB space.
    pub fn rgb_distance_sq(self, other: Color) -> u32 {
        let dr = i32::from(self.r) - i32::from(other.r);
        let dg = i32::from(self.g) - i32::from(other.g);
        let db = i32::from(self.b) - i32::from(other.b);
        (dr * dr + dg * dg + db * db).unsigned_abs()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::str::FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn srgb_to_linear(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f64) -> f64 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        (LAB_KAPPA * t + 16.0) / 116.0
    }
}

/// Round to two decimals for storage. Never feed the result back into a
/// distance comparison.
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // Drop the sign of -0.0 so stored values serialize identically.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    #[test]
    fn hex_round_trip() {
        let original = Color::from_hex("#ff8800").unwrap();
        assert_eq!(original.r, 255);
        assert_eq!(original.g, 136);
        assert_eq!(original.b, 0);
        assert_eq!(original.to_hex(), "#ff8800");
    }

    #[test]
    fn hex_uppercase_input() {
        let color = Color::from_hex("#FF8800").unwrap();
        assert_eq!(color.to_hex(), "#ff8800");
    }

    #[test]
    fn hex_without_hash() {
        let color = Color::from_hex("aabbcc").unwrap();
        assert_eq!(color.to_hex(), "#aabbcc");
    }

    #[test]
    fn hex_invalid_length() {
        assert!(Color::from_hex("#fff").is_err());
        assert!(Color::from_hex("#ff88001").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn hex_invalid_chars() {
        assert!(Color::from_hex("#gggggg").is_err());
        assert!(Color::from_hex("+fffff").is_err());
        // multi-byte chars would otherwise split a code point
        assert!(Color::from_hex("#ééé").is_err());
        assert!(Color::parse("#ééé").is_err());
    }

    #[test]
    fn rgb_function_form() {
        let color = Color::parse("rgb(140, 168, 184)").unwrap();
        assert_eq!(color, Color::new(140, 168, 184));
        let spaced = Color::parse("  RGB(1,2,3)  ").unwrap();
        assert_eq!(spaced, Color::new(1, 2, 3));
    }

    #[test]
    fn rgb_function_rejects_out_of_range_channel() {
        let err = Color::parse("rgb(256, 0, 0)").unwrap_err();
        assert!(err.to_string().contains("> 255"), "got {err}");
    }

    #[test]
    fn rgb_function_rejects_malformed() {
        assert!(Color::parse("rgb(1, 2)").is_err());
        assert!(Color::parse("rgb(1, 2, 3").is_err());
        assert!(Color::parse("rgb(a, b, c)").is_err());
        assert!(Color::parse("rgb(-1, 2, 3)").is_err());
    }

    #[test]
    fn white_lab_endpoint() {
        let lab = WHITE.to_lab();
        assert!((lab.l - 100.0).abs() < 0.5, "L = {}", lab.l);
        assert!(lab.a.abs() < 0.5, "a = {}", lab.a);
        assert!(lab.b.abs() < 0.5, "b = {}", lab.b);
    }

    #[test]
    fn black_lab_endpoint() {
        let lab = BLACK.to_lab();
        assert!(lab.l.abs() < 0.5, "L = {}", lab.l);
        assert!(lab.a.abs() < 0.5, "a = {}", lab.a);
        assert!(lab.b.abs() < 0.5, "b = {}", lab.b);
    }

    #[test]
    fn saturated_red_lab() {
        // Reference values for sRGB red under D65.
        let lab = Color::new(255, 0, 0).to_lab();
        assert!((lab.l - 53.24).abs() < 0.05, "L = {}", lab.l);
        assert!((lab.a - 80.09).abs() < 0.05, "a = {}", lab.a);
        assert!((lab.b - 67.20).abs() < 0.05, "b = {}", lab.b);
    }

    #[test]
    fn lrv_bounds() {
        assert!((WHITE.lrv() - 100.0).abs() < 1e-9);
        assert_eq!(BLACK.lrv(), 0.0);
        let mid = Color::new(128, 128, 128).lrv();
        assert!((mid - 50.2).abs() < 0.1, "lrv = {mid}");
    }

    #[test]
    fn hsl_of_misty_blue() {
        let hsl = Color::new(0x8c, 0xa8, 0xb8).to_hsl();
        assert!((hsl.hue - 201.8).abs() < 0.1, "hue = {}", hsl.hue);
        assert!((hsl.saturation - 23.66).abs() < 0.1, "s = {}", hsl.saturation);
        assert!((hsl.lightness - 63.53).abs() < 0.1, "l = {}", hsl.lightness);
    }

    #[test]
    fn rgb_distance_is_squared_euclidean() {
        let a = Color::new(10, 20, 30);
        let b = Color::new(13, 24, 30);
        assert_eq!(a.rgb_distance_sq(b), 25);
        assert_eq!(b.rgb_distance_sq(a), 25);
        assert_eq!(a.rgb_distance_sq(a), 0);
    }

    #[test]
    fn round2_normalizes_negative_zero() {
        assert_eq!(round2(-0.001).to_bits(), 0.0f64.to_bits());
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(-3.14159), -3.14);
    }

    #[test]
    fn display_matches_to_hex() {
        let color = Color::new(171, 205, 239);
        assert_eq!(format!("{color}"), color.to_hex());
    }
}
