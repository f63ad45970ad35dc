use serde::{Deserialize, Serialize};

use crate::color::{Color, HslPercent};

/// Coarse color family a catalog color is bucketed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorFamily {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Brown,
    Beige,
    Gray,
    Neutral,
    White,
    OffWhite,
    Black,
}

impl ColorFamily {
    pub const ALL: [ColorFamily; 14] = [
        ColorFamily::Red,
        ColorFamily::Orange,
        ColorFamily::Yellow,
        ColorFamily::Green,
        ColorFamily::Blue,
        ColorFamily::Purple,
        ColorFamily::Pink,
        ColorFamily::Brown,
        ColorFamily::Beige,
        ColorFamily::Gray,
        ColorFamily::Neutral,
        ColorFamily::White,
        ColorFamily::OffWhite,
        ColorFamily::Black,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColorFamily::Red => "red",
            ColorFamily::Orange => "orange",
            ColorFamily::Yellow => "yellow",
            ColorFamily::Green => "green",
            ColorFamily::Blue => "blue",
            ColorFamily::Purple => "purple",
            ColorFamily::Pink => "pink",
            ColorFamily::Brown => "brown",
            ColorFamily::Beige => "beige",
            ColorFamily::Gray => "gray",
            ColorFamily::Neutral => "neutral",
            ColorFamily::White => "white",
            ColorFamily::OffWhite => "off-white",
            ColorFamily::Black => "black",
        }
    }

    /// Bucket a color by its HSL coordinates.
    ///
    /// Rules are evaluated top to bottom and the first match wins. The
    /// achromatic and warm-neutral rules must stay ahead of the hue bands,
    /// otherwise warm grays and beiges land in orange or yellow.
    pub fn classify(color: Color) -> Self {
        Self::from_hsl(color.to_hsl())
    }

    pub fn from_hsl(hsl: HslPercent) -> Self {
        let HslPercent {
            hue: h,
            saturation: s,
            lightness: l,
        } = hsl;

        if l > 90.0 && s < 15.0 {
            return ColorFamily::White;
        }
        if l > 80.0 && s < 20.0 {
            return ColorFamily::OffWhite;
        }
        if l < 15.0 {
            return ColorFamily::Black;
        }
        if s < 10.0 && (20.0..=80.0).contains(&l) {
            return ColorFamily::Gray;
        }
        if (10.0..=30.0).contains(&s) && (30.0..=55.0).contains(&h) && (60.0..=85.0).contains(&l) {
            return ColorFamily::Beige;
        }
        if (15.0..=50.0).contains(&s) && (15.0..=45.0).contains(&h) && l < 60.0 {
            return ColorFamily::Brown;
        }
        if s < 15.0 {
            return ColorFamily::Neutral;
        }

        match h {
            h if h >= 345.0 || h < 15.0 => ColorFamily::Red,
            h if h < 45.0 => ColorFamily::Orange,
            h if h < 70.0 => ColorFamily::Yellow,
            h if h < 170.0 => ColorFamily::Green,
            h if h < 260.0 => ColorFamily::Blue,
            h if h < 290.0 => ColorFamily::Purple,
            h if h < 345.0 => ColorFamily::Pink,
            _ => ColorFamily::Neutral,
        }
    }
}

impl std::fmt::Display for ColorFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
