use palette::{Hsl, IntoColor, Lab, Srgb};

// ------------------------------------------------------------
// Color keys
// ------------------------------------------------------------

/// A canonical packed-RGB color key (`0x00RRGGBB`).
///
/// Every representable RGB triple maps to exactly one key, so keys can be
/// used directly as histogram map keys and as a total, deterministic
/// tie-break order (numeric ascending).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorKey(u32);

impl ColorKey {
    #[inline]
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    /// Parse a 6-digit hex color, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let s = hex.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&s[0..2], 16).ok()?;
        let g = u8::from_str_radix(&s[2..4], 16).ok()?;
        let b = u8::from_str_radix(&s[4..6], 16).ok()?;
        Some(Self::from_rgb(r, g, b))
    }

    #[inline]
    pub fn rgb(self) -> [u8; 3] {
        [
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        ]
    }

    /// Uppercase `RRGGBB` hex string, no leading `#`.
    pub fn hex(self) -> String {
        let [r, g, b] = self.rgb();
        format!("{:02X}{:02X}{:02X}", r, g, b)
    }

    #[inline]
    pub fn lab(self) -> Lab {
        let [r, g, b] = self.rgb();
        rgb_to_lab(r, g, b)
    }

    /// HSL saturation of this color, in `0.0..=1.0`.
    #[inline]
    pub fn saturation(self) -> f32 {
        let [r, g, b] = self.rgb();
        saturation(r, g, b)
    }
}

// ------------------------------------------------------------
// Color space conversions (sRGB / HSL / CIE-LAB, D65)
// ------------------------------------------------------------

/// Convert an 8-bit sRGB triple to CIE-LAB (D65).
#[inline]
pub fn rgb_to_lab(r: u8, g: u8, b: u8) -> Lab {
    Srgb::<u8>::new(r, g, b).into_linear().into_color()
}

/// Convert a LAB color back to 8-bit sRGB, clamping out-of-gamut
/// components to the valid channel range instead of erroring.
#[inline]
pub fn lab_to_rgb(lab: Lab) -> [u8; 3] {
    let rgb: Srgb<f32> = Srgb::from_linear(lab.into_color());
    let clamped = Srgb::new(
        rgb.red.clamp(0.0, 1.0),
        rgb.green.clamp(0.0, 1.0),
        rgb.blue.clamp(0.0, 1.0),
    );
    let out: Srgb<u8> = clamped.into_format();
    [out.red, out.green, out.blue]
}

/// Convert an 8-bit sRGB triple to HSL: hue in degrees `0.0..360.0`,
/// saturation and lightness in `0.0..=1.0`. Any non-finite channel
/// computation (achromatic gray) is coerced to `0.0`, never NaN.
#[inline]
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let hsl: Hsl = Srgb::<u8>::new(r, g, b).into_format::<f32>().into_color();
    let finite = |v: f32| if v.is_finite() { v } else { 0.0 };
    (
        finite(hsl.hue.into_positive_degrees()),
        finite(hsl.saturation),
        finite(hsl.lightness),
    )
}

/// HSL saturation of an 8-bit sRGB triple.
#[inline]
pub fn saturation(r: u8, g: u8, b: u8) -> f32 {
    rgb_to_hsl(r, g, b).1
}

// ------------------------------------------------------------
// Perceptual distance (CIEDE2000 family)
// ------------------------------------------------------------

/// Parametric lightness/chroma/hue weights for [`delta_e`].
///
/// `UNIFORM` is the standard CIE2000 metric; `LEGACY` is the weighted
/// variant used by the histogram pipeline, which damps lightness and
/// chroma differences and damps hue differences harder, so that
/// anti-aliasing halos collapse onto their parent hue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaEWeights {
    pub kl: f32,
    pub kc: f32,
    pub kh: f32,
}

impl DeltaEWeights {
    /// Standard unweighted CIE2000.
    pub const UNIFORM: Self = Self { kl: 1.0, kc: 1.0, kh: 1.0 };

    /// Legacy histogram-pipeline weighting.
    pub const LEGACY: Self = Self { kl: 1.5, kc: 1.5, kh: 1.8 };
}

impl Default for DeltaEWeights {
    fn default() -> Self {
        Self::UNIFORM
    }
}

/// CIEDE2000 color difference with parametric kL/kC/kH weights.
///
/// Symmetric in its arguments. Inputs are LAB in D65. f32 throughout;
/// accuracy is well within the integer thresholds the pipeline compares
/// against.
pub fn delta_e(lab1: Lab, lab2: Lab, w: DeltaEWeights) -> f32 {
    let (l1, a1, b1) = (lab1.l, lab1.a, lab1.b);
    let (l2, a2, b2) = (lab2.l, lab2.a, lab2.b);

    let avg_lp = 0.5 * (l1 + l2);
    let c1 = (a1 * a1 + b1 * b1).sqrt();
    let c2 = (a2 * a2 + b2 * b2).sqrt();
    let avg_c = 0.5 * (c1 + c2);

    let g = 0.5 * (1.0 - (avg_c.powf(7.0) / (avg_c.powf(7.0) + 25.0_f32.powf(7.0))).sqrt());
    let a1p = (1.0 + g) * a1;
    let a2p = (1.0 + g) * a2;
    let c1p = (a1p * a1p + b1 * b1).sqrt();
    let c2p = (a2p * a2p + b2 * b2).sqrt();

    let h1p = b1.atan2(a1p).to_degrees().rem_euclid(360.0);
    let h2p = b2.atan2(a2p).to_degrees().rem_euclid(360.0);

    let delta_lp = l2 - l1;
    let delta_cp = c2p - c1p;

    let hp_diff = if c1p * c2p == 0.0 {
        0.0
    } else if (h2p - h1p).abs() <= 180.0 {
        h2p - h1p
    } else if h2p <= h1p {
        h2p - h1p + 360.0
    } else {
        h2p - h1p - 360.0
    };

    let delta_hp = if c1p * c2p == 0.0 {
        0.0
    } else {
        2.0 * (c1p * c2p).sqrt() * (0.5 * hp_diff.to_radians()).sin()
    };

    let avg_hp = if c1p * c2p == 0.0 {
        h1p + h2p
    } else if (h1p - h2p).abs() <= 180.0 {
        0.5 * (h1p + h2p)
    } else if (h1p + h2p) < 360.0 {
        0.5 * (h1p + h2p + 360.0)
    } else {
        0.5 * (h1p + h2p - 360.0)
    };

    let t = 1.0 - 0.17 * (avg_hp - 30.0).to_radians().cos()
        + 0.24 * (2.0 * avg_hp).to_radians().cos()
        + 0.32 * (3.0 * avg_hp + 6.0).to_radians().cos()
        - 0.20 * (4.0 * avg_hp - 63.0).to_radians().cos();

    let delta_ro = 30.0 * (-(((avg_hp - 275.0) / 25.0).powi(2))).exp();
    let rc = 2.0 * (avg_c.powf(7.0) / (avg_c.powf(7.0) + 25.0_f32.powf(7.0))).sqrt();
    let sl = 1.0 + (0.015 * (avg_lp - 50.0).powi(2)) / (20.0 + (avg_lp - 50.0).powi(2)).sqrt();
    let sc = 1.0 + 0.045 * avg_c;
    let sh = 1.0 + 0.015 * avg_c * t;
    let rt = -rc * (2.0 * delta_ro.to_radians()).sin();

    ((delta_lp / (w.kl * sl)).powi(2)
        + (delta_cp / (w.kc * sc)).powi(2)
        + (delta_hp / (w.kh * sh)).powi(2)
        + rt * (delta_cp / (w.kc * sc)) * (delta_hp / (w.kh * sh)))
        .sqrt()
}

/// Perceptual distance between two packed colors.
#[inline]
pub fn key_distance(a: ColorKey, b: ColorKey, w: DeltaEWeights) -> f32 {
    delta_e(a.lab(), b.lab(), w)
}

/// Floored threshold test: a distance crosses a configured threshold only
/// when `floor(distance) <= threshold`, keeping threshold crossings
/// reproducible across floating-point implementations.
#[inline]
pub fn within_threshold(distance: f32, threshold: f32) -> bool {
    distance.floor() <= threshold
}
