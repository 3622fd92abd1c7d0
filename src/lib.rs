//! Extract a small, perceptually distinct color palette from a raster
//! image.
//!
//! The crate distinguishes "spot-color" artwork (few flat colors, logos
//! and illustrations) from full-color photographic imagery and, for
//! spot-color input, snaps noisy anti-aliased pixels onto a compact set
//! of dominant hues. Two interchangeable strategies implement the same
//! contract (pixels + mode → ordered [`Palette`]):
//!
//! 1. **Histogram** (default): exact-match histogram → noise clustering
//!    onto parent colors → saturation/frequency tier filter → curation.
//! 2. **Centroid**: k-means over LAB samples → population filter →
//!    perceptual merge → curation.
//!
//! Both run the same curation tail: dominance ordering, residual
//! de-duplication, an optional size cap, and an optional snap onto a
//! caller-supplied design palette. The classifier that decides whether
//! an image is spot-color or photographic is an external collaborator;
//! its verdict enters as [`Mode`].

use image::{self, DynamicImage, GenericImageView, ImageFormat, RgbaImage};
use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

pub mod centroid;
pub mod cluster;
pub mod color;
pub mod curate;
pub mod error;
pub mod histogram;
pub mod remap;
pub mod sample;
pub mod tier;

pub use centroid::CentroidOptions;
pub use cluster::Cluster;
pub use color::{delta_e, ColorKey, DeltaEWeights};
pub use curate::{DesignColor, Palette, PaletteEntry};
pub use error::PaletteError;
pub use tier::TierPolicy;

use histogram::Histogram;
use sample::sample_opaque;

// ------------------------------------------------------------
// Configuration
// ------------------------------------------------------------

/// Extraction mode, decided upstream by the illustration/photo
/// classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Photographic imagery: the tier filter is bypassed and colors are
    /// ranked by dominance alone (or the image is rejected outright when
    /// [`ExtractOptions::reject_full_color`] is set).
    FullColor,
    /// Flat-color artwork: the full noise-clustering and tier-filtering
    /// pipeline applies.
    SpotColor,
}

/// Which pipeline implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractStrategy {
    /// Exact-match histogram with snap-to-parent noise clustering.
    #[default]
    Histogram,
    /// Over-clustered k-means in LAB space.
    Centroid,
}

/// Configuration for palette extraction. Every threshold of the pipeline
/// is overridable; the defaults are the production tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Pipeline implementation. Default: [`ExtractStrategy::Histogram`].
    pub strategy: ExtractStrategy,
    /// Sample every Nth pixel. Default 1 (dense).
    pub sample_stride: usize,
    /// Drop samples with alpha at or below this value. Default 128
    /// (roughly a 50% opacity cutoff).
    pub alpha_threshold: u8,
    /// Noise-clusterer parent snap distance. Default 12.
    pub noise_threshold: f32,
    /// Curator near-duplicate distance. Default 10.
    pub final_threshold: f32,
    /// Tier policy for spot-color filtering. Default three-tier.
    pub tier_policy: TierPolicy,
    /// Perceptual distance weights for the histogram pipeline.
    /// Default [`DeltaEWeights::LEGACY`].
    pub weights: DeltaEWeights,
    /// Palette size cap; `None` (default) or `Some(0)` mean uncapped.
    pub num_colors: Option<usize>,
    /// When set, [`Mode::FullColor`] extraction returns an empty palette
    /// instead of an unfiltered one. Default off.
    pub reject_full_color: bool,
    /// Centroid-strategy tuning.
    pub centroid: CentroidOptions,
    /// Fixed design palette for the curation snap step.
    pub design_palette: Option<Vec<DesignColor>>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            strategy: ExtractStrategy::Histogram,
            sample_stride: 1,
            alpha_threshold: 128,
            noise_threshold: 12.0,
            final_threshold: 10.0,
            tier_policy: TierPolicy::default(),
            weights: DeltaEWeights::LEGACY,
            num_colors: None,
            reject_full_color: false,
            centroid: CentroidOptions::default(),
            design_palette: None,
        }
    }
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategy(mut self, strategy: ExtractStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn sample_stride(mut self, stride: usize) -> Self {
        self.sample_stride = stride;
        self
    }

    pub fn alpha_threshold(mut self, threshold: u8) -> Self {
        self.alpha_threshold = threshold;
        self
    }

    pub fn noise_threshold(mut self, threshold: f32) -> Self {
        self.noise_threshold = threshold;
        self
    }

    pub fn final_threshold(mut self, threshold: f32) -> Self {
        self.final_threshold = threshold;
        self
    }

    pub fn tier_policy(mut self, policy: TierPolicy) -> Self {
        self.tier_policy = policy;
        self
    }

    pub fn weights(mut self, weights: DeltaEWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn num_colors(mut self, cap: usize) -> Self {
        self.num_colors = Some(cap);
        self
    }

    pub fn reject_full_color(mut self, reject: bool) -> Self {
        self.reject_full_color = reject;
        self
    }

    pub fn centroid(mut self, centroid: CentroidOptions) -> Self {
        self.centroid = centroid;
        self
    }

    pub fn design_palette(mut self, table: Vec<DesignColor>) -> Self {
        self.design_palette = Some(table);
        self
    }
}

// ------------------------------------------------------------
// Core extraction
// ------------------------------------------------------------

/// Extract an ordered palette from a decoded RGBA buffer.
///
/// The buffer must be `width * height * 4` bytes. Zero valid
/// (sufficiently opaque) samples is a normal outcome and yields an empty
/// palette, not an error; a degenerate centroid clustering likewise
/// recovers to an empty palette. Output is deterministic for a fixed
/// buffer, mode, and configuration.
pub fn extract_palette_pixels(
    rgba: &[u8],
    width: u32,
    height: u32,
    mode: Mode,
    options: &ExtractOptions,
) -> Result<Palette, PaletteError> {
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(PaletteError::DimensionMismatch {
            len: rgba.len(),
            width,
            height,
        });
    }
    if mode == Mode::FullColor && options.reject_full_color {
        return Ok(Palette::empty());
    }

    match options.strategy {
        ExtractStrategy::Histogram => {
            let hist = Histogram::build(sample_opaque(
                rgba,
                options.sample_stride,
                options.alpha_threshold,
            ));
            if hist.total() == 0 {
                return Ok(Palette::empty());
            }
            let clusters =
                cluster::snap_to_parents(&hist, options.noise_threshold, options.weights);
            let kept = match mode {
                Mode::SpotColor => tier::filter(&clusters, hist.total(), &options.tier_policy),
                Mode::FullColor => clusters,
            };
            Ok(curate::curate(
                kept,
                hist.total(),
                options.final_threshold,
                options.weights,
                options.num_colors,
                options.design_palette.as_deref(),
            ))
        }
        ExtractStrategy::Centroid => {
            let labs: Vec<palette::Lab> =
                sample_opaque(rgba, options.sample_stride, options.alpha_threshold)
                    .map(|[r, g, b]| color::rgb_to_lab(r, g, b))
                    .collect();
            if labs.is_empty() {
                return Ok(Palette::empty());
            }
            let total = labs.len() as u32;
            let clusters = match centroid::centroid_clusters(&labs, &options.centroid) {
                Ok(clusters) => clusters,
                // Degenerate clustering means "no palette could be
                // determined", not a caller-visible failure.
                Err(PaletteError::Clustering(_)) => return Ok(Palette::empty()),
                Err(other) => return Err(other),
            };
            Ok(curate::finalize(
                clusters,
                total,
                options.num_colors,
                options.design_palette.as_deref(),
                DeltaEWeights::UNIFORM,
            ))
        }
    }
}

// ------------------------------------------------------------
// Byte-level adapters (decode collaborator)
// ------------------------------------------------------------

const ACCEPTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

fn decode_checked(input: &[u8]) -> Result<DynamicImage, PaletteError> {
    let format = image::guess_format(input)?;
    if !ACCEPTED_FORMATS.contains(&format) {
        return Err(PaletteError::UnsupportedFormat(format!("{format:?}")));
    }
    Ok(image::load_from_memory_with_format(input, format)?)
}

/// Decode encoded image bytes and extract a palette.
///
/// Accepts PNG, JPEG, GIF, and WebP; anything else fails with
/// [`PaletteError::UnsupportedFormat`], unreadable data with
/// [`PaletteError::Decode`].
pub fn extract_palette_bytes(
    input: &[u8],
    mode: Mode,
    options: &ExtractOptions,
) -> Result<Palette, PaletteError> {
    let img = decode_checked(input)?;
    let (width, height) = img.dimensions();
    let raw = img.to_rgba8().into_raw();
    extract_palette_pixels(&raw, width, height, mode, options)
}

/// Decode, extract a palette, and snap every opaque pixel onto it.
///
/// Returns the PNG-encoded snapped image together with the palette. With
/// an empty palette (nothing survived extraction) the image is re-encoded
/// unchanged.
pub fn snap_image_bytes(
    input: &[u8],
    mode: Mode,
    options: &ExtractOptions,
) -> Result<(Vec<u8>, Palette), PaletteError> {
    let img = decode_checked(input)?;
    let (width, height) = img.dimensions();
    let raw = img.to_rgba8().into_raw();

    let palette = extract_palette_pixels(&raw, width, height, mode, options)?;
    let snapped = remap::remap_to_palette(
        &raw,
        &palette.keys(),
        options.weights,
        options.alpha_threshold,
    );

    let out_img = DynamicImage::ImageRgba8(
        RgbaImage::from_raw(width, height, snapped).expect("remap preserves buffer dimensions"),
    );
    let mut buf = Vec::new();
    {
        let mut cursor = std::io::Cursor::new(&mut buf);
        out_img.write_to(&mut cursor, ImageFormat::Png)?;
    }
    Ok((buf, palette))
}

// ------------------------------------------------------------
// WASM surface
// ------------------------------------------------------------

fn js_options(
    num_colors: Option<usize>,
    sample_stride: Option<usize>,
    design_palette: Option<Array>,
) -> Result<ExtractOptions, JsValue> {
    let mut options = ExtractOptions::new();
    if let Some(n) = num_colors {
        options = options.num_colors(n);
    }
    if let Some(stride) = sample_stride {
        options = options.sample_stride(stride);
    }
    if let Some(js_palette) = design_palette {
        let mut table = Vec::new();
        for val in js_palette.iter() {
            let s = val
                .as_string()
                .ok_or_else(|| JsValue::from_str("Design palette values must be hex strings"))?;
            let dc =
                DesignColor::new(s.clone(), &s).map_err(|e| JsValue::from_str(&e.to_string()))?;
            table.push(dc);
        }
        options = options.design_palette(table);
    }
    Ok(options)
}

fn palette_to_js(palette: &Palette) -> Result<Array, JsValue> {
    let out = Array::new();
    for entry in palette.iter() {
        let obj = Object::new();
        Reflect::set(&obj, &JsValue::from_str("hex"), &JsValue::from_str(&entry.hex()))?;
        Reflect::set(
            &obj,
            &JsValue::from_str("count"),
            &JsValue::from_f64(entry.count as f64),
        )?;
        Reflect::set(
            &obj,
            &JsValue::from_str("percent"),
            &JsValue::from_f64(entry.percent as f64),
        )?;
        out.push(&obj);
    }
    Ok(out)
}

/// Extract a palette from encoded image bytes.
///
/// Returns an object `{ palette: [{hex, count, percent}], totalSamples }`
/// with entries in dominance order. `spot_color` carries the upstream
/// classifier's verdict; `design_palette` is an optional array of hex
/// strings to snap the result onto.
#[wasm_bindgen]
pub fn extract_palette(
    input: Vec<u8>,
    spot_color: bool,
    num_colors: Option<usize>,
    sample_stride: Option<usize>,
    design_palette: Option<Array>,
) -> Result<Object, JsValue> {
    let options = js_options(num_colors, sample_stride, design_palette)?;
    let mode = if spot_color { Mode::SpotColor } else { Mode::FullColor };

    let palette = extract_palette_bytes(&input, mode, &options)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let result = Object::new();
    Reflect::set(
        &result,
        &JsValue::from_str("palette"),
        &palette_to_js(&palette)?.into(),
    )?;
    Reflect::set(
        &result,
        &JsValue::from_str("totalSamples"),
        &JsValue::from_f64(palette.total_samples() as f64),
    )?;
    Ok(result)
}

/// Extract a spot-color palette and snap the image's pixels onto it.
///
/// Returns `{ image: Uint8Array (PNG), palette: [{hex, count, percent}] }`.
#[wasm_bindgen]
pub fn snap_image(
    input: Vec<u8>,
    num_colors: Option<usize>,
    sample_stride: Option<usize>,
) -> Result<Object, JsValue> {
    let options = js_options(num_colors, sample_stride, None)?;

    let (png, palette) = snap_image_bytes(&input, Mode::SpotColor, &options)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let result = Object::new();
    Reflect::set(
        &result,
        &JsValue::from_str("image"),
        &Uint8Array::from(png.as_slice()),
    )?;
    Reflect::set(
        &result,
        &JsValue::from_str("palette"),
        &palette_to_js(&palette)?.into(),
    )?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_mismatch_is_an_error() {
        let err = extract_palette_pixels(&[0u8; 12], 2, 2, Mode::SpotColor, &ExtractOptions::new())
            .unwrap_err();
        assert!(matches!(
            err,
            PaletteError::DimensionMismatch { len: 12, width: 2, height: 2 }
        ));
    }

    #[test]
    fn options_builder_overrides_defaults() {
        let options = ExtractOptions::new()
            .strategy(ExtractStrategy::Centroid)
            .sample_stride(4)
            .alpha_threshold(0)
            .noise_threshold(8.0)
            .final_threshold(6.0)
            .num_colors(5)
            .reject_full_color(true)
            .weights(DeltaEWeights::UNIFORM);
        assert_eq!(options.strategy, ExtractStrategy::Centroid);
        assert_eq!(options.sample_stride, 4);
        assert_eq!(options.alpha_threshold, 0);
        assert_eq!(options.noise_threshold, 8.0);
        assert_eq!(options.final_threshold, 6.0);
        assert_eq!(options.num_colors, Some(5));
        assert!(options.reject_full_color);
        assert_eq!(options.weights, DeltaEWeights::UNIFORM);
    }

    #[test]
    fn reject_full_color_short_circuits() {
        let rgba = [255u8, 0, 0, 255];
        let options = ExtractOptions::new().reject_full_color(true);
        let palette = extract_palette_pixels(&rgba, 1, 1, Mode::FullColor, &options).unwrap();
        assert!(palette.is_empty());
        // Spot-color extraction of the same buffer is unaffected.
        let palette = extract_palette_pixels(&rgba, 1, 1, Mode::SpotColor, &options).unwrap();
        assert_eq!(palette.hexes(), vec!["FF0000"]);
    }

    #[test]
    fn unsupported_format_is_rejected() {
        // A minimal BMP header: recognized by the decoder, outside the
        // accepted set.
        let bmp = b"BM\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00";
        let err = extract_palette_bytes(bmp, Mode::SpotColor, &ExtractOptions::new()).unwrap_err();
        assert!(matches!(err, PaletteError::UnsupportedFormat(_)));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = extract_palette_bytes(&[0u8; 16], Mode::SpotColor, &ExtractOptions::new())
            .unwrap_err();
        assert!(matches!(err, PaletteError::Decode(_)));
    }
}
