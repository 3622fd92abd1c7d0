//! Snap image pixels onto an extracted palette.

use palette::Lab;

use crate::color::{delta_e, ColorKey, DeltaEWeights};

/// Replace every sufficiently opaque pixel with the perceptually nearest
/// palette color, preserving the alpha channel.
///
/// Pixels at or below `alpha_threshold` are copied through unchanged, as
/// is the whole buffer when the palette is empty. Palette LAB values are
/// precomputed once; matching is a linear scan, which is optimal for the
/// small palettes this crate produces.
pub fn remap_to_palette(
    rgba: &[u8],
    palette: &[ColorKey],
    weights: DeltaEWeights,
    alpha_threshold: u8,
) -> Vec<u8> {
    if palette.is_empty() {
        return rgba.to_vec();
    }

    let palette_labs: Vec<(ColorKey, Lab)> = palette.iter().map(|&k| (k, k.lab())).collect();

    let mut out = Vec::with_capacity(rgba.len());
    for px in rgba.chunks_exact(4) {
        let a = px[3];
        if a <= alpha_threshold {
            out.extend_from_slice(px);
            continue;
        }
        let lab = crate::color::rgb_to_lab(px[0], px[1], px[2]);
        let nearest = palette_labs
            .iter()
            .map(|&(key, pl)| (key, delta_e(pl, lab, weights)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(key, _)| key)
            .expect("palette is non-empty");
        let [r, g, b] = nearest.rgb();
        out.extend_from_slice(&[r, g, b, a]);
    }
    // Trailing partial pixel bytes (if any) are dropped by chunks_exact;
    // callers validate dimensions before getting here.
    out
}
