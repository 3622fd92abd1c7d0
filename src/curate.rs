//! Final palette curation: dominance ordering, residual de-duplication,
//! size capping, and the optional snap onto a fixed design palette.

use crate::cluster::Cluster;
use crate::color::{key_distance, within_threshold, ColorKey, DeltaEWeights};
use crate::error::PaletteError;

/// One curated palette color with its aggregated population.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteEntry {
    pub key: ColorKey,
    pub count: u32,
    /// Share of the valid samples, in percent, rounded to 2 decimals.
    pub percent: f32,
}

impl PaletteEntry {
    /// Uppercase `RRGGBB` hex of this entry.
    pub fn hex(&self) -> String {
        self.key.hex()
    }
}

/// An ordered palette, most dominant color first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
    total_samples: u32,
}

impl Palette {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(entries: Vec<PaletteEntry>, total_samples: u32) -> Self {
        Self { entries, total_samples }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaletteEntry> {
        self.entries.iter()
    }

    /// Number of valid (opaque) samples the percentages are measured
    /// against.
    pub fn total_samples(&self) -> u32 {
        self.total_samples
    }

    /// Hex strings in dominance order.
    pub fn hexes(&self) -> Vec<String> {
        self.entries.iter().map(PaletteEntry::hex).collect()
    }

    /// Packed keys in dominance order.
    pub fn keys(&self) -> Vec<ColorKey> {
        self.entries.iter().map(|e| e.key).collect()
    }
}

/// A fixed reference palette entry supplied by caller configuration.
/// Read-only for the lifetime of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignColor {
    pub id: String,
    pub key: ColorKey,
}

impl DesignColor {
    /// Build a design color from an id and a 6-digit hex string.
    pub fn new(id: impl Into<String>, hex: &str) -> Result<Self, PaletteError> {
        let key = ColorKey::from_hex(hex).ok_or_else(|| PaletteError::InvalidHex(hex.to_string()))?;
        Ok(Self { id: id.into(), key })
    }
}

/// Curate tier-filtered clusters into the final palette.
///
/// Sorts by population (key ascending on ties), then walks the list and
/// discards any color within the floored `final_threshold` of an
/// already-accepted color — the discarded population was already
/// aggregated upstream, so no recompute happens here. The surviving list
/// is handed to [`finalize`] for capping and the design snap.
pub fn curate(
    kept: Vec<Cluster>,
    total: u32,
    final_threshold: f32,
    weights: DeltaEWeights,
    num_colors: Option<usize>,
    design: Option<&[DesignColor]>,
) -> Palette {
    let mut sorted = kept;
    sorted.sort_by(|a, b| b.count.cmp(&a.count).then(a.key.cmp(&b.key)));

    let mut accepted: Vec<Cluster> = Vec::new();
    for c in sorted {
        let duplicate = accepted
            .iter()
            .any(|a| within_threshold(key_distance(a.key, c.key, weights), final_threshold));
        if !duplicate {
            accepted.push(c);
        }
    }

    finalize(accepted, total, num_colors, design, weights)
}

/// Shared curation tail for both strategies: truncate to `num_colors`
/// (never re-sorting afterwards), then optionally snap each survivor to
/// its nearest design color, aggregating populations that land on the
/// same design entry while preserving first-occurrence order.
pub(crate) fn finalize(
    mut survivors: Vec<Cluster>,
    total: u32,
    num_colors: Option<usize>,
    design: Option<&[DesignColor]>,
    weights: DeltaEWeights,
) -> Palette {
    if let Some(cap) = num_colors {
        if cap > 0 {
            survivors.truncate(cap);
        }
    }

    let snapped: Vec<Cluster> = match design {
        Some(table) if !table.is_empty() => {
            let mut out: Vec<Cluster> = Vec::new();
            for c in survivors {
                let nearest = table
                    .iter()
                    .map(|d| (d.key, key_distance(d.key, c.key, weights)))
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(key, _)| key)
                    .unwrap_or(c.key);
                match out.iter_mut().find(|e| e.key == nearest) {
                    Some(existing) => existing.count += c.count,
                    None => out.push(Cluster { key: nearest, count: c.count }),
                }
            }
            out
        }
        _ => survivors,
    };

    let entries = snapped
        .into_iter()
        .map(|c| PaletteEntry {
            key: c.key,
            count: c.count,
            percent: percent_of(c.count, total),
        })
        .collect();
    Palette::new(entries, total)
}

/// `count/total*100`, rounded to 2 decimal places.
fn percent_of(count: u32, total: u32) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let p = count as f32 / total as f32 * 100.0;
    (p * 100.0).round() / 100.0
}
