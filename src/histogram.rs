//! Exact-match color histogram over sampled pixels.

use std::collections::HashMap;

use crate::color::ColorKey;

/// Occurrence counts per packed color, plus the number of samples consumed.
///
/// `total` is the denominator for every percentage threshold downstream,
/// so it counts samples (post alpha-filter), not distinct colors.
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    counts: HashMap<ColorKey, u32>,
    total: u32,
}

impl Histogram {
    /// Drain a sample sequence into exact-match counts.
    pub fn build(samples: impl Iterator<Item = [u8; 3]>) -> Self {
        let mut counts: HashMap<ColorKey, u32> = HashMap::new();
        let mut total = 0u32;
        for [r, g, b] in samples {
            *counts.entry(ColorKey::from_rgb(r, g, b)).or_insert(0) += 1;
            total += 1;
        }
        Self { counts, total }
    }

    #[inline]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[inline]
    pub fn count(&self, key: ColorKey) -> u32 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// Entries in the pipeline's deterministic order: count descending,
    /// ColorKey ascending on ties. Map iteration order never leaks into
    /// the output.
    pub fn entries_by_count(&self) -> Vec<(ColorKey, u32)> {
        let mut entries: Vec<(ColorKey, u32)> = self.counts.iter().map(|(&k, &c)| (k, c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries
    }
}
