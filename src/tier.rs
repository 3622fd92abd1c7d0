//! Saturation/frequency tier filtering of clustered colors.

use crate::cluster::Cluster;

/// Which clustered colors are significant enough to keep.
///
/// Two published policies, selected by configuration; exactly one runs
/// per extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum TierPolicy {
    /// Three saturation brackets with per-bracket population floors,
    /// evaluated in order (vibrant, natural, achromatic); first match
    /// wins and an entry is kept iff some tier accepts it.
    ThreeTier {
        /// Tier 1: saturation floor for vibrant accents.
        vibrant_saturation: f32,
        /// Tier 1: minimum population fraction (small vivid accents
        /// matter even when rare).
        vibrant_min_fraction: f32,
        /// Tier 2: saturation floor for muted-but-visible colors.
        natural_saturation: f32,
        /// Tier 2: minimum population fraction.
        natural_min_fraction: f32,
        /// Tier 3: population floor for achromatic entries; grays must
        /// be a major feature to survive camera/JPEG noise.
        neutral_min_fraction: f32,
    },
    /// Keep everything above a flat dominance floor regardless of
    /// saturation, then up to `max_accents` further saturated clusters
    /// chosen by highest population.
    DominantAccent {
        dominance_fraction: f32,
        accent_saturation: f32,
        max_accents: usize,
    },
}

impl TierPolicy {
    /// Default three-tier policy: vibrant s ≥ 0.35 at ≥ 0.01%, natural
    /// s ≥ 0.10 at ≥ 0.5%, achromatic at ≥ 1.5%.
    pub fn three_tier() -> Self {
        Self::ThreeTier {
            vibrant_saturation: 0.35,
            vibrant_min_fraction: 0.0001,
            natural_saturation: 0.10,
            natural_min_fraction: 0.005,
            neutral_min_fraction: 0.015,
        }
    }

    /// Default dominant/accent split: dominance ≥ 1.5%, up to 3 accents
    /// with saturation ≥ 0.30.
    pub fn dominant_accent() -> Self {
        Self::DominantAccent {
            dominance_fraction: 0.015,
            accent_saturation: 0.30,
            max_accents: 3,
        }
    }
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self::three_tier()
    }
}

/// Apply the tier policy to clustered colors. `total` is the sample count
/// the population fractions are measured against. Input order is
/// preserved for the kept entries.
pub fn filter(clusters: &[Cluster], total: u32, policy: &TierPolicy) -> Vec<Cluster> {
    if total == 0 {
        return Vec::new();
    }
    match *policy {
        TierPolicy::ThreeTier {
            vibrant_saturation,
            vibrant_min_fraction,
            natural_saturation,
            natural_min_fraction,
            neutral_min_fraction,
        } => clusters
            .iter()
            .filter(|c| {
                let fraction = c.count as f32 / total as f32;
                let s = c.key.saturation();
                if s >= vibrant_saturation {
                    return fraction >= vibrant_min_fraction;
                }
                if s >= natural_saturation {
                    return fraction >= natural_min_fraction;
                }
                fraction >= neutral_min_fraction
            })
            .copied()
            .collect(),
        TierPolicy::DominantAccent {
            dominance_fraction,
            accent_saturation,
            max_accents,
        } => {
            let mut kept: Vec<Cluster> = Vec::new();
            let mut rest: Vec<Cluster> = Vec::new();
            for &c in clusters {
                let fraction = c.count as f32 / total as f32;
                if fraction >= dominance_fraction {
                    kept.push(c);
                } else {
                    rest.push(c);
                }
            }
            rest.retain(|c| c.key.saturation() >= accent_saturation);
            rest.sort_by(|a, b| b.count.cmp(&a.count).then(a.key.cmp(&b.key)));
            kept.extend(rest.into_iter().take(max_accents));
            kept
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorKey;

    fn cluster(rgb: [u8; 3], count: u32) -> Cluster {
        Cluster {
            key: ColorKey::from_rgb(rgb[0], rgb[1], rgb[2]),
            count,
        }
    }

    // Saturation ~0.5 at lightness 0.5.
    const SAT_RED: [u8; 3] = [191, 64, 64];
    const SAT_GREEN: [u8; 3] = [64, 191, 64];
    const SAT_BLUE: [u8; 3] = [64, 64, 191];
    // Saturation ~0.2.
    const MUTED: [u8; 3] = [153, 102, 102];
    const GRAY: [u8; 3] = [128, 128, 128];

    #[test]
    fn saturated_colors_survive_down_to_the_vibrant_floor() {
        // 90% / 9% / 1%, all saturation ~0.5: the 1% entry still clears
        // tier 1.
        let clusters = [
            cluster(SAT_RED, 900),
            cluster(SAT_GREEN, 90),
            cluster(SAT_BLUE, 10),
        ];
        let kept = filter(&clusters, 1000, &TierPolicy::three_tier());
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn rare_achromatic_entries_are_noise() {
        // 1% gray fails tier 3 (needs 1.5%); 2% gray passes.
        let clusters = [cluster(SAT_RED, 970), cluster(GRAY, 10)];
        let kept = filter(&clusters, 1000, &TierPolicy::three_tier());
        assert_eq!(kept.len(), 1);

        let clusters = [cluster(SAT_RED, 970), cluster(GRAY, 20)];
        let kept = filter(&clusters, 1000, &TierPolicy::three_tier());
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn muted_colors_need_the_natural_floor() {
        // Saturation ~0.2 sits between the vibrant and natural cut-offs:
        // 0.6% passes tier 2, 0.3% fails every tier.
        let clusters = [cluster(SAT_RED, 900), cluster(MUTED, 6)];
        let kept = filter(&clusters, 1000, &TierPolicy::three_tier());
        assert_eq!(kept.len(), 2);

        let clusters = [cluster(SAT_RED, 900), cluster(MUTED, 3)];
        let kept = filter(&clusters, 1000, &TierPolicy::three_tier());
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn empty_total_keeps_nothing() {
        assert!(filter(&[cluster(SAT_RED, 1)], 0, &TierPolicy::three_tier()).is_empty());
    }

    #[test]
    fn dominant_accent_keeps_flat_threshold_regardless_of_saturation() {
        // 2% gray survives on dominance alone.
        let clusters = [cluster(SAT_RED, 950), cluster(GRAY, 20)];
        let kept = filter(&clusters, 1000, &TierPolicy::dominant_accent());
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn dominant_accent_caps_the_accent_count() {
        // One dominant color plus four saturated sub-dominance accents:
        // only the three most populous accents survive.
        let clusters = [
            cluster(SAT_RED, 960),
            cluster(SAT_GREEN, 12),
            cluster(SAT_BLUE, 11),
            cluster([191, 64, 191], 10),
            cluster([191, 191, 64], 9),
        ];
        let kept = filter(&clusters, 1000, &TierPolicy::dominant_accent());
        assert_eq!(kept.len(), 4);
        assert!(kept.iter().all(|c| c.count >= 10));
    }

    #[test]
    fn dominant_accent_ignores_unsaturated_remainder() {
        let clusters = [cluster(SAT_RED, 990), cluster(GRAY, 10)];
        let kept = filter(&clusters, 1000, &TierPolicy::dominant_accent());
        assert_eq!(kept.len(), 1);
    }
}
