//! Noise clustering: snap near-duplicate histogram entries onto parents.

use palette::Lab;

use crate::color::{delta_e, within_threshold, ColorKey, DeltaEWeights};
use crate::histogram::Histogram;

/// A merged color with its accumulated population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cluster {
    pub key: ColorKey,
    pub count: u32,
}

/// Collapse near-duplicate histogram entries into "parent" colors.
///
/// Entries are visited in deterministic order (count descending, key
/// ascending) and compared against existing parents in the order the
/// parents were created. The first parent within the floored `threshold`
/// absorbs the entry's count; there is no search for a closer parent, and
/// the parent's representative color does not move. An entry matching no
/// parent becomes a new parent.
///
/// First-match-wins is intentional: earlier, higher-count entries are
/// assumed to already represent the true dominant colors, so a later
/// near-duplicate collapses into whichever parent it first resembles.
/// The result is order-sensitive by design.
pub fn snap_to_parents(histogram: &Histogram, threshold: f32, weights: DeltaEWeights) -> Vec<Cluster> {
    let mut parents: Vec<Cluster> = Vec::new();
    let mut parent_labs: Vec<Lab> = Vec::new();

    for (key, count) in histogram.entries_by_count() {
        let lab = key.lab();
        let absorbed = parent_labs
            .iter()
            .position(|&p| within_threshold(delta_e(p, lab, weights), threshold));
        match absorbed {
            Some(i) => parents[i].count += count,
            None => {
                parents.push(Cluster { key, count });
                parent_labs.push(lab);
            }
        }
    }

    parents
}
