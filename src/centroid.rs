//! Centroid strategy: over-clustered k-means in LAB space followed by
//! population-based noise rejection and perceptual merging.

use kmeans_colors::get_kmeans;
use palette::Lab;

use crate::cluster::Cluster;
use crate::color::{delta_e, lab_to_rgb, within_threshold, ColorKey, DeltaEWeights};
use crate::error::PaletteError;

/// Tuning for the k-means pass. `k` is an over-clustering count — more
/// centroids than the final palette needs — and is clamped to the sample
/// count (and to the assignment index range) before running.
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidOptions {
    /// Number of centroids to over-cluster into.
    pub k: usize,
    /// Minimum population fraction for a centroid to survive.
    pub pop_threshold: f32,
    /// Merge distance between surviving centroids, compared with the
    /// standard unweighted CIE2000 metric.
    pub merge_threshold: f32,
    /// k-means iteration cap.
    pub max_iter: usize,
    /// k-means convergence cut-off.
    pub convergence: f32,
    /// Seed for centroid initialization; fixed for reproducible output.
    pub seed: u64,
}

impl Default for CentroidOptions {
    fn default() -> Self {
        Self {
            k: 16,
            pop_threshold: 0.01,
            merge_threshold: 10.0,
            max_iter: 20,
            convergence: 1e-4,
            seed: 0,
        }
    }
}

/// Cluster LAB samples into dominant centroids.
///
/// Runs k-means, counts per-centroid populations, drops centroids below
/// the population floor, then greedily merges any centroid within the
/// floored merge threshold of an already-accepted one — recomputing the
/// accepted centroid as the population-weighted LAB average. (Unlike the
/// histogram path's accumulate-into-first rule, centroids get a
/// recomputed perceptual center.) Survivors are converted back to packed
/// RGB, gamut-clamped.
pub fn centroid_clusters(
    labs: &[Lab],
    opts: &CentroidOptions,
) -> Result<Vec<Cluster>, PaletteError> {
    let total = labs.len();
    let k = opts.k.min(total).min(u8::MAX as usize + 1);
    if k == 0 {
        return Ok(Vec::new());
    }

    let kmeans = get_kmeans(k, opts.max_iter, opts.convergence, false, labs, opts.seed);
    if kmeans.centroids.is_empty() {
        return Err(PaletteError::Clustering(format!(
            "k-means produced no centroids for k={k} over {total} samples"
        )));
    }

    let mut populations = vec![0u32; kmeans.centroids.len()];
    for &idx in &kmeans.indices {
        let slot = populations.get_mut(idx as usize).ok_or_else(|| {
            PaletteError::Clustering(format!(
                "assignment index {idx} out of range for {} centroids",
                kmeans.centroids.len()
            ))
        })?;
        *slot += 1;
    }

    // Population floor, then dominance order (stable on ties).
    let mut survivors: Vec<(Lab, u32)> = kmeans
        .centroids
        .iter()
        .zip(populations)
        .filter(|&(_, pop)| pop as f32 / total as f32 >= opts.pop_threshold)
        .map(|(&lab, pop)| (lab, pop))
        .collect();
    survivors.sort_by(|a, b| b.1.cmp(&a.1));

    let mut accepted: Vec<(Lab, u32)> = Vec::new();
    for (lab, pop) in survivors {
        let near = accepted
            .iter()
            .position(|&(a, _)| {
                within_threshold(delta_e(a, lab, DeltaEWeights::UNIFORM), opts.merge_threshold)
            });
        match near {
            Some(i) => {
                let (a, a_pop) = accepted[i];
                let merged_pop = a_pop + pop;
                let wa = a_pop as f32 / merged_pop as f32;
                let wb = pop as f32 / merged_pop as f32;
                accepted[i] = (
                    Lab::new(
                        a.l * wa + lab.l * wb,
                        a.a * wa + lab.a * wb,
                        a.b * wa + lab.b * wb,
                    ),
                    merged_pop,
                );
            }
            None => accepted.push((lab, pop)),
        }
    }

    Ok(accepted
        .into_iter()
        .map(|(lab, pop)| {
            let [r, g, b] = lab_to_rgb(lab);
            Cluster {
                key: ColorKey::from_rgb(r, g, b),
                count: pop,
            }
        })
        .collect())
}
