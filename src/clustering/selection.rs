use rayon::prelude::*;
use tracing::{info, warn};

use super::{ClusterAssignment, k_medoids, mean_silhouette, silhouette_samples};
use crate::config::KRange;
use crate::distance::DistanceMatrix;
use crate::errors::FamilyError;

/// Outcome of one candidate `k` in the sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct KTrial {
    /// Candidate cluster count.
    pub k: usize,
    /// Mean silhouette of this candidate's clustering.
    pub mean_silhouette: f64,
    /// PAM sweeps performed.
    pub iterations: usize,
    /// Whether PAM reached a fixed point before the sweep cap.
    pub converged: bool,
    /// Sweeps in which some cluster was empty.
    pub empty_cluster_skips: usize,
}

/// Winning candidate of a model-order sweep plus the full trial table.
#[derive(Clone, Debug)]
pub struct ModelSelection {
    /// Assignment for the winning `k`.
    pub assignment: ClusterAssignment,
    /// Per-day silhouettes of the winning assignment.
    pub silhouettes: Vec<f64>,
    /// Mean of `silhouettes`.
    pub mean_silhouette: f64,
    /// Every feasible candidate, ascending by `k`.
    pub trials: Vec<KTrial>,
    /// Candidates skipped because `k >= N`.
    pub skipped: Vec<usize>,
}

impl ModelSelection {
    /// Selected cluster count.
    pub fn k(&self) -> usize {
        self.assignment.k
    }
}

/// Run k-medoids once per candidate in `range` (same `seed` each time) and keep
/// the highest mean silhouette. Ties keep the smaller `k`.
pub fn select_k(
    distances: &DistanceMatrix,
    range: KRange,
    seed: u64,
) -> Result<ModelSelection, FamilyError> {
    if range.is_empty() {
        return Err(FamilyError::Configuration(format!(
            "k range {range} is empty"
        )));
    }
    let population = distances.len();
    let (feasible, skipped): (Vec<usize>, Vec<usize>) = range
        .candidates()
        .partition(|k| *k >= 1 && *k < population);
    if !skipped.is_empty() {
        warn!(
            "[families:sweep] skipping infeasible k values {:?} for {} days",
            skipped, population
        );
    }
    if feasible.is_empty() {
        return Err(FamilyError::InfeasibleRange {
            min: range.min,
            max: range.max,
            population,
        });
    }

    let runs: Vec<(ClusterAssignment, Vec<f64>, f64)> = feasible
        .par_iter()
        .map(|k| {
            let assignment = k_medoids(distances, *k, seed)?;
            let silhouettes = silhouette_samples(distances, &assignment.labels, *k);
            let score = mean_silhouette(&silhouettes);
            Ok((assignment, silhouettes, score))
        })
        .collect::<Result<_, FamilyError>>()?;

    let trials: Vec<KTrial> = runs
        .iter()
        .map(|(assignment, _, score)| KTrial {
            k: assignment.k,
            mean_silhouette: *score,
            iterations: assignment.iterations,
            converged: assignment.converged,
            empty_cluster_skips: assignment.empty_cluster_skips,
        })
        .collect();
    for trial in &trials {
        info!(
            "[families:sweep] k={} mean_silhouette={:.4} iterations={} converged={}",
            trial.k, trial.mean_silhouette, trial.iterations, trial.converged
        );
    }

    let mut best_idx = 0;
    for (idx, (_, _, score)) in runs.iter().enumerate().skip(1) {
        if *score > runs[best_idx].2 {
            best_idx = idx;
        }
    }
    let (assignment, silhouettes, mean_silhouette) = runs
        .into_iter()
        .nth(best_idx)
        .ok_or_else(|| FamilyError::Configuration("sweep produced no trials".to_string()))?;
    info!(
        "[families:sweep] selected k={} (mean_silhouette={:.4})",
        assignment.k, mean_silhouette
    );

    Ok(ModelSelection {
        assignment,
        silhouettes,
        mean_silhouette,
        trials,
        skipped,
    })
}
