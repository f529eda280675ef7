use tracing::{debug, warn};

use super::ClusterAssignment;
use crate::constants::clustering::ITERATION_BOUND_FACTOR;
use crate::distance::DistanceMatrix;
use crate::errors::FamilyError;
use crate::rng::initial_medoids;
use crate::types::{ClusterLabel, DayIndex};

/// Partition the days behind `distances` into `k` clusters (PAM, alternating
/// nearest-medoid assignment and exact per-cluster medoid update).
///
/// Initial medoids are `k` distinct days drawn from a generator seeded with
/// `seed`, so identical inputs always yield identical assignments.
pub fn k_medoids(
    distances: &DistanceMatrix,
    k: usize,
    seed: u64,
) -> Result<ClusterAssignment, FamilyError> {
    let n = distances.len();
    if k == 0 || k >= n {
        return Err(FamilyError::InfeasibleK { k, population: n });
    }

    let mut medoids = initial_medoids(seed, n, k);
    let mut labels = vec![0; n];
    let max_iterations = (ITERATION_BOUND_FACTOR * n).max(1);
    let mut iterations = 0;
    let mut converged = false;
    let mut empty_cluster_skips = 0;

    while iterations < max_iterations {
        assign_nearest(distances, &medoids, &mut labels);
        iterations += 1;
        let mut changed = false;
        for (label, medoid) in medoids.iter_mut().enumerate() {
            match best_medoid(distances, &labels, label, *medoid) {
                Some(best) if best != *medoid => {
                    *medoid = best;
                    changed = true;
                }
                Some(_) => {}
                None => {
                    empty_cluster_skips += 1;
                    debug!(
                        "[families:pam] cluster {} is empty in sweep {}; keeping medoid {}",
                        label, iterations, medoid
                    );
                }
            }
        }
        if !changed {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            "[families:pam] k={} stopped after {} sweeps without reaching a fixed point",
            k, iterations
        );
        assign_nearest(distances, &medoids, &mut labels);
    }

    Ok(ClusterAssignment {
        k,
        labels,
        medoids,
        iterations,
        converged,
        empty_cluster_skips,
    })
}

/// Label every day with its nearest medoid; ties go to the lowest label.
fn assign_nearest(distances: &DistanceMatrix, medoids: &[DayIndex], labels: &mut [ClusterLabel]) {
    for (day, slot) in labels.iter_mut().enumerate() {
        let row = distances.row(day);
        let mut best_label = 0;
        let mut best_distance = row[medoids[0]];
        for (label, medoid) in medoids.iter().enumerate().skip(1) {
            if row[*medoid] < best_distance {
                best_distance = row[*medoid];
                best_label = label;
            }
        }
        *slot = best_label;
    }
}

/// Member of `label` minimizing the summed distance to the other members.
///
/// The current medoid is kept unless another member is strictly better.
/// Returns `None` for an empty cluster.
fn best_medoid(
    distances: &DistanceMatrix,
    labels: &[ClusterLabel],
    label: ClusterLabel,
    current: DayIndex,
) -> Option<DayIndex> {
    let members: Vec<DayIndex> = labels
        .iter()
        .enumerate()
        .filter(|(_, l)| **l == label)
        .map(|(idx, _)| idx)
        .collect();
    if members.is_empty() {
        return None;
    }
    let cost = |candidate: DayIndex| -> f64 {
        let row = distances.row(candidate);
        members.iter().map(|member| row[*member]).sum()
    };
    let (mut best, mut best_cost) = if members.contains(&current) {
        (current, cost(current))
    } else {
        (members[0], cost(members[0]))
    };
    for candidate in &members {
        let candidate_cost = cost(*candidate);
        if candidate_cost < best_cost {
            best = *candidate;
            best_cost = candidate_cost;
        }
    }
    Some(best)
}
