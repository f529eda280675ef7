//! k-medoids clustering over a precomputed distance matrix, silhouette
//! scoring, and model-order selection across a range of cluster counts.

mod pam;
mod selection;
mod silhouette;

pub use pam::k_medoids;
pub use selection::{KTrial, ModelSelection, select_k};
pub use silhouette::{mean_silhouette, silhouette_samples};

use crate::types::{ClusterLabel, DayIndex};

/// Frozen result of one k-medoids run.
///
/// Labels are small integers whose numbering depends on the seed and on
/// iteration order; they carry no meaning until the family namer ranks them.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterAssignment {
    /// Number of clusters requested.
    pub k: usize,
    /// Cluster label per day, in loader order.
    pub labels: Vec<ClusterLabel>,
    /// Medoid day index per cluster label.
    pub medoids: Vec<DayIndex>,
    /// Assignment/update sweeps performed.
    pub iterations: usize,
    /// False when the sweep cap stopped the run before a fixed point.
    pub converged: bool,
    /// Times an update step found a cluster with no members.
    pub empty_cluster_skips: usize,
}

impl ClusterAssignment {
    /// Day indices carrying `label`, ascending.
    pub fn members(&self, label: ClusterLabel) -> Vec<DayIndex> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == label)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Member count per cluster label.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for label in &self.labels {
            sizes[*label] += 1;
        }
        sizes
    }

    /// Same partition under a renumbered label space: old label `l` becomes
    /// `permutation[l]`.
    pub fn relabeled(&self, permutation: &[ClusterLabel]) -> Self {
        let mut medoids = vec![0; self.k];
        for (old, medoid) in self.medoids.iter().enumerate() {
            medoids[permutation[old]] = *medoid;
        }
        Self {
            labels: self.labels.iter().map(|l| permutation[*l]).collect(),
            medoids,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClusterAssignment {
        ClusterAssignment {
            k: 3,
            labels: vec![0, 1, 1, 2, 0, 1],
            medoids: vec![0, 2, 3],
            iterations: 2,
            converged: true,
            empty_cluster_skips: 0,
        }
    }

    #[test]
    fn members_and_sizes_follow_labels() {
        let assignment = sample();
        assert_eq!(assignment.members(1), vec![1, 2, 5]);
        assert_eq!(assignment.cluster_sizes(), vec![2, 3, 1]);
    }

    #[test]
    fn relabeling_moves_medoids_with_labels() {
        let relabeled = sample().relabeled(&[2, 0, 1]);
        assert_eq!(relabeled.labels, vec![2, 0, 0, 1, 2, 0]);
        assert_eq!(relabeled.medoids, vec![2, 3, 0]);
        assert_eq!(relabeled.members(0), vec![1, 2, 5]);
    }
}
