use crate::distance::DistanceMatrix;
use crate::types::ClusterLabel;

/// Per-day silhouette `(b - a) / max(a, b)` measured on `distances`.
///
/// `a` is the mean distance to the other members of the day's own cluster and
/// `b` the smallest mean distance to any other non-empty cluster. Days in
/// singleton clusters, days with no other cluster to compare against, and
/// days where `max(a, b) == 0` score 0.
pub fn silhouette_samples(
    distances: &DistanceMatrix,
    labels: &[ClusterLabel],
    k: usize,
) -> Vec<f64> {
    let mut sizes = vec![0usize; k];
    for label in labels {
        sizes[*label] += 1;
    }

    let mut sums = vec![0.0; k];
    labels
        .iter()
        .enumerate()
        .map(|(day, own)| {
            if sizes[*own] <= 1 {
                return 0.0;
            }
            sums.iter_mut().for_each(|sum| *sum = 0.0);
            for (other, distance) in distances.row(day).iter().enumerate() {
                if other != day {
                    sums[labels[other]] += distance;
                }
            }
            let a = sums[*own] / (sizes[*own] - 1) as f64;
            let b = (0..k)
                .filter(|label| *label != *own && sizes[*label] > 0)
                .map(|label| sums[label] / sizes[label] as f64)
                .fold(f64::INFINITY, f64::min);
            if !b.is_finite() {
                return 0.0;
            }
            let scale = a.max(b);
            if scale == 0.0 { 0.0 } else { (b - a) / scale }
        })
        .collect()
}

/// Arithmetic mean of per-day silhouettes (0 for an empty slice).
pub fn mean_silhouette(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_matrix(points: &[f64]) -> DistanceMatrix {
        let n = points.len();
        let values = points
            .iter()
            .flat_map(|a| points.iter().map(move |b| (a - b).abs()))
            .collect();
        DistanceMatrix::from_values(n, values).unwrap()
    }

    #[test]
    fn well_separated_clusters_score_high() {
        let distances = line_matrix(&[0.0, 0.01, 0.02, 100.0, 100.01, 100.02]);
        let samples = silhouette_samples(&distances, &[0, 0, 0, 1, 1, 1], 2);
        assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(mean_silhouette(&samples) > 0.9);
    }

    #[test]
    fn matches_hand_computed_value() {
        // day 0: a = mean(1) = 1, b = mean(4, 5) = 4.5 -> (4.5 - 1) / 4.5
        let distances = line_matrix(&[0.0, 1.0, 4.0, 5.0]);
        let samples = silhouette_samples(&distances, &[0, 0, 1, 1], 2);
        assert!((samples[0] - 3.5 / 4.5).abs() < 1e-12);
    }

    #[test]
    fn singleton_clusters_score_zero() {
        let distances = line_matrix(&[0.0, 1.0, 10.0]);
        let samples = silhouette_samples(&distances, &[0, 0, 1], 2);
        assert_eq!(samples[2], 0.0);
        assert!(samples[0] > 0.0);
    }

    #[test]
    fn misplaced_day_scores_negative() {
        // day 2 sits next to cluster 1 but carries label 0
        let distances = line_matrix(&[0.0, 0.5, 9.5, 10.0, 10.5]);
        let samples = silhouette_samples(&distances, &[0, 0, 0, 1, 1], 2);
        assert!(samples[2] < -0.1);
    }

    #[test]
    fn single_cluster_scores_zero() {
        let distances = line_matrix(&[0.0, 1.0, 2.0]);
        let samples = silhouette_samples(&distances, &[0, 0, 0], 1);
        assert_eq!(samples, vec![0.0, 0.0, 0.0]);
        assert_eq!(mean_silhouette(&[]), 0.0);
    }
}
