use crate::config::KRange;

/// Rough cost of one clustering run, for reporting before the work starts.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkloadEstimate {
    /// Unordered day pairs, `N(N-1)/2`.
    pub pairs: u128,
    /// DTW table cells filled across all pairs, `pairs * steps^2`.
    pub dtw_cells: u128,
    /// Candidate `k` values that will actually be tried (`1 <= k < N`).
    pub feasible_k: Vec<usize>,
}

/// Estimate the work of clustering `population` days of `steps` samples over `k_range`.
pub fn estimate_workload(population: usize, steps: usize, k_range: KRange) -> WorkloadEstimate {
    let n = population as u128;
    let pairs = n.saturating_mul(n.saturating_sub(1)) / 2;
    let cells_per_pair = (steps as u128).saturating_mul(steps as u128);
    WorkloadEstimate {
        pairs,
        dtw_cells: pairs.saturating_mul(cells_per_pair),
        feasible_k: k_range
            .candidates()
            .filter(|k| *k >= 1 && *k < population)
            .collect(),
    }
}

/// Render `value` with thousands separators.
pub fn format_u128_with_commas(value: u128) -> String {
    let raw = value.to_string();
    let mut grouped_reversed = String::with_capacity(raw.len() + (raw.len() / 3));
    for (idx, ch) in raw.chars().rev().enumerate() {
        if idx > 0 && idx % 3 == 0 {
            grouped_reversed.push(',');
        }
        grouped_reversed.push(ch);
    }
    grouped_reversed.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workload_counts_pairs_and_cells() {
        let estimate = estimate_workload(30, 12, KRange::new(5, 15));
        assert_eq!(estimate.pairs, 435);
        assert_eq!(estimate.dtw_cells, 435 * 144);
        assert_eq!(estimate.feasible_k.len(), 11);
    }

    #[test]
    fn workload_drops_infeasible_k() {
        let estimate = estimate_workload(6, 4, KRange::new(3, 9));
        assert_eq!(estimate.feasible_k, vec![3, 4, 5]);
        assert_eq!(estimate_workload(0, 4, KRange::default()), WorkloadEstimate::default());
    }

    #[test]
    fn formatting_helpers_are_stable() {
        assert_eq!(format_u128_with_commas(0), "0");
        assert_eq!(format_u128_with_commas(999), "999");
        assert_eq!(format_u128_with_commas(1_234_567), "1,234,567");
    }
}
