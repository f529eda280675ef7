use std::collections::BTreeMap;

use crate::data::{DayFingerprint, FamilyId};
use crate::errors::FamilyError;
use crate::fingerprint::feature_matrix;
use crate::registry::FamilyRegistry;
use crate::standardize::standardize;
use crate::types::FeatureName;

/// Aggregate balance metrics for per-family day counts.
#[derive(Clone, Debug, PartialEq)]
pub struct FamilyBalance {
    /// Days in the registry.
    pub total: usize,
    /// Named families (excludes `TF-00`).
    pub families: usize,
    /// Smallest named family.
    pub min: usize,
    /// Largest named family.
    pub max: usize,
    /// Mean named-family size.
    pub mean: f64,
    /// Largest family's share of all days.
    pub max_share: f64,
    /// Smallest family's share of all days.
    pub min_share: f64,
    /// `max / min` (infinite when a family is empty).
    pub ratio: f64,
    /// Days in `TF-00`.
    pub unassigned: usize,
    /// Share of days in `TF-00`.
    pub unassigned_share: f64,
    /// Per-family counts, largest first.
    pub per_family: Vec<FamilyShare>,
}

/// Per-family share of the population.
#[derive(Clone, Debug, PartialEq)]
pub struct FamilyShare {
    /// Family identifier.
    pub family: FamilyId,
    /// Days carrying this family.
    pub count: usize,
    /// Share of all days.
    pub share: f64,
}

/// Compute balance metrics over the named families of `registry`.
/// Returns `None` when the registry names no families.
pub fn family_balance(registry: &FamilyRegistry) -> Option<FamilyBalance> {
    let mut counts: BTreeMap<FamilyId, usize> = registry
        .families()
        .into_iter()
        .map(|family| (family, 0))
        .collect();
    if counts.is_empty() {
        return None;
    }
    let mut unassigned = 0;
    for day in &registry.days {
        if day.family.is_unassigned() {
            unassigned += 1;
        } else if let Some(count) = counts.get_mut(&day.family) {
            *count += 1;
        }
    }

    let total = registry.days.len();
    let share_of = |count: usize| {
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64
        }
    };
    let families = counts.len();
    let min = counts.values().copied().min().unwrap_or(0);
    let max = counts.values().copied().max().unwrap_or(0);
    let assigned: usize = counts.values().sum();
    let ratio = if min == 0 {
        f64::INFINITY
    } else {
        max as f64 / min as f64
    };
    let mut per_family: Vec<FamilyShare> = counts
        .iter()
        .map(|(family, count)| FamilyShare {
            family: *family,
            count: *count,
            share: share_of(*count),
        })
        .collect();
    per_family.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.family.cmp(&b.family)));
    Some(FamilyBalance {
        total,
        families,
        min,
        max,
        mean: assigned as f64 / families as f64,
        max_share: share_of(max),
        min_share: share_of(min),
        ratio,
        unassigned,
        unassigned_share: share_of(unassigned),
        per_family,
    })
}

/// Mean z-scored feature vector of one family.
#[derive(Clone, Debug, PartialEq)]
pub struct FamilyProfile {
    /// Family identifier.
    pub family: FamilyId,
    /// Days carrying this family.
    pub days: usize,
    /// `(feature, mean z-score)` in allowlist order.
    pub features: Vec<(FeatureName, f64)>,
}

impl FamilyProfile {
    /// Features with the largest absolute mean z-score, strongest first.
    pub fn strongest(&self, count: usize) -> Vec<&(FeatureName, f64)> {
        let mut ranked: Vec<&(FeatureName, f64)> = self.features.iter().collect();
        ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(count);
        ranked
    }
}

/// Standardize the feature vectors of `days` and average them per family
/// (including `TF-00` when populated), ordered by family id.
pub fn family_profiles(
    registry: &FamilyRegistry,
    days: &[DayFingerprint],
    keys: &[FeatureName],
) -> Result<Vec<FamilyProfile>, FamilyError> {
    if registry.days.len() != days.len() {
        return Err(FamilyError::MatrixShape(format!(
            "registry covers {} days but {} fingerprints were supplied",
            registry.days.len(),
            days.len()
        )));
    }
    let standardized = standardize(&feature_matrix(days, keys)?).matrix;
    let mut sums: BTreeMap<FamilyId, (usize, Vec<f64>)> = BTreeMap::new();
    for entry in &registry.days {
        let (count, totals) = sums
            .entry(entry.family)
            .or_insert_with(|| (0, vec![0.0; keys.len()]));
        *count += 1;
        for (total, value) in totals.iter_mut().zip(standardized.row(entry.index)) {
            *total += value;
        }
    }
    Ok(sums
        .into_iter()
        .map(|(family, (count, totals))| FamilyProfile {
            family,
            days: count,
            features: keys
                .iter()
                .cloned()
                .zip(totals.into_iter().map(|total| total / count as f64))
                .collect(),
        })
        .collect())
}
