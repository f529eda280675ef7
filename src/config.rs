use std::collections::BTreeSet;
use std::fmt;

use crate::constants::clustering::{
    DEFAULT_K_MAX, DEFAULT_K_MIN, DEFAULT_SEED, DEFAULT_SILHOUETTE_FLOOR,
};
use crate::constants::fingerprint::FEATURE_COUNT;
use crate::errors::FamilyError;
use crate::types::FeatureName;

/// Inclusive range of candidate cluster counts swept during model selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KRange {
    /// Smallest candidate `k` (inclusive).
    pub min: usize,
    /// Largest candidate `k` (inclusive).
    pub max: usize,
}

impl KRange {
    /// Build an inclusive range `min..=max`.
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Range containing exactly one candidate.
    pub const fn exactly(k: usize) -> Self {
        Self { min: k, max: k }
    }

    /// True when `min > max`.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Candidate values in ascending order.
    pub fn candidates(&self) -> impl Iterator<Item = usize> {
        self.min..=self.max
    }
}

impl Default for KRange {
    fn default() -> Self {
        Self::new(DEFAULT_K_MIN, DEFAULT_K_MAX)
    }
}

impl fmt::Display for KRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

/// Top-level clustering run configuration.
#[derive(Clone, Debug)]
pub struct FamilyConfig {
    /// Candidate cluster counts; the best by mean silhouette wins.
    pub k_range: KRange,
    /// Seed threaded into initial medoid selection. Same seed, same registry.
    pub seed: u64,
    /// Days with a silhouette strictly below this value are assigned `TF-00`.
    pub silhouette_floor: f64,
    /// Explicit feature allowlist; `None` derives it from the first fingerprint.
    pub feature_keys: Option<Vec<FeatureName>>,
    /// Z-score trajectory columns before DTW (raw samples are used when false).
    pub standardize_trajectories: bool,
}

impl Default for FamilyConfig {
    fn default() -> Self {
        Self {
            k_range: KRange::default(),
            seed: DEFAULT_SEED,
            silhouette_floor: DEFAULT_SILHOUETTE_FLOOR,
            feature_keys: None,
            standardize_trajectories: true,
        }
    }
}

impl FamilyConfig {
    /// Reject configurations that can never produce a registry.
    pub fn validate(&self) -> Result<(), FamilyError> {
        if self.k_range.is_empty() {
            return Err(FamilyError::Configuration(format!(
                "k range {} is empty",
                self.k_range
            )));
        }
        if self.k_range.min == 0 {
            return Err(FamilyError::Configuration(
                "k range must start at 1 or above".to_string(),
            ));
        }
        if !self.silhouette_floor.is_finite() {
            return Err(FamilyError::Configuration(format!(
                "silhouette floor must be finite, got {}",
                self.silhouette_floor
            )));
        }
        if let Some(keys) = &self.feature_keys {
            let unique: BTreeSet<&FeatureName> = keys.iter().collect();
            if unique.len() != keys.len() {
                return Err(FamilyError::Configuration(
                    "feature key allowlist contains duplicates".to_string(),
                ));
            }
            if keys.len() != FEATURE_COUNT {
                return Err(FamilyError::Configuration(format!(
                    "feature key allowlist must name exactly {FEATURE_COUNT} keys, got {}",
                    keys.len()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FamilyConfig::default();
        assert_eq!(config.k_range, KRange::new(5, 15));
        assert_eq!(config.seed, 42);
        assert!((config.silhouette_floor + 0.1).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_and_zero_ranges_are_rejected() {
        let config = FamilyConfig {
            k_range: KRange::new(6, 5),
            ..FamilyConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FamilyError::Configuration(_))
        ));

        let config = FamilyConfig {
            k_range: KRange::new(0, 3),
            ..FamilyConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FamilyError::Configuration(_))
        ));
    }

    #[test]
    fn allowlist_must_name_every_feature_once() {
        let short = FamilyConfig {
            feature_keys: Some(vec!["a".to_string(), "b".to_string()]),
            ..FamilyConfig::default()
        };
        assert!(short.validate().is_err());

        let mut keys: Vec<String> = (0..FEATURE_COUNT).map(|i| format!("f{i:02}")).collect();
        let exact = FamilyConfig {
            feature_keys: Some(keys.clone()),
            ..FamilyConfig::default()
        };
        assert!(exact.validate().is_ok());

        keys[1] = keys[0].clone();
        let duplicated = FamilyConfig {
            feature_keys: Some(keys),
            ..FamilyConfig::default()
        };
        assert!(duplicated.validate().is_err());
    }

    #[test]
    fn k_range_candidates_ascend() {
        let range = KRange::new(3, 6);
        assert_eq!(range.candidates().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
        assert_eq!(KRange::exactly(4).candidates().count(), 1);
        assert_eq!(range.to_string(), "3..=6");
    }
}
