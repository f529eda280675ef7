//! Validation of the per-day fingerprint population and conversion into
//! sample matrices.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::constants::fingerprint::FEATURE_COUNT;
use crate::data::DayFingerprint;
use crate::errors::FamilyError;
use crate::matrix::SampleMatrix;
use crate::types::FeatureName;

/// Facts established about a population that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PopulationShape {
    /// Number of days.
    pub days: usize,
    /// Shared trajectory length.
    pub trajectory_len: usize,
    /// Sorted feature allowlist every day matched.
    pub feature_keys: Vec<FeatureName>,
}

/// Feature allowlist: the explicit keys (sorted) or the first day's keys.
pub fn resolve_feature_keys(
    days: &[DayFingerprint],
    explicit: Option<&[FeatureName]>,
) -> Result<Vec<FeatureName>, FamilyError> {
    let first = days.first().ok_or(FamilyError::EmptyPopulation)?;
    let Some(explicit) = explicit else {
        let keys: Vec<FeatureName> = first.features.keys().cloned().collect();
        if keys.len() != FEATURE_COUNT {
            return Err(FamilyError::FeatureKeyMismatch {
                day: first.key(),
                details: format!("expected {FEATURE_COUNT} features, found {}", keys.len()),
            });
        }
        return Ok(keys);
    };
    let mut keys = explicit.to_vec();
    keys.sort();
    keys.dedup();
    if keys.len() != FEATURE_COUNT {
        return Err(FamilyError::Configuration(format!(
            "feature allowlist must hold exactly {FEATURE_COUNT} distinct keys, got {}",
            keys.len()
        )));
    }
    Ok(keys)
}

/// Enforce the input contract: non-empty population, equal-length finite
/// trajectories, and the same 26-key feature set on every day.
pub fn validate_population(
    days: &[DayFingerprint],
    explicit_keys: Option<&[FeatureName]>,
) -> Result<PopulationShape, FamilyError> {
    let first = days.first().ok_or(FamilyError::EmptyPopulation)?;
    let trajectory_len = first.trajectory.len();
    let feature_keys = resolve_feature_keys(days, explicit_keys)?;

    for day in days {
        check_symbol(day)?;
        if day.trajectory.is_empty() {
            return Err(FamilyError::EmptyTrajectory { day: day.key() });
        }
        if day.trajectory.len() != trajectory_len {
            return Err(FamilyError::RaggedTrajectory {
                day: day.key(),
                expected: trajectory_len,
                found: day.trajectory.len(),
            });
        }
        if let Some(pos) = day.trajectory.iter().position(|v| !v.is_finite()) {
            return Err(FamilyError::MatrixShape(format!(
                "trajectory for '{}' has a non-finite sample at position {pos}",
                day.key()
            )));
        }
        if !day.features.keys().eq(feature_keys.iter()) {
            let missing: Vec<&str> = feature_keys
                .iter()
                .filter(|key| !day.features.contains_key(*key))
                .map(String::as_str)
                .collect();
            let unexpected: Vec<&str> = day
                .features
                .keys()
                .filter(|key| feature_keys.binary_search(key).is_err())
                .map(String::as_str)
                .collect();
            return Err(FamilyError::FeatureKeyMismatch {
                day: day.key(),
                details: format!("missing {missing:?}, unexpected {unexpected:?}"),
            });
        }
    }

    Ok(PopulationShape {
        days: days.len(),
        trajectory_len,
        feature_keys,
    })
}

/// Symbols end up in artifact file names, so they may not be empty or carry
/// path separators or `..`.
pub fn check_symbol(day: &DayFingerprint) -> Result<(), FamilyError> {
    let symbol = day.symbol.as_str();
    if symbol.is_empty() || symbol.contains(['/', '\\']) || symbol.contains("..") {
        return Err(FamilyError::InvalidSymbol { day: day.key() });
    }
    Ok(())
}

/// Trajectories as rows, in loader order.
pub fn trajectory_matrix(days: &[DayFingerprint]) -> Result<SampleMatrix, FamilyError> {
    SampleMatrix::from_rows(days.iter().map(|day| day.trajectory.clone()).collect())
}

/// Feature vectors as rows, columns in `keys` order.
pub fn feature_matrix(
    days: &[DayFingerprint],
    keys: &[FeatureName],
) -> Result<SampleMatrix, FamilyError> {
    let rows = days
        .iter()
        .map(|day| {
            keys.iter()
                .map(|key| {
                    day.features.get(key).copied().ok_or_else(|| {
                        FamilyError::FeatureKeyMismatch {
                            day: day.key(),
                            details: format!("missing {key:?}"),
                        }
                    })
                })
                .collect::<Result<Vec<f64>, FamilyError>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    SampleMatrix::from_rows(rows)
}

/// Read a JSON array of fingerprints.
pub fn read_fingerprints(path: &Path) -> Result<Vec<DayFingerprint>, FamilyError> {
    let raw = fs::read_to_string(path)?;
    let days: Vec<DayFingerprint> = serde_json::from_str(&raw)?;
    info!(
        "[families:fingerprint] loaded {} fingerprints from {}",
        days.len(),
        path.display()
    );
    Ok(days)
}
