use std::io;

use thiserror::Error;

use crate::data::DayKey;

/// Error type for input-shape, configuration, and persistence failures.
#[derive(Debug, Error)]
pub enum FamilyError {
    /// No fingerprints were supplied.
    #[error("fingerprint population is empty")]
    EmptyPopulation,
    /// A day has an empty trajectory.
    #[error("trajectory for '{day}' has no samples")]
    EmptyTrajectory {
        /// Offending day.
        day: DayKey,
    },
    /// A day's trajectory length differs from the first day's.
    #[error("trajectory for '{day}' has {found} samples, expected {expected}")]
    RaggedTrajectory {
        /// Offending day.
        day: DayKey,
        /// Length of the first day's trajectory.
        expected: usize,
        /// Length of this day's trajectory.
        found: usize,
    },
    /// A day's feature keys differ from the allowlist.
    #[error("feature set for '{day}' does not match the expected keys: {details}")]
    FeatureKeyMismatch {
        /// Offending day.
        day: DayKey,
        /// Missing, extra, or miscounted keys.
        details: String,
    },
    /// A symbol is empty or contains a path separator or `..`.
    #[error("symbol of '{day}' cannot be used in a file name")]
    InvalidSymbol {
        /// Offending day.
        day: DayKey,
    },
    /// A matrix is empty, ragged, or does not match the population.
    #[error("sample matrix shape error: {0}")]
    MatrixShape(String),
    /// A distance matrix is asymmetric, non-finite, negative, or has a non-zero diagonal.
    #[error("distance matrix invariant violated: {0}")]
    DistanceInvariant(String),
    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// `k` is zero or not below the population size.
    #[error("cannot form {k} clusters from {population} days")]
    InfeasibleK {
        /// Requested cluster count.
        k: usize,
        /// Days available.
        population: usize,
    },
    /// No candidate in the k range is feasible.
    #[error("no feasible cluster count in {min}..={max} for {population} days")]
    InfeasibleRange {
        /// Smallest candidate.
        min: usize,
        /// Largest candidate.
        max: usize,
        /// Days available.
        population: usize,
    },
    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// JSON encoding or decoding failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
