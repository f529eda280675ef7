/// Constants used by family identifiers and the unassigned bucket.
pub mod family {
    /// Prefix shared by every rendered family identifier (for example `TF-07`).
    pub const FAMILY_ID_PREFIX: &str = "TF-";
    /// Minimum digit count of the numeric part of a family identifier.
    pub const FAMILY_ID_WIDTH: usize = 2;
    /// Numeric part reserved for the unassigned/noise bucket (`TF-00`).
    pub const UNASSIGNED_NUMBER: u32 = 0;
}

/// Constants used by the clustering engine and model-order selection.
pub mod clustering {
    /// Smallest candidate cluster count swept by default.
    pub const DEFAULT_K_MIN: usize = 5;
    /// Largest candidate cluster count swept by default.
    pub const DEFAULT_K_MAX: usize = 15;
    /// Default run seed for initial medoid selection.
    pub const DEFAULT_SEED: u64 = 42;
    /// Days whose silhouette falls below this value are demoted to `TF-00`.
    pub const DEFAULT_SILHOUETTE_FLOOR: f64 = -0.1;
    /// PAM sweeps are capped at `ITERATION_BOUND_FACTOR * N`.
    pub const ITERATION_BOUND_FACTOR: usize = 2;
}

/// Constants describing the fingerprint input contract.
pub mod fingerprint {
    /// Number of named scalar features every day must carry.
    pub const FEATURE_COUNT: usize = 26;
}

/// Constants used by the gallery exporter layout.
pub mod gallery {
    /// Directory (under the gallery root) receiving one artifact per medoid.
    pub const MEDOIDS_DIR: &str = "medoids";
    /// Extension used when a day's artifact path carries none.
    pub const DEFAULT_ARTIFACT_EXTENSION: &str = "png";
}

/// Constants used by registry persistence.
pub mod registry {
    /// Default filename for a serialized family registry.
    pub const DEFAULT_REGISTRY_FILENAME: &str = "family_registry.json";
}
