#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runners shared by the demo binaries.
pub mod apps;
/// k-medoids clustering, silhouettes, and model selection.
pub mod clustering;
/// Clustering run configuration.
pub mod config;
/// Centralized constants for family ids, clustering defaults, and export layout.
pub mod constants;
/// Day fingerprints and family identifiers.
pub mod data;
/// Dynamic time warping and the pairwise distance matrix.
pub mod distance;
mod errors;
/// Registry assembly and the silhouette floor.
pub mod finalize;
/// Fingerprint intake and population validation.
pub mod fingerprint;
/// Family-folder export of plot artifacts.
pub mod gallery;
mod hash;
/// Workload estimation helpers.
pub mod heuristics;
/// Dense row-major sample matrices.
pub mod matrix;
/// Family balance and feature profiles.
pub mod metrics;
/// Deterministic `TF-NN` naming of clusters.
pub mod naming;
/// End-to-end clustering pipeline.
pub mod pipeline;
/// Persisted day-to-family registry.
pub mod registry;
mod rng;
/// Column-wise z-scoring.
pub mod standardize;
/// Shared type aliases.
pub mod types;

pub use clustering::{ClusterAssignment, KTrial, ModelSelection, k_medoids, select_k};
pub use config::{FamilyConfig, KRange};
pub use data::{DayFingerprint, DayKey, FamilyId};
pub use distance::{DistanceMatrix, dtw};
pub use errors::FamilyError;
pub use finalize::finalize_registry;
pub use fingerprint::read_fingerprints;
pub use gallery::{GalleryExporter, GalleryReport};
pub use matrix::SampleMatrix;
pub use naming::{FamilyNames, NamedCluster, name_families};
pub use pipeline::{ClusteringReport, FamilyPipeline, PipelineOutcome};
pub use registry::{DayFamily, FamilyRegistry, FamilySummary, MedoidFamily};
pub use standardize::{Standardized, standardize};
pub use types::{ClusterLabel, DayIndex, FeatureDigest, FeatureName, Symbol};
