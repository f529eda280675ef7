use std::time::Instant;

use tracing::info;

use crate::clustering::{KTrial, select_k};
use crate::config::FamilyConfig;
use crate::data::DayFingerprint;
use crate::distance::DistanceMatrix;
use crate::errors::FamilyError;
use crate::finalize::finalize_registry;
use crate::fingerprint::{trajectory_matrix, validate_population};
use crate::naming::name_families;
use crate::registry::FamilyRegistry;
use crate::standardize::standardize;
use crate::types::FeatureName;

/// Observability side of a run: what was tried and what was chosen.
#[derive(Clone, Debug)]
pub struct ClusteringReport {
    /// Selected cluster count.
    pub k: usize,
    /// Mean silhouette of the selected clustering.
    pub mean_silhouette: f64,
    /// One entry per feasible candidate, ascending by `k`.
    pub trials: Vec<KTrial>,
    /// Candidates skipped because `k >= N`.
    pub skipped_k: Vec<usize>,
    /// Trajectory positions with zero variance across days.
    pub degenerate_trajectory_columns: Vec<usize>,
    /// Feature allowlist the population was validated against.
    pub feature_keys: Vec<FeatureName>,
    /// Days demoted to `TF-00`.
    pub unassigned: usize,
}

/// Registry plus report for one run.
#[derive(Clone, Debug)]
pub struct PipelineOutcome {
    /// Day and medoid families.
    pub registry: FamilyRegistry,
    /// Sweep and input diagnostics.
    pub report: ClusteringReport,
}

/// Validate -> standardize -> DTW -> k sweep -> name -> finalize.
#[derive(Clone, Debug)]
pub struct FamilyPipeline {
    config: FamilyConfig,
}

impl FamilyPipeline {
    /// Validate `config` and build a pipeline.
    pub fn new(config: FamilyConfig) -> Result<Self, FamilyError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration this pipeline runs with.
    pub fn config(&self) -> &FamilyConfig {
        &self.config
    }

    /// Cluster `days` and name the families. Either the whole run succeeds or
    /// no registry is produced.
    pub fn run(&self, days: &[DayFingerprint]) -> Result<PipelineOutcome, FamilyError> {
        let started = Instant::now();
        let shape = validate_population(days, self.config.feature_keys.as_deref())?;
        info!(
            "[families:pipeline] {} days, {} samples per trajectory, k range {}, seed {}",
            shape.days, shape.trajectory_len, self.config.k_range, self.config.seed
        );

        let trajectories = trajectory_matrix(days)?;
        let (sequences, degenerate_trajectory_columns) = if self.config.standardize_trajectories
        {
            let standardized = standardize(&trajectories);
            (standardized.matrix, standardized.degenerate_columns)
        } else {
            (trajectories, Vec::new())
        };

        let distances = DistanceMatrix::from_sequences(&sequences)?;
        let selection = select_k(&distances, self.config.k_range, self.config.seed)?;
        let names = name_families(&selection.assignment, days)?;
        let registry = finalize_registry(
            days,
            &selection.assignment,
            &names,
            &selection.silhouettes,
            selection.mean_silhouette,
            self.config.silhouette_floor,
        )?;

        let unassigned = registry.unassigned().len();
        info!(
            "[families:pipeline] finished in {:.2}s: k={}, {} families, {} unassigned",
            started.elapsed().as_secs_f64(),
            registry.k,
            registry.medoids.len(),
            unassigned
        );

        Ok(PipelineOutcome {
            report: ClusteringReport {
                k: selection.k(),
                mean_silhouette: selection.mean_silhouette,
                trials: selection.trials,
                skipped_k: selection.skipped,
                degenerate_trajectory_columns,
                feature_keys: shape.feature_keys,
                unassigned,
            },
            registry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KRange;
    use crate::constants::fingerprint::FEATURE_COUNT;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn day(index: usize, level: f64) -> DayFingerprint {
        DayFingerprint {
            symbol: "SPY".into(),
            date: NaiveDate::from_ymd_opt(2025, 2, index as u32 + 1).unwrap(),
            trajectory: vec![0.0, level, level + 0.01 * index as f64],
            features: (0..FEATURE_COUNT)
                .map(|i| (format!("f{i:02}"), level + i as f64))
                .collect::<BTreeMap<_, _>>(),
            plot_ref: PathBuf::from(format!("{index}.png")),
        }
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = FamilyConfig {
            k_range: KRange::new(4, 2),
            ..FamilyConfig::default()
        };
        assert!(matches!(
            FamilyPipeline::new(config),
            Err(FamilyError::Configuration(_))
        ));
    }

    #[test]
    fn small_population_runs_end_to_end() {
        let days: Vec<_> = (0..8)
            .map(|i| day(i, if i % 2 == 0 { 0.0 } else { 5.0 }))
            .collect();
        let pipeline = FamilyPipeline::new(FamilyConfig {
            k_range: KRange::new(2, 3),
            ..FamilyConfig::default()
        })
        .unwrap();
        assert_eq!(pipeline.config().k_range, KRange::new(2, 3));
        let outcome = pipeline.run(&days).unwrap();
        assert_eq!(outcome.registry.days.len(), 8);
        assert_eq!(outcome.report.trials.len(), 2);
        assert_eq!(outcome.report.k, outcome.registry.k);
        // the first trajectory position is 0 on every day
        assert_eq!(outcome.report.degenerate_trajectory_columns, vec![0]);
        assert_eq!(outcome.report.feature_keys.len(), FEATURE_COUNT);
    }

    #[test]
    fn too_few_days_for_any_k_fails() {
        let days: Vec<_> = (0..3).map(|i| day(i, i as f64)).collect();
        let pipeline = FamilyPipeline::new(FamilyConfig::default()).unwrap();
        assert!(matches!(
            pipeline.run(&days),
            Err(FamilyError::InfeasibleRange { population: 3, .. })
        ));
    }
}
