use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};

use crate::config::{FamilyConfig, KRange};
use crate::constants::clustering::{DEFAULT_SEED, DEFAULT_SILHOUETTE_FLOOR};
use crate::constants::registry::DEFAULT_REGISTRY_FILENAME;
use crate::fingerprint::read_fingerprints;
use crate::gallery::GalleryExporter;
use crate::heuristics::{estimate_workload, format_u128_with_commas};
use crate::metrics::{family_balance, family_profiles};
use crate::pipeline::{FamilyPipeline, PipelineOutcome};

#[derive(Debug, Parser)]
#[command(
    name = "cluster_days",
    disable_help_subcommand = true,
    about = "Group daily price trajectories into named families",
    long_about = "Compute DTW distances between daily trajectories, sweep k-medoids over a range of cluster counts, pick the best by mean silhouette, and assign stable TF-NN family names.",
    after_help = "Input is a JSON array of day fingerprints (symbol, date, trajectory, features, plot_ref). Set RUST_LOG=info for progress logs."
)]
/// CLI for `cluster_days`.
///
/// Common usage:
/// - Default sweep: `--input days.json`
/// - Fixed k: `--input days.json --k-range 6..6`
/// - Persist and export: `--registry-out out/ --gallery-dir gallery/`
struct ClusterDaysCli {
    #[arg(long, value_name = "PATH", help = "JSON array of day fingerprints")]
    input: PathBuf,
    #[arg(
        long = "k-range",
        value_name = "MIN..MAX",
        value_parser = parse_k_range_arg,
        default_value = "5..15",
        help = "Inclusive range of candidate cluster counts"
    )]
    k_range: KRange,
    #[arg(
        long,
        default_value_t = DEFAULT_SEED,
        help = "Deterministic seed for initial medoid selection"
    )]
    seed: u64,
    #[arg(
        long = "silhouette-floor",
        default_value_t = DEFAULT_SILHOUETTE_FLOOR,
        allow_hyphen_values = true,
        help = "Days scoring below this silhouette are assigned TF-00"
    )]
    silhouette_floor: f64,
    #[arg(
        long = "feature-key",
        value_name = "NAME",
        help = "Feature allowlist entry, repeat for every key (default: first day's keys)"
    )]
    feature_keys: Vec<String>,
    #[arg(
        long = "raw-trajectories",
        help = "Skip column-wise standardization before DTW"
    )]
    raw_trajectories: bool,
    #[arg(
        long = "registry-out",
        value_name = "PATH",
        help = "Write the registry JSON to this file (or family_registry.json inside this directory)"
    )]
    registry_out: Option<PathBuf>,
    #[arg(
        long = "gallery-dir",
        value_name = "DIR",
        help = "Copy plot artifacts into per-family folders under DIR"
    )]
    gallery_dir: Option<PathBuf>,
}

impl ClusterDaysCli {
    fn config(&self) -> FamilyConfig {
        FamilyConfig {
            k_range: self.k_range,
            seed: self.seed,
            silhouette_floor: self.silhouette_floor,
            feature_keys: if self.feature_keys.is_empty() {
                None
            } else {
                Some(self.feature_keys.clone())
            },
            standardize_trajectories: !self.raw_trajectories,
        }
    }
}

/// Parse `cluster_days` arguments, run the pipeline, and print the report.
pub fn run_cluster_days<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<ClusterDaysCli, _>(
        std::iter::once("cluster_days".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let days = read_fingerprints(&cli.input)?;
    let pipeline = FamilyPipeline::new(cli.config())?;

    let config = pipeline.config();
    let steps = days.first().map(|day| day.trajectory.len()).unwrap_or(0);
    let workload = estimate_workload(days.len(), steps, config.k_range);
    println!("=== trajectory families ===");
    println!("input: {}", cli.input.display());
    println!(
        "days: {}, samples per trajectory: {}",
        format_u128_with_commas(days.len() as u128),
        steps
    );
    println!(
        "dtw pairs: {} ({} table cells)",
        format_u128_with_commas(workload.pairs),
        format_u128_with_commas(workload.dtw_cells)
    );
    println!(
        "k range: {} (feasible: {:?}), seed: {}, silhouette floor: {}",
        config.k_range, workload.feasible_k, config.seed, config.silhouette_floor
    );
    if !config.standardize_trajectories {
        println!("trajectories: raw (not standardized)");
    }
    println!();

    let outcome = pipeline.run(&days)?;
    print_outcome(&outcome);

    let profiles = family_profiles(&outcome.registry, &days, &outcome.report.feature_keys)?;
    println!("[PROFILES]");
    for profile in &profiles {
        let strongest: Vec<String> = profile
            .strongest(3)
            .into_iter()
            .map(|(name, z)| format!("{name}={z:+.2}"))
            .collect();
        println!(
            "  {} ({} days): {}",
            profile.family,
            profile.days,
            strongest.join(", ")
        );
    }
    println!();

    if let Some(target) = cli.registry_out {
        let names_dir = target.is_dir()
            || target
                .as_os_str()
                .to_string_lossy()
                .ends_with(std::path::MAIN_SEPARATOR);
        let path = if names_dir {
            target.join(DEFAULT_REGISTRY_FILENAME)
        } else {
            target
        };
        outcome.registry.write_json(&path)?;
        println!("registry written to {}", path.display());
    }

    if let Some(dir) = cli.gallery_dir {
        let report = GalleryExporter::new(dir).export(&outcome.registry, &days)?;
        println!(
            "gallery: {} day artifacts, {} medoid artifacts, {} missing",
            report.day_copies,
            report.medoid_copies,
            report.missing.len()
        );
    }

    Ok(())
}

fn print_outcome(outcome: &PipelineOutcome) {
    let report = &outcome.report;
    println!("[SWEEP]");
    for trial in &report.trials {
        let marker = if trial.k == report.k { "*" } else { " " };
        println!(
            " {marker} k={:<3} mean_silhouette={:+.4} iterations={:<3} converged={}",
            trial.k, trial.mean_silhouette, trial.iterations, trial.converged
        );
    }
    if !report.skipped_k.is_empty() {
        println!("  skipped (k >= days): {:?}", report.skipped_k);
    }
    println!(
        "selected k={} mean_silhouette={:+.4}",
        report.k, report.mean_silhouette
    );
    if !report.degenerate_trajectory_columns.is_empty() {
        println!(
            "zero-variance trajectory positions: {:?}",
            report.degenerate_trajectory_columns
        );
    }
    println!();

    println!("[FAMILIES]");
    for summary in outcome.registry.summaries() {
        let medoid = summary
            .medoid
            .and_then(|index| outcome.registry.days.get(index))
            .map(|day| format!("{}@{}", day.symbol, day.date))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}  days={:<4} mean_silhouette={:+.4} medoid={}",
            summary.family, summary.assigned, summary.mean_silhouette, medoid
        );
    }
    if let Some(balance) = family_balance(&outcome.registry) {
        println!(
            "  balance: min={} max={} ratio={:.2} unassigned={} ({:.1}%)",
            balance.min,
            balance.max,
            balance.ratio,
            balance.unassigned,
            balance.unassigned_share * 100.0
        );
    }
    println!();
}

fn parse_k_range_arg(raw: &str) -> Result<KRange, String> {
    let (min, max) = raw
        .split_once("..=")
        .or_else(|| raw.split_once(".."))
        .unwrap_or((raw, raw));
    let min = min
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid k range start '{}': must be an integer", min.trim()))?;
    let max = max
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid k range end '{}': must be an integer", max.trim()))?;
    if min == 0 {
        return Err("--k-range must start at 1 or above".to_string());
    }
    if min > max {
        return Err(format!("--k-range {min}..{max} is empty"));
    }
    Ok(KRange::new(min, max))
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
