#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Days, NaiveDate};

use trajectory_families::DayFingerprint;

pub const STEPS: usize = 12;
pub const FEATURES: usize = 26;
/// Seed whose initial medoids land on three different shapes at `k = 3`.
pub const SHAPE_SEED: u64 = 3;

/// Slope of the price path for each synthetic shape: flat, rising, falling.
const SLOPES: [f64; 3] = [0.0, 0.5, -0.5];

/// Shape of synthetic day `index` (0 = flat, 1 = rising, 2 = falling).
pub fn shape_of(index: usize) -> usize {
    index % 3
}

pub fn synthetic_day(index: usize, plots: &Path) -> DayFingerprint {
    let shape = shape_of(index);
    let slope = SLOPES[shape];
    let trajectory = (0..STEPS)
        .map(|t| {
            let t = t as f64;
            let wiggle = 0.02 * (1.7 * index as f64 + 0.9 * t + 0.3).sin();
            100.0 + slope * t + wiggle
        })
        .collect();
    let features: BTreeMap<String, f64> = (0..FEATURES)
        .map(|j| {
            (
                format!("f{j:02}"),
                shape as f64 * 0.1 + j as f64 * 0.01 + index as f64 * 0.001,
            )
        })
        .collect();
    let date = NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .checked_add_days(Days::new(index as u64))
        .unwrap();
    DayFingerprint {
        symbol: "SPY".into(),
        date,
        trajectory,
        features,
        plot_ref: plots.join(format!("SPY_{date}.png")),
    }
}

/// Thirty days cycling through three well-separated shapes.
pub fn synthetic_population(plots: &Path) -> Vec<DayFingerprint> {
    (0..30).map(|index| synthetic_day(index, plots)).collect()
}
