use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::FamilyId;
use crate::errors::FamilyError;
use crate::types::{DayIndex, FeatureDigest, Symbol};

/// Final family of one day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayFamily {
    /// Position in the loader's day ordering.
    pub index: DayIndex,
    /// Symbol of the day.
    pub symbol: Symbol,
    /// Date of the day.
    pub date: NaiveDate,
    /// Final family, `TF-00` when demoted.
    pub family: FamilyId,
    /// Silhouette of the day under the selected clustering.
    pub silhouette: f64,
}

/// Exemplar day of a named family.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MedoidFamily {
    /// Family this medoid names.
    pub family: FamilyId,
    /// Day index of the medoid.
    pub index: DayIndex,
    /// Symbol of the medoid day.
    pub symbol: Symbol,
    /// Date of the medoid day.
    pub date: NaiveDate,
    /// Days in the family's cluster before silhouette demotion.
    pub members: usize,
    /// Content hash of the medoid's feature set (naming tie-breaker).
    pub digest: FeatureDigest,
}

/// Per-family rollup of a registry.
#[derive(Clone, Debug, PartialEq)]
pub struct FamilySummary {
    /// Family identifier.
    pub family: FamilyId,
    /// Days carrying this family after demotion.
    pub assigned: usize,
    /// Mean silhouette over the assigned days.
    pub mean_silhouette: f64,
    /// Medoid day index (`None` for `TF-00`).
    pub medoid: Option<DayIndex>,
}

/// Day -> family and medoid -> family mapping produced by one run.
///
/// Written once and never edited; a rerun produces a new registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FamilyRegistry {
    /// Selected cluster count.
    pub k: usize,
    /// Mean silhouette of the selected clustering.
    pub mean_silhouette: f64,
    /// One entry per day, in loader order.
    pub days: Vec<DayFamily>,
    /// One entry per named family, in family order.
    pub medoids: Vec<MedoidFamily>,
}

impl FamilyRegistry {
    /// Family of day `index`.
    pub fn family_of(&self, index: DayIndex) -> Option<FamilyId> {
        self.days.get(index).map(|day| day.family)
    }

    /// Medoid entry naming `family`.
    pub fn medoid_of(&self, family: FamilyId) -> Option<&MedoidFamily> {
        self.medoids.iter().find(|medoid| medoid.family == family)
    }

    /// Days carrying `family`.
    pub fn members(&self, family: FamilyId) -> Vec<&DayFamily> {
        self.days.iter().filter(|day| day.family == family).collect()
    }

    /// Named families in order (excludes `TF-00`).
    pub fn families(&self) -> Vec<FamilyId> {
        self.medoids.iter().map(|medoid| medoid.family).collect()
    }

    /// Days demoted to `TF-00`.
    pub fn unassigned(&self) -> Vec<&DayFamily> {
        self.members(FamilyId::UNASSIGNED)
    }

    /// One summary per named family, followed by `TF-00` when it has members.
    pub fn summaries(&self) -> Vec<FamilySummary> {
        let mut grouped: BTreeMap<FamilyId, Vec<f64>> = BTreeMap::new();
        for day in &self.days {
            grouped.entry(day.family).or_default().push(day.silhouette);
        }
        let summarize = |family: FamilyId, medoid: Option<DayIndex>| {
            let scores = grouped.get(&family).map(Vec::as_slice).unwrap_or(&[]);
            FamilySummary {
                family,
                assigned: scores.len(),
                mean_silhouette: if scores.is_empty() {
                    0.0
                } else {
                    scores.iter().sum::<f64>() / scores.len() as f64
                },
                medoid,
            }
        };
        let mut summaries: Vec<FamilySummary> = self
            .medoids
            .iter()
            .map(|medoid| summarize(medoid.family, Some(medoid.index)))
            .collect();
        if grouped.contains_key(&FamilyId::UNASSIGNED) {
            summaries.push(summarize(FamilyId::UNASSIGNED, None));
        }
        summaries
    }

    /// Registry as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, FamilyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the registry as JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> Result<(), FamilyError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Read a registry written by `write_json`.
    pub fn read_json(path: &Path) -> Result<Self, FamilyError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
