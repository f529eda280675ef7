use std::cmp::Ordering;

use chrono::NaiveDate;
use tracing::debug;

use crate::clustering::ClusterAssignment;
use crate::data::{DayFingerprint, FamilyId};
use crate::errors::FamilyError;
use crate::hash::feature_digest;
use crate::types::{ClusterLabel, DayIndex, FeatureDigest, Symbol};

/// One non-empty cluster with its stable family identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedCluster {
    /// Assigned family identifier.
    pub family: FamilyId,
    /// Raw label in the assignment this cluster was named from.
    pub label: ClusterLabel,
    /// Medoid day index.
    pub medoid: DayIndex,
    /// Member count.
    pub size: usize,
    /// Symbol of the medoid day.
    pub medoid_symbol: Symbol,
    /// Date of the medoid day.
    pub medoid_date: NaiveDate,
    /// Content hash of the medoid's feature set.
    pub medoid_digest: FeatureDigest,
}

/// Frozen mapping from raw cluster labels to family identifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FamilyNames {
    by_label: Vec<Option<FamilyId>>,
    clusters: Vec<NamedCluster>,
}

impl FamilyNames {
    /// Family for a raw label; `None` for labels whose cluster ended empty.
    pub fn family_for(&self, label: ClusterLabel) -> Option<FamilyId> {
        self.by_label.get(label).copied().flatten()
    }

    /// Named clusters in family order (`TF-01` first).
    pub fn clusters(&self) -> &[NamedCluster] {
        &self.clusters
    }

    /// Number of named clusters.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// True when no cluster was named.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// Rank the clusters of `assignment` and hand out `TF-01`, `TF-02`, ...
///
/// Order: larger clusters first, then earlier medoid date, then smaller medoid
/// feature digest, then medoid symbol and day index. None of these depend on
/// the raw label numbering, so any relabeling of the same partition gets the
/// same names. Empty clusters are not named.
pub fn name_families(
    assignment: &ClusterAssignment,
    days: &[DayFingerprint],
) -> Result<FamilyNames, FamilyError> {
    if assignment.labels.len() != days.len() {
        return Err(FamilyError::MatrixShape(format!(
            "assignment covers {} days but {} fingerprints were supplied",
            assignment.labels.len(),
            days.len()
        )));
    }
    if assignment.medoids.len() != assignment.k {
        return Err(FamilyError::MatrixShape(format!(
            "assignment has {} medoids for k={}",
            assignment.medoids.len(),
            assignment.k
        )));
    }

    let sizes = assignment.cluster_sizes();
    let mut clusters = Vec::with_capacity(assignment.k);
    for (label, medoid) in assignment.medoids.iter().enumerate() {
        if sizes[label] == 0 {
            debug!(
                "[families:naming] cluster {} has no members and receives no family",
                label
            );
            continue;
        }
        let day = days.get(*medoid).ok_or_else(|| {
            FamilyError::MatrixShape(format!("medoid index {medoid} is out of range"))
        })?;
        clusters.push(NamedCluster {
            family: FamilyId::UNASSIGNED,
            label,
            medoid: *medoid,
            size: sizes[label],
            medoid_symbol: day.symbol.clone(),
            medoid_date: day.date,
            medoid_digest: feature_digest(&day.features),
        });
    }

    clusters.sort_by(canonical_order);

    let mut by_label = vec![None; assignment.k];
    for (rank, cluster) in clusters.iter_mut().enumerate() {
        cluster.family = FamilyId::from_rank(rank as u32 + 1);
        by_label[cluster.label] = Some(cluster.family);
    }

    Ok(FamilyNames { by_label, clusters })
}

fn canonical_order(a: &NamedCluster, b: &NamedCluster) -> Ordering {
    b.size
        .cmp(&a.size)
        .then_with(|| a.medoid_date.cmp(&b.medoid_date))
        .then_with(|| a.medoid_digest.cmp(&b.medoid_digest))
        .then_with(|| a.medoid_symbol.cmp(&b.medoid_symbol))
        .then_with(|| a.medoid.cmp(&b.medoid))
}
