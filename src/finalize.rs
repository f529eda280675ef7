use tracing::info;

use crate::clustering::ClusterAssignment;
use crate::data::{DayFingerprint, FamilyId};
use crate::errors::FamilyError;
use crate::naming::FamilyNames;
use crate::registry::{DayFamily, FamilyRegistry, MedoidFamily};

/// Map each day to its family, demoting days whose silhouette is strictly
/// below `silhouette_floor` to `TF-00`.
///
/// `TF-00` is a bucket, not a cluster: it has no medoid and plays no part in
/// distances. Medoids keep naming their family even when demoted themselves.
pub fn finalize_registry(
    days: &[DayFingerprint],
    assignment: &ClusterAssignment,
    names: &FamilyNames,
    silhouettes: &[f64],
    mean_silhouette: f64,
    silhouette_floor: f64,
) -> Result<FamilyRegistry, FamilyError> {
    if assignment.labels.len() != days.len() || silhouettes.len() != days.len() {
        return Err(FamilyError::MatrixShape(format!(
            "finalizer received {} days, {} labels, {} silhouettes",
            days.len(),
            assignment.labels.len(),
            silhouettes.len()
        )));
    }

    let mut entries = Vec::with_capacity(days.len());
    let mut demoted = 0;
    for (index, ((day, label), silhouette)) in days
        .iter()
        .zip(&assignment.labels)
        .zip(silhouettes)
        .enumerate()
    {
        let family = if *silhouette < silhouette_floor {
            demoted += 1;
            FamilyId::UNASSIGNED
        } else {
            names.family_for(*label).ok_or_else(|| {
                FamilyError::MatrixShape(format!(
                    "day {index} carries label {label} which has no family"
                ))
            })?
        };
        entries.push(DayFamily {
            index,
            symbol: day.symbol.clone(),
            date: day.date,
            family,
            silhouette: *silhouette,
        });
    }

    let medoids = names
        .clusters()
        .iter()
        .map(|cluster| MedoidFamily {
            family: cluster.family,
            index: cluster.medoid,
            symbol: cluster.medoid_symbol.clone(),
            date: cluster.medoid_date,
            members: cluster.size,
            digest: cluster.medoid_digest.clone(),
        })
        .collect();

    info!(
        "[families:finalize] {} days across {} families; {} demoted to {}",
        days.len(),
        names.len(),
        demoted,
        FamilyId::UNASSIGNED
    );

    Ok(FamilyRegistry {
        k: assignment.k,
        mean_silhouette,
        days: entries,
        medoids,
    })
}
