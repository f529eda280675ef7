use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::constants::gallery::{DEFAULT_ARTIFACT_EXTENSION, MEDOIDS_DIR};
use crate::data::{DayFingerprint, FamilyId};
use crate::errors::FamilyError;
use crate::fingerprint::check_symbol;
use crate::registry::FamilyRegistry;

/// What an export run copied and what it could not find.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GalleryReport {
    /// Day artifacts copied.
    pub day_copies: usize,
    /// Medoid artifacts copied.
    pub medoid_copies: usize,
    /// Source artifacts that did not exist.
    pub missing: Vec<PathBuf>,
}

/// Copies plot artifacts into the family layout:
/// `<root>/<TF-NN>/<symbol>_<date>.<ext>` per day and
/// `<root>/medoids/<TF-NN>.<ext>` per family medoid.
pub struct GalleryExporter {
    root: PathBuf,
}

impl GalleryExporter {
    /// Create an exporter writing under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Gallery root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Destination of a day's artifact inside `family`'s folder.
    pub fn day_path(&self, family: FamilyId, day: &DayFingerprint) -> PathBuf {
        self.root.join(family.to_string()).join(format!(
            "{}_{}.{}",
            day.symbol,
            day.date,
            artifact_extension(&day.plot_ref)
        ))
    }

    /// Destination of a family's medoid artifact.
    pub fn medoid_path(&self, family: FamilyId, day: &DayFingerprint) -> PathBuf {
        self.root
            .join(MEDOIDS_DIR)
            .join(format!("{family}.{}", artifact_extension(&day.plot_ref)))
    }

    /// Copy every day's artifact and every medoid's artifact. `days` must be the
    /// population the registry was built from, in the same order. Nothing is
    /// copied if any symbol would leave the gallery root.
    pub fn export(
        &self,
        registry: &FamilyRegistry,
        days: &[DayFingerprint],
    ) -> Result<GalleryReport, FamilyError> {
        if registry.days.len() != days.len() {
            return Err(FamilyError::MatrixShape(format!(
                "registry covers {} days but {} fingerprints were supplied",
                registry.days.len(),
                days.len()
            )));
        }
        for day in days {
            check_symbol(day)?;
        }
        let mut report = GalleryReport::default();

        for entry in &registry.days {
            let day = days.get(entry.index).ok_or_else(|| {
                FamilyError::MatrixShape(format!("day index {} is out of range", entry.index))
            })?;
            if copy_artifact(&day.plot_ref, &self.day_path(entry.family, day), &mut report)? {
                report.day_copies += 1;
            }
        }
        for medoid in &registry.medoids {
            let day = days.get(medoid.index).ok_or_else(|| {
                FamilyError::MatrixShape(format!(
                    "medoid index {} is out of range",
                    medoid.index
                ))
            })?;
            if copy_artifact(&day.plot_ref, &self.medoid_path(medoid.family, day), &mut report)? {
                report.medoid_copies += 1;
            }
        }

        info!(
            "[families:gallery] exported {} day artifacts and {} medoid artifacts to {} ({} missing)",
            report.day_copies,
            report.medoid_copies,
            self.root.display(),
            report.missing.len()
        );
        Ok(report)
    }
}

/// Copy `source` to `target`, creating parent folders. A missing source is
/// recorded and skipped; any other I/O failure is returned.
fn copy_artifact(
    source: &Path,
    target: &Path,
    report: &mut GalleryReport,
) -> Result<bool, FamilyError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::copy(source, target) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!(
                "[families:gallery] skipping missing artifact {}",
                source.display()
            );
            if !report.missing.iter().any(|path| path == source) {
                report.missing.push(source.to_path_buf());
            }
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

fn artifact_extension(path: &Path) -> &str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .unwrap_or(DEFAULT_ARTIFACT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{DayFamily, MedoidFamily};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn day(plots: &Path, index: u32, extension: &str) -> DayFingerprint {
        DayFingerprint {
            symbol: "QQQ".into(),
            date: NaiveDate::from_ymd_opt(2025, 8, index + 1).unwrap(),
            trajectory: vec![0.0],
            features: BTreeMap::new(),
            plot_ref: plots.join(format!("plot_{index}.{extension}")),
        }
    }

    fn registry(days: &[DayFingerprint], families: &[FamilyId]) -> FamilyRegistry {
        FamilyRegistry {
            k: 1,
            mean_silhouette: 0.0,
            days: days
                .iter()
                .zip(families)
                .enumerate()
                .map(|(index, (day, family))| DayFamily {
                    index,
                    symbol: day.symbol.clone(),
                    date: day.date,
                    family: *family,
                    silhouette: 0.0,
                })
                .collect(),
            medoids: vec![MedoidFamily {
                family: FamilyId::from_rank(1),
                index: 0,
                symbol: days[0].symbol.clone(),
                date: days[0].date,
                members: 2,
                digest: String::new(),
            }],
        }
    }

    #[test]
    fn copies_days_and_medoids_into_family_folders() {
        let temp = tempdir().unwrap();
        let plots = temp.path().join("plots");
        fs::create_dir_all(&plots).unwrap();
        let days = vec![day(&plots, 0, "png"), day(&plots, 1, "svg"), day(&plots, 2, "png")];
        for day in &days {
            fs::write(&day.plot_ref, day.date.to_string()).unwrap();
        }
        let tf1 = FamilyId::from_rank(1);
        let registry = registry(&days, &[tf1, tf1, FamilyId::UNASSIGNED]);

        let exporter = GalleryExporter::new(temp.path().join("gallery"));
        let report = exporter.export(&registry, &days).unwrap();
        assert_eq!(report.day_copies, 3);
        assert_eq!(report.medoid_copies, 1);
        assert!(report.missing.is_empty());

        let root = exporter.root();
        assert!(root.join("TF-01").join("QQQ_2025-08-01.png").is_file());
        assert!(root.join("TF-01").join("QQQ_2025-08-02.svg").is_file());
        assert!(root.join("TF-00").join("QQQ_2025-08-03.png").is_file());
        let medoid = root.join("medoids").join("TF-01.png");
        assert_eq!(fs::read_to_string(medoid).unwrap(), "2025-08-01");
    }

    #[test]
    fn missing_artifacts_are_reported_not_fatal() {
        let temp = tempdir().unwrap();
        let plots = temp.path().join("plots");
        let days = vec![day(&plots, 0, "png"), day(&plots, 1, "png")];
        let tf1 = FamilyId::from_rank(1);
        let registry = registry(&days, &[tf1, tf1]);

        let report = GalleryExporter::new(temp.path().join("gallery"))
            .export(&registry, &days)
            .unwrap();
        assert_eq!(report.day_copies, 0);
        assert_eq!(report.medoid_copies, 0);
        assert_eq!(report.missing.len(), 2);
    }

    #[test]
    fn extensionless_artifacts_default_to_png() {
        let exporter = GalleryExporter::new("/gallery");
        let mut fingerprint = day(Path::new("/plots"), 0, "png");
        fingerprint.plot_ref = PathBuf::from("/plots/no_extension");
        assert_eq!(
            exporter.medoid_path(FamilyId::from_rank(4), &fingerprint),
            PathBuf::from("/gallery/medoids/TF-04.png")
        );
    }

    #[test]
    fn population_mismatch_fails() {
        let temp = tempdir().unwrap();
        let days = vec![day(temp.path(), 0, "png")];
        let registry = registry(&days, &[FamilyId::from_rank(1)]);
        assert!(
            GalleryExporter::new(temp.path())
                .export(&registry, &[])
                .is_err()
        );
    }

    #[test]
    fn symbols_that_escape_the_root_are_rejected() {
        let temp = tempdir().unwrap();
        let plots = temp.path().join("plots");
        fs::create_dir_all(&plots).unwrap();
        let mut days = vec![day(&plots, 0, "png"), day(&plots, 1, "png")];
        for day in &days {
            fs::write(&day.plot_ref, "plot").unwrap();
        }
        let tf1 = FamilyId::from_rank(1);
        let registry = registry(&days, &[tf1, tf1]);

        for symbol in ["../../escaped", "nested/QQQ", "win\\QQQ", ""] {
            days[1].symbol = symbol.to_string();
            let root = temp.path().join("gallery");
            let result = GalleryExporter::new(&root).export(&registry, &days);
            assert!(
                matches!(result, Err(FamilyError::InvalidSymbol { .. })),
                "{symbol:?} was accepted"
            );
            assert!(!root.exists());
        }
        assert!(!temp.path().join("escaped_2025-08-02.png").exists());
    }
}
