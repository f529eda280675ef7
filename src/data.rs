use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::family::{FAMILY_ID_PREFIX, FAMILY_ID_WIDTH, UNASSIGNED_NUMBER};

pub use crate::types::{FeatureName, Symbol};

/// Identity of one trading day: `(symbol, date)`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayKey {
    /// Instrument the day belongs to.
    pub symbol: Symbol,
    /// Calendar date of the session.
    pub date: NaiveDate,
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.date)
    }
}

/// Per-day fingerprint supplied by the upstream loader.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DayFingerprint {
    /// Instrument the day belongs to.
    pub symbol: Symbol,
    /// Calendar date of the session.
    pub date: NaiveDate,
    /// Fixed-length ordered price-path samples for the day.
    pub trajectory: Vec<f64>,
    /// Named scalar features; keys iterate in sorted order.
    pub features: BTreeMap<FeatureName, f64>,
    /// Opaque reference to the day's plot artifact.
    pub plot_ref: PathBuf,
}

impl DayFingerprint {
    /// `(symbol, date)` identity of this day.
    pub fn key(&self) -> DayKey {
        DayKey {
            symbol: self.symbol.clone(),
            date: self.date,
        }
    }
}

/// Stable family identifier (`TF-01`, `TF-02`, ..., `TF-00` for unassigned days).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FamilyId(u32);

impl FamilyId {
    /// Sentinel bucket for poorly separated days.
    pub const UNASSIGNED: FamilyId = FamilyId(UNASSIGNED_NUMBER);

    /// Family for the cluster at 1-based `rank` in canonical order.
    pub fn from_rank(rank: u32) -> Self {
        FamilyId(rank)
    }

    /// True for the `TF-00` bucket.
    pub fn is_unassigned(&self) -> bool {
        *self == Self::UNASSIGNED
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{FAMILY_ID_PREFIX}{:0width$}",
            self.0,
            width = FAMILY_ID_WIDTH
        )
    }
}

impl FromStr for FamilyId {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let digits = raw
            .strip_prefix(FAMILY_ID_PREFIX)
            .ok_or_else(|| format!("family id '{raw}' must start with '{FAMILY_ID_PREFIX}'"))?;
        if digits.len() < FAMILY_ID_WIDTH || !digits.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(format!(
                "family id '{raw}' must end with at least {FAMILY_ID_WIDTH} digits"
            ));
        }
        digits
            .parse::<u32>()
            .map(FamilyId)
            .map_err(|err| format!("family id '{raw}' is out of range: {err}"))
    }
}

impl Serialize for FamilyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FamilyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
