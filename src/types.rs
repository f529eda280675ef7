/// Ticker or instrument symbol a trajectory belongs to.
/// Examples: `SPY`, `QQQ`
pub type Symbol = String;
/// Name of one scalar feature in a day's static summary.
/// Examples: `open_gap_pct`, `range_atr_ratio`, `vwap_cross_count`
pub type FeatureName = String;
/// Hex-encoded SHA-256 digest over a canonicalized feature set.
/// Example: `3f5a9c...e01b` (64 lowercase hex characters)
pub type FeatureDigest = String;
/// Raw cluster label produced by one k-medoids run (run-dependent, not stable).
/// Examples: `0`, `4`
pub type ClusterLabel = usize;
/// Position of a day in the loader's ordering.
/// Examples: `0`, `29`
pub type DayIndex = usize;
