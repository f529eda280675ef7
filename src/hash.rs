use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::types::{FeatureDigest, FeatureName};

/// Hex SHA-256 of whatever `f` feeds the hasher.
pub fn stable_digest_with(f: impl FnOnce(&mut Sha256)) -> FeatureDigest {
    let mut hasher = Sha256::new();
    f(&mut hasher);
    hex::encode(hasher.finalize())
}

/// Content fingerprint of a feature set.
///
/// Pairs are rendered as `name=value\n` in key order, with values in Rust's
/// shortest round-trip float form, so equal maps always hash equal.
pub fn feature_digest(features: &BTreeMap<FeatureName, f64>) -> FeatureDigest {
    stable_digest_with(|hasher| {
        for (name, value) in features {
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(format!("{value:?}").as_bytes());
            hasher.update(b"\n");
        }
    })
}
