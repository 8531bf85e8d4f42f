//! Configuration loading for the region model.
//!
//! The index tables are delivered as Java-`.properties`-format files, one per
//! table, merged into an immutable [`cordon_index::IndexSnapshot`] before the
//! enforcement core ever sees them. Malformed configuration (unparseable
//! identities, duplicate regions in a feature's declaration) is rejected
//! here; the core assumes well-formed snapshots.
//!
//! This crate also persists the best-effort location cache across restarts,
//! in the same properties format.

mod loader;
mod persist;
mod properties;

pub use loader::{
    ConfigSources, RegionConfigLoader, ARTIFACT_FEATURES_FILE, FEATURE_REGIONS_FILE,
    IDENTITY_ARTIFACTS_FILE, REGION_PACKAGES_FILE,
};
pub use persist::{load_location_cache, store_location_cache, LOCATION_CACHE_FILE};
pub use properties::{parse, write_properties, PropertiesFile, PropertyEntry};

use std::path::PathBuf;

use cordon_core::{FeatureId, RegionId, VersionParseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid component identity `{value}`: expected `symbolic-name~version`")]
    MalformedIdentity { value: String },
    #[error(transparent)]
    Version(#[from] VersionParseError),
    #[error("feature `{feature}` declares region `{region}` more than once")]
    DuplicateRegion { feature: FeatureId, region: RegionId },
}
