//! Loads a configuration directory and drives the enforcer against it,
//! covering the loader → snapshot → filter → persistence chain.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use cordon_core::{ComponentIdentity, ComponentVersion, RegionId};
use cordon_enforcer::{
    BundleRef, Capability, PackageCapability, PackageRequirement, RegionEnforcer,
};
use cordon_index::{LocationCache, SnapshotHandle};
use cordon_properties::{
    load_location_cache, store_location_cache, RegionConfigLoader, ARTIFACT_FEATURES_FILE,
    FEATURE_REGIONS_FILE, IDENTITY_ARTIFACTS_FILE, LOCATION_CACHE_FILE, REGION_PACKAGES_FILE,
};

fn write_config(dir: &Path, file: &str, text: &str) {
    fs::write(dir.join(file), text).unwrap();
}

/// `exporter` sits in a feature declaring `[internal, global]` where
/// `internal` exports `org.foo.p`; `requester` sits in a feature declaring
/// only `global`.
fn config_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_config(
        dir.path(),
        IDENTITY_ARTIFACTS_FILE,
        "g\\:exporter\\:1=exporter~1.0.0\ng\\:requester\\:1=requester~1.0.0\n",
    );
    write_config(
        dir.path(),
        ARTIFACT_FEATURES_FILE,
        "g\\:exporter\\:1=f.exporter\ng\\:requester\\:1=f.requester\n",
    );
    write_config(
        dir.path(),
        FEATURE_REGIONS_FILE,
        "f.exporter=internal,global\nf.requester=global\n",
    );
    write_config(
        dir.path(),
        REGION_PACKAGES_FILE,
        "internal=org.foo.p\nglobal=a.b.c\n",
    );
    dir
}

fn bundle(id: u64, name: &str) -> BundleRef {
    BundleRef::new(
        id,
        ComponentIdentity::new(name, ComponentVersion::new(1, 0, 0)),
    )
    .with_location(format!("http://{name}"))
}

#[test]
fn loaded_configuration_enforces_region_inheritance() {
    let dir = config_dir();
    let snapshot = RegionConfigLoader::new().load_dir(dir.path()).unwrap();
    let handle = SnapshotHandle::new(snapshot);
    let enforcer = RegionEnforcer::from_handle(&handle, Arc::new(LocationCache::new()));

    // The requester shares only `global`, which inherits `internal`'s
    // exports because `internal` precedes it in the exporter feature.
    let requirement = PackageRequirement::new("org.foo.p", bundle(7, "requester"));
    let mut candidates = vec![PackageCapability::new("org.foo.p", bundle(3, "exporter"))];

    let report = enforcer.filter_matches(&requirement, &mut candidates);
    assert!(report.is_none());
    assert_eq!(candidates.len(), 1);
}

#[test]
fn loaded_configuration_denies_and_reports_unshared_packages() {
    let dir = config_dir();
    // Same tables, but the requester's feature now declares a disjoint region.
    write_config(
        dir.path(),
        FEATURE_REGIONS_FILE,
        "f.exporter=internal,global\nf.requester=island\n",
    );

    let snapshot = RegionConfigLoader::new().load_dir(dir.path()).unwrap();
    let enforcer = RegionEnforcer::new(Arc::new(snapshot), Arc::new(LocationCache::new()));

    let requirement = PackageRequirement::new("org.foo.p", bundle(7, "requester"));
    let mut candidates = vec![PackageCapability::new("org.foo.p", bundle(3, "exporter"))];

    let report = enforcer
        .filter_matches(&requirement, &mut candidates)
        .expect("emptied candidate set produces a report");
    assert!(candidates.is_empty());
    assert_eq!(report.requester_regions, vec![RegionId::from("island")]);
    assert_eq!(
        report.removed[0].satisfying_regions,
        vec![RegionId::from("internal"), RegionId::global()]
    );
}

#[test]
fn location_cache_survives_a_restart() {
    let dir = config_dir();
    let cache_path = dir.path().join(LOCATION_CACHE_FILE);

    let snapshot = RegionConfigLoader::new().load_dir(dir.path()).unwrap();
    let locations = Arc::new(load_location_cache(&cache_path).unwrap());
    assert!(locations.is_empty());

    let enforcer = RegionEnforcer::new(Arc::new(snapshot), locations.clone());
    let requirement = PackageRequirement::new("org.foo.p", bundle(7, "requester"));
    let mut candidates = vec![PackageCapability::new("org.foo.p", bundle(3, "exporter"))];
    enforcer.filter_matches(&requirement, &mut candidates);

    store_location_cache(&cache_path, &locations).unwrap();

    // "Restart": reload from disk and observe the memoized identities.
    let restored = load_location_cache(&cache_path).unwrap();
    assert_eq!(
        restored.lookup("http://exporter"),
        Some(candidates[0].bundle().identity.clone())
    );
    assert_eq!(
        restored.lookup("http://requester"),
        Some(ComponentIdentity::new(
            "requester",
            ComponentVersion::new(1, 0, 0)
        ))
    );
}
