use std::collections::{HashMap, HashSet};

use cordon_core::{ArtifactId, ComponentIdentity, FeatureId, RegionId};

/// Frozen index tables for one configuration generation.
///
/// All relations are keyed by opaque string ids rather than object
/// references; the host owns true component identity. Fields are private so
/// a snapshot cannot be mutated once built.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexSnapshot {
    /// Identity → artifacts declaring it. Value order is configuration
    /// order; the same artifact may appear more than once.
    bsn_ver: HashMap<ComponentIdentity, Vec<ArtifactId>>,
    bundle_features: HashMap<ArtifactId, HashSet<FeatureId>>,
    /// Feature → declared regions, ordered and duplicate-free. A later
    /// region inherits the export surface of every earlier one.
    feature_regions: HashMap<FeatureId, Vec<RegionId>>,
    region_packages: HashMap<RegionId, HashSet<String>>,
    default_regions: HashSet<RegionId>,
}

impl IndexSnapshot {
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    pub fn artifacts_for(&self, identity: &ComponentIdentity) -> Option<&[ArtifactId]> {
        self.bsn_ver.get(identity).map(Vec::as_slice)
    }

    pub fn features_for_artifact(&self, artifact: &ArtifactId) -> Option<&HashSet<FeatureId>> {
        self.bundle_features.get(artifact)
    }

    pub fn regions_for_feature(&self, feature: &FeatureId) -> Option<&[RegionId]> {
        self.feature_regions.get(feature).map(Vec::as_slice)
    }

    pub fn packages_for_region(&self, region: &RegionId) -> Option<&HashSet<String>> {
        self.region_packages.get(region)
    }

    pub fn region_exports_package(&self, region: &RegionId, package: &str) -> bool {
        self.region_packages
            .get(region)
            .is_some_and(|packages| packages.contains(package))
    }

    pub fn default_regions(&self) -> &HashSet<RegionId> {
        &self.default_regions
    }

    /// Resolves the transitive feature-model membership of a component.
    ///
    /// An identity absent from the identity table yields an empty
    /// [`Membership`]; that is a distinguished "ungoverned" result, not an
    /// error, and callers interpret it as unrestricted. Features without a
    /// region list contribute no regions.
    pub fn resolve_membership(&self, identity: &ComponentIdentity) -> Membership {
        let Some(artifacts) = self.bsn_ver.get(identity) else {
            return Membership::default();
        };

        let mut features = HashSet::new();
        for artifact in artifacts {
            if let Some(owning) = self.bundle_features.get(artifact) {
                features.extend(owning.iter().cloned());
            }
        }

        let mut regions = HashSet::new();
        for feature in &features {
            if let Some(declared) = self.feature_regions.get(feature) {
                regions.extend(declared.iter().cloned());
            }
        }

        Membership {
            artifacts: artifacts.clone(),
            features,
            regions,
        }
    }
}

/// Result of [`IndexSnapshot::resolve_membership`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Membership {
    pub artifacts: Vec<ArtifactId>,
    pub features: HashSet<FeatureId>,
    pub regions: HashSet<RegionId>,
}

impl Membership {
    /// Not declared by any artifact in the model.
    pub fn is_ungoverned(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Declared by artifacts, but none of them belongs to a feature.
    pub fn is_featureless(&self) -> bool {
        self.features.is_empty()
    }

    /// Unions the snapshot's default-region set into this membership.
    ///
    /// The filtering path never applies this; it exists as a separate,
    /// explicitly-invoked fallback so deployments that grant a baseline
    /// region set can opt in without changing the enforcement default.
    pub fn or_default_regions(mut self, snapshot: &IndexSnapshot) -> Self {
        self.regions.extend(snapshot.default_regions.iter().cloned());
        self
    }
}

/// Accumulates index tuples, typically merged from several configuration
/// sources, and freezes them into an [`IndexSnapshot`].
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    snapshot: IndexSnapshot,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `identity` is declared by `artifact`. Repeated calls
    /// append in order; duplicates are kept.
    pub fn add_artifact(&mut self, identity: ComponentIdentity, artifact: ArtifactId) -> &mut Self {
        self.snapshot
            .bsn_ver
            .entry(identity)
            .or_default()
            .push(artifact);
        self
    }

    pub fn add_artifact_feature(&mut self, artifact: ArtifactId, feature: FeatureId) -> &mut Self {
        self.snapshot
            .bundle_features
            .entry(artifact)
            .or_default()
            .insert(feature);
        self
    }

    /// Appends `region` to `feature`'s declared order. A region already in
    /// the list is not added again, so merging the same source twice keeps
    /// the list duplicate-free without reordering it.
    pub fn add_feature_region(&mut self, feature: FeatureId, region: RegionId) -> &mut Self {
        let declared = self.snapshot.feature_regions.entry(feature).or_default();
        if !declared.contains(&region) {
            declared.push(region);
        }
        self
    }

    pub fn add_region_package(&mut self, region: RegionId, package: impl Into<String>) -> &mut Self {
        self.snapshot
            .region_packages
            .entry(region)
            .or_default()
            .insert(package.into());
        self
    }

    pub fn add_default_region(&mut self, region: RegionId) -> &mut Self {
        self.snapshot.default_regions.insert(region);
        self
    }

    /// Moves every package exported to `region` into the global region and
    /// drops `region` as a distinct export target. Supports deployments
    /// that fold legacy regions into the global one.
    pub fn join_region_to_global(&mut self, region: &RegionId) -> &mut Self {
        if let Some(packages) = self.snapshot.region_packages.remove(region) {
            self.snapshot
                .region_packages
                .entry(RegionId::global())
                .or_default()
                .extend(packages);
        }
        self
    }

    pub fn build(self) -> IndexSnapshot {
        self.snapshot
    }
}
