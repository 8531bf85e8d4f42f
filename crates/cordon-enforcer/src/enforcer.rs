use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use cordon_core::{ComponentIdentity, FeatureId, RegionId};
use cordon_index::{IndexSnapshot, LocationCache, Membership, SnapshotHandle};

use crate::host::{BundleRef, Capability, Requirement};
use crate::inherit::expand_inherited;
use crate::{PACKAGE_NAMESPACE, SYSTEM_BUNDLE_ID};

/// Applies the region model to one resolution round.
///
/// The enforcer pins the snapshot generation it was created with, so a
/// reconfiguration that swaps the [`SnapshotHandle`] mid-round never leaks
/// a half-applied configuration into an in-flight filtering pass.
#[derive(Debug, Clone)]
pub struct RegionEnforcer {
    snapshot: Arc<IndexSnapshot>,
    locations: Arc<LocationCache>,
}

/// Diagnostic record produced when filtering empties a candidate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenialReport {
    /// Rendering of the requirement that ended up unresolvable.
    pub requirement: String,
    /// The requester's resolved region set, sorted for stable output.
    pub requester_regions: Vec<RegionId>,
    pub removed: Vec<RemovedCandidate>,
}

/// One removed candidate, with the regions that would have had to be shared
/// with the requester for the candidate to become visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedCandidate {
    pub capability: String,
    pub package: Option<String>,
    /// In feature declaration order: the first region exporting the package
    /// plus every later region with an export list, since later regions
    /// inherit the earlier ones.
    pub satisfying_regions: Vec<RegionId>,
}

enum Decision {
    Visible,
    Hidden {
        regulated: Vec<FeatureId>,
        package: Option<String>,
    },
}

impl RegionEnforcer {
    pub fn new(snapshot: Arc<IndexSnapshot>, locations: Arc<LocationCache>) -> Self {
        Self {
            snapshot,
            locations,
        }
    }

    /// Pins the handle's current snapshot generation for one round.
    pub fn from_handle(handle: &SnapshotHandle, locations: Arc<LocationCache>) -> Self {
        Self::new(handle.current(), locations)
    }

    pub fn snapshot(&self) -> &IndexSnapshot {
        &self.snapshot
    }

    /// Removes the candidates `requirement`'s owning component is not
    /// authorized to see, preserving the relative order of survivors.
    ///
    /// Only package-namespace requirements are filtered; anything else
    /// passes through untouched. The operation is total: "no visible
    /// candidates" is a valid outcome, surfaced as a warning plus the
    /// returned [`DenialReport`], never as an error.
    pub fn filter_matches<R: Requirement, C: Capability>(
        &self,
        requirement: &R,
        candidates: &mut Vec<C>,
    ) -> Option<DenialReport> {
        if requirement.namespace() != PACKAGE_NAMESPACE {
            return None;
        }

        let requester = requirement.bundle();
        self.remember_location(requester);
        let requester_membership = self.snapshot.resolve_membership(&requester.identity);

        // A requester outside the feature model is unrestricted.
        if requester_membership.is_ungoverned() {
            for candidate in candidates.iter() {
                self.remember_location(candidate.bundle());
            }
            return None;
        }

        let mut memo: HashMap<ComponentIdentity, Membership> = HashMap::new();
        let mut removed = Vec::new();
        candidates.retain(|candidate| {
            self.remember_location(candidate.bundle());
            match self.decide(requester, &requester_membership, candidate, &mut memo) {
                Decision::Visible => true,
                Decision::Hidden { regulated, package } => {
                    removed.push(RemovedCandidate {
                        capability: candidate.display(),
                        satisfying_regions: self
                            .satisfying_regions(package.as_deref(), &regulated),
                        package,
                    });
                    false
                }
            }
        });

        if !candidates.is_empty() || removed.is_empty() {
            return None;
        }

        let mut requester_regions: Vec<RegionId> =
            requester_membership.regions.iter().cloned().collect();
        requester_regions.sort();

        let report = DenialReport {
            requirement: requirement.display(),
            requester_regions,
            removed,
        };
        tracing::warn!(
            requirement = %report.requirement,
            requester_regions = ?report.requester_regions,
            removed = ?report.removed,
            "all candidates for a package requirement were outside the requester's regions"
        );
        Some(report)
    }

    /// Per-candidate coverage check; first matching rule retains.
    fn decide<C: Capability>(
        &self,
        requester: &BundleRef,
        requester_membership: &Membership,
        candidate: &C,
        memo: &mut HashMap<ComponentIdentity, Membership>,
    ) -> Decision {
        let owner = candidate.bundle();

        if owner.id == SYSTEM_BUNDLE_ID {
            return Decision::Visible;
        }
        if owner.id == requester.id {
            // A component always sees its own exports.
            return Decision::Visible;
        }

        let membership = memo
            .entry(owner.identity.clone())
            .or_insert_with(|| self.snapshot.resolve_membership(&owner.identity));

        if membership.is_ungoverned() || membership.is_featureless() {
            // Components outside the feature model are unrestricted.
            return Decision::Visible;
        }

        let package = candidate.attribute(PACKAGE_NAMESPACE);
        let mut regulated = Vec::new();
        for feature in &membership.features {
            if requester_membership.features.contains(feature) {
                // Within one feature everything wires to everything else.
                return Decision::Visible;
            }

            let Some(declared) = self.snapshot.regions_for_feature(feature) else {
                // The owning feature declares no regions.
                return Decision::Visible;
            };
            regulated.push(feature.clone());

            // Without a package attribute there is nothing to match against
            // region export lists.
            let Some(package) = package else { continue };

            if self
                .snapshot
                .region_exports_package(&RegionId::global(), package)
            {
                return Decision::Visible;
            }

            let shared: HashSet<RegionId> = requester_membership
                .regions
                .iter()
                .filter(|region| declared.contains(*region))
                .cloned()
                .collect();
            let shared = expand_inherited(declared, &shared);
            if shared
                .iter()
                .any(|region| self.snapshot.region_exports_package(region, package))
            {
                return Decision::Visible;
            }
        }

        Decision::Hidden {
            regulated,
            package: package.map(str::to_string),
        }
    }

    fn satisfying_regions(&self, package: Option<&str>, features: &[FeatureId]) -> Vec<RegionId> {
        let Some(package) = package else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for feature in features {
            for region in self.relevant_regions_for_package(package, feature) {
                if !out.contains(&region) {
                    out.push(region);
                }
            }
        }
        out
    }

    /// Walks a feature's declared order and collects the regions whose
    /// sharing would expose `package`: the first region exporting it, and
    /// every later region carrying an export list (later regions inherit
    /// earlier ones, so the package applies to them too). Regions without an
    /// export list are skipped.
    fn relevant_regions_for_package(&self, package: &str, feature: &FeatureId) -> Vec<RegionId> {
        let Some(declared) = self.snapshot.regions_for_feature(feature) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        let mut found = false;
        for region in declared {
            let Some(packages) = self.snapshot.packages_for_region(region) else {
                continue;
            };
            if found {
                out.push(region.clone());
            } else if packages.contains(package) {
                out.push(region.clone());
                found = true;
            }
        }
        out
    }

    fn remember_location(&self, bundle: &BundleRef) {
        if let Some(location) = &bundle.location {
            self.locations
                .record(location.clone(), bundle.identity.clone());
        }
    }
}
