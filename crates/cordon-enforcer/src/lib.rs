//! Region-compartmentalized visibility enforcement.
//!
//! The host's resolution engine assembles candidate capabilities for each
//! package requirement; [`RegionEnforcer::filter_matches`] removes the
//! candidates the requesting component is not authorized to see under the
//! feature/region model held by an [`cordon_index::IndexSnapshot`]. The
//! enforcer never decides whether a requirement should exist or how
//! surviving providers are ranked; it only narrows the candidate set.
//!
//! Host capability/requirement objects are consumed through the narrow
//! [`Requirement`] and [`Capability`] traits rather than a re-implementation
//! of the host's object model.

mod enforcer;
mod host;
mod inherit;

pub use enforcer::{DenialReport, RegionEnforcer, RemovedCandidate};
pub use host::{BundleRef, Capability, PackageCapability, PackageRequirement, Requirement};
pub use inherit::expand_inherited;

/// Namespace of package-type requirements and capabilities, and the
/// well-known attribute key under which a capability carries its exported
/// package name.
pub const PACKAGE_NAMESPACE: &str = "cordon.wiring.package";

/// Bundle id reserved for the platform's bootstrap (system) bundle, whose
/// capabilities are visible to every requester.
pub const SYSTEM_BUNDLE_ID: u64 = 0;
