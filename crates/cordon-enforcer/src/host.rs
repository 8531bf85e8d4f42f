use std::collections::HashMap;
use std::fmt;

use cordon_core::ComponentIdentity;

use crate::PACKAGE_NAMESPACE;

/// The identity facts the enforcer needs about a bundle: its numeric runtime
/// id, its (symbolic name, version) identity, and optionally the location
/// string it was installed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRef {
    pub id: u64,
    pub identity: ComponentIdentity,
    pub location: Option<String>,
}

impl BundleRef {
    pub fn new(id: u64, identity: ComponentIdentity) -> Self {
        Self {
            id,
            identity,
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Read-only view of a host requirement.
pub trait Requirement {
    /// The requirement's namespace/kind. Only [`crate::PACKAGE_NAMESPACE`]
    /// requirements are filtered; everything else passes through untouched.
    fn namespace(&self) -> &str;

    /// The bundle that owns the requirement.
    fn bundle(&self) -> &BundleRef;

    /// Human-readable rendering, used in denial diagnostics.
    fn display(&self) -> String;
}

/// Read-only view of a host capability.
pub trait Capability {
    fn namespace(&self) -> &str;

    /// The bundle that owns (exports) the capability.
    fn bundle(&self) -> &BundleRef;

    /// Attribute lookup. A package capability carries its exported package
    /// name under the [`crate::PACKAGE_NAMESPACE`] key.
    fn attribute(&self, key: &str) -> Option<&str>;

    /// Human-readable rendering, used in denial diagnostics.
    fn display(&self) -> String;
}

/// Plain-data [`Requirement`] implementation for hosts (and tests) that do
/// not carry their own requirement objects.
#[derive(Debug, Clone)]
pub struct PackageRequirement {
    pub package: String,
    pub bundle: BundleRef,
}

impl PackageRequirement {
    pub fn new(package: impl Into<String>, bundle: BundleRef) -> Self {
        Self {
            package: package.into(),
            bundle,
        }
    }
}

impl Requirement for PackageRequirement {
    fn namespace(&self) -> &str {
        PACKAGE_NAMESPACE
    }

    fn bundle(&self) -> &BundleRef {
        &self.bundle
    }

    fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PackageRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} requires package {}", self.bundle.identity, self.package)
    }
}

/// Plain-data [`Capability`] implementation, the counterpart of
/// [`PackageRequirement`].
#[derive(Debug, Clone)]
pub struct PackageCapability {
    pub bundle: BundleRef,
    attributes: HashMap<String, String>,
}

impl PackageCapability {
    pub fn new(package: impl Into<String>, bundle: BundleRef) -> Self {
        let mut attributes = HashMap::new();
        attributes.insert(PACKAGE_NAMESPACE.to_string(), package.into());
        Self { bundle, attributes }
    }

    /// A capability without a package attribute; such a capability can only
    /// be retained through one of the unconditional precedence rules.
    pub fn without_package(bundle: BundleRef) -> Self {
        Self {
            bundle,
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl Capability for PackageCapability {
    fn namespace(&self) -> &str {
        PACKAGE_NAMESPACE
    }

    fn bundle(&self) -> &BundleRef {
        &self.bundle
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PackageCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.attribute(PACKAGE_NAMESPACE) {
            Some(package) => write!(f, "{} exports package {}", self.bundle.identity, package),
            None => write!(f, "{} exports (no package attribute)", self.bundle.identity),
        }
    }
}
