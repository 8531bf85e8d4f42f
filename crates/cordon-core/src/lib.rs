//! Core shared identity types for Cordon.
//!
//! This crate is intentionally small and dependency-free.

use std::fmt;
use std::str::FromStr;

/// Name of the region whose exported packages are visible to every
/// requester, regardless of region sharing.
pub const GLOBAL_REGION: &str = "global";

/// A runtime version in `major.minor.micro[.qualifier]` form.
///
/// Trailing segments may be omitted in textual form and default to zero
/// (`2.7` parses as `2.7.0`). The qualifier is an opaque suffix and takes
/// part in equality but not in any numeric comparison Cordon performs.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct ComponentVersion {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
    pub qualifier: String,
}

impl ComponentVersion {
    pub fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
            qualifier: String::new(),
        }
    }

    pub fn with_qualifier(major: u32, minor: u32, micro: u32, qualifier: impl Into<String>) -> Self {
        Self {
            major,
            minor,
            micro,
            qualifier: qualifier.into(),
        }
    }
}

impl fmt::Display for ComponentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}

/// Error produced when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionParseError {
    input: String,
}

impl VersionParseError {
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for VersionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid version `{}`", self.input)
    }
}

impl std::error::Error for VersionParseError {}

impl FromStr for ComponentVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VersionParseError {
            input: s.to_string(),
        };

        if s.is_empty() {
            return Err(err());
        }

        let mut numeric = [0u32; 3];
        let mut qualifier = String::new();
        for (i, part) in s.splitn(4, '.').enumerate() {
            if i < 3 {
                numeric[i] = part.parse().map_err(|_| err())?;
            } else {
                // Everything after the third dot is the qualifier, verbatim.
                qualifier = part.to_string();
            }
        }

        Ok(Self {
            major: numeric[0],
            minor: numeric[1],
            micro: numeric[2],
            qualifier,
        })
    }
}

/// The stable (symbolic name, version) identity of a deployable component.
///
/// Equality and hashing are value-based on both fields; this is the key type
/// of the identity → artifacts index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentIdentity {
    pub symbolic_name: String,
    pub version: ComponentVersion,
}

impl ComponentIdentity {
    pub fn new(symbolic_name: impl Into<String>, version: ComponentVersion) -> Self {
        Self {
            symbolic_name: symbolic_name.into(),
            version,
        }
    }
}

impl fmt::Display for ComponentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.symbolic_name, self.version)
    }
}

macro_rules! opaque_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

opaque_id! {
    /// Identifies a specific packaged artifact. Finer-grained than
    /// [`ComponentIdentity`]: several artifacts may declare the same
    /// symbolic name and version.
    ArtifactId
}

opaque_id! {
    /// Identifies a feature, the deployment unit that groups artifacts and
    /// is the thing regions are assigned to.
    FeatureId
}

opaque_id! {
    /// Names a visibility compartment. Features declare an ordered list of
    /// regions; later regions inherit the export surface of earlier ones.
    RegionId
}

impl RegionId {
    pub fn global() -> Self {
        Self::new(GLOBAL_REGION)
    }

    pub fn is_global(&self) -> bool {
        self.0 == GLOBAL_REGION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_parses_partial_segments() {
        assert_eq!("1".parse(), Ok(ComponentVersion::new(1, 0, 0)));
        assert_eq!("2.7".parse(), Ok(ComponentVersion::new(2, 7, 0)));
        assert_eq!("1.2.3".parse(), Ok(ComponentVersion::new(1, 2, 3)));
        assert_eq!(
            "9.9.9.something".parse(),
            Ok(ComponentVersion::with_qualifier(9, 9, 9, "something"))
        );
    }

    #[test]
    fn version_rejects_garbage() {
        assert!("".parse::<ComponentVersion>().is_err());
        assert!("a.b".parse::<ComponentVersion>().is_err());
        assert!("1.x.3".parse::<ComponentVersion>().is_err());
    }

    #[test]
    fn version_display_round_trips() {
        for text in ["1.0.0", "1.2.3", "9.9.9.something"] {
            let version: ComponentVersion = text.parse().unwrap();
            assert_eq!(version.to_string(), text);
        }
        // Partial forms normalize.
        let version: ComponentVersion = "2.7".parse().unwrap();
        assert_eq!(version.to_string(), "2.7.0");
    }

    #[test]
    fn identity_equality_covers_both_fields() {
        let a = ComponentIdentity::new("b1", ComponentVersion::new(1, 0, 0));
        let b = ComponentIdentity::new("b1", ComponentVersion::new(1, 0, 0));
        let c = ComponentIdentity::new("b1", ComponentVersion::new(1, 0, 1));
        let d = ComponentIdentity::new("b2", ComponentVersion::new(1, 0, 0));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn global_region_is_distinguished() {
        assert!(RegionId::global().is_global());
        assert!(!RegionId::new("internal").is_global());
    }
}
