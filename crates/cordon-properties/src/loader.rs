use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use cordon_core::{ArtifactId, ComponentIdentity, FeatureId, RegionId};
use cordon_index::{IndexSnapshot, SnapshotBuilder};

use crate::properties::parse;
use crate::ConfigError;

pub const IDENTITY_ARTIFACTS_FILE: &str = "idbsnver.properties";
pub const ARTIFACT_FEATURES_FILE: &str = "bundles.properties";
pub const FEATURE_REGIONS_FILE: &str = "features.properties";
pub const REGION_PACKAGES_FILE: &str = "regions.properties";

/// Paths of the four index table files.
#[derive(Debug, Clone)]
pub struct ConfigSources {
    /// `artifact-id = symbolic-name~version`
    pub identity_artifacts: PathBuf,
    /// `artifact-id = feature-id[,feature-id...]`
    pub artifact_features: PathBuf,
    /// `feature-id = region[,region...]` — value order is the inheritance order
    pub feature_regions: PathBuf,
    /// `region = package[,package...]`
    pub region_packages: PathBuf,
}

impl ConfigSources {
    /// The well-known file names inside one configuration directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            identity_artifacts: dir.join(IDENTITY_ARTIFACTS_FILE),
            artifact_features: dir.join(ARTIFACT_FEATURES_FILE),
            feature_regions: dir.join(FEATURE_REGIONS_FILE),
            region_packages: dir.join(REGION_PACKAGES_FILE),
        }
    }
}

/// Builds [`IndexSnapshot`]s from the properties-format table files.
///
/// Loading rejects malformed input so the enforcement core only ever sees
/// well-formed snapshots. A fresh snapshot is produced per load; callers
/// swap it in through [`cordon_index::SnapshotHandle`].
#[derive(Debug, Default, Clone)]
pub struct RegionConfigLoader {
    join_global: HashSet<RegionId>,
    default_regions: HashSet<RegionId>,
}

impl RegionConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Regions whose packages are folded into the global region at load
    /// time; the regions themselves disappear as export targets.
    pub fn with_join_global(mut self, regions: impl IntoIterator<Item = RegionId>) -> Self {
        self.join_global.extend(regions);
        self
    }

    pub fn with_default_regions(mut self, regions: impl IntoIterator<Item = RegionId>) -> Self {
        self.default_regions.extend(regions);
        self
    }

    /// Parses a comma-separated region list as found in framework
    /// properties; `None` or an empty string yields no regions.
    pub fn parse_region_list(text: Option<&str>) -> Vec<RegionId> {
        let Some(text) = text else {
            return Vec::new();
        };
        text.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(RegionId::new)
            .collect()
    }

    pub fn load_dir(&self, dir: &Path) -> Result<IndexSnapshot, ConfigError> {
        self.load(&ConfigSources::in_dir(dir))
    }

    pub fn load(&self, sources: &ConfigSources) -> Result<IndexSnapshot, ConfigError> {
        let mut builder = SnapshotBuilder::new();

        for entry in read_entries(&sources.identity_artifacts)? {
            let identity = parse_identity(&entry.value)?;
            builder.add_artifact(identity, ArtifactId::new(entry.key));
        }

        for entry in read_entries(&sources.artifact_features)? {
            let artifact = ArtifactId::new(entry.key);
            for feature in comma_list(&entry.value) {
                builder.add_artifact_feature(artifact.clone(), FeatureId::new(feature));
            }
        }

        for entry in read_entries(&sources.feature_regions)? {
            let feature = FeatureId::new(entry.key);
            let mut seen = HashSet::new();
            for region in comma_list(&entry.value) {
                let region = RegionId::new(region);
                if !seen.insert(region.clone()) {
                    return Err(ConfigError::DuplicateRegion {
                        feature,
                        region,
                    });
                }
                builder.add_feature_region(feature.clone(), region);
            }
        }

        for entry in read_entries(&sources.region_packages)? {
            let region = RegionId::new(entry.key);
            for package in comma_list(&entry.value) {
                builder.add_region_package(region.clone(), package);
            }
        }

        for region in &self.join_global {
            builder.join_region_to_global(region);
        }
        for region in &self.default_regions {
            builder.add_default_region(region.clone());
        }

        let snapshot = builder.build();
        tracing::debug!(
            identity_artifacts = %sources.identity_artifacts.display(),
            "loaded region configuration snapshot"
        );
        Ok(snapshot)
    }
}

/// Parses `symbolic-name~version` into a [`ComponentIdentity`].
pub fn parse_identity(value: &str) -> Result<ComponentIdentity, ConfigError> {
    let (name, version) = value
        .split_once('~')
        .filter(|(name, version)| !name.is_empty() && !version.is_empty())
        .ok_or_else(|| ConfigError::MalformedIdentity {
            value: value.to_string(),
        })?;
    Ok(ComponentIdentity::new(name, version.parse()?))
}

fn read_entries(path: &Path) -> Result<Vec<crate::PropertyEntry>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse(&text).entries)
}

fn comma_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cordon_core::ComponentVersion;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn identity(name: &str, version: &str) -> ComponentIdentity {
        ComponentIdentity::new(name, version.parse::<ComponentVersion>().unwrap())
    }

    fn write_config(dir: &Path, file: &str, text: &str) {
        fs::write(dir.join(file), text).unwrap();
    }

    fn sample_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            IDENTITY_ARTIFACTS_FILE,
            "g\\:b1\\:1=b1~1.0.0\ng\\:b2\\:1.2.3=b2~1.2.3\ng2\\:b2\\:1.2.4=b2~1.2.3\n",
        );
        write_config(
            dir.path(),
            ARTIFACT_FEATURES_FILE,
            "g\\:b1\\:1=org.acme\\:something\\:1.2.3\n\
             g\\:b2\\:1.2.3=org.acme\\:something\\:1.2.3,some.other\\:feature\\:123\n",
        );
        write_config(
            dir.path(),
            FEATURE_REGIONS_FILE,
            "org.acme\\:something\\:1.2.3=internal,global\n",
        );
        write_config(
            dir.path(),
            REGION_PACKAGES_FILE,
            "internal=xyz\nglobal=a.b.c,d.e.f\n",
        );
        dir
    }

    #[test]
    fn loads_the_four_tables() {
        let dir = sample_dir();
        let snapshot = RegionConfigLoader::new().load_dir(dir.path()).unwrap();

        assert_eq!(
            snapshot.artifacts_for(&identity("b1", "1.0.0")),
            Some([ArtifactId::from("g:b1:1")].as_slice())
        );
        // Two artifacts declare b2/1.2.3, in file order.
        assert_eq!(
            snapshot.artifacts_for(&identity("b2", "1.2.3")),
            Some([ArtifactId::from("g:b2:1.2.3"), ArtifactId::from("g2:b2:1.2.4")].as_slice())
        );

        let membership = snapshot.resolve_membership(&identity("b2", "1.2.3"));
        assert!(membership
            .features
            .contains(&FeatureId::from("some.other:feature:123")));
        assert_eq!(
            membership.regions,
            [RegionId::from("internal"), RegionId::global()]
                .into_iter()
                .collect()
        );

        assert!(snapshot.region_exports_package(&RegionId::from("internal"), "xyz"));
        assert!(snapshot.region_exports_package(&RegionId::global(), "d.e.f"));
    }

    #[test]
    fn region_declaration_order_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), IDENTITY_ARTIFACTS_FILE, "");
        write_config(dir.path(), ARTIFACT_FEATURES_FILE, "");
        write_config(
            dir.path(),
            FEATURE_REGIONS_FILE,
            "org.acme\\:something\\:1.2.3=r0,r1,r2,r3\n",
        );
        write_config(dir.path(), REGION_PACKAGES_FILE, "");

        let snapshot = RegionConfigLoader::new().load_dir(dir.path()).unwrap();
        let declared = snapshot
            .regions_for_feature(&FeatureId::from("org.acme:something:1.2.3"))
            .unwrap();
        let expected: Vec<RegionId> = ["r0", "r1", "r2", "r3"].map(RegionId::from).into();
        assert_eq!(declared, expected.as_slice());
    }

    #[test]
    fn duplicate_region_in_one_declaration_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), IDENTITY_ARTIFACTS_FILE, "");
        write_config(dir.path(), ARTIFACT_FEATURES_FILE, "");
        write_config(dir.path(), FEATURE_REGIONS_FILE, "f=internal,global,internal\n");
        write_config(dir.path(), REGION_PACKAGES_FILE, "");

        let err = RegionConfigLoader::new().load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateRegion { .. }), "{err}");
    }

    #[test]
    fn join_global_folds_regions_into_the_global_region() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), IDENTITY_ARTIFACTS_FILE, "");
        write_config(dir.path(), ARTIFACT_FEATURES_FILE, "");
        write_config(dir.path(), FEATURE_REGIONS_FILE, "");
        write_config(
            dir.path(),
            REGION_PACKAGES_FILE,
            "obsolete=xyz\ndeprecated=test\nglobal=a.b.c,d.e.f\n",
        );

        let loader = RegionConfigLoader::new().with_join_global(
            RegionConfigLoader::parse_region_list(Some("obsolete,deprecated")),
        );
        let snapshot = loader.load_dir(dir.path()).unwrap();

        assert!(snapshot.packages_for_region(&RegionId::from("obsolete")).is_none());
        assert!(snapshot.packages_for_region(&RegionId::from("deprecated")).is_none());
        let global = snapshot.packages_for_region(&RegionId::global()).unwrap();
        for package in ["xyz", "test", "a.b.c", "d.e.f"] {
            assert!(global.contains(package), "{package}");
        }
    }

    #[test]
    fn default_region_lists_parse_like_framework_properties() {
        assert_eq!(
            RegionConfigLoader::parse_region_list(Some("foo.bar,foo.zar")),
            vec![RegionId::from("foo.bar"), RegionId::from("foo.zar")]
        );
        assert_eq!(
            RegionConfigLoader::parse_region_list(Some("test")),
            vec![RegionId::from("test")]
        );
        assert_eq!(RegionConfigLoader::parse_region_list(Some("")), vec![]);
        assert_eq!(RegionConfigLoader::parse_region_list(None), vec![]);
    }

    #[test]
    fn default_regions_land_on_the_snapshot() {
        let dir = sample_dir();
        let loader = RegionConfigLoader::new()
            .with_default_regions([RegionId::from("baseline")]);
        let snapshot = loader.load_dir(dir.path()).unwrap();
        assert!(snapshot.default_regions().contains(&RegionId::from("baseline")));
    }

    #[test]
    fn malformed_identity_is_rejected() {
        assert!(matches!(
            parse_identity("missing-separator"),
            Err(ConfigError::MalformedIdentity { .. })
        ));
        assert!(matches!(
            parse_identity("name~not.a.version"),
            Err(ConfigError::Version(_))
        ));
        assert_eq!(
            parse_identity("b3~2.7").unwrap(),
            identity("b3", "2.7.0")
        );
        assert_eq!(
            parse_identity("blah~1.0.0.suffix").unwrap(),
            identity("blah", "1.0.0.suffix")
        );
    }

    #[test]
    fn missing_table_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = RegionConfigLoader::new().load_dir(dir.path()).unwrap_err();
        match err {
            ConfigError::ReadFile { path, .. } => {
                assert!(path.ends_with(IDENTITY_ARTIFACTS_FILE));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
