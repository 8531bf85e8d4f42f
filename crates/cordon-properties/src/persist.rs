use std::fs;
use std::path::Path;

use cordon_index::LocationCache;

use crate::loader::parse_identity;
use crate::properties::{parse, write_properties, PropertyEntry};
use crate::ConfigError;

/// File name the location cache is persisted under, next to the bundle's
/// private data.
pub const LOCATION_CACHE_FILE: &str = "bundleLocationToFeature.properties";

/// Persists the cache as `location = symbolic-name~version` entries.
pub fn store_location_cache(path: &Path, cache: &LocationCache) -> Result<(), ConfigError> {
    let entries: Vec<PropertyEntry> = cache
        .entries()
        .into_iter()
        .map(|(location, identity)| PropertyEntry {
            key: location,
            value: format!("{}~{}", identity.symbolic_name, identity.version),
        })
        .collect();

    fs::write(path, write_properties(&entries)).map_err(|source| ConfigError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Restores a persisted cache. A missing file is not an error: the cache is
/// best-effort and simply starts empty.
pub fn load_location_cache(path: &Path) -> Result<LocationCache, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            return Ok(LocationCache::new());
        }
        Err(source) => {
            return Err(ConfigError::ReadFile {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let cache = LocationCache::new();
    for entry in parse(&text).entries {
        cache.record(entry.key, parse_identity(&entry.value)?);
    }
    Ok(cache)
}
