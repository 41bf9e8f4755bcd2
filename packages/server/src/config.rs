//! Server configuration read from the environment at startup.

use std::path::PathBuf;

use zoonosis_map_dataset::{DEFAULT_GRID_PATH, DEFAULT_SAMPLE_PATH};
use zoonosis_map_model::DEFAULT_MODEL_PATH;

/// Port used when `PORT` is unset or invalid.
pub const DEFAULT_PORT: u16 = 5000;

/// Listen on all interfaces unless `BIND_ADDR` says otherwise.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

/// Startup configuration. Paths are fixed for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to listen on (`PORT`).
    pub port: u16,
    /// Serialized model artifact (`MODEL_PATH`).
    pub model_path: PathBuf,
    /// Precomputed prediction grid (`GRID_DATA_PATH`).
    pub grid_path: PathBuf,
    /// Sample observation dataset (`SAMPLE_DATA_PATH`).
    pub sample_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            grid_path: PathBuf::from(DEFAULT_GRID_PATH),
            sample_path: PathBuf::from(DEFAULT_SAMPLE_PATH),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Unset or empty variables fall back to their defaults; an unparsable
    /// `PORT` is logged and ignored.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = var("PORT").map_or(defaults.port, |p| {
            p.trim().parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid PORT value {p:?}, using {DEFAULT_PORT}");
                DEFAULT_PORT
            })
        });

        Self {
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port,
            model_path: var("MODEL_PATH").map_or(defaults.model_path, PathBuf::from),
            grid_path: var("GRID_DATA_PATH").map_or(defaults.grid_path, PathBuf::from),
            sample_path: var("SAMPLE_DATA_PATH").map_or(defaults.sample_path, PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 5000);
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.model_path, PathBuf::from("zoonosis_geo_model.json"));
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("PORT", "8081"),
            ("BIND_ADDR", "127.0.0.1"),
            ("MODEL_PATH", "/srv/model.json"),
            ("GRID_DATA_PATH", "/srv/grid.geojson"),
            ("SAMPLE_DATA_PATH", "/srv/sample.geojson"),
        ]);
        assert_eq!(config.port, 8081);
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.model_path, PathBuf::from("/srv/model.json"));
        assert_eq!(config.grid_path, PathBuf::from("/srv/grid.geojson"));
        assert_eq!(config.sample_path, PathBuf::from("/srv/sample.geojson"));
    }

    #[test]
    fn invalid_or_empty_values_fall_back() {
        assert_eq!(config(&[("PORT", "http")]).port, DEFAULT_PORT);
        assert_eq!(config(&[("PORT", "70000")]).port, DEFAULT_PORT);
        assert_eq!(config(&[("BIND_ADDR", "  ")]).bind_addr, DEFAULT_BIND_ADDR);
    }
}
