#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `GeoJSON` dataset storage for the zoonosis map.
//!
//! Two `FeatureCollection` files back the map:
//!
//! - the **grid** file: precomputed predictions over a geographic grid,
//!   produced offline and never written here
//! - the **sample** file: seed and user-submitted observations, grown one
//!   feature at a time by [`GeoDatasetStore::append_observation`]
//!
//! Documents are read whole on every call. Appends rewrite the whole sample
//! file under a process-wide writer lock, writing to a `.tmp` sibling and
//! renaming it into place so readers never observe a partial document.
//! Nothing coordinates writers in separate processes.

pub mod observation;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use geojson::FeatureCollection;
use thiserror::Error;

pub use geojson::Feature;
pub use observation::observation_feature;

/// Default path of the precomputed prediction grid.
pub const DEFAULT_GRID_PATH: &str = "zoonosis_predictions.geojson";

/// Default path of the sample observation dataset.
pub const DEFAULT_SAMPLE_PATH: &str = "api_sample_data.geojson";

/// Errors from dataset reads and writes.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The requested dataset does not exist on disk.
    #[error("{0}")]
    NotFound(String),

    /// A file could not be read, written, or renamed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A file does not contain a valid `GeoJSON` `FeatureCollection`.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// File involved.
        path: String,
        /// Underlying parse error.
        source: geojson::Error,
    },

    /// The updated collection could not be serialized.
    #[error("Failed to encode feature collection: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What [`GeoDatasetStore::append_observation`] did to the sample file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The sample file did not exist and was created with one feature.
    Created,
    /// The feature was appended to an existing file.
    Appended {
        /// Feature count after the append.
        total: usize,
    },
}

/// File-backed store for the grid and sample feature collections.
#[derive(Debug)]
pub struct GeoDatasetStore {
    grid_path: PathBuf,
    sample_path: PathBuf,
    /// Serializes read-modify-write cycles on the sample file.
    writer: Mutex<()>,
}

impl GeoDatasetStore {
    /// Creates a store over the given grid and sample file paths. Neither
    /// file needs to exist yet.
    #[must_use]
    pub fn new(grid_path: impl Into<PathBuf>, sample_path: impl Into<PathBuf>) -> Self {
        Self {
            grid_path: grid_path.into(),
            sample_path: sample_path.into(),
            writer: Mutex::new(()),
        }
    }

    /// Path of the prediction grid file.
    #[must_use]
    pub fn grid_path(&self) -> &Path {
        &self.grid_path
    }

    /// Path of the sample dataset file.
    #[must_use]
    pub fn sample_path(&self) -> &Path {
        &self.sample_path
    }

    /// Reads the prediction grid, falling back to the sample dataset when
    /// the grid file is absent.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::NotFound`] if neither file exists, or an
    /// I/O or parse error from whichever file was read.
    pub fn read_grid(&self) -> Result<FeatureCollection, DatasetError> {
        if let Some(grid) = read_collection(&self.grid_path)? {
            return Ok(grid);
        }

        match read_collection(&self.sample_path)? {
            Some(sample) => {
                log::info!(
                    "Grid file {} not found, serving sample data as fallback",
                    self.grid_path.display()
                );
                Ok(sample)
            }
            None => Err(DatasetError::NotFound(
                "Grid prediction data not found".to_string(),
            )),
        }
    }

    /// Reads the sample dataset.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::NotFound`] if the file does not exist, or an
    /// I/O or parse error if it cannot be read.
    pub fn read_sample(&self) -> Result<FeatureCollection, DatasetError> {
        read_collection(&self.sample_path)?
            .ok_or_else(|| DatasetError::NotFound("Sample data not found".to_string()))
    }

    /// Appends a feature to the sample dataset, creating the file if needed.
    ///
    /// Existing features keep their order and the new one goes last. No
    /// deduplication is performed.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the existing file cannot be parsed or the
    /// updated document cannot be written. The previous file is left intact
    /// on failure.
    pub fn append_observation(&self, feature: Feature) -> Result<AppendOutcome, DatasetError> {
        // The guarded value is `()`, so a poisoned lock carries no broken
        // state.
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let (collection, outcome) = match read_collection(&self.sample_path)? {
            Some(mut collection) => {
                collection.features.push(feature);
                let total = collection.features.len();
                (collection, AppendOutcome::Appended { total })
            }
            None => (
                FeatureCollection {
                    bbox: None,
                    features: vec![feature],
                    foreign_members: None,
                },
                AppendOutcome::Created,
            ),
        };

        write_collection(&self.sample_path, &collection)?;

        match outcome {
            AppendOutcome::Created => log::info!(
                "Created sample dataset {} with first observation",
                self.sample_path.display()
            ),
            AppendOutcome::Appended { total } => log::info!(
                "Appended observation to {} ({total} features)",
                self.sample_path.display()
            ),
        }

        Ok(outcome)
    }
}

/// Reads and parses a feature collection, returning `None` if the file
/// does not exist.
fn read_collection(path: &Path) -> Result<Option<FeatureCollection>, DatasetError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(DatasetError::Io {
                path: path.display().to_string(),
                source: e,
            });
        }
    };

    contents
        .parse::<FeatureCollection>()
        .map(Some)
        .map_err(|e| DatasetError::Parse {
            path: path.display().to_string(),
            source: e,
        })
}

/// Writes a feature collection atomically (write to `.tmp`, then rename).
fn write_collection(path: &Path, collection: &FeatureCollection) -> Result<(), DatasetError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DatasetError::Io {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = serde_json::to_string(collection)?;

    let tmp_path = tmp_path_for(path);
    std::fs::write(&tmp_path, contents).map_err(|e| DatasetError::Io {
        path: tmp_path.display().to_string(),
        source: e,
    })?;

    std::fs::rename(&tmp_path, path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
