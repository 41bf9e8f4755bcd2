#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Disease classifier handle.
//!
//! The model is loaded once at startup from a serialized artifact and is
//! immutable afterwards, so a single [`SharedClassifier`] can be handed to
//! every request handler without synchronization. A failed load is not
//! fatal: callers keep `None` and report the model as unavailable.
//!
//! The only artifact format currently understood is the JSON tree ensemble
//! described in [`forest`].

pub mod forest;

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use zoonosis_map_zoonosis_models::Covariate;

pub use forest::ForestClassifier;

/// Default path of the serialized model artifact.
pub const DEFAULT_MODEL_PATH: &str = "zoonosis_geo_model.json";

/// A loaded classifier shared across request handlers.
pub type SharedClassifier = Arc<dyn Classifier>;

/// A trained multi-class classifier over [`Covariate`] features.
///
/// Feature vectors passed to [`Classifier::classify`] and
/// [`Classifier::class_probabilities`] must follow the order returned by
/// [`Classifier::feature_names`].
pub trait Classifier: Send + Sync {
    /// Known class labels, in the model's canonical order.
    fn classes(&self) -> &[String];

    /// Covariates the model consumes, in the order it expects them.
    fn feature_names(&self) -> &[Covariate];

    /// Returns the most likely class label for a feature vector.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the feature vector has the wrong length or
    /// contains non-finite values.
    fn classify(&self, features: &[f64]) -> Result<String, ModelError>;

    /// Returns one probability per entry of [`Classifier::classes`], in the
    /// same order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the feature vector has the wrong length or
    /// contains non-finite values.
    fn class_probabilities(&self, features: &[f64]) -> Result<Vec<f64>, ModelError>;
}

/// Errors from loading or invoking a classifier.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The artifact could not be read.
    #[error("Failed to read model artifact {path}: {source}")]
    Io {
        /// Artifact path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The artifact is not valid JSON or does not match the expected layout.
    #[error("Failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    /// The artifact was written by an incompatible exporter.
    #[error("Unsupported model format version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the artifact.
        found: u32,
        /// Version this loader understands.
        expected: u32,
    },

    /// The artifact parsed but is internally inconsistent.
    #[error("Invalid model artifact: {message}")]
    InvalidArtifact {
        /// Description of what went wrong.
        message: String,
    },

    /// A feature vector had the wrong number of entries.
    #[error("Expected {expected} features, got {found}")]
    FeatureCount {
        /// Number of features the model consumes.
        expected: usize,
        /// Number of features supplied.
        found: usize,
    },

    /// A feature value was NaN or infinite.
    #[error("Feature {covariate} is not a finite number")]
    NonFinite {
        /// The offending covariate.
        covariate: Covariate,
    },
}

/// Loads the classifier artifact at `path`.
///
/// # Errors
///
/// Returns [`ModelError`] if the file is missing, corrupt, or was written
/// by an incompatible exporter.
pub fn load(path: &Path) -> Result<SharedClassifier, ModelError> {
    let model = ForestClassifier::load(path)?;
    log::info!(
        "Loaded model from {} ({} classes, {} trees)",
        path.display(),
        model.classes().len(),
        model.tree_count()
    );
    Ok(Arc::new(model))
}

/// Loads the classifier at `path`, logging and swallowing any failure.
///
/// The service starts degraded when this returns `None`.
#[must_use]
pub fn load_or_disable(path: &Path) -> Option<SharedClassifier> {
    match load(path) {
        Ok(model) => Some(model),
        Err(e) => {
            log::error!("Model unavailable, prediction routes are disabled: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_artifact_is_io_error() {
        let path = std::env::temp_dir().join("zoonosis_model_test_missing.json");
        let _ = std::fs::remove_file(&path);

        let err = load(&path).err().unwrap();
        assert!(matches!(err, ModelError::Io { .. }), "{err}");
        assert!(load_or_disable(&path).is_none());
    }

    #[test]
    fn load_corrupt_artifact_is_parse_error() {
        let dir = std::env::temp_dir().join("zoonosis_model_test_corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("model.json");
        std::fs::write(&path, "(dp0\nS'classes'\n").unwrap();

        let err = load(&path).err().unwrap();
        assert!(matches!(err, ModelError::Parse(_)), "{err}");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_valid_artifact() {
        let dir = std::env::temp_dir().join("zoonosis_model_test_valid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("model.json");
        std::fs::write(&path, forest::tests::STUMP_ARTIFACT).unwrap();

        let model = load_or_disable(&path).expect("artifact should load");
        assert_eq!(model.classes(), ["Leptospirosis", "Rabies", "Dengue"]);
        assert_eq!(model.feature_names(), Covariate::ALL);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
