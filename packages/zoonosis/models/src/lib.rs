#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Covariate taxonomy, location samples, and prediction results.
//!
//! This crate defines the canonical feature schema shared by the model
//! loader, the prediction service, the dataset store, and the HTTP layer.
//! Every component refers to model inputs through [`Covariate`] so that
//! names, ordering, and default values live in exactly one place.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the seven numeric inputs the disease classifier consumes.
///
/// Variants are declared in the schema order the model was trained on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Covariate {
    /// Latitude in decimal degrees (WGS84).
    Latitude,
    /// Longitude in decimal degrees (WGS84).
    Longitude,
    /// Mean temperature in degrees Celsius.
    Temperature,
    /// Annual rainfall in millimetres.
    Rainfall,
    /// Elevation above sea level in metres.
    Elevation,
    /// Residents per square kilometre.
    PopulationDensity,
    /// Forest coverage as a percentage of land area.
    ForestCoverage,
}

impl Covariate {
    /// All covariates in schema order.
    pub const ALL: [Self; 7] = [
        Self::Latitude,
        Self::Longitude,
        Self::Temperature,
        Self::Rainfall,
        Self::Elevation,
        Self::PopulationDensity,
        Self::ForestCoverage,
    ];

    /// Returns the value substituted when a caller omits this covariate.
    ///
    /// Coordinates have no default and must always be supplied.
    #[must_use]
    pub const fn default_value(self) -> Option<f64> {
        match self {
            Self::Latitude | Self::Longitude => None,
            Self::Temperature => Some(28.0),
            Self::Rainfall => Some(2500.0),
            Self::Elevation => Some(500.0),
            Self::PopulationDensity => Some(200.0),
            Self::ForestCoverage => Some(40.0),
        }
    }

    /// Returns `true` if the covariate may be omitted from a prediction
    /// request.
    #[must_use]
    pub const fn is_optional(self) -> bool {
        self.default_value().is_some()
    }
}

/// A single geographic location with its environmental covariates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Mean temperature in degrees Celsius.
    pub temperature: f64,
    /// Annual rainfall in millimetres.
    pub rainfall: f64,
    /// Elevation in metres.
    pub elevation: f64,
    /// Residents per square kilometre.
    pub population_density: f64,
    /// Forest coverage percentage.
    pub forest_coverage: f64,
}

impl LocationSample {
    /// Creates a sample at the given coordinates with every optional
    /// covariate set to its default.
    #[must_use]
    pub const fn with_defaults(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            temperature: 28.0,
            rainfall: 2500.0,
            elevation: 500.0,
            population_density: 200.0,
            forest_coverage: 40.0,
        }
    }

    /// Returns the value of a single covariate.
    #[must_use]
    pub const fn value(&self, covariate: Covariate) -> f64 {
        match covariate {
            Covariate::Latitude => self.latitude,
            Covariate::Longitude => self.longitude,
            Covariate::Temperature => self.temperature,
            Covariate::Rainfall => self.rainfall,
            Covariate::Elevation => self.elevation,
            Covariate::PopulationDensity => self.population_density,
            Covariate::ForestCoverage => self.forest_coverage,
        }
    }

    /// Returns `[longitude, latitude]`, the `GeoJSON` position order.
    #[must_use]
    pub const fn coordinates(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Checks that every value is finite and the coordinates are in range.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSampleError`] naming the first offending covariate.
    pub fn validate(&self) -> Result<(), InvalidSampleError> {
        for covariate in Covariate::ALL {
            let value = self.value(covariate);
            if !value.is_finite() {
                return Err(InvalidSampleError::NonFinite { covariate });
            }
        }

        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(InvalidSampleError::OutOfRange {
                covariate: Covariate::Latitude,
                value: self.latitude,
                min: -90.0,
                max: 90.0,
            });
        }

        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(InvalidSampleError::OutOfRange {
                covariate: Covariate::Longitude,
                value: self.longitude,
                min: -180.0,
                max: 180.0,
            });
        }

        Ok(())
    }
}

/// Error returned when a [`LocationSample`] fails validation.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum InvalidSampleError {
    /// A covariate is NaN or infinite.
    #[error("Field {covariate} must be a finite number")]
    NonFinite {
        /// The offending covariate.
        covariate: Covariate,
    },

    /// A coordinate lies outside its valid range.
    #[error("Field {covariate} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// The offending covariate.
        covariate: Covariate,
        /// The supplied value.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
}

/// The ranked outcome of classifying a single location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// The label returned by the classifier.
    pub predicted_disease: String,
    /// `[longitude, latitude]` of the classified location.
    pub coordinates: [f64; 2],
    /// Highest-probability `(label, probability)` pairs, descending.
    ///
    /// Truncated, not renormalized: the values sum to at most 1.0.
    pub probabilities: Vec<(String, f64)>,
}
