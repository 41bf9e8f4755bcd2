#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the zoonosis map server.
//!
//! Request bodies are deserialized loosely (every field optional, numbers
//! may arrive as JSON numbers or numeric strings) and then validated into
//! domain types, so that a missing or malformed field produces a precise
//! error message instead of a generic deserialization failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use zoonosis_map_zoonosis_models::{Covariate, InvalidSampleError, LocationSample};

/// Name of the reported disease field in `POST /add_location`.
pub const DISEASE_FIELD: &str = "disease";

/// Errors from validating a request body.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is absent or `null`.
    #[error("Field {field} is required")]
    Missing {
        /// Field name.
        field: String,
    },

    /// A numeric field could not be interpreted as a number.
    #[error("Field {field} must be a number")]
    NotANumber {
        /// Field name.
        field: String,
    },

    /// A text field is not a non-empty string.
    #[error("Field {field} must be a non-empty string")]
    NotAString {
        /// Field name.
        field: String,
    },

    /// The values parsed but do not describe a valid location.
    #[error(transparent)]
    InvalidSample(#[from] InvalidSampleError),
}

/// A numeric field as it arrived on the wire.
///
/// Numbers are taken as-is and strings are parsed, matching the usual
/// float coercion of form-style clients.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    /// A JSON number.
    Number(f64),
    /// A JSON string expected to contain a number.
    Text(String),
    /// Anything else (booleans, arrays, objects).
    Other(Value),
}

impl NumericInput {
    /// Interprets the input as a float.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotANumber`] if the value is not a number
    /// or numeric string.
    pub fn to_f64(&self, covariate: Covariate) -> Result<f64, ValidationError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::NotANumber {
                    field: covariate.to_string(),
                }),
            Self::Other(_) => Err(ValidationError::NotANumber {
                field: covariate.to_string(),
            }),
        }
    }
}

impl From<f64> for NumericInput {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Body of `POST /predict`.
///
/// Only the coordinates are required; omitted covariates take their
/// [`Covariate::default_value`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PredictRequest {
    /// Latitude (required).
    #[serde(default)]
    pub latitude: Option<NumericInput>,
    /// Longitude (required).
    #[serde(default)]
    pub longitude: Option<NumericInput>,
    /// Temperature, default 28.
    #[serde(default)]
    pub temperature: Option<NumericInput>,
    /// Rainfall, default 2500.
    #[serde(default)]
    pub rainfall: Option<NumericInput>,
    /// Elevation, default 500.
    #[serde(default)]
    pub elevation: Option<NumericInput>,
    /// Population density, default 200.
    #[serde(default)]
    pub population_density: Option<NumericInput>,
    /// Forest coverage, default 40.
    #[serde(default)]
    pub forest_coverage: Option<NumericInput>,
}

impl PredictRequest {
    const fn field(&self, covariate: Covariate) -> Option<&NumericInput> {
        match covariate {
            Covariate::Latitude => self.latitude.as_ref(),
            Covariate::Longitude => self.longitude.as_ref(),
            Covariate::Temperature => self.temperature.as_ref(),
            Covariate::Rainfall => self.rainfall.as_ref(),
            Covariate::Elevation => self.elevation.as_ref(),
            Covariate::PopulationDensity => self.population_density.as_ref(),
            Covariate::ForestCoverage => self.forest_coverage.as_ref(),
        }
    }

    /// Validates the request and fills in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if a coordinate is missing, any value is
    /// not numeric, or the resulting sample is out of range.
    pub fn to_sample(&self) -> Result<LocationSample, ValidationError> {
        for covariate in Covariate::ALL {
            if !covariate.is_optional() && self.field(covariate).is_none() {
                return Err(ValidationError::Missing {
                    field: covariate.to_string(),
                });
            }
        }

        let sample = collect_sample(|covariate| match self.field(covariate) {
            Some(input) => input.to_f64(covariate),
            None => covariate
                .default_value()
                .ok_or_else(|| ValidationError::Missing {
                    field: covariate.to_string(),
                }),
        })?;
        sample.validate()?;
        Ok(sample)
    }
}

/// Body of `POST /add_location`. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AddLocationRequest {
    /// Latitude.
    #[serde(default)]
    pub latitude: Option<NumericInput>,
    /// Longitude.
    #[serde(default)]
    pub longitude: Option<NumericInput>,
    /// Disease observed at the location.
    #[serde(default)]
    pub disease: Option<Value>,
    /// Temperature.
    #[serde(default)]
    pub temperature: Option<NumericInput>,
    /// Rainfall.
    #[serde(default)]
    pub rainfall: Option<NumericInput>,
    /// Elevation.
    #[serde(default)]
    pub elevation: Option<NumericInput>,
    /// Population density.
    #[serde(default)]
    pub population_density: Option<NumericInput>,
    /// Forest coverage.
    #[serde(default)]
    pub forest_coverage: Option<NumericInput>,
}

/// A validated `POST /add_location` body.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportedObservation {
    /// Location and covariates.
    pub sample: LocationSample,
    /// Disease label reported by the caller.
    pub disease: String,
}

impl AddLocationRequest {
    const fn field(&self, covariate: Covariate) -> Option<&NumericInput> {
        match covariate {
            Covariate::Latitude => self.latitude.as_ref(),
            Covariate::Longitude => self.longitude.as_ref(),
            Covariate::Temperature => self.temperature.as_ref(),
            Covariate::Rainfall => self.rainfall.as_ref(),
            Covariate::Elevation => self.elevation.as_ref(),
            Covariate::PopulationDensity => self.population_density.as_ref(),
            Covariate::ForestCoverage => self.forest_coverage.as_ref(),
        }
    }

    /// Validates the request.
    ///
    /// Presence is checked for every field before any value is coerced.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if any field is missing or malformed, or
    /// the location is out of range.
    pub fn to_observation(&self) -> Result<ReportedObservation, ValidationError> {
        let missing = |field: &str| ValidationError::Missing {
            field: field.to_string(),
        };

        let [latitude, longitude, rest @ ..] = Covariate::ALL;
        for covariate in [latitude, longitude] {
            if self.field(covariate).is_none() {
                return Err(missing(covariate.as_ref()));
            }
        }
        if self.disease.as_ref().is_none_or(Value::is_null) {
            return Err(missing(DISEASE_FIELD));
        }
        for covariate in rest {
            if self.field(covariate).is_none() {
                return Err(missing(covariate.as_ref()));
            }
        }

        let sample = collect_sample(|covariate| {
            self.field(covariate)
                .ok_or_else(|| missing(covariate.as_ref()))?
                .to_f64(covariate)
        })?;
        sample.validate()?;

        let disease = match &self.disease {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            _ => {
                return Err(ValidationError::NotAString {
                    field: DISEASE_FIELD.to_string(),
                });
            }
        };

        Ok(ReportedObservation { sample, disease })
    }
}

fn collect_sample(
    mut value: impl FnMut(Covariate) -> Result<f64, ValidationError>,
) -> Result<LocationSample, ValidationError> {
    Ok(LocationSample {
        latitude: value(Covariate::Latitude)?,
        longitude: value(Covariate::Longitude)?,
        temperature: value(Covariate::Temperature)?,
        rainfall: value(Covariate::Rainfall)?,
        elevation: value(Covariate::Elevation)?,
        population_density: value(Covariate::PopulationDensity)?,
        forest_coverage: value(Covariate::ForestCoverage)?,
    })
}

/// `GET /health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Always `"ok"` when the server answers.
    pub status: String,
    /// Whether the classifier loaded at startup.
    pub model_loaded: bool,
}

/// Acknowledgement returned by write endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStatus {
    /// Always `"success"`.
    pub status: String,
    /// Human-readable description of what happened.
    pub message: String,
}

/// Uniform error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn predict(body: Value) -> Result<LocationSample, ValidationError> {
        serde_json::from_value::<PredictRequest>(body)
            .unwrap()
            .to_sample()
    }

    fn add_location(body: Value) -> Result<ReportedObservation, ValidationError> {
        serde_json::from_value::<AddLocationRequest>(body)
            .unwrap()
            .to_observation()
    }

    fn full_observation() -> Value {
        json!({
            "latitude": -6.2,
            "longitude": 106.8,
            "disease": "Leptospirosis",
            "temperature": 29,
            "rainfall": 2100,
            "elevation": 8,
            "population_density": 14000,
            "forest_coverage": 2.5,
        })
    }

    #[test]
    fn predict_applies_defaults() {
        let sample = predict(json!({ "latitude": -6.2, "longitude": 106.8 })).unwrap();
        assert_eq!(sample, LocationSample::with_defaults(-6.2, 106.8));
    }

    #[test]
    fn predict_explicit_defaults_match_omitted() {
        let explicit = predict(json!({
            "latitude": -6.2,
            "longitude": 106.8,
            "temperature": 28,
            "rainfall": 2500,
            "elevation": 500,
            "population_density": 200,
            "forest_coverage": 40,
        }))
        .unwrap();
        let omitted = predict(json!({ "latitude": -6.2, "longitude": 106.8 })).unwrap();
        assert_eq!(explicit, omitted);
    }

    #[test]
    fn predict_requires_coordinates() {
        assert_eq!(
            predict(json!({ "longitude": 106.8 })),
            Err(ValidationError::Missing {
                field: "latitude".to_string()
            })
        );
        assert_eq!(
            predict(json!({ "latitude": -6.2, "temperature": 30 }))
                .unwrap_err()
                .to_string(),
            "Field longitude is required"
        );
        assert!(predict(json!({ "latitude": null, "longitude": 106.8 })).is_err());
    }

    #[test]
    fn presence_is_checked_before_coercion() {
        assert_eq!(
            predict(json!({ "latitude": "north" })).unwrap_err().to_string(),
            "Field longitude is required"
        );
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let sample = predict(json!({
            "latitude": "-6.2",
            "longitude": " 106.8 ",
            "rainfall": "1800",
        }))
        .unwrap();
        assert!((sample.latitude + 6.2).abs() < f64::EPSILON);
        assert!((sample.rainfall - 1800.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        assert_eq!(
            predict(json!({ "latitude": -6.2, "longitude": 106.8, "elevation": "high" }))
                .unwrap_err()
                .to_string(),
            "Field elevation must be a number"
        );
        assert!(matches!(
            predict(json!({ "latitude": true, "longitude": 106.8 })),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(matches!(
            predict(json!({ "latitude": "NaN", "longitude": 106.8 })),
            Err(ValidationError::InvalidSample(_))
        ));
    }

    #[test]
    fn coordinates_out_of_range_are_rejected() {
        assert!(matches!(
            predict(json!({ "latitude": 95.0, "longitude": 106.8 })),
            Err(ValidationError::InvalidSample(
                InvalidSampleError::OutOfRange { .. }
            ))
        ));
    }

    #[test]
    fn add_location_accepts_complete_body() {
        let observation = add_location(full_observation()).unwrap();
        assert_eq!(observation.disease, "Leptospirosis");
        assert!((observation.sample.population_density - 14000.0).abs() < f64::EPSILON);
        assert_eq!(observation.sample.coordinates(), [106.8, -6.2]);
    }

    #[test]
    fn add_location_has_no_defaults() {
        for field in [
            "latitude",
            "longitude",
            "disease",
            "temperature",
            "rainfall",
            "elevation",
            "population_density",
            "forest_coverage",
        ] {
            let mut body = full_observation();
            body.as_object_mut().unwrap().remove(field);
            assert_eq!(
                add_location(body),
                Err(ValidationError::Missing {
                    field: field.to_string()
                }),
                "removing {field}"
            );
        }
    }

    #[test]
    fn add_location_requires_disease_string() {
        let mut body = full_observation();
        body["disease"] = json!(42);
        assert_eq!(
            add_location(body).unwrap_err().to_string(),
            "Field disease must be a non-empty string"
        );

        let mut body = full_observation();
        body["disease"] = json!("   ");
        assert!(matches!(
            add_location(body),
            Err(ValidationError::NotAString { .. })
        ));
    }

    #[test]
    fn health_wire_shape() {
        let health = ApiHealth {
            status: "ok".to_string(),
            model_loaded: false,
        };
        assert_eq!(
            serde_json::to_value(&health).unwrap(),
            json!({ "status": "ok", "model_loaded": false })
        );
    }
}
