#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ranked disease prediction for a single location.
//!
//! Wraps a [`Classifier`] call with feature assembly and result ranking.
//! The output keeps the three most likely classes in descending order of
//! probability without renormalizing them.

use thiserror::Error;
use zoonosis_map_model::{Classifier, ModelError};
use zoonosis_map_zoonosis_models::{LocationSample, PredictionResult};

/// Number of `(label, probability)` pairs kept in a [`PredictionResult`].
pub const TOP_PROBABILITIES: usize = 3;

/// Errors from [`predict_for_location`].
#[derive(Debug, Error)]
pub enum PredictionError {
    /// No model was loaded at startup.
    #[error("Model is not loaded")]
    ModelUnavailable,

    /// The model rejected the input or returned an inconsistent result.
    #[error("Inference failed: {0}")]
    Inference(String),
}

impl From<ModelError> for PredictionError {
    fn from(e: ModelError) -> Self {
        Self::Inference(e.to_string())
    }
}

/// Classifies a location and ranks the class probabilities.
///
/// Features are assembled in the order the model declares. Pairs with
/// equal probability keep the model's class order.
///
/// # Errors
///
/// Returns [`PredictionError::ModelUnavailable`] if `model` is `None`, and
/// [`PredictionError::Inference`] if the sample contains non-finite values
/// or the model call fails.
pub fn predict_for_location(
    model: Option<&dyn Classifier>,
    sample: &LocationSample,
) -> Result<PredictionResult, PredictionError> {
    let model = model.ok_or(PredictionError::ModelUnavailable)?;

    let features: Vec<f64> = model
        .feature_names()
        .iter()
        .map(|covariate| sample.value(*covariate))
        .collect();

    if let Some((covariate, _)) = model
        .feature_names()
        .iter()
        .zip(&features)
        .find(|(_, value)| !value.is_finite())
    {
        return Err(PredictionError::Inference(format!(
            "Feature {covariate} is not a finite number"
        )));
    }

    let predicted_disease = model.classify(&features)?;
    let probabilities = model.class_probabilities(&features)?;

    let classes = model.classes();
    if probabilities.len() != classes.len() {
        return Err(PredictionError::Inference(format!(
            "Model returned {} probabilities for {} classes",
            probabilities.len(),
            classes.len()
        )));
    }

    let mut ranked: Vec<(String, f64)> = classes.iter().cloned().zip(probabilities).collect();
    // `sort_by` is stable: equal probabilities keep class order.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(TOP_PROBABILITIES);

    log::debug!(
        "Predicted {predicted_disease} at ({}, {})",
        sample.latitude,
        sample.longitude
    );

    Ok(PredictionResult {
        predicted_disease,
        coordinates: sample.coordinates(),
        probabilities: ranked,
    })
}
