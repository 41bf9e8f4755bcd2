//! Builds sample-dataset features from reported observations.

use geojson::{Feature, Geometry, JsonObject, Value};
use serde_json::Value as JsonValue;
use zoonosis_map_zoonosis_models::{Covariate, LocationSample, PredictionResult};

/// Builds a `Point` feature recording a reported disease alongside the
/// model's prediction for the same location.
///
/// Properties hold `actual_disease`, every covariate by name,
/// `predicted_disease`, and `probabilities` as a label-to-probability map
/// of the ranked classes in `prediction`.
#[must_use]
pub fn observation_feature(
    sample: &LocationSample,
    actual_disease: &str,
    prediction: &PredictionResult,
) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert(
        "actual_disease".to_string(),
        JsonValue::String(actual_disease.to_string()),
    );

    for covariate in Covariate::ALL {
        properties.insert(
            covariate.to_string(),
            JsonValue::from(sample.value(covariate)),
        );
    }

    properties.insert(
        "predicted_disease".to_string(),
        JsonValue::String(prediction.predicted_disease.clone()),
    );

    let probabilities: JsonObject = prediction
        .probabilities
        .iter()
        .map(|(label, p)| (label.clone(), JsonValue::from(*p)))
        .collect();
    properties.insert(
        "probabilities".to_string(),
        JsonValue::Object(probabilities),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(sample.coordinates().to_vec()))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_embeds_observation_and_prediction() {
        let sample = LocationSample {
            latitude: -6.2,
            longitude: 106.8,
            temperature: 30.5,
            rainfall: 1800.0,
            elevation: 12.0,
            population_density: 15000.0,
            forest_coverage: 3.5,
        };
        let prediction = PredictionResult {
            predicted_disease: "Leptospirosis".to_string(),
            coordinates: sample.coordinates(),
            probabilities: vec![
                ("Leptospirosis".to_string(), 0.5),
                ("Dengue".to_string(), 0.3),
                ("Rabies".to_string(), 0.1),
            ],
        };

        let feature = observation_feature(&sample, "Dengue", &prediction);

        assert_eq!(
            feature.geometry.as_ref().map(|g| &g.value),
            Some(&Value::Point(vec![106.8, -6.2]))
        );

        let json = serde_json::to_value(&feature).unwrap();
        assert_eq!(
            json["properties"],
            serde_json::json!({
                "actual_disease": "Dengue",
                "latitude": -6.2,
                "longitude": 106.8,
                "temperature": 30.5,
                "rainfall": 1800.0,
                "elevation": 12.0,
                "population_density": 15000.0,
                "forest_coverage": 3.5,
                "predicted_disease": "Leptospirosis",
                "probabilities": {
                    "Leptospirosis": 0.5,
                    "Dengue": 0.3,
                    "Rabies": 0.1,
                },
            })
        );
        assert_eq!(json["type"], "Feature");
    }
}
