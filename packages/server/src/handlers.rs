//! HTTP handler functions for the zoonosis map API.

use actix_web::{HttpResponse, web};
use zoonosis_map_dataset::{AppendOutcome, observation_feature};
use zoonosis_map_prediction::{PredictionError, predict_for_location};
use zoonosis_map_server_models::{AddLocationRequest, ApiHealth, ApiStatus, PredictRequest};

use crate::AppState;
use crate::error::HandlerError;

/// `GET /health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        status: "ok".to_string(),
        model_loaded: state.model.is_some(),
    })
}

/// `POST /predict`
///
/// Classifies a location. Only `latitude` and `longitude` are required.
pub async fn predict(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    predict_inner(&state, &body).unwrap_or_else(|e| e.respond("/predict"))
}

fn predict_inner(state: &AppState, body: &[u8]) -> Result<HttpResponse, HandlerError> {
    let model = state
        .model
        .as_deref()
        .ok_or(PredictionError::ModelUnavailable)?;

    let request: PredictRequest = serde_json::from_slice(body)?;
    let sample = request.to_sample()?;
    let result = predict_for_location(Some(model), &sample)?;

    Ok(HttpResponse::Ok().json(result))
}

/// `GET /grid`
///
/// Returns the prediction grid, or the sample dataset if no grid exists.
pub async fn grid(state: web::Data<AppState>) -> HttpResponse {
    let store = state.store.clone();
    match tokio::task::spawn_blocking(move || store.read_grid()).await {
        Ok(Ok(collection)) => HttpResponse::Ok().json(collection),
        Ok(Err(e)) => HandlerError::from(e).respond("/grid"),
        Err(e) => HandlerError::from(e).respond("/grid"),
    }
}

/// `GET /data`
///
/// Returns the sample observation dataset.
pub async fn data(state: web::Data<AppState>) -> HttpResponse {
    let store = state.store.clone();
    match tokio::task::spawn_blocking(move || store.read_sample()).await {
        Ok(Ok(collection)) => HttpResponse::Ok().json(collection),
        Ok(Err(e)) => HandlerError::from(e).respond("/data"),
        Err(e) => HandlerError::from(e).respond("/data"),
    }
}

/// `POST /add_location`
///
/// Records an observed disease at a location together with the model's
/// prediction for it. Every field is required.
pub async fn add_location(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    add_location_inner(&state, &body)
        .await
        .unwrap_or_else(|e| e.respond("/add_location"))
}

async fn add_location_inner(state: &AppState, body: &[u8]) -> Result<HttpResponse, HandlerError> {
    let model = state
        .model
        .as_deref()
        .ok_or(PredictionError::ModelUnavailable)?;

    let request: AddLocationRequest = serde_json::from_slice(body)?;
    let observation = request.to_observation()?;
    let prediction = predict_for_location(Some(model), &observation.sample)?;
    let feature = observation_feature(&observation.sample, &observation.disease, &prediction);

    let store = state.store.clone();
    let outcome = tokio::task::spawn_blocking(move || store.append_observation(feature)).await??;

    let message = match outcome {
        AppendOutcome::Created => "New sample data file created",
        AppendOutcome::Appended { .. } => "Location added successfully",
    };

    Ok(HttpResponse::Ok().json(ApiStatus {
        status: "success".to_string(),
        message: message.to_string(),
    }))
}
