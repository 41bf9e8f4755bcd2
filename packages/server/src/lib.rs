#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the zoonosis map application.
//!
//! Exposes the disease classifier (`/predict`), the prediction grid and
//! sample datasets (`/grid`, `/data`), and observation submission
//! (`/add_location`) as a JSON API for the map frontend.

pub mod config;
mod error;
mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use zoonosis_map_dataset::GeoDatasetStore;
use zoonosis_map_model::SharedClassifier;

pub use config::ServerConfig;

/// Shared application state.
pub struct AppState {
    /// Classifier loaded at startup, `None` if loading failed.
    pub model: Option<SharedClassifier>,
    /// Grid and sample dataset files.
    pub store: Arc<GeoDatasetStore>,
}

impl AppState {
    /// Loads the model and opens the dataset store described by `config`.
    ///
    /// A model that fails to load is logged and left as `None`.
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        log::info!("Loading model from {}...", config.model_path.display());
        let model = zoonosis_map_model::load_or_disable(&config.model_path);

        Self {
            model,
            store: Arc::new(GeoDatasetStore::new(
                config.grid_path.clone(),
                config.sample_path.clone(),
            )),
        }
    }
}

/// Registers every API route.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health))
        .route("/predict", web::post().to(handlers::predict))
        .route("/grid", web::get().to(handlers::grid))
        .route("/data", web::get().to(handlers::data))
        .route("/add_location", web::post().to(handlers::add_location));
}

/// Starts the zoonosis map API server.
///
/// Reads [`ServerConfig`] from the environment, loads the model, and
/// serves until shut down. This is a regular async function; the caller
/// provides the runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();
    let state = web::Data::new(AppState::from_config(&config));

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
