#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Zoonosis map API server binary.
//!
//! Configured through `PORT`, `BIND_ADDR`, `MODEL_PATH`, `GRID_DATA_PATH`,
//! and `SAMPLE_DATA_PATH`; logging through `RUST_LOG`.

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    zoonosis_map_server::run_server().await
}
