// src/server/mod.rs

//! HTTP front end serving the analysis form.

mod render;
mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::driver::DriverFactory;
use crate::error::Result;
use crate::models::Config;
use crate::services::AnalysisClient;

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub drivers: Arc<dyn DriverFactory>,
    pub analyst: Arc<dyn AnalysisClient>,
    /// Held for the duration of a run; one browser session at a time.
    run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        config: Config,
        drivers: Arc<dyn DriverFactory>,
        analyst: Arc<dyn AnalysisClient>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            drivers,
            analyst,
            run_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::form))
        .route("/analyze", post(routes::analyze))
        .route("/health", get(routes::health))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
