//! HTTP surface. Routes are nested under `/api/` and every handler opens its
//! own SQLite connection on the blocking pool.

pub mod error;
pub mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

use crate::assistant::Assistant;
use crate::db;
use error::ApiError;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db_path: Arc<PathBuf>,
    pub assistant: Assistant,
}

impl AppState {
    pub fn new(db_path: PathBuf, assistant: Assistant) -> Self {
        Self {
            db_path: Arc::new(db_path),
            assistant,
        }
    }

    /// Run blocking store work off the async executor.
    pub async fn with_conn<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Connection) -> crate::error::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = db::open(&path)?;
            f(&conn)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("worker panicked: {e}")))?
        .map_err(ApiError::from)
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/upload-csv-vectorstore/", post(handlers::upload))
        .route(
            "/financial-records/",
            get(handlers::list_records).delete(handlers::delete_records),
        )
        .route("/financial-indicators/", get(handlers::indicators))
        .route("/financial-trends/", get(handlers::trends))
        .route("/expense-distribution/", get(handlers::expense_distribution))
        .route("/expense-type-percentage/", get(handlers::expense_type_percentage))
        .route("/cash-flow/", get(handlers::cash_flow))
        .route("/financial-agent/", post(handlers::financial_agent))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, db = %state.db_path.display(), "caixa API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("server error")?;
    Ok(())
}
