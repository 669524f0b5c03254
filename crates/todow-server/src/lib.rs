//! Todow Server - to-do list API server
//!
//! HTTP API and web page over a single stored item collection.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod page;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use todow_core::{CollectionStore, Credentials, SqliteCollectionStore, StoreError, API_PATH};

use crate::config::ServerConfig;

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn CollectionStore>,
    pub credentials: Credentials,
}

impl AppState {
    pub fn new(store: Arc<dyn CollectionStore>, credentials: Credentials) -> Self {
        Self { store, credentials }
    }

    /// Open the SQLite store named by the config
    pub fn open(config: &ServerConfig) -> Result<Self, StoreError> {
        let store = SqliteCollectionStore::open(&config.db_path)?;
        tracing::info!("Opened item store at {:?}", config.db_path);
        Ok(Self::new(Arc::new(store), config.credentials.clone()))
    }

    /// Run a store operation on the blocking pool.
    ///
    /// Each store call is one engine transaction and may wait on the
    /// engine's write lock, so it stays off the async workers.
    pub async fn with_store<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn CollectionStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| StoreError::Storage(format!("store task failed: {}", e)))?
    }
}

/// Create the router
///
/// Basic auth wraps every route and the 404 fallback, so credentials are
/// checked before any routing or store decision is visible.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Web page
        .route("/", get(page::index).fallback(http::not_found))
        // Item API
        .route(
            API_PATH,
            get(http::all_items)
                .post(http::add_item)
                .fallback(http::not_found),
        )
        .route(
            &format!("{}{{id}}", API_PATH),
            delete(http::remove_item)
                .patch(http::complete_item)
                .fallback(http::not_found),
        )
        .fallback(http::not_found)
        // Middleware
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_basic_auth,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);
    serve_on(listener, state).await?;
    Ok(())
}

/// Serve on an already bound listener
pub async fn serve_on(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    axum::serve(listener, create_router(state)).await
}
