//! HTTP dispatcher for the store's operation surface.
//!
//! Every operation is a GET route with query-string parameters and a JSON
//! response body. Requests are isolated: a failing operation maps to a
//! status code and never takes the listener down.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::{Result, StoreError};
use crate::label::LabelResolver;
use crate::ops::{OpError, Operation};
use crate::store::Store;

/// Shared state behind every handler.
pub struct AppState {
    /// The open store.
    pub store: Arc<Store>,
    /// Label resolver over the same store.
    pub resolver: LabelResolver,
}

impl AppState {
    /// Wires a resolver over `store`.
    pub fn new(store: Arc<Store>) -> Result<Self> {
        let resolver = LabelResolver::new(store.clone())?;
        Ok(Self { store, resolver })
    }
}

/// Routes every dispatcher operation onto one shared handler.
pub fn router(state: Arc<AppState>) -> Router {
    let routes = [
        "/query",
        "/sources",
        "/add",
        "/del",
        "/count",
        "/info",
        "/node",
        "/literal",
        "/load",
        "/addNamespace",
        "/delNamespace",
        "/expand",
        "/reverseExpand",
        "/values",
        "/label",
    ];
    let mut router = Router::new();
    for route in routes {
        router = router.route(route, get(dispatch));
    }
    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET])
                .allow_origin(Any),
        )
}

/// Binds `addr` and serves until ctrl-c.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "dispatcher listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}

async fn dispatch(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    let operation = Operation::parse(uri.path(), &params)?;
    let result = tokio::task::spawn_blocking(move || {
        operation.execute(&state.store, &state.resolver)
    })
    .await
    .map_err(|e| ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: format!("operation panicked: {e}"),
    })??;
    Ok(Json(result))
}

/// A request-scoped failure, rendered as a JSON error body.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, message = %self.message, "request failed");
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<OpError> for ApiError {
    fn from(err: OpError) -> Self {
        let status = match err {
            OpError::UnknownOperation(_) => StatusCode::NOT_FOUND,
            OpError::MissingParam(_) | OpError::InvalidParam { .. } => StatusCode::BAD_REQUEST,
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = match err {
            StoreError::NotFound(_) | StoreError::UnknownPrefix(_) => StatusCode::NOT_FOUND,
            StoreError::MalformedQName(_) | StoreError::InvalidArgument(_) => {
                StatusCode::BAD_REQUEST
            }
            StoreError::Fetch { .. } => StatusCode::BAD_GATEWAY,
            StoreError::Parse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::CyclicLabel(_) | StoreError::Sqlite(_) | StoreError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}
