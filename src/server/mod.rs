//! HTTP serving layer: exposes a built [`Schema`] at a fixed endpoint path.

use crate::query::{Request, Response as QueryResponse, Schema};
use crate::utils::error::{CatalogError, Result};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    schema: Arc<Schema>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRequest {
    pub query: String,
    /// JSON-encoded variables object
    pub variables: Option<String>,
    pub operation_name: Option<String>,
}

pub fn create_router(schema: Arc<Schema>, graphql_path: &str) -> Router {
    Router::new()
        .route(graphql_path, get(graphql_get).post(graphql_post))
        .with_state(AppState { schema })
}

async fn graphql_get(State(state): State<AppState>, Query(params): Query<GetRequest>) -> Response {
    let variables = match params.variables.as_deref() {
        None | Some("") => None,
        Some(raw) => match serde_json::from_str::<Map<String, Value>>(raw) {
            Ok(variables) => Some(variables),
            Err(e) => {
                let error = CatalogError::InvalidArgument {
                    field: "request".to_string(),
                    argument: "variables".to_string(),
                    reason: e.to_string(),
                };
                return (StatusCode::BAD_REQUEST, Json(error_body(&error))).into_response();
            }
        },
    };

    let request = Request {
        query: params.query,
        variables,
        operation_name: params.operation_name,
    };
    Json(run(&state, &request).await).into_response()
}

async fn graphql_post(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Request>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(request)) => Json(run(&state, &request).await).into_response(),
        Err(rejection) => {
            // same body shape as a malformed GET, keeping axum's status code
            let error = CatalogError::InvalidArgument {
                field: "request".to_string(),
                argument: "body".to_string(),
                reason: rejection.body_text(),
            };
            tracing::debug!(error = %error, "Request body rejected");
            (rejection.status(), Json(error_body(&error))).into_response()
        }
    }
}

async fn run(state: &AppState, request: &Request) -> QueryResponse {
    let started = Instant::now();
    let response = state.schema.execute(request).await;

    tracing::info!(
        operation = request.operation_name.as_deref().unwrap_or("<anonymous>"),
        errors = response.errors.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Query served"
    );
    response
}

fn error_body(error: &CatalogError) -> Value {
    serde_json::json!({
        "data": null,
        "errors": [{
            "message": error.to_string(),
            "extensions": {"code": error.code()},
        }],
    })
}

/// Serves `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| CatalogError::ServerError {
            message: e.to_string(),
        })
}

pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
