use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use suggest_core::{SuggestError, SuggestRequest, SuggestService};
use tower_http::cors::{Any, CorsLayer};

type AppState = Arc<SuggestService>;

pub fn router(service: SuggestService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/ping", get(ping))
        .route("/api/suggest", post(suggest))
        .with_state(Arc::new(service))
        .layer(cors)
}

pub async fn run(service: SuggestService, port: u16) -> anyhow::Result<()> {
    let app = router(service);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", port);
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}

async fn ping() -> Json<serde_json::Value> {
    Json(json!({"message": "pong"}))
}

async fn suggest(
    State(service): State<AppState>,
    payload: Result<Json<SuggestRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match service.suggest(&request).await {
        Ok(suggestion) => Json(suggestion).into_response(),
        Err(err) => error_response(status_for(&err), err.to_string()),
    }
}

fn status_for(err: &SuggestError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!(error = %err, "Suggest request failed");
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({"error": message}))).into_response()
}
