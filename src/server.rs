//! HTTP routes.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use iiifman_cache::{MANIFEST_CONTENT_TYPE, RequestFlags};
use iiifman_config::Config;
use iiifman_service::Service;
use iiifman_service::error::{Error, ErrorKind};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone)]
pub struct AppState {
    service: Arc<Service>,
    config: Arc<Config>,
}

impl AppState {
    pub fn new(service: Service, config: Arc<Config>) -> Self {
        Self { service: Arc::new(service), config }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .route("/version", get(version))
        .route("/healthcheck", get(healthcheck))
        .route("/config", get(config))
        .route("/pid/{pid}", get(manifest))
        .route("/pid/{pid}/manifest.json", get(manifest))
        .route("/pid/{pid}/exist", get(exist))
        .route("/api/aries", get(|| async { "IIIF Manifest Service Aries API" }))
        .route("/api/aries/{id}", get(aries_lookup))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A service error rendered as a plain-text response.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(target: "iiifman::http", status = status.as_u16(), error = ?self.0, "request failed");
        } else {
            tracing::info!(target: "iiifman::http", status = status.as_u16(), error = %self.0, "request rejected");
        }
        (status, (*self.0).to_string()).into_response()
    }
}

/// Manifest query parameters, kept as text so that they can be validated here.
#[derive(Debug, Default, Deserialize)]
pub struct ManifestQuery {
    unit: Option<String>,
    nocache: Option<String>,
    refresh: Option<String>,
}

impl ManifestQuery {
    /// An empty or zero `unit` means no unit. Unreadable booleans are false.
    fn flags(&self) -> Result<RequestFlags, ApiError> {
        let unit = match self.unit.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(unit) => match unit.parse::<u32>() {
                Ok(0) => None,
                Ok(unit) => Some(unit),
                Err(_) => return Err(Error::from(ErrorKind::BadRequest(format!("invalid unit {unit}"))).into()),
            },
        };
        Ok(RequestFlags { unit, nocache: parse_bool(self.nocache.as_deref()), refresh: parse_bool(self.refresh.as_deref()) })
    }
}

fn parse_bool(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "t" | "T" | "true" | "TRUE" | "True"))
}

async fn banner() -> String {
    format!("IIIF Manifest Service version {VERSION}")
}

async fn version() -> Json<serde_json::Value> {
    Json(json!({
        "version": VERSION,
        "build": option_env!("IIIFMAN_BUILD").unwrap_or("unknown"),
    }))
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "iiifman": { "healthy": true } }))
}

async fn config(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = &state.config;
    Json(json!({
        "service_host": config.service_url,
        "tracksys": config.tracksys_url,
        "iiif": config.iiif_url,
        "classifier": config.classifier,
        "cache": config.cache_enabled(),
    }))
}

async fn manifest(
    State(state): State<AppState>,
    Path(pid): Path<String>,
    Query(query): Query<ManifestQuery>,
) -> Result<Response, ApiError> {
    let flags = query.flags()?;
    let manifest = state.service.manifest(&pid, flags).await?;
    tracing::info!(target: "iiifman::http", pid = %pid, source = ?manifest.source, "manifest served");
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(MANIFEST_CONTENT_TYPE)),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        manifest.body,
    )
        .into_response())
}

async fn exist(State(state): State<AppState>, Path(pid): Path<String>) -> Json<serde_json::Value> {
    let existence = state.service.exists(&pid).await;
    match existence.url {
        Some(url) => Json(json!({ "exists": existence.exists, "cached": existence.cached, "url": url })),
        None => Json(json!({ "exists": existence.exists, "cached": existence.cached })),
    }
}

async fn aries_lookup(State(state): State<AppState>, Path(id): Path<String>) -> (StatusCode, String) {
    if state.service.identify(&id).await {
        (StatusCode::OK, format!("IIIF Manifest Service Aries API Lookup {id}"))
    } else {
        (StatusCode::NOT_FOUND, format!("id {id} not found"))
    }
}
