//! HTTP trigger for migrations.
//!
//! `POST /` with `{"entity_type": "Account", "email": "user@example.com"}`
//! runs a scoped migration; without an entity type every file is migrated
//! into the root folder. The response carries the [`MigrationReport`].

use crate::error::{ErrorKind, Result};
use axum::extract::State;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, ORIGIN};
use axum::http::{HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use crosscloud_migrate::error::ErrorKind as MigrateErrorKind;
use crosscloud_migrate::{MigrationReport, Migrator};
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(Debug, Default, Deserialize)]
pub struct MigrateRequest {
    #[serde(default, alias = "sObject", alias = "sobject")]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Serialize)]
struct MigrateResponse {
    code: &'static str,
    report: MigrationReport,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "Not found",
            message: "Page not found".to_string(),
        }
    }
}

impl From<crosscloud_migrate::error::Error> for ApiError {
    fn from(err: crosscloud_migrate::error::Error) -> Self {
        let (status, code) = match &*err {
            MigrateErrorKind::InvalidEntityType(_) => (StatusCode::BAD_REQUEST, "Bad request"),
            MigrateErrorKind::SourceQuery
            | MigrateErrorKind::SourceDownload
            | MigrateErrorKind::FolderCreate(_)
            | MigrateErrorKind::DestinationUpload
            | MigrateErrorKind::Transfer { .. } => (StatusCode::BAD_GATEWAY, "Bad gateway"),
            MigrateErrorKind::DestinationInit => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        };
        if status.is_server_error() {
            tracing::error!(error = ?err, "Migration failed");
        } else {
            tracing::warn!(error = %*err, "Migration rejected");
        }
        Self {
            status,
            code,
            message: (*err).to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

async fn migrate(
    State(migrator): State<Arc<Migrator>>,
    Json(request): Json<MigrateRequest>,
) -> std::result::Result<Json<MigrateResponse>, ApiError> {
    let entity_type = request.entity_type.as_deref().filter(|entity_type| !entity_type.is_empty());
    let grantee = request.email.as_deref().filter(|email| !email.is_empty());
    let report = match entity_type {
        Some(entity_type) => migrator.migrate_by_entity_type(entity_type, grantee).await?,
        None => migrator.migrate_all(grantee).await?,
    };
    Ok(Json(MigrateResponse { code: "OK", report }))
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST])
        .allow_headers([ORIGIN, CONTENT_LENGTH, CONTENT_TYPE, HeaderName::from_static("x-access-token")])
        .expose_headers([CONTENT_LENGTH])
        .max_age(CORS_MAX_AGE)
}

pub fn router(migrator: Arc<Migrator>) -> Router {
    Router::new()
        .route("/", post(migrate))
        .method_not_allowed_fallback(not_found)
        .fallback(not_found)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(migrator)
}

pub async fn serve(bind: SocketAddr, migrator: Arc<Migrator>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await.or_raise(|| ErrorKind::Server)?;
    tracing::info!(address = %bind, "Listening");
    axum::serve(listener, router(migrator))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .or_raise(|| ErrorKind::Server)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
