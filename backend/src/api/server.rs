//! HTTP server for curriculum imports.
//!
//! Persistence is not done here: the upload screen forwards `payload` to the
//! bulk upsert collaborator itself.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | POST   | `/api/import`     | Upload CSV/XLSX, returns payload     |
//! | POST   | `/api/inspect`    | Upload CSV/XLSX, returns columns     |
//! | GET    | `/api/template`   | Download the import template         |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{error_response, ImportResponse, InspectResponse};
use crate::config::AppConfig;
use crate::error::{ContextError, ImportError, PipelineError, ServerError};
use crate::parser::template_csv;
use crate::transform::pipeline::{import_bytes, inspect_bytes, ImportOptions};

type ApiError = (StatusCode, Json<Value>);

/// Build the router for a configuration.
pub fn router(config: AppConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let limit = config.max_upload_bytes;

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/import", post(import_upload))
        .route("/api/inspect", post(inspect_upload))
        .route("/api/template", get(download_template))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(limit))
        .layer(cors)
        .with_state(Arc::new(config))
}

/// Start the HTTP server
pub async fn start_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let port = config.port;
    let app = router(config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Curriculum import server running on http://localhost:{}", port);
    println!("   POST /api/import   - Upload CSV/XLSX file");
    println!("   POST /api/inspect  - Inspect CSV/XLSX columns");
    println!("   GET  /api/template - Import template");
    println!("   GET  /api/logs     - SSE log stream");
    println!("   GET  /health       - Health check");
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "curriculum-import",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "import": "POST /api/import",
            "inspect": "POST /api/inspect",
            "template": "GET /api/template",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers drop entries rather than the connection
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn download_template() -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"modelo-importacao.csv\"",
            ),
        ],
        template_csv(),
    )
        .into_response()
}

/// Fields of an upload form.
#[derive(Debug, Default)]
struct UploadForm {
    file_name: Option<String>,
    file_data: Option<Vec<u8>>,
    course_id: Option<String>,
    discipline: Option<String>,
    front: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ServerError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                form.file_name = field.file_name().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                form.file_data = Some(bytes.to_vec());
            }
            "courseId" | "discipline" | "front" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                let value = Some(text).filter(|t| !t.trim().is_empty());
                match name.as_str() {
                    "courseId" => form.course_id = value,
                    "discipline" => form.discipline = value,
                    _ => form.front = value,
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn import_upload(
    State(config): State<Arc<AppConfig>>,
    multipart: Multipart,
) -> Result<Json<ImportResponse>, ApiError> {
    let form = read_form(multipart).await.map_err(to_api_error)?;
    let bytes = form
        .file_data
        .ok_or_else(|| to_api_error(ServerError::BadRequest("No file provided".into())))?;
    let file_name = form.file_name.unwrap_or_default();

    println!("\n{}", "=".repeat(70));
    println!("📄 NEW IMPORT: {} ({} bytes)", file_name, bytes.len());
    println!("{}\n", "=".repeat(70));

    let options = ImportOptions {
        course_id: form.course_id,
        discipline: form.discipline,
        front: form.front,
        ..config.import_options()
    };

    let report = tokio::task::spawn_blocking(move || import_bytes(&bytes, &file_name, &options))
        .await
        .map_err(|e| to_api_error(ServerError::Internal(e.to_string())))?
        .map_err(|e| {
            log_error(e.to_string());
            to_api_error(ServerError::Pipeline(e))
        })?;

    println!("\n{}", "=".repeat(70));
    println!("📊 SUMMARY");
    println!("{}", "=".repeat(70));
    println!("   Modules:  {}", report.modules.len());
    println!("   Lessons:  {}", report.payload.content.len());
    println!("   Skipped:  {}", report.skipped.len());
    println!("   Invalid:  {}", report.invalid_count);
    println!("{}\n", "=".repeat(70));

    Ok(Json(ImportResponse::from(report)))
}

async fn inspect_upload(
    State(config): State<Arc<AppConfig>>,
    multipart: Multipart,
) -> Result<Json<InspectResponse>, ApiError> {
    let form = read_form(multipart).await.map_err(to_api_error)?;
    let bytes = form
        .file_data
        .ok_or_else(|| to_api_error(ServerError::BadRequest("No file provided".into())))?;
    let file_name = form.file_name.unwrap_or_default();

    let inspection =
        tokio::task::spawn_blocking(move || inspect_bytes(&bytes, &file_name, &config.aliases))
            .await
            .map_err(|e| to_api_error(ServerError::Internal(e.to_string())))?
            .map_err(|e| to_api_error(ServerError::Pipeline(e)))?;

    Ok(Json(InspectResponse::from(inspection)))
}

/// Status code for an error.
pub fn status_for(error: &ServerError) -> StatusCode {
    match error {
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServerError::Pipeline(PipelineError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        ServerError::Pipeline(PipelineError::UnsupportedFormat(_)) => {
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        }
        ServerError::Pipeline(PipelineError::Context(
            ContextError::DisciplineMismatch { .. } | ContextError::FrontMismatch { .. },
        )) => StatusCode::CONFLICT,
        ServerError::Pipeline(PipelineError::Import(ImportError::Malformed(_))) => {
            StatusCode::BAD_REQUEST
        }
        ServerError::Pipeline(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn to_api_error(error: ServerError) -> ApiError {
    (status_for(&error), Json(error_response(&error.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&ServerError::BadRequest("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&PipelineError::UnsupportedFormat("a.txt".into()).into()),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            status_for(&PipelineError::NoLessons.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&PipelineError::Import(ImportError::MissingColumns(vec![])).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(
                &PipelineError::Context(ContextError::FrontMismatch {
                    selected: "A".into(),
                    file: "B".into(),
                })
                .into()
            ),
            StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn test_template_response_headers() {
        let response = download_template().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
    }

    #[test]
    fn test_router_builds() {
        let _ = router(AppConfig::default());
    }
}
