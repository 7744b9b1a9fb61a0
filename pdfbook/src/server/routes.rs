//! Request handlers for the upload service.
//!
//! Endpoints:
//! - GET / - HTML upload form
//! - GET /health - liveness check
//! - POST /process-pdf - append a blank page to the uploaded PDF

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use tokio::task;

use crate::append::append_blank_bytes;
use crate::config::ServerConfig;

/// Multipart field carrying the uploaded document.
pub const FILE_FIELD: &str = "file";

/// Filename announced in the `Content-Disposition` of a processed PDF.
pub const PROCESSED_FILENAME: &str = "processed.pdf";

const UPLOAD_FORM: &str = r#"<!doctype html>
<html>
  <head><title>pdfbook</title></head>
  <body>
    <h1>Append a blank page</h1>
    <form action="/process-pdf" method="post" enctype="multipart/form-data">
      <input type="file" name="file" accept="application/pdf">
      <button type="submit">Process</button>
    </form>
  </body>
</html>
"#;

/// Errors a request can end in. The body is the plain message.
#[derive(Debug)]
pub enum ApiError {
    /// The form has no `file` field.
    NoFile,
    /// The `file` field has an empty filename.
    NoSelectedFile,
    /// The request body could not be read as multipart.
    BadUpload(String),
    /// Processing the document failed.
    Processing(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NoFile | Self::NoSelectedFile | Self::BadUpload(_) => StatusCode::BAD_REQUEST,
            Self::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::NoFile => "No file uploaded".to_string(),
            Self::NoSelectedFile => "No selected file".to_string(),
            Self::BadUpload(reason) => format!("Failed to read upload: {reason}"),
            Self::Processing(reason) => reason.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), self.message()).into_response()
    }
}

/// Build the router for `config`.
pub fn router(config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(upload_form))
        .route("/health", get(health))
        .route("/process-pdf", post(process_pdf))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
}

async fn upload_form() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

async fn health() -> &'static str {
    "ok"
}

/// POST /process-pdf
///
/// Returns the uploaded document with one blank page appended.
async fn process_pdf(multipart: Multipart) -> Result<Response, ApiError> {
    let upload = read_upload(multipart).await?;
    log::debug!("Received upload of {} bytes", upload.len());

    let processed = task::spawn_blocking(move || append_blank_bytes(&upload))
        .await
        .map_err(|e| ApiError::Processing(format!("Processing task failed: {e}")))?
        .map_err(|e| {
            log::warn!("Failed to process upload: {e}");
            ApiError::Processing(e.to_string())
        })?;

    log::info!("Processed upload ({} bytes out)", processed.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{PROCESSED_FILENAME}\""),
            ),
        ],
        processed,
    )
        .into_response())
}

/// Pull the bytes of the `file` field out of the form.
async fn read_upload(mut multipart: Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        match field.file_name() {
            None => continue,
            Some("") => return Err(ApiError::NoSelectedFile),
            Some(_) => {}
        }

        return field
            .bytes()
            .await
            .map_err(|e| ApiError::BadUpload(e.to_string()));
    }

    Err(ApiError::NoFile)
}
