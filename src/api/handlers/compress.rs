use crate::AppState;
use crate::api::error::{AppError, ErrorResponse};
use crate::models::{FILE_FIELD, X_COMPRESSED_SIZE, X_COMPRESSION_RATIO, X_ORIGINAL_SIZE};
use crate::utils::validation::{
    FALLBACK_FILENAME, PDF_MIME, compressed_filename, sanitize_filename,
    validate_pdf_content_type,
};
use axum::{
    extract::{Multipart, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

struct Upload {
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

#[utoipa::path(
    post,
    path = "/api/compress",
    request_body(content = crate::models::CompressForm, content_type = "multipart/form-data", description = "PDF upload"),
    responses(
        (status = 200, description = "Compressed PDF bytes (application/pdf)",
            headers(
                ("X-Original-Size" = u64, description = "Size of the upload in bytes"),
                ("X-Compressed-Size" = u64, description = "Size of the response body in bytes"),
                ("X-Compression-Ratio" = String, description = "Percentage saved, two decimals")
            )
        ),
        (status = 400, description = "Missing file or not a PDF", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 500, description = "PDF could not be processed", body = ErrorResponse)
    ),
    tag = "compress"
)]
pub async fn compress_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(sanitize_filename)
            .unwrap_or_else(|| FALLBACK_FILENAME.to_string());
        let content_type = field.content_type().map(|s| s.to_string());
        let data = field.bytes().await.map_err(multipart_error)?;

        upload = Some(Upload {
            filename,
            content_type,
            data,
        });
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
    validate_pdf_content_type(upload.content_type.as_deref())?;

    tracing::info!(
        "🗜️  Compressing '{}' ({} bytes)",
        upload.filename,
        upload.data.len()
    );

    let result = state.compressor.compress_blocking(upload.data).await?;

    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, PDF_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&upload.filename),
            ),
            (X_ORIGINAL_SIZE, result.original_size.to_string()),
            (X_COMPRESSED_SIZE, result.compressed_size.to_string()),
            (X_COMPRESSION_RATIO, result.ratio_header()),
        ],
        result.bytes,
    )
        .into_response();

    Ok(response)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// `attachment` disposition naming `compressed_<filename>`, with an ASCII
/// fallback and an RFC 5987 UTF-8 form.
pub fn content_disposition(filename: &str) -> String {
    let ascii_filename = filename
        .chars()
        .filter(|c| c.is_ascii() && !c.is_control() && *c != '"' && *c != '\\' && *c != ';')
        .collect::<String>();
    let fallback_filename = if ascii_filename.trim().is_empty() {
        FALLBACK_FILENAME
    } else {
        &ascii_filename
    };

    let download_name = compressed_filename(filename);
    let encoded_filename = utf8_percent_encode(&download_name, NON_ALPHANUMERIC).to_string();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        compressed_filename(fallback_filename),
        encoded_filename
    )
}
