use axum::http::HeaderName;
use serde::Deserialize;
use utoipa::ToSchema;

/// Multipart field carrying the uploaded PDF
pub const FILE_FIELD: &str = "file";

pub const X_ORIGINAL_SIZE: HeaderName = HeaderName::from_static("x-original-size");
pub const X_COMPRESSED_SIZE: HeaderName = HeaderName::from_static("x-compressed-size");
pub const X_COMPRESSION_RATIO: HeaderName = HeaderName::from_static("x-compression-ratio");

/// Multipart body accepted by `POST /api/compress`
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct CompressForm {
    /// PDF document, declared as `application/pdf`
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Error body as a client reads it back
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub details: Option<String>,
}
