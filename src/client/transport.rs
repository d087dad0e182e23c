use super::error::{COMPRESSION_FAILED, ClientError};
use crate::config::ClientConfig;
use crate::models::{ErrorBody, FILE_FIELD, X_COMPRESSED_SIZE, X_COMPRESSION_RATIO, X_ORIGINAL_SIZE};
use axum::http::{HeaderMap, HeaderName};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use std::str::FromStr;

/// A successful reply from the compression endpoint
#[derive(Debug, Clone)]
pub struct ServerReply {
    pub body: Bytes,
    pub original_size: Option<u64>,
    pub compressed_size: Option<u64>,
    pub ratio_percent: Option<f64>,
}

impl ServerReply {
    pub fn from_parts(headers: &HeaderMap, body: Bytes) -> Self {
        Self {
            original_size: parse_header(headers, &X_ORIGINAL_SIZE),
            compressed_size: parse_header(headers, &X_COMPRESSED_SIZE),
            ratio_percent: parse_header(headers, &X_COMPRESSION_RATIO),
            body,
        }
    }
}

fn parse_header<T: FromStr>(headers: &HeaderMap, name: &HeaderName) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Sends a PDF to the compression endpoint
#[async_trait::async_trait]
pub trait CompressTransport: Send + Sync {
    async fn submit(
        &self,
        filename: &str,
        declared_type: &str,
        bytes: Bytes,
    ) -> Result<ServerReply, ClientError>;
}

/// Multipart upload over HTTP
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.endpoint())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl CompressTransport for HttpTransport {
    async fn submit(
        &self,
        filename: &str,
        declared_type: &str,
        bytes: Bytes,
    ) -> Result<ServerReply, ClientError> {
        let part = Part::bytes(bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str(declared_type)
            .map_err(|e| ClientError::Validation(e.to_string()))?;
        let form = Form::new().part(FILE_FIELD, part);

        tracing::debug!("Uploading '{}' to {}", filename, self.endpoint);

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| {
                    if let Some(details) = &body.details {
                        tracing::debug!("Server error details: {}", details);
                    }
                    body.error
                })
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| COMPRESSION_FAILED.to_string());

            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(ServerReply::from_parts(&headers, body))
    }
}
