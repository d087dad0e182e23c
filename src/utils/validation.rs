use std::path::Path;

/// The only content type the compressor accepts
pub const PDF_MIME: &str = "application/pdf";

/// Name used when an upload carries no usable filename
pub const FALLBACK_FILENAME: &str = "document.pdf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Lowercased essence of a content type, parameters stripped
pub fn normalize_mime(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

pub fn is_pdf_mime(content_type: &str) -> bool {
    normalize_mime(content_type) == PDF_MIME
}

/// Validates the declared content type of an upload
pub fn validate_pdf_content_type(content_type: Option<&str>) -> Result<(), ValidationError> {
    match content_type {
        Some(ct) if is_pdf_mime(ct) => Ok(()),
        _ => Err(ValidationError {
            code: "INVALID_MIME_TYPE",
            message: "File must be a PDF".to_string(),
        }),
    }
}

/// Validates payload size against a ceiling
pub fn validate_file_size(size: usize, max_size: usize) -> Result<(), ValidationError> {
    if size > max_size {
        return Err(ValidationError {
            code: "FILE_TOO_LARGE",
            message: format!(
                "File size {} bytes exceeds maximum allowed {} bytes ({} MB)",
                size,
                max_size,
                max_size / 1024 / 1024
            ),
        });
    }
    Ok(())
}

/// Sanitizes a client-supplied filename so it is safe to echo in a header
/// or to join onto an output directory.
pub fn sanitize_filename(filename: &str) -> String {
    // Only the last path component survives
    let name = filename.rsplit(['/', '\\']).next().unwrap_or("");
    let name = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path components stripped from filename: {}", filename);
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || c == ':'
                || c == '*'
                || c == '?'
                || c == '"'
                || c == '<'
                || c == '>'
                || c == '|'
                || c == ';'
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Limit length safely for UTF-8
    let sanitized = if sanitized.len() > 255 {
        let mut end = 255;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized[..end].to_string()
    } else {
        sanitized
    };

    let trimmed = sanitized.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        return FALLBACK_FILENAME.to_string();
    }

    trimmed.to_string()
}

/// Name a compressed download is offered under
pub fn compressed_filename(original: &str) -> String {
    format!("compressed_{}", original)
}
