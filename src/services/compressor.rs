use crate::config::ServerConfig;
use crate::utils::format::{compression_ratio, format_ratio};
use lopdf::{Dictionary, Document, Object, SaveOptions};
use thiserror::Error;

/// Info dictionary entries blanked on every pass
pub const METADATA_FIELDS: [&str; 6] = [
    "Title", "Author", "Subject", "Keywords", "Producer", "Creator",
];

#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("Failed to load PDF: {0}")]
    Load(#[source] lopdf::Error),

    #[error("PDF requires a password to open")]
    PasswordProtected,

    #[error("Failed to save PDF: {0}")]
    Save(#[source] std::io::Error),

    #[error("Compression task failed: {0}")]
    Task(String),
}

/// Knobs for a single load/save pass
#[derive(Debug, Clone, Copy)]
pub struct CompressionOptions {
    pub max_objects_per_stream: usize,
    pub prune_objects: bool,
    pub compress_streams: bool,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_objects_per_stream: 100,
            prune_objects: true,
            compress_streams: true,
        }
    }
}

impl From<&ServerConfig> for CompressionOptions {
    fn from(config: &ServerConfig) -> Self {
        Self {
            max_objects_per_stream: config.max_objects_per_stream,
            prune_objects: config.prune_objects,
            compress_streams: config.compress_streams,
        }
    }
}

/// Output of one compression pass
#[derive(Debug, Clone)]
pub struct CompressionResult {
    pub bytes: Vec<u8>,
    pub original_size: u64,
    pub compressed_size: u64,
    pub ratio_percent: f64,
}

impl CompressionResult {
    pub fn ratio_header(&self) -> String {
        format_ratio(self.ratio_percent)
    }
}

/// Re-serializes PDFs with metadata stripped and object streams enabled.
///
/// Each call owns its own `Document`; nothing is shared between calls, so a
/// single compressor can serve any number of concurrent requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfCompressor {
    options: CompressionOptions,
}

impl PdfCompressor {
    pub fn new(options: CompressionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CompressionOptions {
        self.options
    }

    pub fn compress(&self, input: &[u8]) -> Result<CompressionResult, CompressionError> {
        if input.is_empty() {
            return Err(CompressionError::EmptyInput);
        }

        let mut doc = Document::load_mem(input).map_err(CompressionError::Load)?;

        // lopdf drops /Encrypt once the empty password opens the file
        if doc.is_encrypted() {
            return Err(CompressionError::PasswordProtected);
        }
        if doc.was_encrypted() {
            tracing::warn!("🔒 Encrypted PDF accepted as-is ({} bytes)", input.len());
        }

        clear_metadata(&mut doc);

        if self.options.prune_objects {
            let pruned = doc.prune_objects();
            if !pruned.is_empty() {
                tracing::debug!("Pruned {} unreachable objects", pruned.len());
            }
        }

        if self.options.compress_streams {
            doc.compress();
        }

        let save_options = SaveOptions::builder()
            .use_object_streams(true)
            .use_xref_streams(true)
            .max_objects_per_stream(self.options.max_objects_per_stream)
            .build();

        let mut bytes = Vec::with_capacity(input.len());
        doc.save_with_options(&mut bytes, save_options)
            .map_err(CompressionError::Save)?;

        let original_size = input.len() as u64;
        let compressed_size = bytes.len() as u64;
        let ratio_percent = compression_ratio(original_size, compressed_size);

        tracing::info!(
            original_size,
            compressed_size,
            ratio = %format_ratio(ratio_percent),
            "📦 PDF compressed"
        );

        Ok(CompressionResult {
            bytes,
            original_size,
            compressed_size,
            ratio_percent,
        })
    }

    /// Runs [`PdfCompressor::compress`] on the blocking pool.
    pub async fn compress_blocking(
        &self,
        input: bytes::Bytes,
    ) -> Result<CompressionResult, CompressionError> {
        let compressor = *self;
        tokio::task::spawn_blocking(move || compressor.compress(&input))
            .await
            .map_err(|e| CompressionError::Task(e.to_string()))?
    }
}

/// Blanks the six descriptive Info entries, creating the Info dictionary
/// when the trailer has none.
pub fn clear_metadata(doc: &mut Document) {
    let info_ref = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| obj.as_reference().ok());

    if let Some(id) = info_ref {
        if let Ok(info) = doc.get_object_mut(id).and_then(Object::as_dict_mut) {
            blank_fields(info);
            return;
        }
    }

    if let Ok(info) = doc
        .trailer
        .get_mut(b"Info")
        .and_then(Object::as_dict_mut)
    {
        blank_fields(info);
        return;
    }

    let mut info = Dictionary::new();
    blank_fields(&mut info);
    let id = doc.add_object(info);
    doc.trailer.set("Info", id);
}

fn blank_fields(info: &mut Dictionary) {
    for field in METADATA_FIELDS {
        info.set(field, Object::string_literal(""));
    }
}
