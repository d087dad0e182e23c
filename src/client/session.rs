use super::error::ClientError;
use crate::utils::validation::is_pdf_mime;
use bytes::Bytes;
use std::path::Path;

/// Message shown when the selected file is not declared as a PDF
pub const NOT_A_PDF: &str = "Please select a PDF file";

/// Where a session is in its compress cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    CompressingClient,
    CompressingServer,
    Done,
    Error,
}

/// A file picked by the user, with the type it was declared as
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub declared_type: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk and declares its type from the extension,
    /// sniffing the content only when there is no extension to go by.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let declared_type = declared_type_for(&name, &bytes);

        Ok(Self::new(name, declared_type, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_pdf(&self) -> bool {
        is_pdf_mime(&self.declared_type)
    }
}

/// Declared content type for a file, extension first
pub fn declared_type_for(name: &str, bytes: &[u8]) -> String {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    let sniffed = infer::get(bytes).map(|kind| kind.mime_type());

    match extension.as_deref() {
        Some("pdf") => mime::APPLICATION_PDF.to_string(),
        None => sniffed
            .unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref())
            .to_string(),
        Some(_) => sniffed
            .filter(|m| !is_pdf_mime(m))
            .unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref())
            .to_string(),
    }
}

/// Sizes and savings shown once a compress action completes
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionStats {
    pub original_size: u64,
    /// Size after the local pass, when one ran
    pub intermediate_size: Option<u64>,
    pub final_size: u64,
    pub ratio_percent: f64,
}

/// State of one user's upload, from selection through result.
#[derive(Debug)]
pub struct UploadSession {
    file: Option<SelectedFile>,
    stage: Stage,
    error: Option<String>,
    stats: Option<CompressionStats>,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadSession {
    pub fn new() -> Self {
        Self {
            file: None,
            stage: Stage::Idle,
            error: None,
            stats: None,
        }
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn stats(&self) -> Option<&CompressionStats> {
        self.stats.as_ref()
    }

    pub fn is_compressing(&self) -> bool {
        matches!(
            self.stage,
            Stage::CompressingClient | Stage::CompressingServer
        )
    }

    /// Whether the compress control should be enabled
    pub fn can_compress(&self) -> bool {
        self.file.is_some() && !self.is_compressing() && self.stats.is_none()
    }

    /// Replaces the selection. Anything not declared as a PDF is refused and
    /// leaves the session with no file.
    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), ClientError> {
        if self.is_compressing() {
            return Err(ClientError::Busy);
        }

        self.stats = None;

        if !file.is_pdf() {
            tracing::debug!("Rejected '{}' declared as {}", file.name, file.declared_type);
            self.file = None;
            self.stage = Stage::Error;
            self.error = Some(NOT_A_PDF.to_string());
            return Err(ClientError::Validation(NOT_A_PDF.to_string()));
        }

        self.file = Some(file);
        self.stage = Stage::Idle;
        self.error = None;
        Ok(())
    }

    /// Enters the first compressing stage and hands back the file to work on.
    /// Refused while another compress action is in flight.
    pub fn begin(&mut self, local_pass: bool) -> Result<SelectedFile, ClientError> {
        if self.is_compressing() {
            return Err(ClientError::Busy);
        }
        let file = self
            .file
            .clone()
            .ok_or_else(|| ClientError::Validation("No file selected".to_string()))?;

        self.error = None;
        self.stats = None;
        self.stage = if local_pass {
            Stage::CompressingClient
        } else {
            Stage::CompressingServer
        };
        Ok(file)
    }

    /// Local pass finished; the upload is next
    pub fn advance_to_server(&mut self) {
        if self.stage == Stage::CompressingClient {
            self.stage = Stage::CompressingServer;
        }
    }

    pub fn finish(&mut self, stats: CompressionStats) {
        self.stats = Some(stats);
        self.error = None;
        self.stage = Stage::Done;
    }

    pub fn fail(&mut self, error: &ClientError) {
        self.error = Some(error.user_message());
        self.stage = Stage::Error;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_file() -> SelectedFile {
        SelectedFile::new("report.pdf", "application/pdf", b"%PDF-1.5".to_vec())
    }

    fn stats() -> CompressionStats {
        CompressionStats {
            original_size: 100,
            intermediate_size: None,
            final_size: 60,
            ratio_percent: 40.0,
        }
    }

    #[test]
    fn test_select_pdf() {
        let mut session = UploadSession::new();
        session.select_file(pdf_file()).unwrap();

        assert_eq!(session.stage(), Stage::Idle);
        assert_eq!(session.file().unwrap().name, "report.pdf");
        assert!(session.can_compress());
    }

    #[test]
    fn test_select_non_pdf_is_rejected() {
        let mut session = UploadSession::new();
        session.select_file(pdf_file()).unwrap();
        session.begin(false).unwrap();
        session.finish(stats());

        let err = session
            .select_file(SelectedFile::new("notes.txt", "text/plain", b"hello".to_vec()))
            .unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(session.error(), Some(NOT_A_PDF));
        assert!(session.file().is_none());
        assert!(session.stats().is_none());
        assert!(!session.can_compress());
    }

    #[test]
    fn test_begin_guards_in_flight_request() {
        let mut session = UploadSession::new();
        session.select_file(pdf_file()).unwrap();

        session.begin(true).unwrap();
        assert_eq!(session.stage(), Stage::CompressingClient);
        assert!(session.is_compressing());
        assert!(!session.can_compress());

        assert!(matches!(session.begin(true), Err(ClientError::Busy)));
        assert!(matches!(session.select_file(pdf_file()), Err(ClientError::Busy)));

        session.advance_to_server();
        assert_eq!(session.stage(), Stage::CompressingServer);
    }

    #[test]
    fn test_begin_without_file() {
        let mut session = UploadSession::new();
        assert!(matches!(session.begin(false), Err(ClientError::Validation(_))));
        assert_eq!(session.stage(), Stage::Idle);
    }

    #[test]
    fn test_finish_and_reset() {
        let mut session = UploadSession::new();
        session.select_file(pdf_file()).unwrap();
        session.begin(false).unwrap();
        session.finish(stats());

        assert_eq!(session.stage(), Stage::Done);
        assert_eq!(session.stats().unwrap().final_size, 60);
        assert!(!session.can_compress());

        session.reset();
        assert_eq!(session.stage(), Stage::Idle);
        assert!(session.file().is_none());
        assert!(session.stats().is_none());
        assert!(session.error().is_none());
    }

    #[test]
    fn test_fail_records_user_message() {
        let mut session = UploadSession::new();
        session.select_file(pdf_file()).unwrap();
        session.begin(false).unwrap();
        session.fail(&ClientError::Network("connection refused".to_string()));

        assert_eq!(session.stage(), Stage::Error);
        assert_eq!(session.error(), Some("An error occurred"));
        // A failed attempt can be retried by the user
        assert!(session.can_compress());
    }

    #[test]
    fn test_declared_type_for() {
        assert_eq!(declared_type_for("a.pdf", b""), "application/pdf");
        assert_eq!(declared_type_for("A.PDF", b"not really"), "application/pdf");
        assert_eq!(declared_type_for("scan", b"%PDF-1.7\n"), "application/pdf");
        assert_eq!(
            declared_type_for("notes.txt", b"%PDF-1.7\n"),
            "application/octet-stream"
        );
        assert_eq!(declared_type_for("blob", b"\x00\x01"), "application/octet-stream");
    }
}
