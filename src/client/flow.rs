use super::error::ClientError;
use super::session::{CompressionStats, SelectedFile, UploadSession};
use super::transport::{CompressTransport, ServerReply};
use crate::config::ClientConfig;
use crate::services::compressor::PdfCompressor;
use crate::utils::format::compression_ratio;
use crate::utils::validation::{compressed_filename, validate_file_size};
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;

/// Where a finished compress action left its output
#[derive(Debug, Clone)]
pub struct Download {
    pub path: PathBuf,
    pub stats: CompressionStats,
}

/// Drives one compress action: optional local pass, upload, stats, download.
pub struct CompressFlow {
    transport: Arc<dyn CompressTransport>,
    compressor: PdfCompressor,
    config: ClientConfig,
}

impl CompressFlow {
    pub fn new(config: ClientConfig, transport: Arc<dyn CompressTransport>) -> Self {
        Self {
            transport,
            compressor: PdfCompressor::default(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Runs the selected file through the pipeline. Every failure is terminal
    /// for this attempt and is recorded on the session.
    pub async fn run(&self, session: &mut UploadSession) -> Result<Download, ClientError> {
        let file = session.begin(self.config.local_pass)?;

        match self.execute(session, &file).await {
            Ok(download) => {
                session.finish(download.stats.clone());
                Ok(download)
            }
            Err(e) => {
                tracing::warn!("Compression of '{}' failed: {}", file.name, e);
                session.fail(&e);
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        session: &mut UploadSession,
        file: &SelectedFile,
    ) -> Result<Download, ClientError> {
        let mut payload = file.bytes.clone();
        let mut intermediate_size = None;

        if self.config.local_pass {
            let local = self.compressor.compress_blocking(payload).await?;

            validate_file_size(local.bytes.len(), self.config.upload_ceiling).map_err(|_| {
                ClientError::SizeExceeded {
                    size: local.compressed_size,
                    limit: self.config.upload_ceiling as u64,
                }
            })?;

            tracing::info!(
                "Local pass: {} -> {} bytes",
                local.original_size,
                local.compressed_size
            );
            intermediate_size = Some(local.compressed_size);
            payload = Bytes::from(local.bytes);
            session.advance_to_server();
        }

        let reply = self
            .transport
            .submit(&file.name, &file.declared_type, payload)
            .await?;

        let stats = self.stats_for(file, intermediate_size, &reply);
        let path = self.save_download(&file.name, &reply.body).await?;

        Ok(Download { path, stats })
    }

    fn stats_for(
        &self,
        file: &SelectedFile,
        intermediate_size: Option<u64>,
        reply: &ServerReply,
    ) -> CompressionStats {
        let final_size = reply
            .compressed_size
            .unwrap_or(reply.body.len() as u64);

        // After a local pass the server's sizes are relative to the intermediate upload
        if intermediate_size.is_some() {
            let original_size = file.size();
            return CompressionStats {
                original_size,
                intermediate_size,
                final_size,
                ratio_percent: compression_ratio(original_size, final_size),
            };
        }

        let original_size = reply.original_size.unwrap_or(file.size());
        CompressionStats {
            original_size,
            intermediate_size: None,
            final_size,
            ratio_percent: reply
                .ratio_percent
                .unwrap_or_else(|| compression_ratio(original_size, final_size)),
        }
    }

    async fn save_download(&self, selected_name: &str, body: &[u8]) -> Result<PathBuf, ClientError> {
        let dir = PathBuf::from(&self.config.output_dir);
        tokio::fs::create_dir_all(&dir).await?;

        // Directory parts are dropped; the name itself is kept verbatim
        let name = selected_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(selected_name);
        let path = dir.join(compressed_filename(name));
        tokio::fs::write(&path, body).await?;

        tracing::info!("💾 Saved {}", path.display());
        Ok(path)
    }
}
