use super::error::FetchError;
use crate::access::{AccessBroker, AccessOperation};
use crate::attachments::Attachment;
use crate::blob::{BlobDownloader, DownloadError};
use crate::observability::TransferMetrics;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, instrument, warn};

/// Fetches registered attachments onto local disk
pub struct AttachmentFetcher {
    broker: Arc<dyn AccessBroker>,
    downloader: BlobDownloader,
    container: String,
    directory: PathBuf,
    metrics: Arc<TransferMetrics>,
}

impl AttachmentFetcher {
    pub fn new(
        broker: Arc<dyn AccessBroker>,
        downloader: BlobDownloader,
        container: impl Into<String>,
        directory: impl Into<PathBuf>,
        metrics: Arc<TransferMetrics>,
    ) -> Self {
        Self {
            broker,
            downloader,
            container: container.into(),
            directory: directory.into(),
            metrics,
        }
    }

    /// Download one attachment and return where it was written
    ///
    /// Existing files are never overwritten; a taken name gets a ` (n)` suffix.
    /// A partially written file is removed before the error is returned.
    #[instrument(skip(self, attachment, auth_token), fields(attachment_id = %attachment.id))]
    pub async fn download_attachment(
        &self,
        attachment: &Attachment,
        target_dir: Option<&Path>,
        auth_token: Option<&str>,
    ) -> Result<PathBuf, FetchError> {
        let access = self
            .broker
            .request_access(AccessOperation::Download, &self.container, auth_token)
            .await?;

        let bytes = self
            .downloader
            .download(&attachment.blob_path(), &access)
            .await?;

        let dir = target_dir.unwrap_or(self.directory.as_path());
        fs::create_dir_all(dir).await.map_err(DownloadError::Io)?;

        let name = local_file_name(attachment);
        let (path, file) = create_unique(dir, &name).await.map_err(DownloadError::Io)?;
        write_or_discard(&path, file, &bytes)
            .await
            .map_err(DownloadError::Io)?;

        self.metrics.file_downloaded();
        info!(path = %path.display(), bytes = bytes.len(), "Attachment downloaded");
        Ok(path)
    }
}

/// Final path component of the original name, falling back to the stored name
fn local_file_name(attachment: &Attachment) -> String {
    [attachment.original.as_str(), attachment.name.as_str()]
        .into_iter()
        .filter_map(|candidate| {
            Path::new(candidate.trim())
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
        })
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| attachment.id.clone())
}

/// `report.pdf`, `report (1).pdf`, `report (2).pdf`, ...
fn numbered_name(name: &str, n: usize) -> String {
    if n == 0 {
        return name.to_string();
    }
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{} ({}).{}", stem, n, ext),
        None => format!("{} ({})", stem, n),
    }
}

async fn create_unique(dir: &Path, name: &str) -> io::Result<(PathBuf, fs::File)> {
    let mut n = 0;
    loop {
        let path = dir.join(numbered_name(name, n));
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e),
        }
    }
}

async fn write_or_discard<W>(path: &Path, mut writer: W, bytes: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let result = async {
        writer.write_all(bytes).await?;
        writer.flush().await
    }
    .await;

    if let Err(e) = &result {
        drop(writer);
        warn!(path = %path.display(), error = %e, "Removing partial download");
        let _ = fs::remove_file(path).await;
    }
    result
}
