use bytes::Bytes;
use std::io;
use std::path::Path;

/// One file handed to the uploader: its caller-visible name, bytes and MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Read a file from disk, naming it after its final path component
    pub async fn from_path(path: &Path) -> io::Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("not a file path: {}", path.display()),
                )
            })?
            .to_string();

        let bytes = tokio::fs::read(path).await?;
        let content_type = mime_guess::from_path(&name).first().map(|m| m.to_string());

        Ok(Self {
            name,
            content_type,
            bytes: Bytes::from(bytes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_from_path_guesses_common_attachment_types() {
        let dir = TempDir::new().unwrap();
        let cases = [
            ("logs.zip", "application/zip"),
            ("report.docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
            ("sheet.xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            ("capture.mp4", "video/mp4"),
            ("shot.webp", "image/webp"),
            ("NOTES.TXT", "text/plain"),
        ];

        for (name, expected) in cases {
            let path = dir.path().join(name);
            std::fs::write(&path, b"data").unwrap();

            let file = UploadFile::from_path(&path).await.unwrap();
            assert_eq!(file.content_type.as_deref(), Some(expected), "{}", name);
        }
    }

    #[tokio::test]
    async fn test_from_path_unknown_extension_has_no_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dump.zzq");
        std::fs::write(&path, b"data").unwrap();

        let file = UploadFile::from_path(&path).await.unwrap();
        assert!(file.content_type.is_none());
    }

    #[tokio::test]
    async fn test_from_path_reads_name_and_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trace.json");
        std::fs::write(&path, b"{}").unwrap();

        let file = UploadFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "trace.json");
        assert_eq!(file.len(), 2);
        assert_eq!(file.content_type.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = UploadFile::from_path(&dir.path().join("absent.txt"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
