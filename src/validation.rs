use crate::blob::UploadFile;
use crate::config::{ByteSize, UploadLimits};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("case id must not be empty")]
    MissingCaseId,

    #[error("no files to upload")]
    NoFiles,

    #[error("{count} files exceed the limit of {limit} per upload")]
    TooManyFiles { count: usize, limit: usize },

    #[error("files exceed the {limit} size limit: {}", files.join(", "))]
    FileTooLarge { files: Vec<String>, limit: ByteSize },
}

impl ValidationError {
    /// Offending file names, where the error is about specific files
    pub fn files(&self) -> &[String] {
        match self {
            ValidationError::FileTooLarge { files, .. } => files,
            _ => &[],
        }
    }
}

/// All-or-nothing size guard: every oversized file is reported, none is skipped
pub fn check_sizes(files: &[UploadFile], max_file_size: ByteSize) -> Result<(), ValidationError> {
    let oversized: Vec<String> = files
        .iter()
        .filter(|file| !max_file_size.admits(file.len()))
        .map(|file| file.name.clone())
        .collect();

    if oversized.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::FileTooLarge {
            files: oversized,
            limit: max_file_size,
        })
    }
}

/// Checks run before the broker is contacted
pub fn check_batch(
    case_id: &str,
    files: &[UploadFile],
    limits: &UploadLimits,
) -> Result<(), ValidationError> {
    if case_id.trim().is_empty() {
        return Err(ValidationError::MissingCaseId);
    }

    if files.is_empty() {
        return Err(ValidationError::NoFiles);
    }

    if files.len() > limits.max_files {
        return Err(ValidationError::TooManyFiles {
            count: files.len(),
            limit: limits.max_files,
        });
    }

    check_sizes(files, limits.max_file_size)
}
