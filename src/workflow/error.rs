use crate::access::BrokerError;
use crate::attachments::RegistrarError;
use crate::blob::{DownloadError, TransferError};
use crate::validation::ValidationError;
use thiserror::Error;

/// Single rejection surfaced by [`super::UploadOrchestrator`]
///
/// Nothing durable exists after `Validation`, `Broker` or `Transfer`
/// (transferred blobs may be orphaned in storage). After `Registration` or
/// `Protocol` every file is stored but none is referenced by an attachment.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid upload: {0}")]
    Validation(#[from] ValidationError),

    #[error("could not obtain upload access: {0}")]
    Broker(#[from] BrokerError),

    #[error("file transfer failed: {0}")]
    Transfer(TransferError),

    #[error("files were stored but not registered: {0}")]
    Registration(RegistrarError),

    #[error("registration protocol violation: sent {expected} attachments, got {actual} ids")]
    Protocol { expected: usize, actual: usize },
}

impl UploadError {
    /// HTTP status behind the failure, where there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            UploadError::Broker(e) => e.status(),
            UploadError::Transfer(e) => e.status(),
            UploadError::Registration(e) => e.status(),
            UploadError::Validation(_) | UploadError::Protocol { .. } => None,
        }
    }

    /// Files the failure is about, for user-facing messages
    pub fn files(&self) -> Vec<String> {
        match self {
            UploadError::Validation(e) => e.files().to_vec(),
            UploadError::Transfer(e) => e.file().map(str::to_string).into_iter().collect(),
            _ => Vec::new(),
        }
    }
}

impl From<TransferError> for UploadError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::Validation(e) => UploadError::Validation(e),
            other => UploadError::Transfer(other),
        }
    }
}

impl From<RegistrarError> for UploadError {
    fn from(err: RegistrarError) -> Self {
        match err {
            RegistrarError::LengthMismatch { expected, actual } => {
                UploadError::Protocol { expected, actual }
            }
            other => UploadError::Registration(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not obtain download access: {0}")]
    Broker(#[from] BrokerError),

    #[error(transparent)]
    Download(#[from] DownloadError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ByteSize;

    #[test]
    fn test_length_mismatch_becomes_protocol_error() {
        let err = UploadError::from(RegistrarError::LengthMismatch {
            expected: 3,
            actual: 2,
        });
        assert!(matches!(
            err,
            UploadError::Protocol {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_transfer_validation_is_validation() {
        let err = UploadError::from(TransferError::Validation(ValidationError::FileTooLarge {
            files: vec!["big.iso".to_string()],
            limit: ByteSize::mib(50),
        }));
        assert!(matches!(err, UploadError::Validation(_)));
        assert_eq!(err.files(), vec!["big.iso".to_string()]);
    }

    #[test]
    fn test_status_and_files_from_transfer() {
        let err = UploadError::from(TransferError::Rejected {
            file: "b.txt".to_string(),
            status: 403,
            body: "AuthorizationFailure".to_string(),
        });
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.files(), vec!["b.txt".to_string()]);
        assert!(err.to_string().contains("AuthorizationFailure"));
    }
}
