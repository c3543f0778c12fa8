//! End-to-end flows built from the broker, blob and attachment layers

mod download;
mod error;
mod upload;

pub use download::AttachmentFetcher;
pub use error::{FetchError, UploadError};
pub use upload::{UploadOrchestrator, UploadStage};
