//! Blob transfer through signed URLs
//!
//! Files land at `<container>/<pathPrefix>/<YYYYMMDD>/<YYYYMMDDHHmmss>_<original>`.
//! Nothing here is durable from the backend's point of view until the
//! attachment registrar has recorded it.

mod downloader;
mod file;
mod locator;
mod naming;
mod uploader;

pub use downloader::{BlobDownloader, DownloadError};
pub use file::UploadFile;
pub use locator::{LocatorError, SignedLocator};
pub use naming::{
    FileNameGenerator, TimestampZone, UploadTarget, dated_sub_path, timestamped_name,
};
pub use uploader::{BlobUploader, TransferError, UploadOptions, UploadedFileRecord, plan_targets};
