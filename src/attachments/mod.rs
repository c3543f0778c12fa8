//! Attachment records and their registration with the backend

mod models;
mod registrar;

pub use models::{Attachment, AttachmentSource, AttachmentStatus};
pub use registrar::{AttachmentRegistrar, AttachmentRegistry, REGISTER_PATH, RegistrarError};
