//! Support cases and their statements, resolutions and attachments

mod models;
mod service;

pub use models::{
    Case, CasePage, CaseResolution, CaseStatement, CaseStatus, NewCase, NewCaseStatement,
    RegisterCaseRequest, SupportCase,
};
pub use service::{CaseService, CaseServiceError};
