pub mod access;
pub mod attachments;
pub mod blob;
pub mod cases;
pub mod client;
pub mod config;
pub mod humanize;
pub mod observability;
pub mod state;
pub mod validation;
pub mod workflow;
