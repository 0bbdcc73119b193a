//! Error types for imap2abook

use thiserror::Error;

/// A single header block could not be decoded. Recoverable: the block is
/// skipped and the harvest continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed header block: {0}")]
    Malformed(String),
}

/// Retrieval failure. Fatal for the whole run.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// TCP or TLS setup failed
    #[error("cannot connect to IMAP server {server}:{port}: {reason}")]
    Connect {
        server: String,
        port: u16,
        reason: String,
    },

    #[error("cannot log in as {user}: {reason}")]
    Login { user: String, reason: String },

    #[error("cannot select folder {folder}: {reason}")]
    Select { folder: String, reason: String },

    #[error("cannot fetch headers: {0}")]
    Fetch(String),
}

pub type Result<T> = std::result::Result<T, HarvestError>;
