//! Error types shared across the client
//!
//! Remote calls fail with [`ApiError`], the audio seam with [`AudioError`],
//! and form checks with [`ValidationError`]. The controller turns all of them
//! into user-facing notices; none of them are fatal.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No response at all (DNS, connect, timeout, TLS)
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with a non-success status
    #[error("server returned {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    /// The body did not have the expected shape
    #[error("malformed response: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("cannot read {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message sent back by the server, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("cannot load {source_url}: {reason}")]
    Load { source_url: String, reason: String },

    /// The output refused to start (the terminal analogue of a blocked autoplay)
    #[error("playback rejected: {0}")]
    PlaybackRejected(String),

    #[error("seek failed: {0}")]
    Seek(String),

    #[error("audio device error: {0}")]
    Device(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("el campo {0} es obligatorio")]
    Required(&'static str),

    #[error("el email no es válido")]
    InvalidEmail,

    #[error("la contraseña debe tener al menos {0} caracteres")]
    PasswordTooShort(usize),

    #[error("{field} no es válido: {reason}")]
    Invalid { field: &'static str, reason: String },
}
