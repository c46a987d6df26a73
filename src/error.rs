use std::io;
use thiserror::Error;

use crate::core::severity::Severity;

/// Error type for the probe library
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Transport(String),

    #[error("Authentication Error")]
    Auth,

    #[error("CIM error {code}: {description}")]
    Protocol { code: u32, description: String },

    #[error("Malformed CIM response: {0}")]
    Xml(String),

    #[error("Unrecognized {scheme} code {code} on element '{element}'")]
    UnrecognizedStatus {
        scheme: &'static str,
        code: i64,
        element: String,
    },

    #[error("Malformed instance: {0}")]
    MalformedInstance(String),
}

/// Result type alias for the probe library
pub type Result<T> = std::result::Result<T, ProbeError>;

/// CIM error descriptions that mean the CIMOM itself is unreachable.
const FATAL_CIM_DESCRIPTIONS: &[&str] = &[
    "Socket error",
    "ThreadPool --- Failed to enqueue request",
];

impl ProbeError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ProbeError::Config(msg.into())
    }

    /// Create a transport error
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        ProbeError::Transport(msg.into())
    }

    pub fn xml<S: Into<String>>(msg: S) -> Self {
        ProbeError::Xml(msg.into())
    }

    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        ProbeError::MalformedInstance(msg.into())
    }

    /// Build the error for a CIM `ERROR` element. Descriptions that report
    /// a dead connection on the server side are promoted to transport errors.
    pub fn cim(code: u32, description: impl Into<String>) -> Self {
        let description = description.into();
        if FATAL_CIM_DESCRIPTIONS
            .iter()
            .any(|marker| description.contains(marker))
        {
            return ProbeError::Transport(format!("CIM error {}: {}", code, description));
        }
        ProbeError::Protocol { code, description }
    }

    /// Transport and authentication failures end the run immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProbeError::Transport(_) | ProbeError::Auth)
    }

    /// Verdict reported for a run aborted by this error.
    pub fn severity(&self) -> Severity {
        Severity::Unknown
    }
}
