use crate::services::{
    alias_store::StoreError, migration::MigrationError, signature_probe::ProbeError,
    validation::ValidationError,
};
use serde_json::json;
use std::fmt;

/// Exit status for operational failures (I/O, connection, remote errors).
pub const ERROR_EXIT_STATUS: i32 = 1;

/// Exit status for wrong arguments and invalid input.
pub const USAGE_EXIT_STATUS: i32 = 1;

/// Broad class of a failure, which decides the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong argument count or shape.
    Usage,
    /// Malformed alias, URL, key or flag value.
    Validation,
    /// Unable to reach or set up a client for the endpoint.
    Connection,
    /// The server answered with an error.
    Remote,
    /// Config file unreadable or unwritable.
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Usage => "usage",
            ErrorKind::Validation => "validation",
            ErrorKind::Connection => "connection",
            ErrorKind::Remote => "remote",
            ErrorKind::Io => "io",
        }
    }
}

/// A command failure with its class and a user-facing message.
#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
        }
    }

    /// Shortcut for a usage error
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Usage, msg)
    }

    /// Shortcut for an I/O error
    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, msg)
    }

    /// Prefix the message with what the command was trying to do.
    pub fn context(mut self, what: impl fmt::Display) -> Self {
        self.message = format!("{}: {}", what, self.message);
        self
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind {
            ErrorKind::Usage | ErrorKind::Validation => USAGE_EXIT_STATUS,
            ErrorKind::Connection | ErrorKind::Remote | ErrorKind::Io => ERROR_EXIT_STATUS,
        }
    }

    /// JSON rendering for `--json` mode.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "status": "error",
            "error": {
                "kind": self.kind.as_str(),
                "message": self.message,
            }
        })
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::new(ErrorKind::Validation, err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let kind = match &err {
            StoreError::Validation(_) | StoreError::InvalidEnvAlias { .. } => {
                ErrorKind::Validation
            }
            StoreError::NoSuchAlias(_) => ErrorKind::Usage,
            StoreError::NotFound(_)
            | StoreError::VersionMismatch { .. }
            | StoreError::Decode(_)
            | StoreError::Io(_) => ErrorKind::Io,
        };
        AppError::new(kind, err.to_string())
    }
}

impl From<MigrationError> for AppError {
    fn from(err: MigrationError) -> Self {
        let kind = match &err {
            MigrationError::UnsupportedGlob(_) => ErrorKind::Validation,
            _ => ErrorKind::Io,
        };
        AppError::new(kind, err.to_string())
    }
}

impl From<ProbeError> for AppError {
    fn from(err: ProbeError) -> Self {
        let kind = match &err {
            ProbeError::InvalidUrl(_) => ErrorKind::Validation,
            ProbeError::Client(_) => ErrorKind::Connection,
            ProbeError::Inconclusive { .. } => ErrorKind::Remote,
        };
        AppError::new(kind, err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::io(format!("{:#}", err))
    }
}
