//! Gateway error kinds
//!
//! Request-time errors map onto a status code and body at the router
//! boundary. Key store and load errors never reach a client.

use hyper::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

pub const UNAUTHORIZED_BODY: &str =
    "<h1>401 - Unauthorized</h1><br>You are not authorized to access this endpoint, dummy.";
pub const NOT_FOUND_BODY: &str = "<h1>404 - Not Found</h1><br>Endpoint not found.";

/// Failure reported by a command handler.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
    /// Diagnostic detail (stderr, source location, ...)
    pub detail: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: detail.into(),
        }
    }

    /// `"<message> | <detail>"`
    pub fn full(&self) -> String {
        format!("{} | {}", self.message, self.detail)
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("handler failed: {0}")]
    HandlerFailure(HandlerError),
}

impl GatewayError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::UnknownCommand(_) => StatusCode::NOT_FOUND,
            Self::HandlerFailure(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Response body; handler detail is dropped unless `expose_detail` is set
    pub fn body(&self, expose_detail: bool) -> String {
        match self {
            Self::Unauthorized => UNAUTHORIZED_BODY.to_string(),
            Self::UnknownCommand(_) => NOT_FOUND_BODY.to_string(),
            Self::HandlerFailure(err) if expose_detail => err.full(),
            Self::HandlerFailure(err) => err.message.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("failed to read key file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("key file {path} is not a JSON array of strings: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Startup-time failure to register one handler.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no built-in command named '{name}' (available: {available})")]
    UnknownBuiltin { name: String, available: String },

    #[error("cannot read handler directory entry: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a regular file")]
    NotAFile,

    #[error("file is not executable")]
    NotExecutable,

    #[error("file name is not a valid command name")]
    InvalidName,
}
