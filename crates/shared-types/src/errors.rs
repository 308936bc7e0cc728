//! # Error Types
//!
//! The structured error a service returns across the queue in place of a
//! success payload.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kinds of failure a command reply can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Payload does not match the command's expected shape. Never retried.
    MalformedPayload,
    /// No handler is registered for the command name.
    UnknownCommand,
    /// Payload is well-formed but fails field validation.
    ValidationFailed,
    /// Operation conflicts with existing state (duplicate email or login).
    DomainConflict,
    /// Target resource does not exist.
    NotFound,
    /// Login attempt with a wrong email, login or password.
    InvalidCredentials,
    /// Handler failed unexpectedly.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MalformedPayload => "malformed_payload",
            ErrorKind::UnknownCommand => "unknown_command",
            ErrorKind::ValidationFailed => "validation_failed",
            ErrorKind::DomainConflict => "domain_conflict",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidCredentials => "invalid_credentials",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business or decode failure returned as a structured reply.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct CommandError {
    pub kind: ErrorKind,
    /// Human-readable reason, safe to show to the external caller.
    pub message: String,
}

impl CommandError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedPayload, message)
    }

    pub fn unknown_command(name: &str) -> Self {
        Self::new(ErrorKind::UnknownCommand, format!("no handler for command '{name}'"))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationFailed, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DomainConflict, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "invalid email, login or password")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}
