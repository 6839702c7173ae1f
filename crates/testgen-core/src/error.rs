//! Error types and error code constants for testgen.
//!
//! This module provides a unified error type (`TestgenError`) that bridges
//! domain-specific errors from different subsystems (workspace, fixture
//! generation, discovery) into a common format suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Resolution errors (no type at location, no test project, file not found)
//! - `4`: Apply errors (duplicate document, failed write)
//! - `5`: Cancelled by the host
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! ## Design
//!
//! - **Unified type**: `TestgenError` is the single error type for CLI output
//! - **Bridging**: `impl From<X> for TestgenError` bridges domain errors
//! - **Code mapping**: `OutputErrorCode` provides stable integer codes for JSON

use std::fmt;

use thiserror::Error;

use crate::action::Cancelled;
use crate::workspace::WorkspaceError;

pub use crate::types::Location;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (no type declaration, no test project, file not found).
    ResolutionError = 3,
    /// Apply errors (duplicate document, failed to write changes).
    ApplyError = 4,
    /// The host cancelled the operation.
    Cancelled = 5,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
///
/// All subsystem errors are converted to this type before being rendered as
/// JSON output.
#[derive(Debug, Error)]
pub enum TestgenError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// No type declaration at the specified location.
    #[error("no type declaration found at {file}:{line}:{col}")]
    NoTypeDeclaration { file: String, line: u32, col: u32 },

    /// No sibling test project of the requested kind.
    #[error("no {kind} test project found for project {project}")]
    NoTestProject { kind: String, project: String },

    /// The semantic model could not resolve the selected declaration.
    #[error("symbol resolution failed: {message}")]
    SymbolResolution { message: String },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Failed to apply changes.
    #[error("apply error: {message}")]
    ApplyError {
        message: String,
        file: Option<String>,
    },

    /// The host cancelled the operation before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&TestgenError> for OutputErrorCode {
    fn from(err: &TestgenError) -> Self {
        match err {
            TestgenError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            TestgenError::NoTypeDeclaration { .. } => OutputErrorCode::ResolutionError,
            TestgenError::NoTestProject { .. } => OutputErrorCode::ResolutionError,
            TestgenError::SymbolResolution { .. } => OutputErrorCode::ResolutionError,
            TestgenError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            TestgenError::ApplyError { .. } => OutputErrorCode::ApplyError,
            TestgenError::Cancelled => OutputErrorCode::Cancelled,
            TestgenError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<TestgenError> for OutputErrorCode {
    fn from(err: TestgenError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges: WorkspaceError, Cancelled -> TestgenError
// ============================================================================

impl From<WorkspaceError> for TestgenError {
    fn from(err: WorkspaceError) -> Self {
        match err {
            WorkspaceError::ProjectNotFound { project } => TestgenError::InternalError {
                message: format!("project {} is not part of the snapshot", project),
            },
            WorkspaceError::DocumentNotFound { document } => TestgenError::InternalError {
                message: format!("document {} is not part of the snapshot", document),
            },
            WorkspaceError::DuplicateDocument { project, path } => TestgenError::ApplyError {
                message: format!("'{}' already exists in project {}", path, project),
                file: Some(path),
            },
        }
    }
}

impl From<Cancelled> for TestgenError {
    fn from(_: Cancelled) -> Self {
        TestgenError::Cancelled
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl TestgenError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        TestgenError::InvalidArguments {
            message: message.into(),
            details: None,
        }
    }

    /// Create an invalid arguments error with JSON details.
    pub fn invalid_args_with_details(
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        TestgenError::InvalidArguments {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        TestgenError::FileNotFound { path: path.into() }
    }

    /// Create an apply error tied to a file.
    pub fn apply(message: impl Into<String>, file: impl Into<String>) -> Self {
        TestgenError::ApplyError {
            message: message.into(),
            file: Some(file.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        TestgenError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
