//! Error bridge implementations for language-specific errors.
//!
//! This module provides `impl From<X> for TestgenError` conversions from the
//! C# crate's error types to the unified `TestgenError` type.
//!
//! These bridges live in this crate rather than the root crate because Rust's
//! orphan rule requires the impl to be in the crate that defines a source type.

use testgen_core::error::TestgenError;
use crate::conventions::ConventionsError;
use crate::discover::DiscoveryError;
use crate::ops::FixtureError;

// ============================================================================
// Bridge: FixtureError -> TestgenError
// ============================================================================

impl From<FixtureError> for TestgenError {
    fn from(err: FixtureError) -> Self {
        match err {
            FixtureError::DocumentNotFound { document } => TestgenError::InternalError {
                message: format!("document {} is not part of the snapshot", document),
            },
            FixtureError::SymbolResolution { identifier } => TestgenError::SymbolResolution {
                message: format!("cannot resolve type symbol for '{}'", identifier),
            },
            FixtureError::Cancelled => TestgenError::Cancelled,
            FixtureError::Workspace(workspace_err) => TestgenError::from(workspace_err),
        }
    }
}

// ============================================================================
// Bridge: DiscoveryError -> TestgenError
// ============================================================================

impl From<DiscoveryError> for TestgenError {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::RootNotFound { path } => TestgenError::FileNotFound { path },
            DiscoveryError::NoProjects { root } => TestgenError::invalid_args_with_details(
                format!("no .csproj projects found under {}", root),
                serde_json::json!({ "workspace": root }),
            ),
            DiscoveryError::Io { path, source } => TestgenError::InternalError {
                message: format!("failed to read {}: {}", path, source),
            },
            DiscoveryError::Walk(walk_err) => TestgenError::InternalError {
                message: format!("walk error: {}", walk_err),
            },
            DiscoveryError::Workspace(workspace_err) => TestgenError::from(workspace_err),
        }
    }
}

// ============================================================================
// Bridge: ConventionsError -> TestgenError
// ============================================================================

impl From<ConventionsError> for TestgenError {
    fn from(err: ConventionsError) -> Self {
        let message = err.to_string();
        match err {
            ConventionsError::Io { path, .. } | ConventionsError::Json { path, .. } => {
                TestgenError::invalid_args_with_details(
                    message,
                    serde_json::json!({ "conventions": path }),
                )
            }
            ConventionsError::EmptyField { field } => TestgenError::invalid_args_with_details(
                message,
                serde_json::json!({ "field": field }),
            ),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
