//! JSON output types and serialization for CLI responses.
//!
//! These types form the contract with whatever drives the CLI (editor
//! extension, script, agent).
//!
//! ## Design Principles
//!
//! 1. **Structured JSON:** Every response is valid JSON; `preview` may print a
//!    plain unified diff instead
//! 2. **Status first:** Every response has `status` as first field
//! 3. **Deterministic:** Same input -> same output (field order, array ordering)
//! 4. **Nullable vs absent:** Explicit `null` for "no value"; absent field means "not applicable"
//! 5. **Versioned:** Schema version in response enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, TestgenError};

pub use crate::types::Location;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Error Output
// ============================================================================

/// Error details for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Where the error occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ErrorInfo {
    /// Create from a TestgenError.
    pub fn from_error(err: &TestgenError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let message = err.to_string();

        let (details, location) = match err {
            TestgenError::NoTypeDeclaration { file, line, col } => {
                (None, Some(Location::new(file.clone(), *line, *col)))
            }
            TestgenError::NoTestProject { kind, project } => (
                Some(serde_json::json!({ "kind": kind, "project": project })),
                None,
            ),
            TestgenError::InvalidArguments { details, .. } => (details.clone(), None),
            TestgenError::FileNotFound { path } => (Some(serde_json::json!({ "path": path })), None),
            TestgenError::ApplyError { file, .. } => {
                let details = file.as_ref().map(|f| serde_json::json!({ "file": f }));
                (details, None)
            }
            TestgenError::SymbolResolution { .. }
            | TestgenError::Cancelled
            | TestgenError::InternalError { .. } => (None, None),
        };

        ErrorInfo {
            code,
            message,
            details,
            location,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version.
    pub schema_version: String,
    /// Snapshot the command ran against, when one was taken.
    pub snapshot_id: Option<String>,
    /// Error details.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn new(err: &TestgenError, snapshot_id: Option<String>) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            snapshot_id,
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Projects
// ============================================================================

/// A discovered project and its sibling test projects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Logical project name.
    pub name: String,
    /// Workspace-relative manifest path.
    pub manifest: String,
    /// Number of documents in the project.
    pub documents: usize,
    /// Sibling unit test project, `null` when none or ambiguous.
    pub unit_tests: Option<String>,
    /// Sibling integration test project, `null` when none or ambiguous.
    pub integration_tests: Option<String>,
}

/// Response for the `projects` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub snapshot_id: String,
    pub projects: Vec<ProjectInfo>,
}

impl ProjectsResponse {
    pub fn new(snapshot_id: impl Into<String>, projects: Vec<ProjectInfo>) -> Self {
        ProjectsResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            snapshot_id: snapshot_id.into(),
            projects,
        }
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Names and placement of a generated test artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub type_name: String,
    pub namespace: String,
    pub test_type_name: String,
    pub test_namespace: String,
    pub file_name: String,
    pub folders: Vec<String>,
}

/// One offered action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionInfo {
    /// Title as shown in an editor.
    pub title: String,
    /// Fixture kind: "unit" or "integration".
    pub kind: String,
    /// Target test project name.
    pub project: String,
    /// Workspace-relative path of the file the action would create.
    pub path: String,
    /// Whether that file already exists (applying would fail).
    pub exists: bool,
    pub artifact: ArtifactInfo,
}

/// Response for the `actions` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionsResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub snapshot_id: String,
    /// The selection the actions were resolved for.
    pub location: Location,
    /// Offered actions; empty when the selection is not a type declaration
    /// or no sibling test project exists.
    pub actions: Vec<ActionInfo>,
}

impl ActionsResponse {
    pub fn new(snapshot_id: impl Into<String>, location: Location, actions: Vec<ActionInfo>) -> Self {
        ActionsResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            snapshot_id: snapshot_id.into(),
            location,
            actions,
        }
    }
}

// ============================================================================
// Preview and Apply
// ============================================================================

/// Response for the `preview` command (JSON format).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    /// Snapshot the action was resolved against.
    pub snapshot_id: String,
    /// Snapshot the action would produce.
    pub derived_snapshot_id: String,
    pub action: ActionInfo,
    /// Generated source text.
    pub text: String,
    /// Unified diff creating the file.
    pub unified_diff: String,
}

/// Response for the `apply` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub snapshot_id: String,
    pub derived_snapshot_id: String,
    pub action: ActionInfo,
    /// Workspace-relative paths written to disk.
    pub files_written: Vec<String>,
    /// Document the editor should open.
    pub open: String,
}

// ============================================================================
// Emit Helpers
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Emit a response as compact JSON (single line) to a writer.
pub fn emit_response_compact<T: Serialize>(
    response: &T,
    writer: &mut impl Write,
) -> io::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
