//! Code action seam between hosts and language operations.
//!
//! A language operation offers titled [`CodeAction`]s. The host decides when
//! to invoke one; the action never touches the host's state directly and
//! instead describes the outcome as a list of [`ActionOperation`]s:
//!
//! - `ApplyChanges`: a derived [`WorkspaceSnapshot`] the host should adopt
//! - `OpenDocument`: a document the host should bring into focus
//!
//! Preview operations omit the focus signal so the host can render a diff
//! without stealing focus from the editor.
//!
//! Cancellation is cooperative through [`CancellationToken`]. Actions check
//! the token at each host boundary and bail out with [`Cancelled`] without
//! publishing a snapshot.

use thiserror::Error;

pub use tokio_util::sync::CancellationToken;

use crate::types::DocumentId;
use crate::workspace::WorkspaceSnapshot;

// ============================================================================
// Operations
// ============================================================================

/// One step of an action's outcome, interpreted by the host.
#[derive(Debug, Clone)]
pub enum ActionOperation {
    /// Adopt the derived snapshot.
    ApplyChanges(WorkspaceSnapshot),
    /// Open the document; `activate` moves focus to it.
    OpenDocument { document: DocumentId, activate: bool },
}

impl ActionOperation {
    /// The snapshot carried by the first `ApplyChanges` operation, if any.
    pub fn changed_snapshot(operations: &[ActionOperation]) -> Option<&WorkspaceSnapshot> {
        operations.iter().find_map(|op| match op {
            ActionOperation::ApplyChanges(snapshot) => Some(snapshot),
            ActionOperation::OpenDocument { .. } => None,
        })
    }

    /// The document carried by the first `OpenDocument` operation, if any.
    pub fn opened_document(operations: &[ActionOperation]) -> Option<DocumentId> {
        operations.iter().find_map(|op| match op {
            ActionOperation::OpenDocument { document, .. } => Some(*document),
            ActionOperation::ApplyChanges(_) => None,
        })
    }
}

// ============================================================================
// Code Action Trait
// ============================================================================

/// A titled, host-invocable unit of work.
///
/// Implementations hold everything they need (base snapshot included), so
/// computing operations is independent of any later change on the host side.
pub trait CodeAction {
    /// Error type returned by the language operation.
    type Error;

    /// Title shown in the host's action list.
    fn title(&self) -> &str;

    /// Operations to perform when the user commits to the action.
    fn compute_operations(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ActionOperation>, Self::Error>;

    /// Operations for a preview: changes only, no focus signal.
    fn compute_preview_operations(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ActionOperation>, Self::Error>;
}

// ============================================================================
// Cancellation
// ============================================================================

/// Returned when the host cancels an operation at a boundary check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Check the token at a host boundary.
pub fn check_cancelled(cancel: &CancellationToken) -> Result<(), Cancelled> {
    if cancel.is_cancelled() {
        Err(Cancelled)
    } else {
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
