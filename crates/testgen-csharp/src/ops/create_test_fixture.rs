//! Create test fixture: scaffold an NUnit fixture for the selected type.
//!
//! Resolution runs in four steps:
//!
//! 1. Find the syntax node at the selection; anything but a type declaration
//!    yields no actions
//! 2. Bind the declaration to its type symbol through the host's semantic model
//! 3. Locate the sibling unit and integration test projects of the owning project
//! 4. Offer one action per located test project, integration first
//!
//! Applying an action maps the namespace to the test project, renders the
//! fixture template and inserts the new document into a derived snapshot.
//! The snapshot the action was resolved against is never modified.

use thiserror::Error;
use tracing::{debug, info};

use testgen_core::action::{check_cancelled, ActionOperation, CancellationToken, Cancelled, CodeAction};
use testgen_core::output::ArtifactInfo;
use testgen_core::types::{DocumentId, ProjectId, Span};
use testgen_core::workspace::{NewDocument, WorkspaceError, WorkspaceSnapshot};

use crate::conventions::Conventions;
use crate::locator::find_sibling_test_projects;
use crate::namespace::{map_folders, map_namespace};
use crate::syntax::{SemanticModel, SyntaxTree, TypeSymbol};
use crate::template::{self, FixtureFlavor, FixtureNames};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while resolving or applying fixture actions.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The document is not part of the snapshot.
    #[error("document not found: {document}")]
    DocumentNotFound { document: DocumentId },

    /// The semantic model could not bind the selected declaration.
    #[error("cannot resolve type symbol for '{identifier}'")]
    SymbolResolution { identifier: String },

    /// The host cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Deriving the snapshot failed.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

impl From<Cancelled> for FixtureError {
    fn from(_: Cancelled) -> Self {
        FixtureError::Cancelled
    }
}

/// Result type for fixture operations.
pub type FixtureResult<T> = Result<T, FixtureError>;

// ============================================================================
// Descriptor
// ============================================================================

/// Names and placement of a fixture for one type in one test project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestArtifactDescriptor {
    pub type_name: String,
    pub namespace: String,
    pub test_type_name: String,
    pub test_namespace: String,
    pub file_name: String,
    pub folders: Vec<String>,
}

impl TestArtifactDescriptor {
    /// Map `symbol`, declared in `source_project`, into `test_project`.
    pub fn describe(
        symbol: &TypeSymbol,
        source_project: &str,
        test_project: &str,
        conventions: &Conventions,
    ) -> Self {
        let namespace = symbol.containing_namespace();
        let test_type_name = conventions.test_type_name(&symbol.name);
        TestArtifactDescriptor {
            type_name: symbol.name.clone(),
            test_namespace: map_namespace(&namespace, source_project, test_project),
            folders: map_folders(&namespace, source_project),
            file_name: conventions.file_name(&test_type_name),
            test_type_name,
            namespace,
        }
    }

    pub fn names(&self) -> FixtureNames<'_> {
        FixtureNames {
            type_name: &self.type_name,
            type_namespace: &self.namespace,
            test_type_name: &self.test_type_name,
            test_namespace: &self.test_namespace,
        }
    }

    /// Project-relative path of the fixture file.
    pub fn relative_path(&self) -> String {
        let mut parts: Vec<&str> = self.folders.iter().map(String::as_str).collect();
        parts.push(&self.file_name);
        parts.join("/")
    }

    pub fn artifact_info(&self) -> ArtifactInfo {
        ArtifactInfo {
            type_name: self.type_name.clone(),
            namespace: self.namespace.clone(),
            test_type_name: self.test_type_name.clone(),
            test_namespace: self.test_namespace.clone(),
            file_name: self.file_name.clone(),
            folders: self.folders.clone(),
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Everything the resolver needs from the host for one selection.
pub struct FixtureRequest<'a> {
    pub snapshot: &'a WorkspaceSnapshot,
    /// Document holding the selection.
    pub document: DocumentId,
    pub span: Span,
    /// Syntax tree of `document`.
    pub syntax: &'a dyn SyntaxTree,
    /// Semantic model of `document`.
    pub semantic: &'a dyn SemanticModel,
    pub conventions: &'a Conventions,
}

/// Resolve the fixture actions offered at the request's selection.
///
/// Returns an empty list when the selection is not a type declaration or no
/// sibling test project exists. Fails when the document is unknown, the
/// declaration cannot be bound, or the token is cancelled.
pub fn resolve_actions(
    request: &FixtureRequest<'_>,
    cancel: &CancellationToken,
) -> FixtureResult<Vec<CreateTestFixtureAction>> {
    check_cancelled(cancel)?;

    let (project, _) = request
        .snapshot
        .document(request.document)
        .ok_or(FixtureError::DocumentNotFound {
            document: request.document,
        })?;

    let node = request.syntax.find_node(request.span);
    let Some(declaration) = node.as_ref().and_then(|n| n.as_type_declaration()) else {
        debug!(span = %request.span, "selection is not a type declaration");
        return Ok(Vec::new());
    };

    check_cancelled(cancel)?;
    let symbol = request
        .semantic
        .declared_symbol(declaration)
        .ok_or_else(|| FixtureError::SymbolResolution {
            identifier: declaration.identifier.clone(),
        })?;
    check_cancelled(cancel)?;

    let siblings = find_sibling_test_projects(request.snapshot.projects(), project, request.conventions);

    let actions: Vec<CreateTestFixtureAction> = [
        (FixtureFlavor::Integration, siblings.integration),
        (FixtureFlavor::Unit, siblings.unit),
    ]
    .into_iter()
    .filter_map(|(flavor, target)| {
        target.map(|target| CreateTestFixtureAction {
            title: title(&symbol.name, flavor, target.name(), request.conventions),
            flavor,
            snapshot: request.snapshot.clone(),
            source_project: project.name().to_string(),
            target_project: target.id(),
            target_project_name: target.name().to_string(),
            symbol: symbol.clone(),
            conventions: request.conventions.clone(),
        })
    })
    .collect();

    debug!(
        type_name = %symbol.name,
        project = project.name(),
        actions = actions.len(),
        "resolved fixture actions"
    );
    Ok(actions)
}

fn title(type_name: &str, flavor: FixtureFlavor, project: &str, conventions: &Conventions) -> String {
    let file_name = conventions.file_name(&conventions.test_type_name(type_name));
    format!(
        "Create {} {} test for this class in the {} project",
        file_name, flavor, project
    )
}

// ============================================================================
// Action
// ============================================================================

/// Outcome of applying a fixture action.
#[derive(Debug, Clone)]
pub struct AppliedFixture {
    /// Derived snapshot holding the new document.
    pub snapshot: WorkspaceSnapshot,
    /// The inserted document; hosts should open it.
    pub document: DocumentId,
}

/// A deferred "create test fixture" action bound to one test project.
///
/// Holds the snapshot it was resolved against, so applying it later yields
/// the same result regardless of what the host did in between.
#[derive(Debug, Clone)]
pub struct CreateTestFixtureAction {
    title: String,
    flavor: FixtureFlavor,
    snapshot: WorkspaceSnapshot,
    source_project: String,
    target_project: ProjectId,
    target_project_name: String,
    symbol: TypeSymbol,
    conventions: Conventions,
}

impl CreateTestFixtureAction {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn flavor(&self) -> FixtureFlavor {
        self.flavor
    }

    pub fn target_project(&self) -> ProjectId {
        self.target_project
    }

    pub fn target_project_name(&self) -> &str {
        &self.target_project_name
    }

    pub fn symbol(&self) -> &TypeSymbol {
        &self.symbol
    }

    /// The snapshot the action was resolved against.
    pub fn base_snapshot(&self) -> &WorkspaceSnapshot {
        &self.snapshot
    }

    pub fn descriptor(&self) -> TestArtifactDescriptor {
        TestArtifactDescriptor::describe(
            &self.symbol,
            &self.source_project,
            &self.target_project_name,
            &self.conventions,
        )
    }

    /// Fixture source text.
    pub fn render(&self) -> String {
        template::render(self.flavor, &self.descriptor().names(), &self.conventions)
    }

    /// Derive the snapshot with the fixture inserted.
    pub fn apply(&self, cancel: &CancellationToken) -> FixtureResult<AppliedFixture> {
        let applied = self.derive(cancel)?;
        info!(
            project = %self.target_project_name,
            path = %self.descriptor().relative_path(),
            snapshot = %applied.snapshot.id(),
            "created test fixture"
        );
        Ok(applied)
    }

    /// Same derivation as [`apply`](Self::apply), without the document to open.
    pub fn preview(&self, cancel: &CancellationToken) -> FixtureResult<WorkspaceSnapshot> {
        self.derive(cancel).map(|applied| applied.snapshot)
    }

    fn derive(&self, cancel: &CancellationToken) -> FixtureResult<AppliedFixture> {
        let descriptor = self.descriptor();
        let text = template::render(self.flavor, &descriptor.names(), &self.conventions);

        check_cancelled(cancel)?;
        let (snapshot, document) = self.snapshot.with_document(
            self.target_project,
            NewDocument::new(descriptor.file_name, descriptor.folders, text),
        )?;
        Ok(AppliedFixture { snapshot, document })
    }
}

impl CodeAction for CreateTestFixtureAction {
    type Error = FixtureError;

    fn title(&self) -> &str {
        &self.title
    }

    fn compute_operations(&self, cancel: &CancellationToken) -> FixtureResult<Vec<ActionOperation>> {
        let applied = self.apply(cancel)?;
        Ok(vec![
            ActionOperation::ApplyChanges(applied.snapshot),
            ActionOperation::OpenDocument {
                document: applied.document,
                activate: true,
            },
        ])
    }

    fn compute_preview_operations(
        &self,
        cancel: &CancellationToken,
    ) -> FixtureResult<Vec<ActionOperation>> {
        let snapshot = self.preview(cancel)?;
        Ok(vec![ActionOperation::ApplyChanges(snapshot)])
    }
}

// ============================================================================
// Tests
// ============================================================================
