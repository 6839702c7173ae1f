//! WorkspaceSnapshot: the immutable project/document graph handed over by the host.
//!
//! This module provides the core abstraction for tracking workspace state:
//! - Projects identified by a logical name and a manifest path
//! - Documents addressed by folder segments and a file name
//! - Copy-on-write derivation: adding a document returns a new snapshot and
//!   leaves the original untouched
//! - Content-derived snapshot ids
//!
//! Projects and documents are shared between snapshots through `Arc`, so
//! deriving a snapshot only copies the pointer vectors on the path to the
//! change.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::types::{ContentHash, DocumentId, ProjectId, SnapshotId};

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while building or deriving snapshots.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkspaceError {
    /// The project is not part of this snapshot.
    #[error("project not found: {project}")]
    ProjectNotFound { project: ProjectId },

    /// The document is not part of this snapshot.
    #[error("document not found: {document}")]
    DocumentNotFound { document: DocumentId },

    /// A document with the same relative path already exists in the project.
    #[error("document '{path}' already exists in project {project}")]
    DuplicateDocument { project: String, path: String },
}

/// Result type for workspace operations.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

// ============================================================================
// Document
// ============================================================================

/// A named, foldered unit of source text inside a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: DocumentId,
    name: String,
    folders: Vec<String>,
    text: Arc<str>,
    content_hash: ContentHash,
}

impl Document {
    fn new(id: DocumentId, new: NewDocument) -> Self {
        let content_hash = ContentHash::compute(new.text.as_bytes());
        Document {
            id,
            name: new.name,
            folders: new.folders,
            text: Arc::from(new.text),
            content_hash,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// File name, including the extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Folder segments relative to the project directory, outermost first.
    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn content_hash(&self) -> &ContentHash {
        &self.content_hash
    }

    /// Project-relative path with forward slashes (`Core/FooTests.cs`).
    pub fn relative_path(&self) -> String {
        relative_path(&self.folders, &self.name)
    }
}

/// Description of a document to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub name: String,
    pub folders: Vec<String>,
    pub text: String,
}

impl NewDocument {
    pub fn new(name: impl Into<String>, folders: Vec<String>, text: impl Into<String>) -> Self {
        NewDocument {
            name: name.into(),
            folders,
            text: text.into(),
        }
    }

    /// Project-relative path the document will occupy.
    pub fn relative_path(&self) -> String {
        relative_path(&self.folders, &self.name)
    }
}

fn relative_path(folders: &[String], name: &str) -> String {
    let mut path = String::new();
    for folder in folders.iter().filter(|f| !f.is_empty()) {
        path.push_str(folder);
        path.push('/');
    }
    path.push_str(name);
    path
}

// ============================================================================
// Project
// ============================================================================

/// A named collection of documents with a manifest path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    id: ProjectId,
    name: String,
    manifest_path: PathBuf,
    documents: Vec<Arc<Document>>,
}

impl Project {
    pub fn id(&self) -> ProjectId {
        self.id
    }

    /// Logical project name (assembly name, e.g. `Acme.Widgets.NUnit`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Directory holding the manifest; documents live below it.
    pub fn directory(&self) -> Option<&Path> {
        self.manifest_path.parent()
    }

    /// Documents in insertion order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter().map(|d| d.as_ref())
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents().find(|d| d.id == id)
    }

    /// Look up a document by its project-relative path.
    pub fn document_by_path(&self, relative_path: &str) -> Option<&Document> {
        self.documents().find(|d| d.relative_path() == relative_path)
    }
}

// ============================================================================
// Workspace Snapshot
// ============================================================================

/// Immutable point-in-time graph of all projects and documents known to the host.
///
/// Snapshots are cheap to clone. Every derivation (`with_document`) returns
/// a new snapshot with an incremented version; the receiver stays valid.
#[derive(Debug, Clone)]
pub struct WorkspaceSnapshot {
    id: SnapshotId,
    version: u64,
    projects: Vec<Arc<Project>>,
    next_document_id: u32,
}

impl WorkspaceSnapshot {
    /// Start building the initial snapshot of a workspace.
    pub fn builder() -> WorkspaceBuilder {
        WorkspaceBuilder::default()
    }

    pub fn id(&self) -> &SnapshotId {
        &self.id
    }

    /// Number of derivations since the initial snapshot.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Projects in insertion order.
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter().map(|p| p.as_ref())
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn document_count(&self) -> usize {
        self.projects.iter().map(|p| p.documents.len()).sum()
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects().find(|p| p.id == id)
    }

    pub fn project_by_name(&self, name: &str) -> Option<&Project> {
        self.projects().find(|p| p.name == name)
    }

    /// Find a document and its owning project.
    pub fn document(&self, id: DocumentId) -> Option<(&Project, &Document)> {
        self.projects()
            .find_map(|p| p.document(id).map(|d| (p, d)))
    }

    /// Derive a new snapshot with `document` appended to `project`.
    ///
    /// Returns the new snapshot and the id of the inserted document. Fails
    /// without producing a snapshot when the project is unknown or already
    /// holds a document at the same relative path.
    pub fn with_document(
        &self,
        project: ProjectId,
        document: NewDocument,
    ) -> WorkspaceResult<(WorkspaceSnapshot, DocumentId)> {
        let index = self
            .projects
            .iter()
            .position(|p| p.id == project)
            .ok_or(WorkspaceError::ProjectNotFound { project })?;

        let target = &self.projects[index];
        let path = document.relative_path();
        if target.document_by_path(&path).is_some() {
            return Err(WorkspaceError::DuplicateDocument {
                project: target.name.clone(),
                path,
            });
        }

        let document_id = DocumentId::new(self.next_document_id);
        let mut updated = Project::clone(target);
        updated
            .documents
            .push(Arc::new(Document::new(document_id, document)));

        let mut projects = self.projects.clone();
        projects[index] = Arc::new(updated);

        let snapshot = WorkspaceSnapshot {
            id: generate_snapshot_id(&projects),
            version: self.version + 1,
            projects,
            next_document_id: self.next_document_id + 1,
        };
        debug!(
            base = %self.id,
            derived = %snapshot.id,
            %document_id,
            "derived snapshot"
        );
        Ok((snapshot, document_id))
    }

    /// Documents present in `self` but not in `base`, with their owning project.
    ///
    /// Used by hosts to materialize or preview a derived snapshot.
    pub fn added_documents<'a>(
        &'a self,
        base: &WorkspaceSnapshot,
    ) -> Vec<(&'a Project, &'a Document)> {
        let known: HashSet<DocumentId> = base
            .projects()
            .flat_map(|p| p.documents().map(|d| d.id))
            .collect();

        self.projects()
            .flat_map(|p| p.documents().map(move |d| (p, d)))
            .filter(|(_, d)| !known.contains(&d.id))
            .collect()
    }

    /// Check whether two snapshots share the given project without copying it.
    pub fn shares_project(&self, other: &WorkspaceSnapshot, project: ProjectId) -> bool {
        let find = |s: &WorkspaceSnapshot| s.projects.iter().find(|p| p.id == project).cloned();
        match (find(self), find(other)) {
            (Some(a), Some(b)) => Arc::ptr_eq(&a, &b),
            _ => false,
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builds the initial snapshot for an analysis pass.
#[derive(Debug, Default)]
pub struct WorkspaceBuilder {
    projects: Vec<Project>,
    next_document_id: u32,
}

impl WorkspaceBuilder {
    /// Register a project. Ids follow registration order.
    pub fn add_project(&mut self, name: impl Into<String>, manifest_path: impl Into<PathBuf>) -> ProjectId {
        let id = ProjectId::new(self.projects.len() as u32);
        self.projects.push(Project {
            id,
            name: name.into(),
            manifest_path: manifest_path.into(),
            documents: Vec::new(),
        });
        id
    }

    /// Add a document to a registered project.
    pub fn add_document(
        &mut self,
        project: ProjectId,
        document: NewDocument,
    ) -> WorkspaceResult<DocumentId> {
        let target = self
            .projects
            .iter_mut()
            .find(|p| p.id == project)
            .ok_or(WorkspaceError::ProjectNotFound { project })?;

        let path = document.relative_path();
        if target.document_by_path(&path).is_some() {
            return Err(WorkspaceError::DuplicateDocument {
                project: target.name.clone(),
                path,
            });
        }

        let id = DocumentId::new(self.next_document_id);
        self.next_document_id += 1;
        target.documents.push(Arc::new(Document::new(id, document)));
        Ok(id)
    }

    pub fn build(self) -> WorkspaceSnapshot {
        let projects: Vec<Arc<Project>> = self.projects.into_iter().map(Arc::new).collect();
        WorkspaceSnapshot {
            id: generate_snapshot_id(&projects),
            version: 0,
            projects,
            next_document_id: self.next_document_id,
        }
    }
}

/// Generate a deterministic snapshot ID from project and document contents.
fn generate_snapshot_id(projects: &[Arc<Project>]) -> SnapshotId {
    let mut hasher = Sha256::new();

    for project in projects {
        hasher.update(project.name.as_bytes());
        hasher.update(b"@");
        hasher.update(project.manifest_path.to_string_lossy().as_bytes());
        hasher.update(b"\n");
        for document in project.documents() {
            hasher.update(document.relative_path().as_bytes());
            hasher.update(b":");
            hasher.update(document.content_hash.0.as_bytes());
            hasher.update(b"\n");
        }
    }

    let result = hasher.finalize();
    // First 12 hex chars keep the id readable
    SnapshotId::new(format!("snap_{}", hex::encode(&result[..6])))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn widgets_workspace() -> (WorkspaceSnapshot, ProjectId, ProjectId) {
        let mut builder = WorkspaceSnapshot::builder();
        let source = builder.add_project("Acme.Widgets", "/repo/src/Acme.Widgets/Acme.Widgets.csproj");
        let tests = builder.add_project(
            "Acme.Widgets.NUnit",
            "/repo/src/Acme.Widgets.NUnit/Acme.Widgets.NUnit.csproj",
        );
        builder
            .add_document(
                source,
                NewDocument::new("Foo.cs", vec!["Core".to_string()], "class Foo {}"),
            )
            .unwrap();
        (builder.build(), source, tests)
    }

    mod builder_tests {
        use super::*;

        #[test]
        fn builder_assigns_ids_in_order() {
            let (snapshot, source, tests) = widgets_workspace();
            assert_eq!(source, ProjectId::new(0));
            assert_eq!(tests, ProjectId::new(1));
            assert_eq!(snapshot.project_count(), 2);
            assert_eq!(snapshot.document_count(), 1);
            assert_eq!(snapshot.version(), 0);
        }

        #[test]
        fn builder_rejects_unknown_project() {
            let mut builder = WorkspaceSnapshot::builder();
            let err = builder
                .add_document(ProjectId::new(7), NewDocument::new("A.cs", vec![], ""))
                .unwrap_err();
            assert_eq!(
                err,
                WorkspaceError::ProjectNotFound {
                    project: ProjectId::new(7)
                }
            );
        }

        #[test]
        fn document_relative_path_joins_folders() {
            let (snapshot, source, _) = widgets_workspace();
            let project = snapshot.project(source).unwrap();
            let doc = project.documents().next().unwrap();
            assert_eq!(doc.relative_path(), "Core/Foo.cs");
            assert!(project.document_by_path("Core/Foo.cs").is_some());
        }

        #[test]
        fn root_document_has_bare_name() {
            let doc = NewDocument::new("FooTests.cs", vec![], "");
            assert_eq!(doc.relative_path(), "FooTests.cs");
        }
    }

    mod derivation_tests {
        use super::*;

        #[test]
        fn with_document_leaves_original_untouched() {
            let (base, _, tests) = widgets_workspace();
            let (derived, doc_id) = base
                .with_document(
                    tests,
                    NewDocument::new("FooTests.cs", vec!["Core".to_string()], "// fixture"),
                )
                .unwrap();

            assert_eq!(base.document_count(), 1);
            assert_eq!(base.project(tests).unwrap().document_count(), 0);
            assert!(base.document(doc_id).is_none());

            assert_eq!(derived.document_count(), 2);
            assert_eq!(derived.version(), 1);
            let (owner, doc) = derived.document(doc_id).unwrap();
            assert_eq!(owner.id(), tests);
            assert_eq!(doc.relative_path(), "Core/FooTests.cs");
            assert_eq!(doc.text(), "// fixture");
        }

        #[test]
        fn with_document_changes_snapshot_id() {
            let (base, _, tests) = widgets_workspace();
            let (derived, _) = base
                .with_document(tests, NewDocument::new("FooTests.cs", vec![], "x"))
                .unwrap();
            assert_ne!(base.id(), derived.id());
        }

        #[test]
        fn untouched_projects_are_shared() {
            let (base, source, tests) = widgets_workspace();
            let (derived, _) = base
                .with_document(tests, NewDocument::new("FooTests.cs", vec![], "x"))
                .unwrap();
            assert!(base.shares_project(&derived, source));
            assert!(!base.shares_project(&derived, tests));
        }

        #[test]
        fn duplicate_document_is_rejected() {
            let (base, _, tests) = widgets_workspace();
            let doc = NewDocument::new("FooTests.cs", vec!["Core".to_string()], "x");
            let (derived, _) = base.with_document(tests, doc.clone()).unwrap();
            let err = derived.with_document(tests, doc).unwrap_err();
            assert_eq!(
                err,
                WorkspaceError::DuplicateDocument {
                    project: "Acme.Widgets.NUnit".to_string(),
                    path: "Core/FooTests.cs".to_string(),
                }
            );
        }

        #[test]
        fn unknown_project_is_rejected() {
            let (base, _, _) = widgets_workspace();
            let err = base
                .with_document(ProjectId::new(42), NewDocument::new("A.cs", vec![], ""))
                .unwrap_err();
            assert!(matches!(err, WorkspaceError::ProjectNotFound { .. }));
        }

        #[test]
        fn sibling_derivations_are_independent() {
            let (base, _, tests) = widgets_workspace();
            let (a, id_a) = base
                .with_document(tests, NewDocument::new("ATests.cs", vec![], "a"))
                .unwrap();
            let (b, id_b) = base
                .with_document(tests, NewDocument::new("BTests.cs", vec![], "b"))
                .unwrap();

            // Both derive from the same base, so they reuse the next id
            assert_eq!(id_a, id_b);
            assert_eq!(a.document(id_a).unwrap().1.name(), "ATests.cs");
            assert_eq!(b.document(id_b).unwrap().1.name(), "BTests.cs");
        }

        #[test]
        fn added_documents_lists_only_new_ones() {
            let (base, _, tests) = widgets_workspace();
            let (derived, doc_id) = base
                .with_document(tests, NewDocument::new("FooTests.cs", vec![], "x"))
                .unwrap();
            let added = derived.added_documents(&base);
            assert_eq!(added.len(), 1);
            assert_eq!(added[0].0.id(), tests);
            assert_eq!(added[0].1.id(), doc_id);
            assert!(base.added_documents(&base).is_empty());
        }
    }

    mod snapshot_id_tests {
        use super::*;

        #[test]
        fn snapshot_id_is_deterministic() {
            let (a, _, _) = widgets_workspace();
            let (b, _, _) = widgets_workspace();
            assert_eq!(a.id(), b.id());
            assert!(a.id().0.starts_with("snap_"));
            assert_eq!(a.id().0.len(), "snap_".len() + 12);
        }

        #[test]
        fn snapshot_id_changes_with_content() {
            let mut builder = WorkspaceSnapshot::builder();
            let p = builder.add_project("P", "/r/P/P.csproj");
            builder
                .add_document(p, NewDocument::new("A.cs", vec![], "one"))
                .unwrap();
            let first = builder.build();

            let mut builder = WorkspaceSnapshot::builder();
            let p = builder.add_project("P", "/r/P/P.csproj");
            builder
                .add_document(p, NewDocument::new("A.cs", vec![], "two"))
                .unwrap();
            let second = builder.build();

            assert_ne!(first.id(), second.id());
        }
    }

    #[test]
    fn snapshot_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WorkspaceSnapshot>();
    }
}
