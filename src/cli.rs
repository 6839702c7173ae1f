//! CLI front door.
//!
//! Plays the editor's role for the create-test-fixture action:
//! - `projects` - discovered projects and their sibling test projects
//! - `actions` - actions offered at a `path:line:col` selection
//! - `preview` - unified diff (or JSON) of what an action would create
//! - `apply` - derive the snapshot and write the new file to disk
//!
//! Every function rediscovers the workspace, so each call runs against a
//! fresh snapshot. Functions return the JSON (or diff) text to print; the
//! binary owns stdout and exit codes.
//!
//! ## Error Handling
//!
//! All functions return `Result<String, TestgenError>`. Domain errors convert
//! through the bridges in `error_bridges`.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use testgen_core::action::{ActionOperation, CancellationToken, CodeAction};
use testgen_core::diff::generate_snapshot_diff;
use testgen_core::error::TestgenError;
use testgen_core::output::{
    ActionInfo, ActionsResponse, ApplyResponse, Location, PreviewResponse, ProjectInfo,
    ProjectsResponse, SCHEMA_VERSION,
};
use testgen_core::text::caret_at;
use testgen_core::workspace::{Project, WorkspaceSnapshot};
use testgen_csharp::conventions::Conventions;
use testgen_csharp::declarations::SourceOutline;
use testgen_csharp::discover::{
    discover_workspace, document_path, find_document_by_path, workspace_relative, DiscoveryConfig,
};
use testgen_csharp::locator::find_sibling_test_projects;
use testgen_csharp::ops::{resolve_actions, CreateTestFixtureAction, FixtureRequest};
use testgen_csharp::syntax::SyntaxTree;
use testgen_csharp::template::FixtureFlavor;

// ============================================================================
// Context
// ============================================================================

/// Output format for `preview`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PreviewFormat {
    /// Unified diff, compatible with `git apply`.
    #[default]
    Diff,
    /// Full JSON response.
    Json,
}

/// Settings shared by all commands.
#[derive(Debug, Clone)]
pub struct CliContext {
    workspace_root: PathBuf,
    conventions: Conventions,
    discovery: DiscoveryConfig,
}

impl CliContext {
    /// Resolve the workspace root and load conventions.
    pub fn new(workspace: &Path, conventions_file: Option<&Path>) -> Result<Self, TestgenError> {
        let workspace_root = fs::canonicalize(workspace)
            .map_err(|_| TestgenError::file_not_found(workspace.display().to_string()))?;
        let conventions = match conventions_file {
            Some(path) => Conventions::load(path)?,
            None => Conventions::default(),
        };
        Ok(CliContext {
            workspace_root,
            conventions,
            discovery: DiscoveryConfig::default(),
        })
    }

    /// Skip directories with these names in addition to the defaults.
    pub fn with_excludes(mut self, exclude: &[String]) -> Self {
        self.discovery = DiscoveryConfig::with_excludes(exclude.iter().cloned());
        self
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    fn discover(&self) -> Result<WorkspaceSnapshot, TestgenError> {
        Ok(discover_workspace(&self.workspace_root, &self.discovery)?)
    }

    fn relative(&self, path: &Path) -> String {
        workspace_relative(&self.workspace_root, path)
    }
}

// ============================================================================
// Commands
// ============================================================================

/// List discovered projects with their sibling test projects.
pub fn run_projects(ctx: &CliContext) -> Result<String, TestgenError> {
    let snapshot = ctx.discover()?;

    let projects = snapshot
        .projects()
        .map(|project| {
            let siblings = find_sibling_test_projects(snapshot.projects(), project, ctx.conventions());
            ProjectInfo {
                name: project.name().to_string(),
                manifest: ctx.relative(project.manifest_path()),
                documents: project.document_count(),
                unit_tests: siblings.unit.map(|p| p.name().to_string()),
                integration_tests: siblings.integration.map(|p| p.name().to_string()),
            }
        })
        .collect();

    to_json(&ProjectsResponse::new(snapshot.id().0.clone(), projects))
}

/// List the actions offered at `at` (`path:line:col`).
pub fn run_actions(ctx: &CliContext, at: &str) -> Result<String, TestgenError> {
    let resolved = resolve_at(ctx, at)?;
    let actions = resolved
        .actions
        .iter()
        .map(|action| action_info(ctx, &resolved.snapshot, action))
        .collect();

    to_json(&ActionsResponse::new(
        resolved.snapshot.id().0.clone(),
        resolved.location,
        actions,
    ))
}

/// Preview the `kind` action at `at` without touching the disk.
pub fn run_preview(
    ctx: &CliContext,
    at: &str,
    kind: FixtureFlavor,
    format: PreviewFormat,
) -> Result<String, TestgenError> {
    let resolved = resolve_at(ctx, at)?;
    let action = resolved.select(kind)?;

    let cancel = CancellationToken::new();
    let operations = action.compute_preview_operations(&cancel)?;
    let derived = ActionOperation::changed_snapshot(&operations)
        .ok_or_else(|| TestgenError::internal("preview produced no snapshot"))?;

    let unified_diff = generate_snapshot_diff(&resolved.snapshot, derived, |project, rel| {
        project_relative(ctx, project, rel)
    });

    match format {
        PreviewFormat::Diff => Ok(unified_diff),
        PreviewFormat::Json => to_json(&PreviewResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            snapshot_id: resolved.snapshot.id().0.clone(),
            derived_snapshot_id: derived.id().0.clone(),
            action: action_info(ctx, &resolved.snapshot, action),
            text: action.render(),
            unified_diff,
        }),
    }
}

/// Apply the `kind` action at `at` and write the new files.
///
/// Existing files are never overwritten: the command fails before writing
/// anything if any target already exists, and each file is created
/// exclusively so one appearing in the meantime is not clobbered either.
pub fn run_apply(ctx: &CliContext, at: &str, kind: FixtureFlavor) -> Result<String, TestgenError> {
    let resolved = resolve_at(ctx, at)?;
    let action = resolved.select(kind)?;

    let cancel = CancellationToken::new();
    let operations = action.compute_operations(&cancel)?;
    let derived = ActionOperation::changed_snapshot(&operations)
        .ok_or_else(|| TestgenError::internal("apply produced no snapshot"))?;
    let opened = ActionOperation::opened_document(&operations)
        .ok_or_else(|| TestgenError::internal("apply produced no document to open"))?;

    let added = derived.added_documents(&resolved.snapshot);
    for (project, document) in &added {
        let path = document_path(project, document);
        if path.exists() {
            return Err(TestgenError::apply(
                "refusing to overwrite existing file",
                ctx.relative(&path),
            ));
        }
    }

    let mut files_written = Vec::with_capacity(added.len());
    for (project, document) in &added {
        let path = document_path(project, document);
        let relative = ctx.relative(&path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                TestgenError::apply(format!("failed to create directory: {}", e), relative.clone())
            })?;
        }
        write_new_file(&path, document.text()).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => {
                TestgenError::apply("refusing to overwrite existing file", relative.clone())
            }
            _ => TestgenError::apply(format!("failed to write file: {}", e), relative.clone()),
        })?;
        info!(file = %relative, "wrote test fixture");
        files_written.push(relative);
    }

    let (project, document) = derived
        .document(opened)
        .ok_or_else(|| TestgenError::internal("opened document missing from snapshot"))?;

    to_json(&ApplyResponse {
        status: "ok".to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
        snapshot_id: resolved.snapshot.id().0.clone(),
        derived_snapshot_id: derived.id().0.clone(),
        action: action_info(ctx, &resolved.snapshot, action),
        files_written,
        open: ctx.relative(&document_path(project, document)),
    })
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Actions resolved at one selection.
struct Resolved {
    snapshot: WorkspaceSnapshot,
    location: Location,
    source_project: String,
    on_type_declaration: bool,
    actions: Vec<CreateTestFixtureAction>,
}

impl Resolved {
    /// The action of `kind`, or the error explaining why there is none.
    fn select(&self, kind: FixtureFlavor) -> Result<&CreateTestFixtureAction, TestgenError> {
        if !self.on_type_declaration {
            return Err(TestgenError::NoTypeDeclaration {
                file: self.location.file.clone(),
                line: self.location.line,
                col: self.location.col,
            });
        }
        self.actions
            .iter()
            .find(|a| a.flavor() == kind)
            .ok_or_else(|| TestgenError::NoTestProject {
                kind: kind.to_string(),
                project: self.source_project.clone(),
            })
    }
}

fn resolve_at(ctx: &CliContext, at: &str) -> Result<Resolved, TestgenError> {
    let location = Location::parse(at).ok_or_else(|| {
        TestgenError::invalid_args(format!(
            "invalid location format '{}', expected path:line:col",
            at
        ))
    })?;

    let snapshot = ctx.discover()?;
    let (project, document) =
        find_document_by_path(&snapshot, ctx.workspace_root(), Path::new(&location.file))
            .ok_or_else(|| TestgenError::file_not_found(location.file.clone()))?;

    let outline = SourceOutline::parse(document.text());
    let span = caret_at(document.text(), location.line, location.col);
    let on_type_declaration = outline
        .find_node(span)
        .is_some_and(|node| node.as_type_declaration().is_some());
    debug!(location = %location, %span, on_type_declaration, "resolving selection");

    let request = FixtureRequest {
        snapshot: &snapshot,
        document: document.id(),
        span,
        syntax: &outline,
        semantic: &outline,
        conventions: ctx.conventions(),
    };
    let actions = resolve_actions(&request, &CancellationToken::new())?;
    let source_project = project.name().to_string();

    Ok(Resolved {
        snapshot,
        location,
        source_project,
        on_type_declaration,
        actions,
    })
}

fn action_info(
    ctx: &CliContext,
    snapshot: &WorkspaceSnapshot,
    action: &CreateTestFixtureAction,
) -> ActionInfo {
    let descriptor = action.descriptor();
    let relative = descriptor.relative_path();
    let (path, exists) = match snapshot.project(action.target_project()) {
        Some(project) => {
            let on_disk = project
                .directory()
                .map(|dir| dir.join(&relative))
                .unwrap_or_else(|| PathBuf::from(&relative));
            let exists = on_disk.exists() || project.document_by_path(&relative).is_some();
            (ctx.relative(&on_disk), exists)
        }
        None => (relative, false),
    };

    ActionInfo {
        title: CodeAction::title(action).to_string(),
        kind: action.flavor().to_string(),
        project: action.target_project_name().to_string(),
        path,
        exists,
        artifact: descriptor.artifact_info(),
    }
}

/// Create `path` with `text`, failing if it already exists.
fn write_new_file(path: &Path, text: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(text.as_bytes())
}

fn project_relative(ctx: &CliContext, project: &Project, relative: &str) -> String {
    match project.directory() {
        Some(dir) => ctx.relative(&dir.join(relative)),
        None => relative.to_string(),
    }
}

fn to_json<T: serde::Serialize>(response: &T) -> Result<String, TestgenError> {
    serde_json::to_string_pretty(response)
        .map_err(|e| TestgenError::internal(format!("JSON serialization error: {}", e)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_new_file_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("FooTests.cs");
        write_new_file(&path, "class FooTests { }\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "class FooTests { }\n");
    }

    #[test]
    fn write_new_file_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("FooTests.cs");
        fs::write(&path, "// hand written\n").unwrap();

        let err = write_new_file(&path, "class FooTests { }\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&path).unwrap(), "// hand written\n");
    }
}
