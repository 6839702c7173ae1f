//! Workspace discovery from `.csproj` manifests on disk.
//!
//! Every `*.csproj` under the root becomes a project named after the
//! manifest's file stem. Every `*.cs` file belongs to the project whose
//! directory is its nearest ancestor; its folders are the directories between
//! the project directory and the file. Files outside any project are skipped.
//!
//! Discovery is deterministic: entries are visited in sorted order, so the
//! same tree always yields the same ids and the same snapshot id.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use testgen_core::workspace::{
    Document, NewDocument, Project, WorkspaceError, WorkspaceSnapshot,
};

/// Directory names skipped by default.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    "bin",
    "obj",
    ".git",
    ".vs",
    "node_modules",
    "packages",
    "TestResults",
];

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during workspace discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The workspace root is missing or not a directory.
    #[error("workspace root not found: {path}")]
    RootNotFound { path: String },

    /// No `.csproj` manifest under the root.
    #[error("no .csproj projects found under {root}")]
    NoProjects { root: String },

    /// Reading a source file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Walking the directory tree failed.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

/// Result type for discovery.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

// ============================================================================
// Configuration
// ============================================================================

/// Discovery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Directory names never descended into.
    pub exclude_dirs: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        DiscoveryConfig {
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DiscoveryConfig {
    /// Defaults plus `extra` directory names.
    pub fn with_excludes<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = DiscoveryConfig::default();
        config.exclude_dirs.extend(extra.into_iter().map(Into::into));
        config
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }
}

// ============================================================================
// Discovery
// ============================================================================

/// Build a snapshot of the C# workspace under `root`.
///
/// Manifest paths in the snapshot are `root` joined with the manifest's
/// relative path, so pass an absolute root to get absolute manifests.
pub fn discover_workspace(root: &Path, config: &DiscoveryConfig) -> DiscoveryResult<WorkspaceSnapshot> {
    if !root.is_dir() {
        return Err(DiscoveryError::RootNotFound {
            path: root.display().to_string(),
        });
    }

    let mut manifests: Vec<PathBuf> = Vec::new();
    let mut sources: Vec<PathBuf> = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !config.is_excluded(&entry.file_name().to_string_lossy())
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        match path.extension().and_then(|e| e.to_str()) {
            Some("csproj") => manifests.push(path.to_path_buf()),
            Some("cs") => sources.push(path.to_path_buf()),
            _ => {}
        }
    }

    if manifests.is_empty() {
        return Err(DiscoveryError::NoProjects {
            root: root.display().to_string(),
        });
    }

    let mut builder = WorkspaceSnapshot::builder();
    let mut project_dirs = Vec::with_capacity(manifests.len());
    for manifest in &manifests {
        let name = manifest
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let id = builder.add_project(name, manifest.clone());
        let dir = manifest.parent().map(Path::to_path_buf).unwrap_or_default();
        project_dirs.push((id, dir));
    }

    for source in &sources {
        let owner = project_dirs
            .iter()
            .filter(|(_, dir)| source.starts_with(dir))
            .max_by_key(|(_, dir)| dir.components().count());
        let Some((project, dir)) = owner else {
            warn!(file = %source.display(), "source file outside any project, skipped");
            continue;
        };

        let text = match fs::read_to_string(source) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!(file = %source.display(), "source file is not UTF-8, skipped");
                continue;
            }
            Err(source_err) => {
                return Err(DiscoveryError::Io {
                    path: source.display().to_string(),
                    source: source_err,
                });
            }
        };

        let Ok(relative) = source.strip_prefix(dir) else {
            continue;
        };
        let folders: Vec<String> = relative
            .parent()
            .map(|p| {
                p.components()
                    .filter_map(|c| match c {
                        Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        let name = relative
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        builder.add_document(*project, NewDocument::new(name, folders, text))?;
    }

    let snapshot = builder.build();
    debug!(
        snapshot = %snapshot.id(),
        projects = snapshot.project_count(),
        documents = snapshot.document_count(),
        "workspace discovered"
    );
    Ok(snapshot)
}

/// On-disk path of a document: project directory joined with its relative path.
pub fn document_path(project: &Project, document: &Document) -> PathBuf {
    let mut path = project.directory().map(Path::to_path_buf).unwrap_or_default();
    path.extend(document.folders());
    path.push(document.name());
    path
}

/// Find the document stored at `path` (absolute, or relative to `root`).
pub fn find_document_by_path<'a>(
    snapshot: &'a WorkspaceSnapshot,
    root: &Path,
    path: &Path,
) -> Option<(&'a Project, &'a Document)> {
    let wanted = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };
    snapshot.projects().find_map(|project| {
        project
            .documents()
            .find(|doc| document_path(project, doc) == wanted)
            .map(|doc| (project, doc))
    })
}

/// `path` relative to `root` with forward slashes, or `path` as-is when it
/// lies outside the root.
pub fn workspace_relative(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// Tests
// ============================================================================
