//! Namespace and folder mapping from a source project to a test project.
//!
//! A type in `Acme.Widgets.Core` inside project `Acme.Widgets` maps to
//! namespace `Acme.Widgets.NUnit.Core` in test project `Acme.Widgets.NUnit`,
//! and its fixture file lives under folder `Core/`.

/// Strip `"<project>."` from the start of `namespace`, once.
///
/// A namespace equal to the project name is the project's root namespace and
/// strips to the empty string. Anything else without the prefix is returned
/// unchanged.
pub fn strip_project_prefix<'a>(namespace: &'a str, project_name: &str) -> &'a str {
    if namespace == project_name {
        return "";
    }
    namespace
        .strip_prefix(project_name)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(namespace)
}

/// Namespace of the fixture type inside the test project.
///
/// `test_project + "." + stripped`, or just `test_project` when the stripped
/// namespace is empty.
pub fn map_namespace(namespace: &str, source_project: &str, test_project: &str) -> String {
    let stripped = strip_project_prefix(namespace, source_project);
    if stripped.is_empty() {
        test_project.to_string()
    } else {
        format!("{}.{}", test_project, stripped)
    }
}

/// Folder segments under which the fixture file is placed.
///
/// An empty stripped namespace yields no segments (project root).
pub fn map_folders(namespace: &str, source_project: &str) -> Vec<String> {
    let stripped = strip_project_prefix(namespace, source_project);
    if stripped.is_empty() {
        return Vec::new();
    }
    stripped.split('.').map(str::to_string).collect()
}

/// Join containing-namespace names outer to inner, skipping empty names.
///
/// The global namespace has an empty name, so a type declared outside any
/// namespace yields the empty string.
pub fn join_namespace<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

// ============================================================================
// Tests
// ============================================================================
