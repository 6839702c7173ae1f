//! Sibling test project discovery.
//!
//! Test projects sit next to the project they test:
//!
//! ```text
//! src/
//!   Acme.Widgets/Acme.Widgets.csproj
//!   Acme.Widgets.NUnit/Acme.Widgets.NUnit.csproj
//!   Acme.Widgets.Integration.NUnit/Acme.Widgets.Integration.NUnit.csproj
//! ```
//!
//! Two projects are siblings when their manifests share the same directory
//! two levels up. Among the siblings, the test projects are recognized by
//! name suffix; a kind with zero or several candidates has no target.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use testgen_core::workspace::Project;

use crate::conventions::Conventions;

/// Directory containing the manifest's directory, lexically normalized.
///
/// `None` when the manifest path has no grandparent.
pub fn project_root_directory(manifest_path: &Path) -> Option<PathBuf> {
    let normalized = normalize(manifest_path);
    normalized.parent()?.parent().map(Path::to_path_buf)
}

/// Whether two manifests live under the same root directory.
///
/// A path without a grandparent is never a sibling of anything.
pub fn is_sibling(a: &Path, b: &Path) -> bool {
    match (project_root_directory(a), project_root_directory(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` of the root is the root.
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component.as_os_str()),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// The test projects found next to a source project.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiblingTestProjects<'a> {
    pub integration: Option<&'a Project>,
    pub unit: Option<&'a Project>,
}

impl SiblingTestProjects<'_> {
    pub fn is_empty(&self) -> bool {
        self.integration.is_none() && self.unit.is_none()
    }
}

/// Find the single integration and single unit test project among the
/// siblings of `source`.
///
/// The source project belongs to its own sibling set and is not excluded.
pub fn find_sibling_test_projects<'a>(
    projects: impl IntoIterator<Item = &'a Project>,
    source: &Project,
    conventions: &Conventions,
) -> SiblingTestProjects<'a> {
    let siblings: Vec<&Project> = projects
        .into_iter()
        .filter(|p| is_sibling(source.manifest_path(), p.manifest_path()))
        .collect();

    let integration = single_match(&siblings, "integration", |p| {
        conventions.is_integration_project(p.name())
    });
    let unit = single_match(&siblings, "unit", |p| conventions.is_unit_project(p.name()));

    SiblingTestProjects { integration, unit }
}

fn single_match<'a>(
    siblings: &[&'a Project],
    kind: &str,
    predicate: impl Fn(&Project) -> bool,
) -> Option<&'a Project> {
    let matches: Vec<&'a Project> = siblings.iter().copied().filter(|p| predicate(p)).collect();
    match matches.as_slice() {
        [single] => Some(*single),
        [] => None,
        many => {
            debug!(
                kind,
                candidates = ?many.iter().map(|p| p.name()).collect::<Vec<_>>(),
                "ambiguous test projects, offering none"
            );
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use testgen_core::workspace::WorkspaceSnapshot;

    fn snapshot(projects: &[(&str, &str)]) -> WorkspaceSnapshot {
        let mut builder = WorkspaceSnapshot::builder();
        for (name, manifest) in projects {
            builder.add_project(*name, *manifest);
        }
        builder.build()
    }

    mod sibling_tests {
        use super::*;

        #[test]
        fn root_directory_is_grandparent() {
            assert_eq!(
                project_root_directory(Path::new("/repo/src/Acme/Acme.csproj")),
                Some(PathBuf::from("/repo/src"))
            );
        }

        #[test]
        fn root_directory_normalizes_dots() {
            assert_eq!(
                project_root_directory(Path::new("/repo/src/./Acme/../Acme/Acme.csproj")),
                Some(PathBuf::from("/repo/src"))
            );
        }

        #[test]
        fn parent_of_root_stays_at_root() {
            assert_eq!(
                project_root_directory(Path::new("/../src/Acme/Acme.csproj")),
                Some(PathBuf::from("/src"))
            );
            assert!(is_sibling(
                Path::new("/../a/A.csproj"),
                Path::new("/b/B.csproj"),
            ));
        }

        #[test]
        fn leading_parent_of_relative_path_is_kept() {
            assert_eq!(
                project_root_directory(Path::new("../src/Acme/Acme.csproj")),
                Some(PathBuf::from("../src"))
            );
        }

        #[test]
        fn same_root_is_sibling() {
            assert!(is_sibling(
                Path::new("/repo/src/Acme/Acme.csproj"),
                Path::new("/repo/src/Acme.NUnit/Acme.NUnit.csproj"),
            ));
        }

        #[test]
        fn different_root_is_not_sibling() {
            assert!(!is_sibling(
                Path::new("/repo/src/Acme/Acme.csproj"),
                Path::new("/repo/tests/Acme.NUnit/Acme.NUnit.csproj"),
            ));
        }

        #[test]
        fn nested_depth_is_not_sibling() {
            assert!(!is_sibling(
                Path::new("/repo/src/Acme/Acme.csproj"),
                Path::new("/repo/src/tests/Acme.NUnit/Acme.NUnit.csproj"),
            ));
        }

        #[test]
        fn missing_path_is_never_sibling() {
            assert!(!is_sibling(Path::new(""), Path::new("")));
            assert!(!is_sibling(Path::new("Acme.csproj"), Path::new("Acme.csproj")));
            assert!(!is_sibling(Path::new("/Acme.csproj"), Path::new("/repo/A/A.csproj")));
        }

        #[test]
        fn project_is_its_own_sibling() {
            let p = Path::new("/repo/src/Acme/Acme.csproj");
            assert!(is_sibling(p, p));
        }
    }

    mod find_tests {
        use super::*;

        #[test]
        fn finds_unit_and_integration() {
            let s = snapshot(&[
                ("Acme.Widgets", "/r/src/Acme.Widgets/Acme.Widgets.csproj"),
                ("Acme.Widgets.NUnit", "/r/src/Acme.Widgets.NUnit/Acme.Widgets.NUnit.csproj"),
                (
                    "Acme.Widgets.Integration.NUnit",
                    "/r/src/Acme.Widgets.Integration.NUnit/Acme.Widgets.Integration.NUnit.csproj",
                ),
            ]);
            let source = s.project_by_name("Acme.Widgets").unwrap();
            let found = find_sibling_test_projects(s.projects(), source, &Conventions::default());
            assert_eq!(found.unit.map(|p| p.name()), Some("Acme.Widgets.NUnit"));
            assert_eq!(
                found.integration.map(|p| p.name()),
                Some("Acme.Widgets.Integration.NUnit")
            );
        }

        #[test]
        fn ambiguous_unit_projects_yield_none() {
            let s = snapshot(&[
                ("Acme.Widgets", "/r/src/Acme.Widgets/Acme.Widgets.csproj"),
                ("Acme.Widgets.NUnit", "/r/src/Acme.Widgets.NUnit/Acme.Widgets.NUnit.csproj"),
                ("Acme.Other.NUnit", "/r/src/Acme.Other.NUnit/Acme.Other.NUnit.csproj"),
            ]);
            let source = s.project_by_name("Acme.Widgets").unwrap();
            let found = find_sibling_test_projects(s.projects(), source, &Conventions::default());
            assert!(found.unit.is_none());
            assert!(found.integration.is_none());
            assert!(found.is_empty());
        }

        #[test]
        fn ambiguous_integration_keeps_unit() {
            let s = snapshot(&[
                ("Acme", "/r/src/Acme/Acme.csproj"),
                ("Acme.NUnit", "/r/src/Acme.NUnit/Acme.NUnit.csproj"),
                ("Acme.A.Integration.NUnit", "/r/src/A/A.csproj"),
                ("Acme.B.Integration.NUnit", "/r/src/B/B.csproj"),
            ]);
            let source = s.project_by_name("Acme").unwrap();
            let found = find_sibling_test_projects(s.projects(), source, &Conventions::default());
            assert!(found.integration.is_none());
            assert_eq!(found.unit.map(|p| p.name()), Some("Acme.NUnit"));
        }

        #[test]
        fn non_sibling_test_projects_are_ignored() {
            let s = snapshot(&[
                ("Acme", "/r/src/Acme/Acme.csproj"),
                ("Acme.NUnit", "/r/tests/Acme.NUnit/Acme.NUnit.csproj"),
            ]);
            let source = s.project_by_name("Acme").unwrap();
            let found = find_sibling_test_projects(s.projects(), source, &Conventions::default());
            assert!(found.is_empty());
        }

        #[test]
        fn source_project_can_match_itself() {
            // No self-exclusion: a test project asking for siblings finds itself.
            let s = snapshot(&[("Acme.NUnit", "/r/src/Acme.NUnit/Acme.NUnit.csproj")]);
            let source = s.project_by_name("Acme.NUnit").unwrap();
            let found = find_sibling_test_projects(s.projects(), source, &Conventions::default());
            assert_eq!(found.unit.map(|p| p.id()), Some(source.id()));
        }

        #[test]
        fn custom_suffixes_are_honored() {
            let s = snapshot(&[
                ("Acme", "/r/src/Acme/Acme.csproj"),
                ("Acme.Tests", "/r/src/Acme.Tests/Acme.Tests.csproj"),
                ("Acme.IntegrationTests", "/r/src/Acme.IT/Acme.IT.csproj"),
            ]);
            let conventions = Conventions {
                unit_suffix: ".Tests".to_string(),
                integration_suffix: ".IntegrationTests".to_string(),
                ..Conventions::default()
            };
            let source = s.project_by_name("Acme").unwrap();
            let found = find_sibling_test_projects(s.projects(), source, &conventions);
            assert_eq!(found.unit.map(|p| p.name()), Some("Acme.Tests"));
            assert_eq!(found.integration.map(|p| p.name()), Some("Acme.IntegrationTests"));
        }
    }

    fn manifest_path() -> impl Strategy<Value = String> {
        prop::collection::vec(prop_oneof!["[a-c]", Just("..".to_string()), Just(".".to_string())], 0..5)
            .prop_map(|parts| {
                let mut path = parts.join("/");
                path.push_str("/P.csproj");
                path
            })
    }

    proptest! {
        #[test]
        fn sibling_detection_is_symmetric(a in manifest_path(), b in manifest_path()) {
            prop_assert_eq!(
                is_sibling(Path::new(&a), Path::new(&b)),
                is_sibling(Path::new(&b), Path::new(&a))
            );
        }

        #[test]
        fn absolute_variant_is_symmetric(a in manifest_path(), b in manifest_path()) {
            let a = format!("/{}", a);
            let b = format!("/{}", b);
            prop_assert_eq!(
                is_sibling(Path::new(&a), Path::new(&b)),
                is_sibling(Path::new(&b), Path::new(&a))
            );
        }
    }
}
