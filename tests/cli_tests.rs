//! CLI end-to-end tests.
//!
//! These tests build a small C# workspace in a temporary directory, spawn the
//! actual `testgen` binary and validate stdout, exit codes and the files left
//! on disk.
//!
//! Exit code expectations:
//! - 0: Success
//! - 2: Invalid arguments (malformed location, bad conventions)
//! - 3: Resolution error (no type declaration, no test project, unknown file)
//! - 4: Apply error (fixture file already exists)

use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

const FOO: &str = "\
using System;

namespace Acme.Widgets.Core
{
    public class Foo
    {
        public void Run() { }
    }
}
";

/// Caret on the `Foo` identifier.
const AT_FOO: &str = "src/Acme.Widgets/Core/Foo.cs:5:18";
/// Caret on the `Run` method.
const AT_RUN: &str = "src/Acme.Widgets/Core/Foo.cs:7:21";

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn add_project(root: &Path, name: &str) {
    write(
        root,
        &format!("src/{0}/{0}.csproj", name),
        "<Project Sdk=\"Microsoft.NET.Sdk\" />\n",
    );
}

/// Workspace with the source project and the given test projects.
fn workspace(test_projects: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    add_project(dir.path(), "Acme.Widgets");
    write(dir.path(), "src/Acme.Widgets/Core/Foo.cs", FOO);
    for name in test_projects {
        add_project(dir.path(), name);
    }
    dir
}

fn full_workspace() -> TempDir {
    workspace(&["Acme.Widgets.NUnit", "Acme.Widgets.Integration.NUnit"])
}

/// Run testgen against `root` and return (stdout, stderr, exit_code).
fn run_testgen(root: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_testgen"))
        .arg("--workspace")
        .arg(root)
        .args(args)
        .output()
        .expect("failed to execute testgen");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn run_json(root: &Path, args: &[&str]) -> (Value, i32) {
    let (stdout, stderr, code) = run_testgen(root, args);
    let json: Value = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout should be valid JSON ({}): {}\nstderr: {}", e, stdout, stderr));
    (json, code)
}

// ============================================================================
// Projects
// ============================================================================

mod projects_tests {
    use super::*;

    #[test]
    fn lists_projects_with_siblings() {
        let dir = full_workspace();
        let (json, code) = run_json(dir.path(), &["projects"]);
        assert_eq!(code, 0);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["schema_version"], "1");
        assert!(json["snapshot_id"].as_str().unwrap().starts_with("snap_"));

        let projects = json["projects"].as_array().unwrap();
        assert_eq!(projects.len(), 3);
        let widgets = projects
            .iter()
            .find(|p| p["name"] == "Acme.Widgets")
            .unwrap();
        assert_eq!(widgets["manifest"], "src/Acme.Widgets/Acme.Widgets.csproj");
        assert_eq!(widgets["documents"], 1);
        assert_eq!(widgets["unit_tests"], "Acme.Widgets.NUnit");
        assert_eq!(widgets["integration_tests"], "Acme.Widgets.Integration.NUnit");
    }

    #[test]
    fn empty_directory_is_invalid_arguments() {
        let dir = TempDir::new().unwrap();
        let (json, code) = run_json(dir.path(), &["projects"]);
        assert_eq!(code, 2);
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"]["code"], 2);
    }
}

// ============================================================================
// Actions
// ============================================================================

mod actions_tests {
    use super::*;

    #[test]
    fn offers_integration_then_unit() {
        let dir = full_workspace();
        let (json, code) = run_json(dir.path(), &["actions", "--at", AT_FOO]);
        assert_eq!(code, 0);

        let actions = json["actions"].as_array().unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0]["kind"], "integration");
        assert_eq!(
            actions[0]["title"],
            "Create FooTests.cs integration test for this class in the Acme.Widgets.Integration.NUnit project"
        );
        assert_eq!(actions[1]["kind"], "unit");
        assert_eq!(actions[1]["path"], "src/Acme.Widgets.NUnit/Core/FooTests.cs");
        assert_eq!(actions[1]["exists"], false);

        let artifact = &actions[1]["artifact"];
        assert_eq!(artifact["test_type_name"], "FooTests");
        assert_eq!(artifact["test_namespace"], "Acme.Widgets.NUnit.Core");
        assert_eq!(artifact["folders"], serde_json::json!(["Core"]));
        assert_eq!(artifact["file_name"], "FooTests.cs");
        assert_eq!(json["location"]["line"], 5);
    }

    #[test]
    fn method_selection_offers_nothing() {
        let dir = full_workspace();
        let (json, code) = run_json(dir.path(), &["actions", "--at", AT_RUN]);
        assert_eq!(code, 0);
        assert_eq!(json["actions"], serde_json::json!([]));
    }

    #[test]
    fn ambiguous_unit_projects_offer_no_unit_action() {
        let dir = workspace(&["Acme.Widgets.NUnit", "Acme.Gadgets.NUnit"]);
        let (json, code) = run_json(dir.path(), &["actions", "--at", AT_FOO]);
        assert_eq!(code, 0);
        assert_eq!(json["actions"], serde_json::json!([]));
    }

    #[test]
    fn malformed_location_is_invalid_arguments() {
        let dir = full_workspace();
        let (json, code) = run_json(dir.path(), &["actions", "--at", "Foo.cs"]);
        assert_eq!(code, 2);
        assert_eq!(json["error"]["code"], 2);
    }

    #[test]
    fn unknown_file_is_resolution_error() {
        let dir = full_workspace();
        let (json, code) = run_json(dir.path(), &["actions", "--at", "src/Nope.cs:1:1"]);
        assert_eq!(code, 3);
        assert_eq!(json["error"]["details"]["path"], "src/Nope.cs");
    }

    #[test]
    fn custom_conventions_are_applied() {
        let dir = workspace(&["Acme.Widgets.Tests"]);
        write(
            dir.path(),
            "testgen.json",
            r#"{ "unit_suffix": ".Tests", "test_type_suffix": "Specs" }"#,
        );
        let conventions = dir.path().join("testgen.json");
        let (json, code) = run_json(
            dir.path(),
            &[
                "--conventions",
                conventions.to_str().unwrap(),
                "actions",
                "--at",
                AT_FOO,
            ],
        );
        assert_eq!(code, 0);
        let actions = json["actions"].as_array().unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0]["project"], "Acme.Widgets.Tests");
        assert_eq!(actions[0]["artifact"]["file_name"], "FooSpecs.cs");
    }
}

// ============================================================================
// Preview
// ============================================================================

mod preview_tests {
    use super::*;

    #[test]
    fn diff_creates_fixture_file() {
        let dir = full_workspace();
        let (stdout, _stderr, code) =
            run_testgen(dir.path(), &["preview", "--at", AT_FOO, "--kind", "unit"]);
        assert_eq!(code, 0);
        assert!(stdout.starts_with(
            "--- /dev/null\n+++ b/src/Acme.Widgets.NUnit/Core/FooTests.cs\n@@ -0,0 +1,"
        ));
        assert!(stdout.contains("+namespace Acme.Widgets.NUnit.Core\n"));
        assert!(stdout.contains("+    public class FooTests : TestFakeBase\n"));
        assert!(!dir.path().join("src/Acme.Widgets.NUnit/Core/FooTests.cs").exists());
    }

    #[test]
    fn json_reports_both_snapshots() {
        let dir = full_workspace();
        let (json, code) = run_json(
            dir.path(),
            &["preview", "--at", AT_FOO, "--kind", "integration", "--format", "json"],
        );
        assert_eq!(code, 0);
        assert_ne!(json["snapshot_id"], json["derived_snapshot_id"]);
        assert_eq!(json["action"]["kind"], "integration");
        let text = json["text"].as_str().unwrap();
        assert!(text.contains("[OneTimeSetUp]"));
        assert!(text.contains("public class FooTests : TestBase"));
        assert!(json["unified_diff"]
            .as_str()
            .unwrap()
            .contains("+++ b/src/Acme.Widgets.Integration.NUnit/Core/FooTests.cs"));
    }

    #[test]
    fn method_selection_is_no_type_declaration() {
        let dir = full_workspace();
        let (json, code) = run_json(dir.path(), &["preview", "--at", AT_RUN, "--kind", "unit"]);
        assert_eq!(code, 3);
        assert_eq!(json["error"]["location"]["line"], 7);
    }

    #[test]
    fn missing_test_project_is_resolution_error() {
        let dir = workspace(&["Acme.Widgets.NUnit"]);
        let (json, code) = run_json(
            dir.path(),
            &["preview", "--at", AT_FOO, "--kind", "integration"],
        );
        assert_eq!(code, 3);
        assert_eq!(json["error"]["details"]["kind"], "integration");
        assert_eq!(json["error"]["details"]["project"], "Acme.Widgets");
    }
}

// ============================================================================
// Apply
// ============================================================================

mod apply_tests {
    use super::*;

    #[test]
    fn writes_fixture_and_reports_document_to_open() {
        let dir = full_workspace();
        let (json, code) = run_json(dir.path(), &["apply", "--at", AT_FOO, "--kind", "unit"]);
        assert_eq!(code, 0);
        assert_eq!(json["status"], "ok");
        assert_eq!(
            json["files_written"],
            serde_json::json!(["src/Acme.Widgets.NUnit/Core/FooTests.cs"])
        );
        assert_eq!(json["open"], "src/Acme.Widgets.NUnit/Core/FooTests.cs");

        let written =
            fs::read_to_string(dir.path().join("src/Acme.Widgets.NUnit/Core/FooTests.cs")).unwrap();
        assert!(written.starts_with("using NUnit.Framework;\nusing Acme.Widgets.Core;\nusing Core.Fakes;\n"));
        assert!(written.contains("        [SetUp]\n"));

        // Source file is untouched.
        let source = fs::read_to_string(dir.path().join("src/Acme.Widgets/Core/Foo.cs")).unwrap();
        assert_eq!(source, FOO);
    }

    #[test]
    fn second_apply_refuses_to_overwrite() {
        let dir = full_workspace();
        let (_, code) = run_json(dir.path(), &["apply", "--at", AT_FOO, "--kind", "unit"]);
        assert_eq!(code, 0);

        let (json, code) = run_json(dir.path(), &["actions", "--at", AT_FOO]);
        assert_eq!(code, 0);
        assert_eq!(json["actions"][1]["exists"], true);

        let (json, code) = run_json(dir.path(), &["apply", "--at", AT_FOO, "--kind", "unit"]);
        assert_eq!(code, 4);
        assert_eq!(json["error"]["code"], 4);
        assert_eq!(json["error"]["details"]["file"], "Core/FooTests.cs");
    }

    #[test]
    fn root_namespace_fixture_lands_in_project_root() {
        let dir = workspace(&["Acme.Widgets.Integration.NUnit"]);
        write(
            dir.path(),
            "src/Acme.Widgets/Widget.cs",
            "namespace Acme.Widgets;\n\npublic record Widget(string Name);\n",
        );
        let (json, code) = run_json(
            dir.path(),
            &["apply", "--at", "src/Acme.Widgets/Widget.cs:3:15", "--kind", "integration"],
        );
        assert_eq!(code, 0);
        assert_eq!(json["open"], "src/Acme.Widgets.Integration.NUnit/WidgetTests.cs");
        let written = fs::read_to_string(
            dir.path()
                .join("src/Acme.Widgets.Integration.NUnit/WidgetTests.cs"),
        )
        .unwrap();
        assert!(written.contains("namespace Acme.Widgets.Integration.NUnit\n"));
    }

    #[test]
    fn json_logs_go_to_stderr() {
        let dir = full_workspace();
        let (stdout, stderr, code) = run_testgen(
            dir.path(),
            &[
                "--log-level",
                "info",
                "--log-format",
                "json",
                "apply",
                "--at",
                AT_FOO,
                "--kind",
                "integration",
            ],
        );
        assert_eq!(code, 0);
        let _: Value = serde_json::from_str(&stdout).unwrap();
        let line = stderr.lines().find(|l| l.contains("wrote test fixture")).unwrap();
        let log: Value = serde_json::from_str(line).unwrap();
        assert_eq!(log["level"], "INFO");
    }
}
