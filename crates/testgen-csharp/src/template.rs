//! NUnit fixture templates.
//!
//! Two flavors exist:
//!
//! | Flavor | Base fixture | Setup attribute | Extra imports |
//! |--------|--------------|-----------------|---------------|
//! | `Unit` | `TestFakeBase` | `[SetUp]` (once per test) | fakes namespace |
//! | `Integration` | `TestBase` | `[OneTimeSetUp]` (once per fixture) | none |
//!
//! Both declare the fixture class in the test namespace, expose the type
//! under test as an injectable property, inject it from the ambient
//! container during setup and carry an empty arrange/act/assert test stub.
//! Rendering is pure and total.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::conventions::Conventions;

/// Which fixture template to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureFlavor {
    Unit,
    Integration,
}

impl FixtureFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixtureFlavor::Unit => "unit",
            FixtureFlavor::Integration => "integration",
        }
    }
}

impl fmt::Display for FixtureFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names substituted into a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureNames<'a> {
    pub type_name: &'a str,
    pub type_namespace: &'a str,
    pub test_type_name: &'a str,
    pub test_namespace: &'a str,
}

/// Render the fixture source for `flavor`.
pub fn render(flavor: FixtureFlavor, names: &FixtureNames<'_>, conventions: &Conventions) -> String {
    match flavor {
        FixtureFlavor::Unit => render_unit(names, conventions),
        FixtureFlavor::Integration => render_integration(names, conventions),
    }
}

/// Unit fixture: fake-aware base, setup once per test.
pub fn render_unit(names: &FixtureNames<'_>, conventions: &Conventions) -> String {
    let imports = [
        conventions.framework_namespace.as_str(),
        names.type_namespace,
        conventions.fakes_namespace.as_str(),
    ];

    render_fixture(
        names,
        &imports,
        &conventions.fake_base_fixture,
        "SetUp",
        Some("//Container.SetTable();"),
    )
}

/// Integration fixture: plain base, setup once per fixture.
pub fn render_integration(names: &FixtureNames<'_>, conventions: &Conventions) -> String {
    let imports = [conventions.framework_namespace.as_str(), names.type_namespace];

    render_fixture(names, &imports, &conventions.base_fixture, "OneTimeSetUp", None)
}

fn render_fixture(
    names: &FixtureNames<'_>,
    imports: &[&str],
    base_fixture: &str,
    setup_attribute: &str,
    arrangement_hint: Option<&str>,
) -> String {
    let type_name = names.type_name;
    let mut out = String::new();

    // The global namespace has no using directive.
    for import in imports.iter().filter(|i| !i.is_empty()) {
        out.push_str(&format!("using {};\n", import));
    }
    out.push('\n');

    out.push_str(&format!("namespace {}\n{{\n", names.test_namespace));
    out.push_str("    [TestFixture]\n");
    out.push_str(&format!(
        "    public class {} : {}\n    {{\n",
        names.test_type_name, base_fixture
    ));
    out.push_str(&format!(
        "        public {} {} {{ get; set; }}\n\n",
        type_name, type_name
    ));

    out.push_str(&format!("        [{}]\n", setup_attribute));
    out.push_str("        public void Init()\n");
    out.push_str("        {\n");
    out.push_str("            Container.InjectProperties(this);\n");
    out.push_str("        }\n\n");

    out.push_str("        [Test]\n");
    out.push_str("        public void SomeTest()\n");
    out.push_str("        {\n");
    out.push_str("            // --============================================= arrangement\n");
    if let Some(hint) = arrangement_hint {
        out.push_str(&format!("            {}\n", hint));
    }
    out.push('\n');
    out.push_str("            // --============================================= action\n");
    out.push_str(&format!("            //{}.\n\n", type_name));
    out.push_str("            // --============================================= assertion\n");
    out.push_str("        }\n");
    out.push_str("    }\n");
    out.push_str("}\n");
    out
}

// ============================================================================
// Tests
// ============================================================================
