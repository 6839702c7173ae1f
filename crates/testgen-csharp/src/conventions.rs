//! Naming conventions for test projects and generated fixtures.
//!
//! Defaults follow the NUnit layout used across the workspace:
//! `<Project>.NUnit` for unit tests, `<Project>.Integration.NUnit` for
//! integration tests, `<TypeName>Tests.cs` fixtures. Hosts may override any
//! field from a JSON file; missing fields keep their defaults.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading a conventions file.
#[derive(Debug, Error)]
pub enum ConventionsError {
    #[error("failed to read conventions file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid conventions file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A suffix is empty, which would match every project.
    #[error("invalid conventions: {field} must not be empty")]
    EmptyField { field: &'static str },
}

/// Test project and fixture naming conventions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conventions {
    /// Name suffix of unit test projects.
    pub unit_suffix: String,
    /// Name suffix of integration test projects.
    pub integration_suffix: String,
    /// Appended to the type name to form the fixture name.
    pub test_type_suffix: String,
    /// Extension of generated files, without the dot.
    pub file_extension: String,
    /// Namespace of the test framework attributes.
    pub framework_namespace: String,
    /// Namespace of the fakes support library imported by unit fixtures.
    pub fakes_namespace: String,
    /// Base type of integration fixtures.
    pub base_fixture: String,
    /// Base type of unit fixtures.
    pub fake_base_fixture: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Conventions {
            unit_suffix: ".NUnit".to_string(),
            integration_suffix: ".Integration.NUnit".to_string(),
            test_type_suffix: "Tests".to_string(),
            file_extension: "cs".to_string(),
            framework_namespace: "NUnit.Framework".to_string(),
            fakes_namespace: "Core.Fakes".to_string(),
            base_fixture: "TestBase".to_string(),
            fake_base_fixture: "TestFakeBase".to_string(),
        }
    }
}

impl Conventions {
    /// Load conventions from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConventionsError> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConventionsError::Io {
            path: display.clone(),
            source,
        })?;
        let conventions: Conventions =
            serde_json::from_str(&content).map_err(|source| ConventionsError::Json {
                path: display,
                source,
            })?;
        conventions.validate()?;
        Ok(conventions)
    }

    /// Reject settings that would make project matching meaningless.
    pub fn validate(&self) -> Result<(), ConventionsError> {
        if self.unit_suffix.is_empty() {
            return Err(ConventionsError::EmptyField {
                field: "unit_suffix",
            });
        }
        if self.integration_suffix.is_empty() {
            return Err(ConventionsError::EmptyField {
                field: "integration_suffix",
            });
        }
        Ok(())
    }

    /// `<TypeName><suffix>`, e.g. `FooTests`.
    pub fn test_type_name(&self, type_name: &str) -> String {
        format!("{}{}", type_name, self.test_type_suffix)
    }

    /// File name for a fixture type, e.g. `FooTests.cs`.
    pub fn file_name(&self, test_type_name: &str) -> String {
        if self.file_extension.is_empty() {
            test_type_name.to_string()
        } else {
            format!("{}.{}", test_type_name, self.file_extension)
        }
    }

    /// Unit test project names end with the unit suffix but not the integration suffix.
    pub fn is_unit_project(&self, name: &str) -> bool {
        name.ends_with(&self.unit_suffix) && !self.is_integration_project(name)
    }

    pub fn is_integration_project(&self, name: &str) -> bool {
        name.ends_with(&self.integration_suffix)
    }
}

// ============================================================================
// Tests
// ============================================================================
