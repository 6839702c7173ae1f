//! C# support for testgen.
//!
//! This crate provides the NUnit fixture generator on top of `testgen-core`:
//! - Naming conventions for test projects and fixtures
//! - Namespace and folder mapping into a test project
//! - Fixture templates (unit and integration flavors)
//! - Sibling test project location
//! - The host interface (syntax tree, semantic model) and a lightweight
//!   declaration outline implementing it
//! - `.csproj` workspace discovery
//! - The create-test-fixture code action

pub mod conventions;
pub mod declarations;
pub mod discover;
mod error_bridges;
pub mod locator;
pub mod namespace;
pub mod ops;
pub mod syntax;
pub mod template;
