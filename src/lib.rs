//! testgen: scaffold NUnit test fixtures for C# types.
//!
//! Given a type declaration selected in a C# source file, testgen locates the
//! sibling unit and integration test projects and creates a fixture file in
//! the namespace-derived folder of the chosen project.

// Core infrastructure - re-exported from testgen-core
pub use testgen_core::action;
pub use testgen_core::diff;
pub use testgen_core::error;
pub use testgen_core::output;
pub use testgen_core::text;
pub use testgen_core::types;
pub use testgen_core::workspace;

// Language support
pub use testgen_csharp as csharp;

// Front door
pub mod cli;

// Error bridges (language-specific errors -> TestgenError) live in testgen-csharp
// because of the orphan rule.
