//! C# code actions.
//!
//! Each operation resolves a set of titled actions against a workspace
//! snapshot and derives new snapshots on demand; nothing here writes to disk.

pub mod create_test_fixture;

pub use create_test_fixture::{
    resolve_actions, AppliedFixture, CreateTestFixtureAction, FixtureError, FixtureRequest,
    FixtureResult, TestArtifactDescriptor,
};
pub use testgen_core::action::{ActionOperation, CancellationToken, CodeAction};
