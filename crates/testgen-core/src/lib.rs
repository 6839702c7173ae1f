//! Core infrastructure for testgen.
//!
//! This crate provides language-agnostic infrastructure:
//! - Immutable workspace snapshots (projects and documents with structural sharing)
//! - Stable identifiers and content hashes
//! - The code action seam between hosts and language operations
//! - Error types and error codes
//! - JSON output types for CLI responses
//! - Text utilities and diff generation

pub mod action;
pub mod diff;
pub mod error;
pub mod output;
pub mod text;
pub mod types;
pub mod workspace;
