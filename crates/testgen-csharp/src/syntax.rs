//! Host interface: the syntax and semantic collaborators.
//!
//! Parsing and symbol binding belong to the host. The action resolver only
//! needs two questions answered:
//!
//! - [`SyntaxTree::find_node`]: what node covers this selection?
//! - [`SemanticModel::declared_symbol`]: which type does this declaration declare?
//!
//! [`crate::declarations::SourceOutline`] is a lightweight implementation of
//! both for hosts without a compiler front end.

use std::fmt;

use serde::{Deserialize, Serialize};

use testgen_core::types::Span;

use crate::namespace::join_namespace;

/// Kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Struct,
    Record,
    Interface,
}

impl TypeKind {
    /// Parse the declaration keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "class" => Some(TypeKind::Class),
            "struct" => Some(TypeKind::Struct),
            "record" => Some(TypeKind::Record),
            "interface" => Some(TypeKind::Interface),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Record => "record",
            TypeKind::Interface => "interface",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type declaration node in a syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    /// Declared identifier, without generic parameters.
    pub identifier: String,
    pub kind: TypeKind,
    /// Byte span of the whole declaration.
    pub span: Span,
}

/// The node found at a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    TypeDeclaration(TypeDeclaration),
    /// Any other node; `kind` is informational only.
    Other { kind: String, span: Span },
}

impl SyntaxNode {
    pub fn as_type_declaration(&self) -> Option<&TypeDeclaration> {
        match self {
            SyntaxNode::TypeDeclaration(decl) => Some(decl),
            SyntaxNode::Other { .. } => None,
        }
    }
}

/// Syntax tree of one document.
pub trait SyntaxTree {
    /// Innermost node covering `span`, or `None` when nothing does.
    fn find_node(&self, span: Span) -> Option<SyntaxNode>;
}

/// A resolved type symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSymbol {
    pub name: String,
    /// Containing namespace names, outermost first. The global namespace has
    /// an empty name.
    pub containing_namespaces: Vec<String>,
}

impl TypeSymbol {
    /// Dotted containing namespace; empty for the global namespace.
    pub fn containing_namespace(&self) -> String {
        join_namespace(&self.containing_namespaces)
    }
}

/// Semantic model of one document.
pub trait SemanticModel {
    /// The symbol declared by `declaration`, or `None` when binding fails.
    fn declared_symbol(&self, declaration: &TypeDeclaration) -> Option<TypeSymbol>;
}
