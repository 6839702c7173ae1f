//! Lightweight C# declaration outline.
//!
//! Not a parser. The outline finds namespace blocks (braced and file-scoped)
//! and `class`/`struct`/`record`/`interface` declarations with enough
//! precision to answer "is the caret on a type declaration, and in which
//! namespace does it live". Comments, string literals, character literals
//! and preprocessor lines are blanked out before matching so braces and
//! keywords inside them are ignored.
//!
//! [`SourceOutline`] implements both [`SyntaxTree`] and [`SemanticModel`],
//! which is all the fixture action needs from a host.

use std::sync::LazyLock;

use regex::Regex;

use testgen_core::types::Span;

use crate::syntax::{SemanticModel, SyntaxNode, SyntaxTree, TypeDeclaration, TypeKind, TypeSymbol};

static NAMESPACE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bnamespace\s+(@?[A-Za-z_][A-Za-z0-9_.]*)\s*([{;])").expect("valid regex")
});

static TYPE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(record\s+(?:class|struct)|class|struct|record|interface)\s+(@?[A-Za-z_][A-Za-z0-9_]*)",
    )
    .expect("valid regex")
});

/// Words that may precede a type keyword as part of the declaration.
const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "internal",
    "static",
    "sealed",
    "abstract",
    "partial",
    "readonly",
    "unsafe",
    "new",
    "file",
    "ref",
];

/// Words that follow a type keyword without naming a type: constraint
/// keywords after `class`/`struct`, and operators after a variable named
/// `record`.
const NOT_TYPE_NAMES: &[&str] = &[
    "where", "new", "unmanaged", "notnull", "is", "as", "with", "switch", "and", "or", "not",
    "when", "in",
];

/// A namespace declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBlock {
    /// Dotted name as written.
    pub name: String,
    /// From the `namespace` keyword to the closing brace, or to the end of the
    /// file for a file-scoped namespace.
    pub span: Span,
    pub file_scoped: bool,
}

/// A type declaration found in the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineType {
    pub declaration: TypeDeclaration,
    /// Modifiers, keyword, name, type parameters, base list and constraints.
    pub header: Span,
    /// Braced body, braces included. `None` for `record Foo(int X);`.
    pub body: Option<Span>,
    /// Dotted containing namespace; empty for the global namespace.
    pub namespace: String,
}

/// Namespaces and type declarations of one C# source file.
#[derive(Debug, Clone, Default)]
pub struct SourceOutline {
    len: usize,
    namespaces: Vec<NamespaceBlock>,
    types: Vec<OutlineType>,
}

impl SourceOutline {
    /// Build the outline of `text`. Never fails; unrecognized text yields an
    /// empty outline.
    pub fn parse(text: &str) -> Self {
        let code = mask_non_code(text);
        let bytes = code.as_bytes();

        let namespaces: Vec<NamespaceBlock> = NAMESPACE_DECL
            .captures_iter(&code)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = caps.get(1)?.as_str().trim_start_matches('@').to_string();
                let terminator = caps.get(2)?;
                let file_scoped = terminator.as_str() == ";";
                let end = if file_scoped {
                    bytes.len()
                } else {
                    matching_brace(bytes, terminator.start()).map_or(bytes.len(), |c| c + 1)
                };
                Some(NamespaceBlock {
                    name,
                    span: Span::new(whole.start(), end),
                    file_scoped,
                })
            })
            .collect();

        let mut types = Vec::new();
        for caps in TYPE_DECL.captures_iter(&code) {
            let (Some(keyword), Some(ident)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let identifier = ident.as_str().trim_start_matches('@');
            if NOT_TYPE_NAMES.contains(&identifier) {
                continue;
            }
            let Some(kind) = keyword
                .as_str()
                .split_whitespace()
                .next()
                .and_then(TypeKind::from_keyword)
            else {
                continue;
            };

            let start = extend_over_modifiers(&code, keyword.start());
            // `record` is contextual; elsewhere it is an ordinary identifier.
            if keyword.as_str() == "record"
                && start == keyword.start()
                && !at_declaration_boundary(&code, start)
            {
                continue;
            }
            let (header_end, body) = match header_terminator(bytes, ident.end()) {
                Some((open, b'{')) => {
                    let close = matching_brace(bytes, open).map_or(bytes.len(), |c| c + 1);
                    (open, Some(Span::new(open, close)))
                }
                Some((semicolon, _)) => (semicolon + 1, None),
                None => (bytes.len(), None),
            };
            let end = body.map_or(header_end, |b| b.end);

            types.push(OutlineType {
                declaration: TypeDeclaration {
                    identifier: identifier.to_string(),
                    kind,
                    span: Span::new(start, end),
                },
                header: Span::new(start, header_end),
                body,
                namespace: containing_namespace(&namespaces, start),
            });
        }

        SourceOutline {
            len: text.len(),
            namespaces,
            types,
        }
    }

    pub fn namespaces(&self) -> &[NamespaceBlock] {
        &self.namespaces
    }

    /// Type declarations in source order.
    pub fn types(&self) -> &[OutlineType] {
        &self.types
    }

    /// First type declared with `identifier`.
    pub fn type_named(&self, identifier: &str) -> Option<&OutlineType> {
        self.types
            .iter()
            .find(|t| t.declaration.identifier == identifier)
    }

    /// Innermost type whose header covers `span`.
    pub fn type_at(&self, span: Span) -> Option<&OutlineType> {
        self.types
            .iter()
            .filter(|t| t.header.contains(&span))
            .max_by_key(|t| t.header.start)
    }
}

impl SyntaxTree for SourceOutline {
    fn find_node(&self, span: Span) -> Option<SyntaxNode> {
        if span.end > self.len {
            return None;
        }
        if let Some(found) = self.type_at(span) {
            return Some(SyntaxNode::TypeDeclaration(found.declaration.clone()));
        }

        let enclosing = self
            .types
            .iter()
            .filter_map(|t| t.body.map(|body| (t, body)))
            .filter(|(_, body)| body.contains(&span))
            .max_by_key(|(_, body)| body.start);
        if let Some((found, body)) = enclosing {
            // The closing brace belongs to the declaration; the opening one is
            // already covered by the header.
            if span.start + 1 >= body.end {
                return Some(SyntaxNode::TypeDeclaration(found.declaration.clone()));
            }
            return Some(SyntaxNode::Other {
                kind: "member".to_string(),
                span: body,
            });
        }

        let enclosing_namespace = self
            .namespaces
            .iter()
            .filter(|ns| ns.span.contains(&span))
            .max_by_key(|ns| ns.span.start);
        Some(match enclosing_namespace {
            Some(ns) => SyntaxNode::Other {
                kind: "namespace".to_string(),
                span: ns.span,
            },
            None => SyntaxNode::Other {
                kind: "compilation_unit".to_string(),
                span: Span::new(0, self.len),
            },
        })
    }
}

impl SemanticModel for SourceOutline {
    fn declared_symbol(&self, declaration: &TypeDeclaration) -> Option<TypeSymbol> {
        let found = self.types.iter().find(|t| {
            t.declaration.span == declaration.span
                && t.declaration.identifier == declaration.identifier
        })?;

        let mut containing_namespaces = vec![String::new()];
        containing_namespaces.extend(
            found
                .namespace
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        Some(TypeSymbol {
            name: found.declaration.identifier.clone(),
            containing_namespaces,
        })
    }
}

// ============================================================================
// Scanning helpers
// ============================================================================

/// Dotted join of the namespaces covering `offset`, outermost first.
fn containing_namespace(namespaces: &[NamespaceBlock], offset: usize) -> String {
    let mut covering: Vec<&NamespaceBlock> = namespaces
        .iter()
        .filter(|ns| ns.span.start <= offset && offset < ns.span.end)
        .collect();
    covering.sort_by_key(|ns| ns.span.start);
    covering
        .iter()
        .map(|ns| ns.name.as_str())
        .collect::<Vec<_>>()
        .join(".")
}

/// Move `start` back over modifier keywords (`public sealed class`).
fn extend_over_modifiers(code: &str, mut start: usize) -> usize {
    loop {
        let before = code[..start].trim_end_matches(|c: char| c.is_ascii_whitespace());
        let word_start = before
            .char_indices()
            .rev()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
            .map_or(0, |(p, c)| p + c.len_utf8());
        let word = &before[word_start..];
        if word.is_empty() || !MODIFIERS.contains(&word) {
            return start;
        }
        start = word_start;
    }
}

/// Whether a declaration may start at `start`: beginning of file or right
/// after `;`, `{`, `}` or an attribute's `]`.
fn at_declaration_boundary(code: &str, start: usize) -> bool {
    code[..start]
        .trim_end_matches(|c: char| c.is_ascii_whitespace())
        .chars()
        .next_back()
        .is_none_or(|c| matches!(c, ';' | '{' | '}' | ']'))
}

/// First `{` or `;` outside parentheses at or after `from`.
fn header_terminator(code: &[u8], from: usize) -> Option<(usize, u8)> {
    let mut depth = 0usize;
    for (i, &b) in code.iter().enumerate().skip(from) {
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b'{' | b';' if depth == 0 => return Some((i, b)),
            _ => {}
        }
    }
    None
}

/// Index of the brace closing the one at `open`.
fn matching_brace(code: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &b) in code.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Copy of `text` with comments, literals and preprocessor lines replaced by
/// spaces. Byte offsets and newlines are preserved.
fn mask_non_code(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0;
    let mut at_line_start = true;

    while i < bytes.len() {
        let b = bytes[i];
        let end = match b {
            b'/' if bytes.get(i + 1) == Some(&b'/') => Some(find_byte(bytes, i, b'\n')),
            b'/' if bytes.get(i + 1) == Some(&b'*') => Some(
                find_seq(bytes, i + 2, b"*/").map_or(bytes.len(), |p| p + 2),
            ),
            b'#' if at_line_start => Some(find_byte(bytes, i, b'\n')),
            b'"' => Some(string_end(bytes, i)),
            b'\'' => Some(char_literal_end(bytes, i)),
            _ => None,
        };

        match end {
            Some(end) => {
                blank(&mut out, i, end);
                i = end;
                at_line_start = false;
            }
            None => {
                if b == b'\n' {
                    at_line_start = true;
                } else if !b.is_ascii_whitespace() {
                    at_line_start = false;
                }
                i += 1;
            }
        }
    }

    // Only whole ASCII-delimited ranges were blanked, so this never replaces.
    String::from_utf8_lossy(&out).into_owned()
}

fn blank(out: &mut [u8], start: usize, end: usize) {
    for b in &mut out[start..end] {
        if *b != b'\n' {
            *b = b' ';
        }
    }
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == needle)
        .map_or(bytes.len(), |p| from + p)
}

fn find_seq(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

/// End (exclusive) of the string literal whose opening quote is at `open`.
fn string_end(bytes: &[u8], open: usize) -> usize {
    let quotes = bytes[open..].iter().take_while(|&&b| b == b'"').count();
    if quotes >= 3 {
        let fence = vec![b'"'; quotes];
        return find_seq(bytes, open + quotes, &fence).map_or(bytes.len(), |p| p + quotes);
    }

    let prefix = &bytes[..open];
    let verbatim = prefix.ends_with(b"@") || prefix.ends_with(b"@$");
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'"' if verbatim && bytes.get(i + 1) == Some(&b'"') => i += 2,
            b'"' => return i + 1,
            b'\\' if !verbatim => i += 2,
            b'\n' if !verbatim => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// End (exclusive) of the character literal opened at `open`.
fn char_literal_end(bytes: &[u8], open: usize) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\'' => return i + 1,
            b'\n' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

// ============================================================================
// Tests
// ============================================================================
