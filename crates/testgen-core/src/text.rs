//! Text position utilities for byte offset and line:column conversions.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Columns count Unicode scalar values, not bytes
//! - Byte offsets are **0-indexed**
//! - Line/column values of 0 are treated as 1

use crate::types::Span;

/// Convert a byte offset to 1-indexed line and column.
///
/// If `offset` exceeds the content length, returns the position at the end
/// of the content.
pub fn byte_offset_to_position(content: &str, offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut col = 1u32;

    for (i, ch) in content.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// Convert 1-indexed line and column to a byte offset.
///
/// A column beyond the end of the line clamps to the line end; a line beyond
/// the content returns the content length.
pub fn position_to_byte_offset(content: &str, line: u32, col: u32) -> usize {
    let line = line.max(1);
    let col = col.max(1);

    let mut current_line = 1u32;

    for (i, ch) in content.char_indices() {
        if current_line == line {
            let mut current_col = 1u32;
            for (j, c) in content[i..].char_indices() {
                if current_col == col {
                    return i + j;
                }
                if c == '\n' {
                    break;
                }
                current_col += 1;
            }
            return content[i..]
                .find('\n')
                .map(|p| i + p)
                .unwrap_or(content.len());
        }
        if ch == '\n' {
            current_line += 1;
        }
    }

    content.len()
}

/// Caret span at a 1-indexed position.
pub fn caret_at(content: &str, line: u32, col: u32) -> Span {
    Span::caret(position_to_byte_offset(content, line, col))
}

/// Count the number of lines in the content.
///
/// A trailing newline does not start a new line.
pub fn line_count(content: &str) -> u32 {
    if content.is_empty() {
        return 0;
    }
    let newlines = content.bytes().filter(|&b| b == b'\n').count() as u32;
    if content.ends_with('\n') {
        newlines
    } else {
        newlines + 1
    }
}

// ============================================================================
// Tests
// ============================================================================
