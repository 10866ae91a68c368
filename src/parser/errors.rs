//! Parse errors and caret diagnostics
//!
//! A parse records at most one [`Error`] (first error wins). The error
//! message is pre-formatted as a three-line diagnostic: a `file:line:col:`
//! header, the source line, and a caret under the offending column. The
//! format is a compatibility contract with the debugger front-end and is
//! reproduced byte for byte, including the padding rules when the caret
//! falls past the end of the line.

use std::fmt;

use crate::parser::lexer::SourceLocation;

/// Stable error tags reported alongside the diagnostic text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unknown,
    InvalidExpressionSyntax,
    InvalidNumericLiteral,
    InvalidOperandType,
    UndeclaredIdentifier,
    NotImplemented,
}

/// A parse error: stable tag plus the formatted diagnostic.
#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

/// The expression source buffer plus the name used in diagnostics.
#[derive(Debug, Clone)]
pub struct SourceText {
    name: String,
    text: String,
}

impl SourceText {
    /// Wrap an expression string under the conventional `<expr>` name.
    pub fn new(text: &str) -> Self {
        SourceText {
            name: "<expr>".to_string(),
            text: text.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The 1-based source line, without its terminator. Out-of-range lines
    /// resolve to an empty line (e.g. the position just past a trailing
    /// newline).
    fn line(&self, line: usize) -> &str {
        self.text
            .split('\n')
            .nth(line.saturating_sub(1))
            .unwrap_or("")
            .trim_end_matches('\r')
    }
}

/// Format the three-line caret diagnostic:
///
/// ```text
/// <file>:<line>:<col>: <message>
/// <source-line-text-padded>
/// <caret-with-leading-spaces>
/// ```
///
/// If the column points past the end of the line (e.g. unexpected EOF), the
/// source line is right-padded with spaces so the caret still lands under
/// the intended column; otherwise the caret line is right-padded to the
/// line length.
pub(crate) fn format_diagnostics(
    source: &SourceText,
    message: &str,
    loc: SourceLocation,
) -> String {
    let line = source.line(loc.line);
    let line_len = line.chars().count();
    let arrow = loc.column;

    let expr_rpad = arrow.saturating_sub(line_len);
    let arrow_rpad = line_len.saturating_sub(arrow);

    format!(
        "{}:{}:{}: {}\n{}{}\n{}^{}",
        source.name(),
        loc.line,
        loc.column,
        message,
        line,
        " ".repeat(expr_rpad),
        " ".repeat(arrow.saturating_sub(1)),
        " ".repeat(arrow_rpad),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_under_token() {
        let source = SourceText::new("1 + foo");
        let rendered = format_diagnostics(&source, "some message", SourceLocation::new(1, 5));

        assert_eq!(
            rendered,
            "<expr>:1:5: some message\n\
             1 + foo\n\
             \x20   ^  "
        );
    }

    #[test]
    fn test_caret_past_end_of_line() {
        // Unexpected EOF: column 6 on a 5-character line pads the source
        // line so the caret lands under the intended column.
        let source = SourceText::new("1 + 2");
        let rendered = format_diagnostics(&source, "expected 'r_paren'", SourceLocation::new(1, 6));

        assert_eq!(
            rendered,
            "<expr>:1:6: expected 'r_paren'\n\
             1 + 2 \n\
             \x20    ^"
        );
    }

    #[test]
    fn test_caret_on_first_column() {
        let source = SourceText::new("bad");
        let rendered = format_diagnostics(&source, "m", SourceLocation::new(1, 1));

        assert_eq!(rendered, "<expr>:1:1: m\nbad\n^  ");
    }

    #[test]
    fn test_multi_line_source() {
        let source = SourceText::new("1 +\n  qux");
        let rendered = format_diagnostics(&source, "m", SourceLocation::new(2, 3));

        assert_eq!(rendered, "<expr>:2:3: m\n  qux\n  ^  ");
    }
}
