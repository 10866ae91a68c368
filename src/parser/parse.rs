//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing
//! infrastructure: token stream helpers, the bail-out error sink, and
//! tentative (backtracking) parsing. The grammar itself is split across
//! `impl Parser` blocks in sibling modules:
//! - `expressions`: the operator-precedence ladder
//! - `declarations`: `type-id` and qualified-name productions
//!
//! # Error handling
//!
//! The first error wins. [`Parser::bail_out`] records the error and forces
//! the current token to `eof`; from then on `consume_token` is a no-op and
//! every pending recursive level falls through cheaply without producing
//! further diagnostics. Grammar routines return [`ExprNode::Error`]
//! sentinels on error paths; `run` maps a recorded error to `Err`.
//!
//! # Tentative parsing
//!
//! [`Parser::start_tentative_parsing`] snapshots the stream position and the
//! current token. Rolling back restores both; committing is simply dropping
//! the snapshot. Snapshots nest. Rollback does not clear a recorded error —
//! grammar routines only bail out on paths they commit to.

use std::rc::Rc;

use tracing::{debug, trace};

use crate::context::Context;
use crate::parser::ast::ExprNode;
use crate::parser::errors::{format_diagnostics, Error, ErrorKind, SourceText};
use crate::parser::lexer::{Lexer, SourceLocation, Token, TokenKind};

/// Saved stream state for tentative parsing. Dropping a snapshot commits
/// the tokens consumed since it was taken.
pub(crate) struct ParserSnapshot {
    position: usize,
    token: Token,
}

/// Recursive descent parser for debugger expressions.
///
/// One instance parses one expression string to completion; `run` consumes
/// the parser. The context is shared with the embedder and only read from.
pub struct Parser {
    pub(crate) ctx: Rc<dyn Context>,
    pub(crate) source: SourceText,
    tokens: Vec<Token>,
    /// Index of the next unconsumed token.
    position: usize,
    /// Current token; forced to `eof` by `bail_out`.
    pub(crate) token: Token,
    error: Option<Error>,
}

impl Parser {
    /// Create a parser for one expression string. The token stream is fully
    /// materialized up front; lexing never fails.
    pub fn new(ctx: Rc<dyn Context>, expr: &str) -> Self {
        let source = SourceText::new(expr);
        let tokens = Lexer::new(expr).tokenize();
        let token = Token::new(TokenKind::Unknown, "", SourceLocation::new(1, 1));

        Self {
            ctx,
            source,
            tokens,
            position: 0,
            token,
            error: None,
        }
    }

    /// Parse the expression. One-shot: the parser is consumed. On failure
    /// the recorded (first) error is returned; the partial AST is dropped.
    pub fn run(mut self) -> Result<ExprNode, Error> {
        debug!(expr = %self.source.text(), "parsing expression");

        self.consume_token();
        let expr = self.parse_expression();
        self.expect(TokenKind::Eof);

        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(expr),
        }
    }

    // ===== Token stream helpers =====

    /// Advance to the next token. A no-op once the current token is `eof`,
    /// which keeps the parser quiescent while bailing out.
    pub(crate) fn consume_token(&mut self) {
        if self.token.is(TokenKind::Eof) {
            return;
        }
        self.token = self.tokens[self.position].clone();
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Peek `k` tokens past the current one without consuming (`k >= 1`).
    /// Past the end of input this resolves to the trailing `eof` token.
    pub(crate) fn lookahead(&self, k: usize) -> &Token {
        debug_assert!(k >= 1);
        let index = (self.position + k - 1).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Record a `kUnknown` error unless the current token has the given
    /// kind. Does not consume.
    pub(crate) fn expect(&mut self, kind: TokenKind) {
        if !self.token.is(kind) {
            let message = format!(
                "expected '{}', got: {}",
                kind.name(),
                self.token.description()
            );
            let loc = self.token.loc;
            self.bail_out(ErrorKind::Unknown, &message, loc);
        }
    }

    /// Record a `kUnknown` error unless the current token is one of the
    /// given kinds. Does not consume.
    pub(crate) fn expect_one_of(&mut self, kinds: &[TokenKind]) {
        if !self.token.is_one_of(kinds) {
            let list = kinds
                .iter()
                .map(|kind| format!("'{}'", kind.name()))
                .collect::<Vec<_>>()
                .join(", ");
            let message = format!("expected any of ({}), got: {}", list, self.token.description());
            let loc = self.token.loc;
            self.bail_out(ErrorKind::Unknown, &message, loc);
        }
    }

    /// Record the first error and force the stream to `eof` so that all
    /// pending recursive levels fall through. Later calls are no-ops.
    pub(crate) fn bail_out(&mut self, kind: ErrorKind, message: &str, loc: SourceLocation) {
        if self.error.is_some() {
            // Already bailing out; keep the original error.
            return;
        }

        debug!(?kind, error = message, "parse error");
        self.error = Some(Error {
            kind,
            message: format_diagnostics(&self.source, message, loc),
        });
        self.token = Token::new(TokenKind::Eof, "", loc);
    }

    // ===== Tentative parsing =====

    /// Snapshot the stream for a speculative parse.
    pub(crate) fn start_tentative_parsing(&self) -> ParserSnapshot {
        trace!(position = self.position, "tentative parse");
        ParserSnapshot {
            position: self.position,
            token: self.token.clone(),
        }
    }

    /// Rewind the stream (and the current token) to a snapshot. A recorded
    /// error, if any, stays recorded.
    pub(crate) fn rollback(&mut self, snapshot: ParserSnapshot) {
        trace!(position = snapshot.position, "tentative parse rolled back");
        self.position = snapshot.position;
        self.token = snapshot.token;
    }
}
