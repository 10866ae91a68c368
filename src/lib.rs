//! # Introduction
//!
//! `dexpr` parses a restricted dialect of C++ expressions in the context of
//! a live debugger session, producing a typed AST suitable for later
//! evaluation, or a caret-formatted error pinpointing the offending source
//! location.
//!
//! ## Parsing pipeline
//!
//! ```text
//! Expression → Lexer → Parser ⇄ Context → AST
//! ```
//!
//! 1. [`parser::lexer`] — tokenizes the expression string.
//! 2. [`parser::parse::Parser`] — recursive descent over the token stream,
//!    with tentative (backtracking) parsing to tell C-style casts from
//!    parenthesized expressions and template-ids from comparisons.
//! 3. [`context::Context`] — the embedder-supplied symbol and type
//!    resolver consulted during the parse; also constructs literal values.
//! 4. [`parser::ast`] — the resulting tree, traversed by an external
//!    visitor.
//!
//! ## Usage
//!
//! The embedder implements [`context::Context`] over its debug target and
//! runs one [`parser::parse::Parser`] per expression:
//!
//! ```text
//! let parser = Parser::new(ctx.clone(), "(int*)buf + 1");
//! match parser.run() {
//!     Ok(ast) => evaluate(&ast),
//!     Err(error) => eprintln!("{}", error),
//! }
//! ```
//!
//! Evaluation of the AST, the symbol table, and the type system live on the
//! debugger side; the parser only reads from the context.

pub mod context;
pub mod parser;

pub use context::{BasicType, Context, DebuggerValue, TargetInfo, TypeInfo, TypeRef, Value, ValueRef};
pub use parser::ast::{dump, ExprNode, MemberOfKind, Visitor};
pub use parser::errors::{Error, ErrorKind};
pub use parser::parse::Parser;
