//! AST node definitions for parsed expressions
//!
//! The AST is a closed sum type with unique tree-shaped ownership: every
//! non-leaf node owns its children through `Box`, and the root is owned by
//! the caller of the parser. Operator nodes store the operator's
//! [`TokenKind`] directly; indexing reuses `l_square` as its binary
//! operator. Traversal is through the external [`Visitor`] trait.

use crate::context::{TypeRef, Value};
use crate::parser::lexer::TokenKind;

/// Which flavor of member access produced a [`ExprNode::MemberOf`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberOfKind {
    /// `base.member`
    OfObject,
    /// `base->member`
    OfPointer,
}

/// A parsed expression.
#[derive(Debug, Clone)]
pub enum ExprNode {
    /// Sentinel returned on error paths; the parse as a whole reports the
    /// recorded [`Error`](crate::parser::errors::Error).
    Error,
    Literal {
        value: Value,
    },
    Identifier {
        name: String,
        value: Value,
    },
    BinaryOp {
        op: TokenKind,
        lhs: Box<ExprNode>,
        rhs: Box<ExprNode>,
    },
    UnaryOp {
        op: TokenKind,
        operand: Box<ExprNode>,
    },
    TernaryOp {
        cond: Box<ExprNode>,
        then: Box<ExprNode>,
        otherwise: Box<ExprNode>,
    },
    CStyleCast {
        ty: TypeRef,
        operand: Box<ExprNode>,
    },
    MemberOf {
        kind: MemberOfKind,
        base: Box<ExprNode>,
        member: String,
    },
}

/// External visitor over the closed node set. An evaluator implements this
/// to interpret the tree without the AST knowing about it.
pub trait Visitor {
    fn visit_error(&mut self);
    fn visit_literal(&mut self, value: &Value);
    fn visit_identifier(&mut self, name: &str, value: &Value);
    fn visit_binary_op(&mut self, op: TokenKind, lhs: &ExprNode, rhs: &ExprNode);
    fn visit_unary_op(&mut self, op: TokenKind, operand: &ExprNode);
    fn visit_ternary_op(&mut self, cond: &ExprNode, then: &ExprNode, otherwise: &ExprNode);
    fn visit_cstyle_cast(&mut self, ty: &TypeRef, operand: &ExprNode);
    fn visit_member_of(&mut self, kind: MemberOfKind, base: &ExprNode, member: &str);
}

impl ExprNode {
    /// Dispatch to the matching `Visitor` method.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            ExprNode::Error => visitor.visit_error(),
            ExprNode::Literal { value } => visitor.visit_literal(value),
            ExprNode::Identifier { name, value } => visitor.visit_identifier(name, value),
            ExprNode::BinaryOp { op, lhs, rhs } => visitor.visit_binary_op(*op, lhs, rhs),
            ExprNode::UnaryOp { op, operand } => visitor.visit_unary_op(*op, operand),
            ExprNode::TernaryOp {
                cond,
                then,
                otherwise,
            } => visitor.visit_ternary_op(cond, then, otherwise),
            ExprNode::CStyleCast { ty, operand } => visitor.visit_cstyle_cast(ty, operand),
            ExprNode::MemberOf { kind, base, member } => {
                visitor.visit_member_of(*kind, base, member)
            }
        }
    }
}

/// Render the tree as a compact s-expression, e.g. `(plus literal (star
/// literal literal))`. Operators print their kind names; identifiers print
/// their (qualified) names; cast types print the resolved type name.
pub fn dump(node: &ExprNode) -> String {
    struct Dumper {
        out: String,
    }

    impl Visitor for Dumper {
        fn visit_error(&mut self) {
            self.out.push_str("<error>");
        }

        fn visit_literal(&mut self, _value: &Value) {
            self.out.push_str("literal");
        }

        fn visit_identifier(&mut self, name: &str, _value: &Value) {
            self.out.push_str(name);
        }

        fn visit_binary_op(&mut self, op: TokenKind, lhs: &ExprNode, rhs: &ExprNode) {
            self.out.push('(');
            self.out.push_str(op.name());
            self.out.push(' ');
            lhs.accept(self);
            self.out.push(' ');
            rhs.accept(self);
            self.out.push(')');
        }

        fn visit_unary_op(&mut self, op: TokenKind, operand: &ExprNode) {
            self.out.push('(');
            self.out.push_str(op.name());
            self.out.push(' ');
            operand.accept(self);
            self.out.push(')');
        }

        fn visit_ternary_op(&mut self, cond: &ExprNode, then: &ExprNode, otherwise: &ExprNode) {
            self.out.push_str("(?: ");
            cond.accept(self);
            self.out.push(' ');
            then.accept(self);
            self.out.push(' ');
            otherwise.accept(self);
            self.out.push(')');
        }

        fn visit_cstyle_cast(&mut self, ty: &TypeRef, operand: &ExprNode) {
            self.out.push_str("(cast '");
            self.out.push_str(&ty.name());
            self.out.push_str("' ");
            operand.accept(self);
            self.out.push(')');
        }

        fn visit_member_of(&mut self, kind: MemberOfKind, base: &ExprNode, member: &str) {
            self.out.push('(');
            self.out.push_str(match kind {
                MemberOfKind::OfObject => ".",
                MemberOfKind::OfPointer => "->",
            });
            self.out.push(' ');
            base.accept(self);
            self.out.push(' ');
            self.out.push_str(member);
            self.out.push(')');
        }
    }

    let mut dumper = Dumper { out: String::new() };
    node.accept(&mut dumper);
    dumper.out
}
