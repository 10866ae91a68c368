//! Expression parsing
//!
//! One routine per precedence level, lowest first; each parses its
//! left-hand side at the next level up and then folds while the current
//! token matches one of its operators, which makes every binary level
//! left-associative. `?:` and the prefix levels recurse to the right.
//!
//! The cast level cannot tell a C-style cast from a parenthesized
//! expression on `(` alone: it speculatively parses a `type-id`, asks the
//! context whether the collected name resolves to a type, and rewinds to
//! the `(` when it does not.

use tracing::debug;

use crate::context::{BasicType, TargetInfo, Value};
use crate::parser::ast::{ExprNode, MemberOfKind};
use crate::parser::errors::ErrorKind;
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::literals::{self, FloatLiteral, IntegerLiteral, NumericLiteral};
use crate::parser::parse::Parser;

/// Select the basic type of an integer literal from its value, radix and
/// suffixes, given the target's integer widths. Candidates are tried
/// narrowest first; a value too large even for `unsigned long long` falls
/// back to `unsigned long long` (the "interpreted as unsigned" case).
fn pick_integer_type(target: TargetInfo, literal: &IntegerLiteral) -> BasicType {
    let fits = |width: u32| literal.value.bits() <= u64::from(width);

    // Binary, octal, hexadecimal and literals with a U suffix are allowed
    // to be unsigned.
    let unsigned_is_allowed = literal.is_unsigned || literal.radix != 10;

    // Try int/unsigned int.
    if !literal.is_long && !literal.is_long_long && fits(target.int_width) {
        if !literal.is_unsigned && fits(target.int_width - 1) {
            return BasicType::Int;
        }
        if unsigned_is_allowed {
            return BasicType::UnsignedInt;
        }
    }
    // Try long/unsigned long.
    if !literal.is_long_long && fits(target.long_width) {
        if !literal.is_unsigned && fits(target.long_width - 1) {
            return BasicType::Long;
        }
        if unsigned_is_allowed {
            return BasicType::UnsignedLong;
        }
    }
    // Try long long/unsigned long long.
    if fits(target.long_long_width) {
        if !literal.is_unsigned && fits(target.long_long_width - 1) {
            return BasicType::LongLong;
        }
        if unsigned_is_allowed {
            return BasicType::UnsignedLongLong;
        }
    }

    // Too large for a signed long long but carrying no U suffix: interpret
    // as unsigned anyway.
    BasicType::UnsignedLongLong
}

impl Parser {
    /// Parse an expression.
    ///
    ///  expression:
    ///    assignment_expression
    pub(crate) fn parse_expression(&mut self) -> ExprNode {
        self.parse_assignment_expression()
    }

    /// Parse an assignment_expression. The grammar has no assignment
    /// operators; this is a passthrough.
    ///
    ///  assignment_expression:
    ///    conditional_expression
    fn parse_assignment_expression(&mut self) -> ExprNode {
        self.parse_conditional_expression()
    }

    /// Parse a conditional_expression.
    ///
    ///  conditional_expression:
    ///    logical_or_expression
    ///    logical_or_expression "?" expression ":" assignment_expression
    fn parse_conditional_expression(&mut self) -> ExprNode {
        let mut lhs = self.parse_logical_or_expression();

        if self.token.is(TokenKind::Question) {
            self.consume_token();
            let then = self.parse_expression();
            self.expect(TokenKind::Colon);
            self.consume_token();
            let otherwise = self.parse_assignment_expression();
            lhs = ExprNode::TernaryOp {
                cond: Box::new(lhs),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            };
        }

        lhs
    }

    /// Parse a logical_or_expression.
    ///
    ///  logical_or_expression:
    ///    logical_and_expression {"||" logical_and_expression}
    fn parse_logical_or_expression(&mut self) -> ExprNode {
        let mut lhs = self.parse_logical_and_expression();

        while self.token.is(TokenKind::PipePipe) {
            let op = self.token.kind;
            self.consume_token();
            let rhs = self.parse_logical_and_expression();
            lhs = ExprNode::BinaryOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        lhs
    }

    /// Parse a logical_and_expression.
    ///
    ///  logical_and_expression:
    ///    inclusive_or_expression {"&&" inclusive_or_expression}
    fn parse_logical_and_expression(&mut self) -> ExprNode {
        let mut lhs = self.parse_inclusive_or_expression();

        while self.token.is(TokenKind::AmpAmp) {
            let op = self.token.kind;
            self.consume_token();
            let rhs = self.parse_inclusive_or_expression();
            lhs = ExprNode::BinaryOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        lhs
    }

    /// Parse an inclusive_or_expression.
    ///
    ///  inclusive_or_expression:
    ///    exclusive_or_expression {"|" exclusive_or_expression}
    fn parse_inclusive_or_expression(&mut self) -> ExprNode {
        let mut lhs = self.parse_exclusive_or_expression();

        while self.token.is(TokenKind::Pipe) {
            let op = self.token.kind;
            self.consume_token();
            let rhs = self.parse_exclusive_or_expression();
            lhs = ExprNode::BinaryOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        lhs
    }

    /// Parse an exclusive_or_expression.
    ///
    ///  exclusive_or_expression:
    ///    and_expression {"^" and_expression}
    fn parse_exclusive_or_expression(&mut self) -> ExprNode {
        let mut lhs = self.parse_and_expression();

        while self.token.is(TokenKind::Caret) {
            let op = self.token.kind;
            self.consume_token();
            let rhs = self.parse_and_expression();
            lhs = ExprNode::BinaryOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        lhs
    }

    /// Parse an and_expression.
    ///
    ///  and_expression:
    ///    equality_expression {"&" equality_expression}
    fn parse_and_expression(&mut self) -> ExprNode {
        let mut lhs = self.parse_equality_expression();

        while self.token.is(TokenKind::Amp) {
            let op = self.token.kind;
            self.consume_token();
            let rhs = self.parse_equality_expression();
            lhs = ExprNode::BinaryOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        lhs
    }

    /// Parse an equality_expression.
    ///
    ///  equality_expression:
    ///    relational_expression {"==" relational_expression}
    ///    relational_expression {"!=" relational_expression}
    fn parse_equality_expression(&mut self) -> ExprNode {
        let mut lhs = self.parse_relational_expression();

        while self
            .token
            .is_one_of(&[TokenKind::EqualEqual, TokenKind::ExclaimEqual])
        {
            let op = self.token.kind;
            self.consume_token();
            let rhs = self.parse_relational_expression();
            lhs = ExprNode::BinaryOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        lhs
    }

    /// Parse a relational_expression.
    ///
    ///  relational_expression:
    ///    shift_expression {"<" shift_expression}
    ///    shift_expression {">" shift_expression}
    ///    shift_expression {"<=" shift_expression}
    ///    shift_expression {">=" shift_expression}
    fn parse_relational_expression(&mut self) -> ExprNode {
        let mut lhs = self.parse_shift_expression();

        while self.token.is_one_of(&[
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::LessEqual,
            TokenKind::GreaterEqual,
        ]) {
            let op = self.token.kind;
            self.consume_token();
            let rhs = self.parse_shift_expression();
            lhs = ExprNode::BinaryOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        lhs
    }

    /// Parse a shift_expression.
    ///
    ///  shift_expression:
    ///    additive_expression {"<<" additive_expression}
    ///    additive_expression {">>" additive_expression}
    fn parse_shift_expression(&mut self) -> ExprNode {
        let mut lhs = self.parse_additive_expression();

        while self
            .token
            .is_one_of(&[TokenKind::LessLess, TokenKind::GreaterGreater])
        {
            let op = self.token.kind;
            self.consume_token();
            let rhs = self.parse_additive_expression();
            lhs = ExprNode::BinaryOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        lhs
    }

    /// Parse an additive_expression.
    ///
    ///  additive_expression:
    ///    multiplicative_expression {"+" multiplicative_expression}
    ///    multiplicative_expression {"-" multiplicative_expression}
    fn parse_additive_expression(&mut self) -> ExprNode {
        let mut lhs = self.parse_multiplicative_expression();

        while self.token.is_one_of(&[TokenKind::Plus, TokenKind::Minus]) {
            let op = self.token.kind;
            self.consume_token();
            let rhs = self.parse_multiplicative_expression();
            lhs = ExprNode::BinaryOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        lhs
    }

    /// Parse a multiplicative_expression.
    ///
    ///  multiplicative_expression:
    ///    cast_expression {"*" cast_expression}
    ///    cast_expression {"/" cast_expression}
    ///    cast_expression {"%" cast_expression}
    fn parse_multiplicative_expression(&mut self) -> ExprNode {
        let mut lhs = self.parse_cast_expression();

        while self
            .token
            .is_one_of(&[TokenKind::Star, TokenKind::Slash, TokenKind::Percent])
        {
            let op = self.token.kind;
            self.consume_token();
            let rhs = self.parse_cast_expression();
            lhs = ExprNode::BinaryOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        lhs
    }

    /// Parse a cast_expression.
    ///
    ///  cast_expression:
    ///    unary_expression
    ///    "(" type_id ")" cast_expression
    fn parse_cast_expression(&mut self) -> ExprNode {
        // This can be a C-style cast; speculatively parse the contents of
        // the parentheses as a type declaration and let the context decide.
        if self.token.is(TokenKind::LParen) {
            let snapshot = self.start_tentative_parsing();

            // Consume the "(" only after the snapshot is taken.
            self.consume_token();

            let type_decl = self.parse_type_id();

            if let Some(ty) = self.resolve_type_from_decl(&type_decl) {
                // It is a type: commit the speculated tokens and apply the
                // declarators (pointer/reference qualifiers).
                let ty = match self.resolve_type_declarators(ty, &type_decl) {
                    Some(ty) => ty,
                    None => return ExprNode::Error,
                };

                self.expect(TokenKind::RParen);
                self.consume_token();
                let operand = self.parse_cast_expression();

                return ExprNode::CStyleCast {
                    ty,
                    operand: Box::new(operand),
                };
            }

            // Not a type declaration: rewind to the "(" and fall through to
            // unary_expression.
            self.rollback(snapshot);
        }

        self.parse_unary_expression()
    }

    /// Parse a unary_expression.
    ///
    ///  unary_expression:
    ///    postfix_expression
    ///    "++" cast_expression
    ///    "--" cast_expression
    ///    unary_operator cast_expression
    ///
    ///  unary_operator:
    ///    "&" | "*" | "+" | "-" | "~" | "!"
    fn parse_unary_expression(&mut self) -> ExprNode {
        if self.token.is_one_of(&[
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
            TokenKind::Star,
            TokenKind::Amp,
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Exclaim,
            TokenKind::Tilde,
        ]) {
            let op = self.token.kind;
            self.consume_token();
            let operand = self.parse_cast_expression();
            return ExprNode::UnaryOp {
                op,
                operand: Box::new(operand),
            };
        }

        self.parse_postfix_expression()
    }

    /// Parse a postfix_expression.
    ///
    ///  postfix_expression:
    ///    primary_expression {"[" expression "]"}
    ///    primary_expression {"." id_expression}
    ///    primary_expression {"->" id_expression}
    ///    primary_expression {"++"}
    ///    primary_expression {"--"}
    fn parse_postfix_expression(&mut self) -> ExprNode {
        let mut lhs = self.parse_primary_expression();

        loop {
            match self.token.kind {
                TokenKind::Period | TokenKind::Arrow => {
                    let kind = if self.token.is(TokenKind::Period) {
                        MemberOfKind::OfObject
                    } else {
                        MemberOfKind::OfPointer
                    };
                    self.consume_token();
                    let member = self.parse_id_expression();
                    lhs = ExprNode::MemberOf {
                        kind,
                        base: Box::new(lhs),
                        member,
                    };
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let message = format!(
                        "We don't support postfix inc/dec yet: {}",
                        self.token.description()
                    );
                    let loc = self.token.loc;
                    self.bail_out(ErrorKind::NotImplemented, &message, loc);
                    return ExprNode::Error;
                }
                TokenKind::LSquare => {
                    self.consume_token();
                    let rhs = self.parse_expression();
                    self.expect(TokenKind::RSquare);
                    self.consume_token();
                    lhs = ExprNode::BinaryOp {
                        op: TokenKind::LSquare,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    };
                }
                _ => break,
            }
        }

        lhs
    }

    /// Parse a primary_expression.
    ///
    ///  primary_expression:
    ///    numeric_literal
    ///    boolean_literal
    ///    pointer_literal
    ///    id_expression
    ///    "this"
    ///    "(" expression ")"
    fn parse_primary_expression(&mut self) -> ExprNode {
        if self.token.is(TokenKind::NumericConstant) {
            return self.parse_numeric_literal();
        }

        if self.token.is_one_of(&[TokenKind::KwTrue, TokenKind::KwFalse]) {
            return self.parse_boolean_literal();
        }

        if self.token.is(TokenKind::KwNullptr) {
            return self.parse_pointer_literal();
        }

        if self
            .token
            .is_one_of(&[TokenKind::ColonColon, TokenKind::Identifier])
        {
            // Diagnose at the start of the id-expression.
            let loc = self.token.loc;
            let identifier = self.parse_id_expression();

            return match self.ctx.lookup_identifier(&identifier) {
                Some(value) => ExprNode::Identifier {
                    name: identifier,
                    value: Value::lvalue(value),
                },
                None => {
                    let message = format!("use of undeclared identifier '{}'", identifier);
                    self.bail_out(ErrorKind::UndeclaredIdentifier, &message, loc);
                    ExprNode::Error
                }
            };
        }

        if self.token.is(TokenKind::KwThis) {
            let loc = self.token.loc;
            self.consume_token();

            return match self.ctx.lookup_identifier("this") {
                // Per the standard, `this` is a prvalue.
                Some(value) => ExprNode::Identifier {
                    name: "this".to_string(),
                    value: Value::rvalue(value),
                },
                None => {
                    self.bail_out(
                        ErrorKind::UndeclaredIdentifier,
                        "invalid use of 'this' outside of a non-static member function",
                        loc,
                    );
                    ExprNode::Error
                }
            };
        }

        if self.token.is(TokenKind::LParen) {
            self.consume_token();
            let expr = self.parse_expression();
            self.expect(TokenKind::RParen);
            self.consume_token();
            return expr;
        }

        let message = format!("Unexpected token: {}", self.token.description());
        let loc = self.token.loc;
        self.bail_out(ErrorKind::InvalidExpressionSyntax, &message, loc);
        ExprNode::Error
    }

    /// Parse a numeric_literal.
    fn parse_numeric_literal(&mut self) -> ExprNode {
        self.expect(TokenKind::NumericConstant);
        let token = self.token.clone();
        let numeric_constant = self.parse_numeric_constant(&token);
        self.consume_token();
        numeric_constant
    }

    /// Classify and build a numeric constant; it can be either an integer
    /// or a floating literal.
    fn parse_numeric_constant(&mut self, token: &Token) -> ExprNode {
        match literals::classify(&token.spelling) {
            Ok(NumericLiteral::Float(literal)) => self.parse_float_literal(&literal, token),
            Ok(NumericLiteral::Integer(literal)) => self.parse_integer_literal(&literal, token),
            Err(error) => {
                debug!(detail = %error, "numeric constant rejected");
                let message = format!(
                    "Failed to parse token as numeric-constant: {}",
                    token.description()
                );
                self.bail_out(ErrorKind::InvalidNumericLiteral, &message, token.loc);
                ExprNode::Error
            }
        }
    }

    /// Build a floating literal of IEEE single (with an `f` suffix) or
    /// double format. Overflow is always an error; underflow only if the
    /// result collapsed to zero (denormals are accepted).
    fn parse_float_literal(&mut self, literal: &FloatLiteral, token: &Token) -> ExprNode {
        let conversion = literal.value();

        if conversion.overflow || (conversion.underflow && conversion.value == 0.0) {
            let message = format!("float underflow/overflow happened: {}", token.description());
            self.bail_out(ErrorKind::InvalidNumericLiteral, &message, token.loc);
            return ExprNode::Error;
        }

        let ty = if literal.is_single {
            BasicType::Float
        } else {
            BasicType::Double
        };
        let value = self.ctx.value_from_float(conversion.value, ty);

        ExprNode::Literal {
            value: Value::rvalue(value),
        }
    }

    /// Build an integer literal, selecting its basic type against the
    /// target's integer widths. Values wider than the 64-bit extraction
    /// window are an error, like in the host debugger.
    fn parse_integer_literal(&mut self, literal: &IntegerLiteral, token: &Token) -> ExprNode {
        if literal.value.bits() > 64 {
            let message = format!(
                "integer literal is too large to be represented in any integer type: {}",
                token.description()
            );
            self.bail_out(ErrorKind::InvalidNumericLiteral, &message, token.loc);
            return ExprNode::Error;
        }

        let ty = pick_integer_type(self.ctx.target_info(), literal);
        let is_unsigned = ty.is_unsigned();
        let value = self.ctx.value_from_integer(&literal.value, ty, is_unsigned);

        ExprNode::Literal {
            value: Value::rvalue(value),
        }
    }

    /// Parse a boolean_literal: "true" or "false".
    fn parse_boolean_literal(&mut self) -> ExprNode {
        self.expect_one_of(&[TokenKind::KwTrue, TokenKind::KwFalse]);
        let literal_value = self.token.is(TokenKind::KwTrue);
        self.consume_token();

        ExprNode::Literal {
            value: Value::rvalue(self.ctx.value_from_bool(literal_value)),
        }
    }

    /// Parse a pointer_literal: "nullptr".
    fn parse_pointer_literal(&mut self) -> ExprNode {
        self.expect(TokenKind::KwNullptr);
        self.consume_token();

        ExprNode::Literal {
            value: Value::rvalue(self.ctx.value_null_pointer()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn literal(value: u128, radix: u32, suffix: &str) -> IntegerLiteral {
        IntegerLiteral {
            value: BigUint::from(value),
            radix,
            is_unsigned: suffix.contains('u'),
            is_long: suffix == "l" || suffix == "ul",
            is_long_long: suffix == "ll" || suffix == "ull",
        }
    }

    const LP64: TargetInfo = TargetInfo {
        int_width: 32,
        long_width: 64,
        long_long_width: 64,
    };

    const LLP64: TargetInfo = TargetInfo {
        int_width: 32,
        long_width: 32,
        long_long_width: 64,
    };

    #[test]
    fn test_small_decimal_is_int() {
        assert_eq!(pick_integer_type(LP64, &literal(1, 10, "")), BasicType::Int);
        assert_eq!(
            pick_integer_type(LP64, &literal(2147483647, 10, "")),
            BasicType::Int
        );
    }

    #[test]
    fn test_hex_prefers_unsigned_of_same_width() {
        // 0x80000000 does not fit in 31 bits, but hex literals may go
        // unsigned: unsigned int on a 32-bit int target.
        assert_eq!(
            pick_integer_type(LP64, &literal(0x8000_0000, 16, "")),
            BasicType::UnsignedInt
        );
        // The same value written in decimal must widen instead.
        assert_eq!(
            pick_integer_type(LP64, &literal(0x8000_0000, 10, "")),
            BasicType::Long
        );
        // With a 32-bit long, decimal widens past long to long long.
        assert_eq!(
            pick_integer_type(LLP64, &literal(0x8000_0000, 10, "")),
            BasicType::LongLong
        );
    }

    #[test]
    fn test_suffixes_constrain_candidates() {
        assert_eq!(
            pick_integer_type(LP64, &literal(1, 10, "u")),
            BasicType::UnsignedInt
        );
        assert_eq!(pick_integer_type(LP64, &literal(1, 10, "l")), BasicType::Long);
        assert_eq!(
            pick_integer_type(LP64, &literal(1, 10, "ul")),
            BasicType::UnsignedLong
        );
        assert_eq!(
            pick_integer_type(LP64, &literal(1, 10, "ll")),
            BasicType::LongLong
        );
        assert_eq!(
            pick_integer_type(LP64, &literal(1, 10, "ull")),
            BasicType::UnsignedLongLong
        );
    }

    #[test]
    fn test_unsigned_fallback_for_huge_decimal() {
        // Does not fit in a signed long long and has no U suffix:
        // interpreted as unsigned long long anyway.
        assert_eq!(
            pick_integer_type(LP64, &literal(u64::MAX as u128, 10, "")),
            BasicType::UnsignedLongLong
        );
    }

    #[test]
    fn test_zero_value() {
        assert_eq!(pick_integer_type(LP64, &literal(0, 8, "")), BasicType::Int);
    }
}
