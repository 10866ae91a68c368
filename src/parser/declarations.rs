//! Type and qualified-name parsing
//!
//! Implements the `type-id`, `type-specifier-seq`, `nested-name-specifier`,
//! `simple-template-id`, `ptr-operator` and `id-expression` productions.
//! Types are collected textually into a [`TypeDeclaration`] and resolved
//! against the context afterwards; qualified names are returned as a single
//! rendered string (e.g. `::ns::Outer<T>::inner`).
//!
//! Several productions are ambiguous on their first tokens, so callers wrap
//! them in tentative-parsing scopes; routines here are free to consume
//! tokens and then report failure with an empty/invalid result, relying on
//! the enclosing scope to rewind.

use crate::context::TypeRef;
use crate::parser::errors::ErrorKind;
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::parse::Parser;

/// `*` or `&` in an abstract declarator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtrOperator {
    Star,
    Amp,
}

/// A type declaration collected by the type parser: textual type-specifier
/// fragments plus declarators, not yet resolved against the context.
///
/// A declaration is valid iff at least one type name was parsed.
#[derive(Debug, Clone, Default)]
pub struct TypeDeclaration {
    pub typenames: Vec<String>,
    pub ptr_operators: Vec<PtrOperator>,
}

impl TypeDeclaration {
    pub fn is_valid(&self) -> bool {
        !self.typenames.is_empty()
    }

    /// The base type name: fragments joined with single spaces, with the
    /// `short int`/`long int` aliases collapsed (first occurrence only).
    pub fn base_name(&self) -> String {
        let mut name = self.typenames.join(" ");
        replace_first(&mut name, "short int", "short");
        replace_first(&mut name, "long int", "long");
        name
    }

    /// The full name: base name plus declarators. The debugger separates
    /// the declarator run from the base name with a single space, e.g.
    /// `int **` or `ns::T &`.
    pub fn name(&self) -> String {
        let mut name = self.base_name();
        if !self.ptr_operators.is_empty() {
            name.push(' ');
        }
        for op in &self.ptr_operators {
            name.push(match op {
                PtrOperator::Star => '*',
                PtrOperator::Amp => '&',
            });
        }
        name
    }
}

fn replace_first(text: &mut String, from: &str, to: &str) {
    if let Some(pos) = text.find(from) {
        text.replace_range(pos..pos + from.len(), to);
    }
}

fn is_cv_qualifier(token: &Token) -> bool {
    token.is_one_of(&[TokenKind::KwConst, TokenKind::KwVolatile])
}

fn is_simple_type_specifier_keyword(token: &Token) -> bool {
    token.is_one_of(&[
        TokenKind::KwChar,
        TokenKind::KwChar16T,
        TokenKind::KwChar32T,
        TokenKind::KwWcharT,
        TokenKind::KwBool,
        TokenKind::KwShort,
        TokenKind::KwInt,
        TokenKind::KwLong,
        TokenKind::KwSigned,
        TokenKind::KwUnsigned,
        TokenKind::KwFloat,
        TokenKind::KwDouble,
        TokenKind::KwVoid,
    ])
}

fn is_ptr_operator(token: &Token) -> bool {
    token.is_one_of(&[TokenKind::Star, TokenKind::Amp])
}

impl Parser {
    /// Parse a type_id.
    ///
    ///  type_id:
    ///    type_specifier_seq {abstract_declarator}
    ///
    ///  abstract_declarator:
    ///    ptr_operator {abstract_declarator}
    pub(crate) fn parse_type_id(&mut self) -> TypeDeclaration {
        let mut type_decl = TypeDeclaration::default();

        self.parse_type_specifier_seq(&mut type_decl);

        while is_ptr_operator(&self.token) {
            self.parse_ptr_operator(&mut type_decl);
        }

        type_decl
    }

    /// Parse a type_specifier_seq: type specifiers, greedily.
    fn parse_type_specifier_seq(&mut self, type_decl: &mut TypeDeclaration) {
        // Combined-specifier validation ("long long" vs "char char") is left
        // to type resolution, which rejects unknown combinations by name.
        while self.parse_type_specifier(type_decl) {}
    }

    /// Parse a type_specifier.
    ///
    ///  type_specifier:
    ///    simple_type_specifier
    ///    cv_qualifier
    ///
    ///  simple_type_specifier:
    ///    {"::"} {nested_name_specifier} type_name
    ///    "char" | "char16_t" | "char32_t" | "wchar_t" | "bool" | "short"
    ///    | "int" | "long" | "signed" | "unsigned" | "float" | "double"
    ///    | "void"
    ///
    /// Returns true if a type_specifier was parsed at this location.
    fn parse_type_specifier(&mut self, type_decl: &mut TypeDeclaration) -> bool {
        if is_cv_qualifier(&self.token) {
            // CV qualifiers play no role in casting; discard.
            self.consume_token();
            return true;
        }

        if is_simple_type_specifier_keyword(&self.token) {
            type_decl.typenames.push(self.token.spelling.clone());
            self.consume_token();
            return true;
        }

        // Otherwise this must be a user-defined type.
        let mut global_scope = false;
        if self.token.is(TokenKind::ColonColon) {
            global_scope = true;
            self.consume_token();
        }

        let nested_name_specifier = self.parse_nested_name_specifier();
        let type_name = self.parse_type_name();

        // Global and nested scopes are optional; a type_name alone is enough.
        if !type_name.is_empty() {
            let mut type_specifier = String::new();
            if global_scope {
                type_specifier.push_str("::");
            }
            type_specifier.push_str(&nested_name_specifier);
            type_specifier.push_str(&type_name);

            type_decl.typenames.push(type_specifier);
            return true;
        }

        false
    }

    /// Parse a nested_name_specifier.
    ///
    ///  nested_name_specifier:
    ///    type_name "::"
    ///    namespace_name "::"
    ///    nested_name_specifier identifier "::"
    ///    nested_name_specifier simple_template_id "::"
    pub(crate) fn parse_nested_name_specifier(&mut self) -> String {
        // The first token is always an identifier.
        if !self.token.is(TokenKind::Identifier) {
            return String::new();
        }

        // `identifier ::` is a nested-name component.
        if self.lookahead(1).is(TokenKind::ColonColon) {
            let identifier = self.token.spelling.clone();
            self.consume_token();
            self.expect(TokenKind::ColonColon);
            self.consume_token();
            return format!("{}::{}", identifier, self.parse_nested_name_specifier());
        }

        // `identifier <` may be a simple_template_id followed by "::", or
        // just a type_name. Speculate and rewind if the "::" never comes.
        if self.lookahead(1).is(TokenKind::Less) {
            let snapshot = self.start_tentative_parsing();

            let type_name = self.parse_type_name();
            if !type_name.is_empty() && self.token.is(TokenKind::ColonColon) {
                // Commit and continue with the rest of the specifier.
                self.consume_token();
                return format!("{}::{}", type_name, self.parse_nested_name_specifier());
            }

            self.rollback(snapshot);
        }

        String::new()
    }

    /// Parse a type_name: an identifier, optionally carrying a
    /// simple_template_id.
    ///
    ///  type_name:
    ///    class_name | enum_name | typedef_name | simple_template_id
    ///
    /// Returns the rendered name, or "" if no type_name is present.
    pub(crate) fn parse_type_name(&mut self) -> String {
        if !self.token.is(TokenKind::Identifier) {
            return String::new();
        }

        if self.lookahead(1).is(TokenKind::Less) {
            let template_name = self.token.spelling.clone();
            self.consume_token(); // the name
            self.consume_token(); // "<"

            // Empty argument list short-circuit.
            if self.token.is(TokenKind::Greater) {
                self.consume_token();
                return format!("{}<>", template_name);
            }

            let template_argument_list = self.parse_template_argument_list();

            // ">>" of a nested closer is not split here; such inputs fail
            // this check and the enclosing tentative scope rewinds.
            if self.token.is(TokenKind::Greater) {
                self.consume_token();
                return format!("{}<{}>", template_name, template_argument_list);
            }

            return String::new();
        }

        let identifier = self.token.spelling.clone();
        self.consume_token();
        identifier
    }

    /// Parse a template_argument_list: comma-separated template arguments.
    /// Returns "" if any argument fails to parse.
    fn parse_template_argument_list(&mut self) -> String {
        let mut arguments: Vec<String> = Vec::new();

        loop {
            if !arguments.is_empty() {
                // Eat the comma.
                self.consume_token();
            }

            let argument = self.parse_template_argument();
            if argument.is_empty() {
                return String::new();
            }
            arguments.push(argument);

            if !self.token.is(TokenKind::Comma) {
                break;
            }
        }

        // The debugger spells nested templates with an extra space to avoid
        // ">>": `Foo<Bar<X> >`.
        if let Some(last) = arguments.last_mut() {
            if last.ends_with('>') {
                last.push(' ');
            }
        }

        arguments.join(", ")
    }

    /// Parse a template_argument: a type_id, or failing that an
    /// id_expression, each followed by "," or ">". Returns "" if neither
    /// candidate fits.
    fn parse_template_argument(&mut self) -> String {
        // An ambiguity between a type-id and an expression is resolved to a
        // type-id, so try that first.
        {
            let snapshot = self.start_tentative_parsing();

            let type_decl = self.parse_type_id();
            if type_decl.is_valid()
                && self.resolve_type_from_decl(&type_decl).is_some()
                && self
                    .token
                    .is_one_of(&[TokenKind::Comma, TokenKind::Greater])
            {
                return type_decl.name();
            }

            self.rollback(snapshot);
        }

        {
            let snapshot = self.start_tentative_parsing();

            let id_expression = self.parse_id_expression();
            if !id_expression.is_empty()
                && self
                    .token
                    .is_one_of(&[TokenKind::Comma, TokenKind::Greater])
            {
                return id_expression;
            }

            self.rollback(snapshot);
        }

        String::new()
    }

    /// Parse a ptr_operator: `*` with any trailing cv_qualifier run, or `&`.
    fn parse_ptr_operator(&mut self, type_decl: &mut TypeDeclaration) {
        self.expect_one_of(&[TokenKind::Star, TokenKind::Amp]);

        if self.token.is(TokenKind::Star) {
            type_decl.ptr_operators.push(PtrOperator::Star);
            self.consume_token();
            while is_cv_qualifier(&self.token) {
                // CV qualifiers play no role in casting; discard.
                self.consume_token();
            }
        } else if self.token.is(TokenKind::Amp) {
            type_decl.ptr_operators.push(PtrOperator::Amp);
            self.consume_token();
        }
    }

    /// Resolve the base type of a declaration against the context. `None`
    /// means the declaration does not denote a type.
    pub(crate) fn resolve_type_from_decl(&self, type_decl: &TypeDeclaration) -> Option<TypeRef> {
        if !type_decl.is_valid() {
            return None;
        }
        self.ctx.resolve_type_by_name(&type_decl.base_name())
    }

    /// Apply the declarators left to right: `*` builds pointer types, `&`
    /// builds the reference type. Pointers and references to reference
    /// types are rejected with `kInvalidOperandType`.
    pub(crate) fn resolve_type_declarators(
        &mut self,
        ty: TypeRef,
        type_decl: &TypeDeclaration,
    ) -> Option<TypeRef> {
        let mut ty = ty;

        for op in &type_decl.ptr_operators {
            match op {
                PtrOperator::Star => {
                    if ty.is_reference() {
                        let message = format!(
                            "'type name' declared as a pointer to a reference of type '{}'",
                            ty.name()
                        );
                        let loc = self.token.loc;
                        self.bail_out(ErrorKind::InvalidOperandType, &message, loc);
                        return None;
                    }
                    ty = ty.pointer_type();
                }
                PtrOperator::Amp => {
                    if ty.is_reference() {
                        let loc = self.token.loc;
                        self.bail_out(
                            ErrorKind::InvalidOperandType,
                            "type name declared as a reference to a reference",
                            loc,
                        );
                        return None;
                    }
                    ty = ty.reference_type();
                }
            }
        }

        Some(ty)
    }

    /// Parse an id_expression.
    ///
    ///  id_expression:
    ///    unqualified_id
    ///    qualified_id
    ///
    ///  qualified_id:
    ///    {"::"} {nested_name_specifier} unqualified_id
    ///    {"::"} identifier
    pub(crate) fn parse_id_expression(&mut self) -> String {
        let mut global_scope = false;
        if self.token.is(TokenKind::ColonColon) {
            global_scope = true;
            self.consume_token();
        }

        let nested_name_specifier = self.parse_nested_name_specifier();

        // With a nested_name_specifier this is the first qualified_id
        // production.
        if !nested_name_specifier.is_empty() {
            let unqualified_id = self.parse_unqualified_id();
            return format!(
                "{}{}{}",
                if global_scope { "::" } else { "" },
                nested_name_specifier,
                unqualified_id
            );
        }

        // Global scope with a bare identifier is the second production.
        if global_scope {
            self.expect(TokenKind::Identifier);
            let identifier = self.token.spelling.clone();
            self.consume_token();
            return format!("::{}", identifier);
        }

        self.parse_unqualified_id()
    }

    /// Parse an unqualified_id: a single identifier.
    fn parse_unqualified_id(&mut self) -> String {
        self.expect(TokenKind::Identifier);
        let identifier = self.token.spelling.clone();
        self.consume_token();
        identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_joins_fragments() {
        let type_decl = TypeDeclaration {
            typenames: vec!["unsigned".to_string(), "int".to_string()],
            ptr_operators: vec![],
        };
        assert_eq!(type_decl.base_name(), "unsigned int");
        assert_eq!(type_decl.name(), "unsigned int");
    }

    #[test]
    fn test_base_name_collapses_aliases() {
        let type_decl = TypeDeclaration {
            typenames: vec!["short".to_string(), "int".to_string()],
            ptr_operators: vec![],
        };
        assert_eq!(type_decl.base_name(), "short");

        let type_decl = TypeDeclaration {
            typenames: vec![
                "unsigned".to_string(),
                "long".to_string(),
                "int".to_string(),
            ],
            ptr_operators: vec![],
        };
        assert_eq!(type_decl.base_name(), "unsigned long");
    }

    #[test]
    fn test_name_appends_declarators() {
        let type_decl = TypeDeclaration {
            typenames: vec!["int".to_string()],
            ptr_operators: vec![PtrOperator::Star, PtrOperator::Star],
        };
        assert_eq!(type_decl.name(), "int **");

        let type_decl = TypeDeclaration {
            typenames: vec!["int".to_string()],
            ptr_operators: vec![PtrOperator::Star, PtrOperator::Amp],
        };
        assert_eq!(type_decl.name(), "int *&");
    }

    #[test]
    fn test_invalid_declaration() {
        let type_decl = TypeDeclaration::default();
        assert!(!type_decl.is_valid());

        let type_decl = TypeDeclaration {
            typenames: vec!["int".to_string()],
            ptr_operators: vec![],
        };
        assert!(type_decl.is_valid());
    }
}
