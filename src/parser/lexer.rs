//! Lexer (tokenizer) for C++ expression text
//!
//! Converts an expression string into a flat [`Token`] stream consumed by the
//! parser. The lexer never fails: bytes outside the token grammar become
//! [`TokenKind::Unknown`] tokens and are rejected later by the grammar. The
//! stream always ends with an [`TokenKind::Eof`] token.
//!
//! Numeric constants are lexed as a single `pp-number`-style token (digits,
//! identifier characters, `.`, digit separators, and exponent signs after
//! `e`/`E`/`p`/`P`); classification into integer/float and suffix handling
//! happens in [`literals`](crate::parser::literals).

use std::fmt;

/// Source position of a token, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Generates the `TokenKind` enum and its `name()` method. Each entry maps a
/// variant to the kind name used in diagnostics; keyword kinds are named by
/// their spelling.
macro_rules! define_token_kinds {
    ( $( $variant:ident => $name:literal ),* $(,)? ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum TokenKind {
            $( $variant, )*
        }

        impl TokenKind {
            /// The kind name used in diagnostics, e.g. `l_paren`.
            pub fn name(self) -> &'static str {
                match self {
                    $( TokenKind::$variant => $name, )*
                }
            }
        }
    };
}

define_token_kinds! {
    // Punctuators.
    LParen              => "l_paren",
    RParen              => "r_paren",
    LSquare             => "l_square",
    RSquare             => "r_square",
    LBrace              => "l_brace",
    RBrace              => "r_brace",
    Period              => "period",
    PeriodStar          => "periodstar",
    Ellipsis            => "ellipsis",
    Amp                 => "amp",
    AmpAmp              => "ampamp",
    AmpEqual            => "ampequal",
    Star                => "star",
    StarEqual           => "starequal",
    Plus                => "plus",
    PlusPlus            => "plusplus",
    PlusEqual           => "plusequal",
    Minus               => "minus",
    Arrow               => "arrow",
    ArrowStar           => "arrowstar",
    MinusMinus          => "minusminus",
    MinusEqual          => "minusequal",
    Tilde               => "tilde",
    Exclaim             => "exclaim",
    ExclaimEqual        => "exclaimequal",
    Slash               => "slash",
    SlashEqual          => "slashequal",
    Percent             => "percent",
    PercentEqual        => "percentequal",
    Less                => "less",
    LessLess            => "lessless",
    LessEqual           => "lessequal",
    LessLessEqual       => "lesslessequal",
    Greater             => "greater",
    GreaterGreater      => "greatergreater",
    GreaterEqual        => "greaterequal",
    GreaterGreaterEqual => "greatergreaterequal",
    Caret               => "caret",
    CaretEqual          => "caretequal",
    Pipe                => "pipe",
    PipePipe            => "pipepipe",
    PipeEqual           => "pipeequal",
    Question            => "question",
    Colon               => "colon",
    ColonColon          => "coloncolon",
    Semi                => "semi",
    Equal               => "equal",
    EqualEqual          => "equalequal",
    Comma               => "comma",

    // Keywords.
    KwTrue              => "true",
    KwFalse             => "false",
    KwNullptr           => "nullptr",
    KwThis              => "this",
    KwConst             => "const",
    KwVolatile          => "volatile",
    KwBool              => "bool",
    KwChar              => "char",
    KwChar16T           => "char16_t",
    KwChar32T           => "char32_t",
    KwWcharT            => "wchar_t",
    KwShort             => "short",
    KwInt               => "int",
    KwLong              => "long",
    KwSigned            => "signed",
    KwUnsigned          => "unsigned",
    KwFloat             => "float",
    KwDouble            => "double",
    KwVoid              => "void",

    // Everything else.
    Identifier          => "identifier",
    NumericConstant     => "numeric_constant",
    Unknown             => "unknown",
    Eof                 => "eof",
}

/// A single lexed token: kind, spelling as written, and source position.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub spelling: String,
    pub loc: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, spelling: impl Into<String>, loc: SourceLocation) -> Self {
        Token {
            kind,
            spelling: spelling.into(),
            loc,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_one_of(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }

    /// Token description used in diagnostics, e.g. `<'+' (plus)>`.
    pub fn description(&self) -> String {
        format!("<'{}' ({})>", self.spelling, self.kind.name())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Lexer for C++ expression text.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given expression string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input. Ends with an `Eof` token.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, "", self.current_location()));
                break;
            }

            tokens.push(self.next_token());
        }

        tokens
    }

    /// Lex the next token.
    fn next_token(&mut self) -> Token {
        let loc = self.current_location();
        // Guarded by `is_at_end` in `tokenize`.
        let ch = match self.advance() {
            Some(ch) => ch,
            None => return Token::new(TokenKind::Eof, "", loc),
        };

        match ch {
            '0'..='9' => self.number_constant(ch, loc),

            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(ch, loc),

            '(' => Token::new(TokenKind::LParen, "(", loc),
            ')' => Token::new(TokenKind::RParen, ")", loc),
            '[' => Token::new(TokenKind::LSquare, "[", loc),
            ']' => Token::new(TokenKind::RSquare, "]", loc),
            '{' => Token::new(TokenKind::LBrace, "{", loc),
            '}' => Token::new(TokenKind::RBrace, "}", loc),

            '.' => {
                if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.number_constant('.', loc)
                } else if self.peek() == Some('*') {
                    self.advance();
                    Token::new(TokenKind::PeriodStar, ".*", loc)
                } else if self.peek() == Some('.') && self.peek_ahead(1) == Some('.') {
                    self.advance();
                    self.advance();
                    Token::new(TokenKind::Ellipsis, "...", loc)
                } else {
                    Token::new(TokenKind::Period, ".", loc)
                }
            }
            '+' => {
                if self.peek() == Some('+') {
                    self.advance();
                    Token::new(TokenKind::PlusPlus, "++", loc)
                } else if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::PlusEqual, "+=", loc)
                } else {
                    Token::new(TokenKind::Plus, "+", loc)
                }
            }
            '-' => {
                if self.peek() == Some('-') {
                    self.advance();
                    Token::new(TokenKind::MinusMinus, "--", loc)
                } else if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::MinusEqual, "-=", loc)
                } else if self.peek() == Some('>') {
                    self.advance();
                    if self.peek() == Some('*') {
                        self.advance();
                        Token::new(TokenKind::ArrowStar, "->*", loc)
                    } else {
                        Token::new(TokenKind::Arrow, "->", loc)
                    }
                } else {
                    Token::new(TokenKind::Minus, "-", loc)
                }
            }
            '*' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::StarEqual, "*=", loc)
                } else {
                    Token::new(TokenKind::Star, "*", loc)
                }
            }
            '/' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::SlashEqual, "/=", loc)
                } else {
                    Token::new(TokenKind::Slash, "/", loc)
                }
            }
            '%' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::PercentEqual, "%=", loc)
                } else {
                    Token::new(TokenKind::Percent, "%", loc)
                }
            }
            '&' => {
                if self.peek() == Some('&') {
                    self.advance();
                    Token::new(TokenKind::AmpAmp, "&&", loc)
                } else if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::AmpEqual, "&=", loc)
                } else {
                    Token::new(TokenKind::Amp, "&", loc)
                }
            }
            '|' => {
                if self.peek() == Some('|') {
                    self.advance();
                    Token::new(TokenKind::PipePipe, "||", loc)
                } else if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::PipeEqual, "|=", loc)
                } else {
                    Token::new(TokenKind::Pipe, "|", loc)
                }
            }
            '^' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::CaretEqual, "^=", loc)
                } else {
                    Token::new(TokenKind::Caret, "^", loc)
                }
            }
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::EqualEqual, "==", loc)
                } else {
                    Token::new(TokenKind::Equal, "=", loc)
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::ExclaimEqual, "!=", loc)
                } else {
                    Token::new(TokenKind::Exclaim, "!", loc)
                }
            }
            '<' => {
                if self.peek() == Some('<') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        Token::new(TokenKind::LessLessEqual, "<<=", loc)
                    } else {
                        Token::new(TokenKind::LessLess, "<<", loc)
                    }
                } else if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::LessEqual, "<=", loc)
                } else {
                    Token::new(TokenKind::Less, "<", loc)
                }
            }
            '>' => {
                if self.peek() == Some('>') {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        Token::new(TokenKind::GreaterGreaterEqual, ">>=", loc)
                    } else {
                        Token::new(TokenKind::GreaterGreater, ">>", loc)
                    }
                } else if self.peek() == Some('=') {
                    self.advance();
                    Token::new(TokenKind::GreaterEqual, ">=", loc)
                } else {
                    Token::new(TokenKind::Greater, ">", loc)
                }
            }
            '~' => Token::new(TokenKind::Tilde, "~", loc),
            '?' => Token::new(TokenKind::Question, "?", loc),
            ':' => {
                if self.peek() == Some(':') {
                    self.advance();
                    Token::new(TokenKind::ColonColon, "::", loc)
                } else {
                    Token::new(TokenKind::Colon, ":", loc)
                }
            }
            ';' => Token::new(TokenKind::Semi, ";", loc),
            ',' => Token::new(TokenKind::Comma, ",", loc),

            _ => Token::new(TokenKind::Unknown, ch.to_string(), loc),
        }
    }

    /// Lex a `pp-number`: digits, identifier characters, `.`, digit
    /// separators, and `+`/`-` immediately after an exponent letter. The
    /// spelling is classified later by the literal analyzer.
    fn number_constant(&mut self, first: char, loc: SourceLocation) -> Token {
        let mut spelling = String::new();
        spelling.push(first);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || ch == '\'' {
                spelling.push(ch);
                self.advance();
            } else if (ch == '+' || ch == '-')
                && matches!(spelling.chars().last(), Some('e' | 'E' | 'p' | 'P'))
            {
                spelling.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::new(TokenKind::NumericConstant, spelling, loc)
    }

    /// Lex an identifier or keyword.
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match ident.as_str() {
            "true" => TokenKind::KwTrue,
            "false" => TokenKind::KwFalse,
            "nullptr" => TokenKind::KwNullptr,
            "this" => TokenKind::KwThis,
            "const" => TokenKind::KwConst,
            "volatile" => TokenKind::KwVolatile,
            "bool" => TokenKind::KwBool,
            "char" => TokenKind::KwChar,
            "char16_t" => TokenKind::KwChar16T,
            "char32_t" => TokenKind::KwChar32T,
            "wchar_t" => TokenKind::KwWcharT,
            "short" => TokenKind::KwShort,
            "int" => TokenKind::KwInt,
            "long" => TokenKind::KwLong,
            "signed" => TokenKind::KwSigned,
            "unsigned" => TokenKind::KwUnsigned,
            "float" => TokenKind::KwFloat,
            "double" => TokenKind::KwDouble,
            "void" => TokenKind::KwVoid,
            _ => TokenKind::Identifier,
        };

        Token::new(kind, ident, loc)
    }

    /// Skip whitespace and comments.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment();
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    /// Skip a single-line comment (`// ...`).
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip a multi-line comment (`/* ... */`). An unterminated comment
    /// consumes the rest of the input.
    fn skip_block_comment(&mut self) {
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                return;
            }
            self.advance();
        }
    }

    /// Peek at current character without consuming.
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters.
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character.
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input.
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location.
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).tokenize().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = Lexer::new("(a + b) * 2").tokenize();

        assert!(tokens[0].is(TokenKind::LParen));
        assert!(tokens[1].is(TokenKind::Identifier));
        assert_eq!(tokens[1].spelling, "a");
        assert!(tokens[2].is(TokenKind::Plus));
        assert!(tokens[3].is(TokenKind::Identifier));
        assert!(tokens[4].is(TokenKind::RParen));
        assert!(tokens[5].is(TokenKind::Star));
        assert!(tokens[6].is(TokenKind::NumericConstant));
        assert_eq!(tokens[6].spelling, "2");
        assert!(tokens[7].is(TokenKind::Eof));
    }

    #[test]
    fn test_operators_max_munch() {
        assert_eq!(
            kinds("<< <<= < <= -> ->* :: : .* ... >>="),
            vec![
                TokenKind::LessLess,
                TokenKind::LessLessEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Arrow,
                TokenKind::ArrowStar,
                TokenKind::ColonColon,
                TokenKind::Colon,
                TokenKind::PeriodStar,
                TokenKind::Ellipsis,
                TokenKind::GreaterGreaterEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let tokens = Lexer::new("unsigned long longing this nullptr").tokenize();

        assert!(tokens[0].is(TokenKind::KwUnsigned));
        assert!(tokens[1].is(TokenKind::KwLong));
        assert!(tokens[2].is(TokenKind::Identifier));
        assert_eq!(tokens[2].spelling, "longing");
        assert!(tokens[3].is(TokenKind::KwThis));
        assert!(tokens[4].is(TokenKind::KwNullptr));
    }

    #[test]
    fn test_pp_number_spans_suffix_and_exponent() {
        // The whole pp-number is one token; classification happens later.
        let tokens = Lexer::new("1e400f + 0x1p-3 + 1'000'000ull").tokenize();

        assert!(tokens[0].is(TokenKind::NumericConstant));
        assert_eq!(tokens[0].spelling, "1e400f");
        assert!(tokens[1].is(TokenKind::Plus));
        assert_eq!(tokens[2].spelling, "0x1p-3");
        assert!(tokens[3].is(TokenKind::Plus));
        assert_eq!(tokens[4].spelling, "1'000'000ull");
    }

    #[test]
    fn test_leading_dot_number() {
        let tokens = Lexer::new(".5 .x").tokenize();

        assert!(tokens[0].is(TokenKind::NumericConstant));
        assert_eq!(tokens[0].spelling, ".5");
        assert!(tokens[1].is(TokenKind::Period));
        assert!(tokens[2].is(TokenKind::Identifier));
    }

    #[test]
    fn test_unknown_character() {
        let tokens = Lexer::new("a @ b").tokenize();

        assert!(tokens[1].is(TokenKind::Unknown));
        assert_eq!(tokens[1].spelling, "@");
        assert_eq!(tokens[1].description(), "<'@' (unknown)>");
    }

    #[test]
    fn test_locations() {
        let tokens = Lexer::new("a +\n  bb").tokenize();

        assert_eq!(tokens[0].loc, SourceLocation::new(1, 1));
        assert_eq!(tokens[1].loc, SourceLocation::new(1, 3));
        assert_eq!(tokens[2].loc, SourceLocation::new(2, 3));
        assert_eq!(tokens[3].loc, SourceLocation::new(2, 5)); // eof
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("a /* block */ + b // line"),
            vec![
                TokenKind::Identifier,
                TokenKind::Plus,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }
}
