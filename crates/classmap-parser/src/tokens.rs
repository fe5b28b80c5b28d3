use std::fmt;

use crate::span::Span;

/// Token types for the accepted C# subset.
///
/// Literal payloads borrow the raw source text, quotes and signs included,
/// so a default value can be reported exactly as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'src> {
    // Structural keywords
    Namespace,
    Using,
    Class,
    Enum,
    Partial,
    Override,
    Void,

    // Modifier keywords
    Public,
    Private,
    Protected,
    Static,

    // Direction keywords
    Out,
    Ref,

    // Literals
    Identifier(&'src str),
    IntegerLiteral(&'src str),
    NumberLiteral(&'src str),
    StringLiteral(&'src str),
    CharLiteral(&'src str),

    // Punctuation
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    LeftAngle,    // <
    RightAngle,   // >
    Comma,        // ,
    Semicolon,    // ;
    Colon,        // :
    Equals,       // =
    Question,     // ?
    FatArrow,     // =>

    /// Any other character; only meaningful inside opaque regions.
    Symbol(&'src str),
}

/// Lexical category of a token as seen by tree queries.
///
/// Several tokens share a kind: all three visibility keywords are
/// [`TokenKind::Visibility`], both direction keywords are
/// [`TokenKind::Direction`]. The last two kinds never come from the lexer;
/// the parser synthesizes them for regions it keeps as raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    IntegerLiteral,
    NumberLiteral,
    StringLiteral,
    CharLiteral,
    Visibility,
    Static,
    Direction,
    Namespace,
    Using,
    Class,
    Enum,
    Partial,
    Override,
    Void,
    Punctuation,
    Symbol,
    /// Raw initializer text up to and including its `;`.
    ValueLiteral,
    /// An opaque `{ ... }` body.
    Body,
}

impl<'src> Token<'src> {
    /// The source text of this token.
    pub fn text(&self) -> &'src str {
        match self {
            Token::Namespace => "namespace",
            Token::Using => "using",
            Token::Class => "class",
            Token::Enum => "enum",
            Token::Partial => "partial",
            Token::Override => "override",
            Token::Void => "void",
            Token::Public => "public",
            Token::Private => "private",
            Token::Protected => "protected",
            Token::Static => "static",
            Token::Out => "out",
            Token::Ref => "ref",

            Token::Identifier(text)
            | Token::IntegerLiteral(text)
            | Token::NumberLiteral(text)
            | Token::StringLiteral(text)
            | Token::CharLiteral(text)
            | Token::Symbol(text) => text,

            Token::LeftBrace => "{",
            Token::RightBrace => "}",
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::LeftBracket => "[",
            Token::RightBracket => "]",
            Token::LeftAngle => "<",
            Token::RightAngle => ">",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::Colon => ":",
            Token::Equals => "=",
            Token::Question => "?",
            Token::FatArrow => "=>",
        }
    }

    /// The lexical category of this token.
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Namespace => TokenKind::Namespace,
            Token::Using => TokenKind::Using,
            Token::Class => TokenKind::Class,
            Token::Enum => TokenKind::Enum,
            Token::Partial => TokenKind::Partial,
            Token::Override => TokenKind::Override,
            Token::Void => TokenKind::Void,
            Token::Public | Token::Private | Token::Protected => TokenKind::Visibility,
            Token::Static => TokenKind::Static,
            Token::Out | Token::Ref => TokenKind::Direction,
            Token::Identifier(_) => TokenKind::Identifier,
            Token::IntegerLiteral(_) => TokenKind::IntegerLiteral,
            Token::NumberLiteral(_) => TokenKind::NumberLiteral,
            Token::StringLiteral(_) => TokenKind::StringLiteral,
            Token::CharLiteral(_) => TokenKind::CharLiteral,
            Token::Symbol(_) => TokenKind::Symbol,
            Token::LeftBrace
            | Token::RightBrace
            | Token::LeftParen
            | Token::RightParen
            | Token::LeftBracket
            | Token::RightBracket
            | Token::LeftAngle
            | Token::RightAngle
            | Token::Comma
            | Token::Semicolon
            | Token::Colon
            | Token::Equals
            | Token::Question
            | Token::FatArrow => TokenKind::Punctuation,
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::IntegerLiteral => "integer literal",
            TokenKind::NumberLiteral => "numeric literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::CharLiteral => "character literal",
            TokenKind::Visibility => "visibility keyword",
            TokenKind::Static => "`static`",
            TokenKind::Direction => "direction keyword",
            TokenKind::Namespace => "`namespace`",
            TokenKind::Using => "`using`",
            TokenKind::Class => "`class`",
            TokenKind::Enum => "`enum`",
            TokenKind::Partial => "`partial`",
            TokenKind::Override => "`override`",
            TokenKind::Void => "`void`",
            TokenKind::Punctuation => "punctuation",
            TokenKind::Symbol => "symbol",
            TokenKind::ValueLiteral => "value",
            TokenKind::Body => "body",
        };
        f.write_str(name)
    }
}

/// A token with its position in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl fmt::Display for PositionedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}
