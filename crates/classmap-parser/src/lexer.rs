//! Lexical analyzer for the accepted C# subset.
//!
//! The lexer converts source text into a stream of [`PositionedToken`]s.
//! Trivia (whitespace, `//` and `/* */` comments, preprocessor lines such as
//! `#region`) is consumed here and never reaches the parser.
//!
//! String and character literals are validated but not decoded: their token
//! text is the raw source slice, quotes included, because extraction reports
//! literals exactly as written.
//!
//! The public entry point is [`tokenize`], which keeps going after an error
//! and reports every lexical problem of the unit in a single pass.

use winnow::{
    Parser as _,
    ascii::{digit0, digit1},
    combinator::{alt, cut_err, delimited, not, opt, peek, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{any, none_of, one_of, take_until, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Diagnostic details attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<LexerDiagnostic>>;

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn whitespace<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    take_while(1.., char::is_whitespace).void().parse_next(input)
}

fn line_comment<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    preceded("//", take_while(0.., |c| c != '\n'))
        .void()
        .parse_next(input)
}

fn block_comment<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    let start = input.current_token_start();

    (
        "/*",
        cut_err(terminated(take_until(0.., "*/"), "*/")).context(LexerDiagnostic {
            code: ErrorCode::E004,
            message: "unterminated block comment",
            help: Some("add a closing `*/`"),
            start,
        }),
    )
        .void()
        .parse_next(input)
}

/// `#region`, `#endregion`, `#if DEBUG` and friends, up to the end of line.
fn preprocessor_line<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    preceded('#', take_while(0.., |c| c != '\n'))
        .void()
        .parse_next(input)
}

fn trivia<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    alt((whitespace, line_comment, block_comment, preprocessor_line)).parse_next(input)
}

/// Parse an escape sequence after validating it against the C# set.
///
/// Accepts `\'`, `\"`, `\\`, `\0`, `\a`, `\b`, `\f`, `\n`, `\r`, `\t`, `\v`,
/// `\x` with 1 to 4 hex digits, `\u` with exactly 4 and `\U` with exactly 8.
fn escape_sequence<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    let escape_start = input.current_token_start();

    let hex = |c: char| c.is_ascii_hexdigit();
    let escape = cut_err(alt((
        one_of(['\'', '"', '\\', '0', 'a', 'b', 'f', 'n', 'r', 't', 'v']).void(),
        preceded('x', take_while(1..=4, hex)).void(),
        preceded('u', take_while(4, hex)).void(),
        preceded('U', take_while(8, hex)).void(),
    )))
    .context(LexerDiagnostic {
        code: ErrorCode::E003,
        message: "invalid escape sequence",
        help: Some(
            "valid escapes: `\\'`, `\\\"`, `\\\\`, `\\0`, `\\a`, `\\b`, `\\f`, `\\n`, `\\r`, `\\t`, `\\v`, `\\xH`, `\\uHHHH`, `\\UHHHHHHHH`",
        ),
        start: escape_start,
    });

    preceded('\\', escape).parse_next(input)
}

fn unterminated_string(start: usize) -> LexerDiagnostic {
    LexerDiagnostic {
        code: ErrorCode::E001,
        message: "unterminated string literal",
        help: Some("add a closing `\"`"),
        start,
    }
}

/// `"..."` with escape sequences; may not span lines.
fn regular_string<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    let start = input.current_token_start();

    let content = repeat(
        0..,
        alt((escape_sequence, none_of(['"', '\\', '\n', '\r']).void())),
    )
    .map(|()| ());

    preceded(
        '"',
        cut_err(terminated(content, '"')).context(unterminated_string(start)),
    )
    .parse_next(input)
}

/// `@"..."` where `""` stands for a quote; may span lines.
fn verbatim_string<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    let start = input.current_token_start();

    let content = repeat(0.., alt(("\"\"".void(), none_of('"').void()))).map(|()| ());

    preceded(
        "@\"",
        cut_err(terminated(content, '"')).context(unterminated_string(start)),
    )
    .parse_next(input)
}

/// An interpolation hole `{ ... }`. Nested strings, character literals and
/// braces are skipped as units so their `}` does not close the hole.
fn interpolation_hole<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    let content = repeat(
        0..,
        alt((
            string_literal.void(),
            char_literal.void(),
            interpolation_hole,
            none_of(['{', '}', '"', '\'']).void(),
        )),
    )
    .map(|()| ());

    delimited('{', content, '}').parse_next(input)
}

/// `$"..."`, `$@"..."` and `@$"..."`.
fn interpolated_string<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    let start = input.current_token_start();

    let opener: IResult<'a, bool> =
        alt(("$@\"".value(true), "@$\"".value(true), "$\"".value(false))).parse_next(input);
    let verbatim = opener?;

    let content = repeat(
        0..,
        alt((
            "{{".void(),
            "}}".void(),
            interpolation_hole,
            move |input: &mut Input<'a>| {
                if verbatim {
                    alt(("\"\"".void(), none_of(['"', '{', '}']).void())).parse_next(input)
                } else {
                    alt((escape_sequence, none_of(['"', '\\', '{', '}', '\n', '\r']).void()))
                        .parse_next(input)
                }
            },
        )),
    )
    .map(|()| ());

    cut_err(terminated(content, '"'))
        .context(unterminated_string(start))
        .parse_next(input)
}

/// Any string literal form; the token keeps the raw text.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt((interpolated_string, verbatim_string, regular_string))
        .take()
        .map(Token::StringLiteral)
        .parse_next(input)
}

fn char_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start = input.current_token_start();

    let content = cut_err(terminated(
        alt((escape_sequence, none_of(['\'', '\\', '\n', '\r']).void())),
        '\'',
    ))
    .context(LexerDiagnostic {
        code: ErrorCode::E005,
        message: "unterminated character literal",
        help: Some("a character literal holds exactly one character: `'x'`"),
        start,
    });

    preceded('\'', content)
        .take()
        .map(Token::CharLiteral)
        .parse_next(input)
}

/// `[+-]?(0|[1-9][0-9]*)` not followed by an identifier character or `.`.
fn integer_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    terminated(
        (
            opt(one_of(['+', '-'])),
            alt(('0'.void(), (one_of('1'..='9'), digit0).void())),
        )
            .take(),
        peek(not(one_of(|c: char| is_identifier_continue(c) || c == '.'))),
    )
    .map(Token::IntegerLiteral)
    .parse_next(input)
}

/// Every other numeric form: `1.5`, `0x1F`, `2f`, `1_000`, `007`, `1e-5`.
///
/// A sign is part of the literal only directly after an `e`/`E` exponent
/// marker that is followed by digits.
fn number_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    (
        opt(one_of(['+', '-'])),
        one_of(|c: char| c.is_ascii_digit()),
        repeat(
            0..,
            alt((
                (one_of(['e', 'E']), one_of(['+', '-']), digit1).void(),
                one_of(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.').void(),
            )),
        )
        .map(|()| ()),
    )
        .take()
        .map(Token::NumberLiteral)
        .parse_next(input)
}

fn identifier_segment<'a>(input: &mut Input<'a>) -> IResult<'a, &'a str> {
    (
        one_of(is_identifier_start),
        take_while(0.., is_identifier_continue),
    )
        .take()
        .parse_next(input)
}

/// A keyword or an identifier.
///
/// Dotted names such as `System.Collections.Generic` are a single
/// identifier token. A word is a keyword only when it matches exactly,
/// so `publicKey` and `Outer.Class` stay identifiers.
fn word<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    (
        identifier_segment,
        repeat(0.., ('.', identifier_segment).void()).map(|()| ()),
    )
        .take()
        .map(|text: &str| match text {
            "namespace" => Token::Namespace,
            "using" => Token::Using,
            "class" => Token::Class,
            "enum" => Token::Enum,
            "partial" => Token::Partial,
            "override" => Token::Override,
            "void" => Token::Void,
            "public" => Token::Public,
            "private" => Token::Private,
            "protected" => Token::Protected,
            "static" => Token::Static,
            "out" => Token::Out,
            "ref" => Token::Ref,
            _ => Token::Identifier(text),
        })
        .parse_next(input)
}

fn punctuation<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt((
        "=>".value(Token::FatArrow),
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        '<'.value(Token::LeftAngle),
        '>'.value(Token::RightAngle),
        ','.value(Token::Comma),
        ';'.value(Token::Semicolon),
        ':'.value(Token::Colon),
        '='.value(Token::Equals),
        '?'.value(Token::Question),
    ))
    .parse_next(input)
}

/// Any printable character without a token of its own.
fn symbol<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    any.verify(|c: &char| !c.is_control())
        .take()
        .map(Token::Symbol)
        .parse_next(input)
}

/// Parse a single token with position tracking.
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<'a, PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        string_literal,  // Must come before `@` and `$` symbols
        char_literal,    // Must come before symbols
        integer_literal, // Must come before number_literal and `+`/`-` symbols
        number_literal,  // Must come before symbols
        word,            // Keywords and identifiers
        punctuation,     // `=>` before `=`
        symbol,          // Anything else printable
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();

    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            let checkpoint = input.checkpoint();
            let result = match trivia(&mut input) {
                Ok(()) => continue,
                Err(ErrMode::Backtrack(_)) => {
                    input.reset(&checkpoint);
                    positioned_token(&mut input)
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(token) => self.tokens.push(token),
                Err(e) => {
                    let error_pos = input.current_token_start();
                    let diagnostic = Self::convert_err_mode(e, error_pos);
                    let code = diagnostic.code();
                    self.diagnostics.emit(diagnostic);
                    Self::recover(&mut input, code);
                }
            }
        }
    }

    /// Skip past the damage of a failed token.
    ///
    /// An unterminated block comment swallows the rest of the unit. Broken
    /// string and character literals skip the rest of their line, so the
    /// literal's tail is not re-lexed as code.
    fn recover(input: &mut Input<'a>, code: Option<ErrorCode>) {
        match code {
            Some(ErrorCode::E004) => {
                input.next_slice(input.eof_offset());
            }
            Some(ErrorCode::E001 | ErrorCode::E003 | ErrorCode::E005) => {
                let rest_of_line: IResult<'a, &'a str> =
                    take_while(0.., |c| c != '\n').parse_next(input);
                debug_assert!(rest_of_line.is_ok());
            }
            _ => {
                if !input.is_empty() {
                    input.next_token();
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert an `ErrMode` and error position to a [`Diagnostic`].
    ///
    /// Uses the innermost `LexerDiagnostic` context for code, message and
    /// help. Falls back to E002 (unexpected character) when no context is
    /// attached, which happens for characters no token accepts.
    fn convert_err_mode(err: ErrMode<ContextError<LexerDiagnostic>>, error_pos: usize) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos.max(*start + 1));

            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
    }
}

/// Tokenize a source unit, collecting every lexical error.
///
/// # Returns
///
/// - `Ok(tokens)` - the significant tokens in source order, trivia removed
/// - `Err(ParseError)` - one or more lexical errors; contains all diagnostics
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}
