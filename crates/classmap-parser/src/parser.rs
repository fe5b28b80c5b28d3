//! Parser for C# subset tokens.
//!
//! This module turns the token stream from the [`lexer`](super::lexer) into a
//! concrete parse [`Node`] tree. The public entry point is [`build_tree`].
//!
//! The grammar is a pragmatic subset of C#: namespaces holding classes and
//! enums, classes holding fields, properties, methods and constructors.
//! Method bodies, accessor bodies and initializer expressions are never
//! parsed; they are skipped by counting brackets and kept as one raw leaf.
//!
//! Two productions overlap and are resolved deterministically:
//! - a namespace-level declaration peeks past its modifiers and `partial`
//!   for the `class` or `enum` keyword before committing
//! - a class member tries the method production first and falls back to
//!   the attribute production

use winnow::{
    Parser,
    combinator::{alt, opt, repeat, repeat_till},
    error::{ContextError, ErrMode},
    stream::{Stateful, Stream, TokenSlice},
    token::any,
};

use crate::{
    error::{Diagnostic, ErrorCode},
    span::Span,
    tokens::{PositionedToken, Token, TokenKind},
    tree::{Child, Leaf, Node, Rule},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what was expected
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) where the failed construct began
    StartOffset(usize),
    /// Overrides the default E100 code
    Code(ErrorCode),
}

/// Tokens to parse, carrying the source text so opaque regions can be kept
/// as raw slices.
type Input<'t, 'src> = Stateful<TokenSlice<'t, PositionedToken<'src>>, &'src str>;
type PError = ErrMode<ContextError<Context>>;
type IResult<O> = Result<O, PError>;

/// Commit to the construct parsed by `f`: a failure becomes a `Cut` that
/// remembers where the construct started.
fn cut_err<'t, 'src, O, F>(input: &mut Input<'t, 'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'t, 'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::StartOffset(start_remaining));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

fn leaf<'src>(token: &PositionedToken<'src>) -> Leaf<'src> {
    Leaf::new(token.kind(), token.text(), token.span)
}

/// Match a single token satisfying `predicate` and keep it as a leaf.
fn token_where<'t, 'src: 't, F>(predicate: F) -> impl Parser<Input<'t, 'src>, Leaf<'src>, PError>
where
    F: Fn(&Token<'src>) -> bool,
{
    any.verify_map(move |token: &'t PositionedToken<'src>| {
        predicate(&token.token).then(|| leaf(token))
    })
}

/// Match exactly `expected`.
fn punct<'t, 'src: 't>(expected: Token<'src>) -> impl Parser<Input<'t, 'src>, Leaf<'src>, PError> {
    token_where(move |token| *token == expected)
}

fn next_token<'t, 'src>(input: &mut Input<'t, 'src>) -> IResult<&'t PositionedToken<'src>> {
    any.parse_next(input)
}

fn peek_token<'src>(input: &Input<'_, 'src>) -> Option<Token<'src>> {
    input.first().map(|token| token.token)
}

fn identifier<'src>(input: &mut Input<'_, 'src>) -> IResult<Leaf<'src>> {
    token_where(|token| matches!(token, Token::Identifier(_)))
        .context(Context::Label("identifier"))
        .parse_next(input)
}

fn semicolon<'src>(input: &mut Input<'_, 'src>) -> IResult<Leaf<'src>> {
    punct(Token::Semicolon)
        .context(Context::Label("`;`"))
        .parse_next(input)
}

fn is_modifier(token: &Token<'_>) -> bool {
    matches!(
        token,
        Token::Public | Token::Private | Token::Protected | Token::Static
    )
}

/// `modifier := (VISIBILITY | "static"){1,2}`
fn modifier<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    repeat(1..=2, token_where(is_modifier))
        .map(|leaves: Vec<Leaf<'src>>| {
            Node::new(Rule::Modifier, leaves.into_iter().map(Child::from).collect())
        })
        .parse_next(input)
}

/// Parse a type expression.
///
/// ## Grammar:
///   `type_name := (IDENT | IDENT "<" (type_name ",")* type_name ">") "?"? ("[" ","* "]")*`
///
/// Examples: `int`, `List<Foo>`, `Dictionary<string, List<int>>`, `int?`,
/// `string[]`, `int[,][]`.
fn type_name<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    let mut children: Vec<Child<'src>> = vec![identifier.parse_next(input)?.into()];

    if let Some(open) = opt(punct(Token::LeftAngle)).parse_next(input)? {
        children.push(open.into());
        children.push(type_name.parse_next(input)?.into());
        while let Some(comma) = opt(punct(Token::Comma)).parse_next(input)? {
            children.push(comma.into());
            children.push(type_name.parse_next(input)?.into());
        }
        let close = punct(Token::RightAngle)
            .context(Context::Label("`>` closing the type arguments"))
            .parse_next(input)?;
        children.push(close.into());
    }

    if let Some(question) = opt(punct(Token::Question)).parse_next(input)? {
        children.push(question.into());
    }

    while let Some(open) = opt(punct(Token::LeftBracket)).parse_next(input)? {
        children.push(open.into());
        let commas: Vec<Leaf<'src>> = repeat(0.., punct(Token::Comma)).parse_next(input)?;
        children.extend(commas.into_iter().map(Child::from));
        let close = punct(Token::RightBracket)
            .context(Context::Label("`]` closing the array rank"))
            .parse_next(input)?;
        children.push(close.into());
    }

    Ok(Node::new(Rule::TypeName, children))
}

/// Skip a brace-balanced `{ ... }` region and keep it as one [`TokenKind::Body`] leaf.
fn body<'src>(input: &mut Input<'_, 'src>) -> IResult<Leaf<'src>> {
    let open = punct(Token::LeftBrace).parse_next(input)?;

    cut_err(input, |input| {
        let mut depth = 1usize;
        loop {
            let token = next_token
                .context(Context::Label("`}` closing the body"))
                .parse_next(input)?;
            match token.token {
                Token::LeftBrace => depth += 1,
                Token::RightBrace => {
                    depth -= 1;
                    if depth == 0 {
                        let span = open.span().union(token.span);
                        let source = input.state;
                        return Ok(Leaf::new(TokenKind::Body, &source[span.range()], span));
                    }
                }
                _ => {}
            }
        }
    })
}

/// Skip an expression up to and including the first `;` outside any
/// brackets and keep it as one [`TokenKind::ValueLiteral`] leaf.
///
/// At least one token must precede the `;`.
fn value_literal<'src>(input: &mut Input<'_, 'src>) -> IResult<Leaf<'src>> {
    let first = token_where(|token| *token != Token::Semicolon)
        .context(Context::Label("value"))
        .parse_next(input)?;

    let mut depth = 0usize;
    let mut current = first;
    loop {
        match current.text() {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" if depth > 0 => depth -= 1,
            ";" if depth == 0 && current.kind() == TokenKind::Punctuation => {
                let span = first.span().union(current.span());
                let source = input.state;
                return Ok(Leaf::new(
                    TokenKind::ValueLiteral,
                    &source[span.range()],
                    span,
                ));
            }
            _ => {}
        }
        current = next_token
            .map(leaf)
            .context(Context::Label("`;` ending the value"))
            .parse_next(input)?;
    }
}

/// `default_value := INTEGER | STRING | NUMBER | CHAR | IDENT`
fn default_value<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    token_where(|token| {
        matches!(
            token,
            Token::IntegerLiteral(_)
                | Token::StringLiteral(_)
                | Token::NumberLiteral(_)
                | Token::CharLiteral(_)
                | Token::Identifier(_)
        )
    })
    .map(|value| Node::new(Rule::DefaultValue, vec![value.into()]))
    .context(Context::Label("default value"))
    .parse_next(input)
}

/// `param := ("out" | "ref")? type_name IDENT ("=" default_value)?`
fn param<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    let mut children: Vec<Child<'src>> = Vec::new();

    if let Some(direction) = opt(token_where(|token| matches!(token, Token::Out | Token::Ref)))
        .parse_next(input)?
    {
        children.push(direction.into());
    }

    children.push(
        type_name
            .context(Context::Label("parameter type"))
            .parse_next(input)?
            .into(),
    );
    children.push(
        identifier
            .context(Context::Label("parameter name"))
            .parse_next(input)?
            .into(),
    );

    if let Some(equals) = opt(punct(Token::Equals)).parse_next(input)? {
        children.push(equals.into());
        children.push(default_value.parse_next(input)?.into());
    }

    Ok(Node::new(Rule::Param, children))
}

/// `params := (param ",")* param`
fn params<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    let mut children: Vec<Child<'src>> = vec![param.parse_next(input)?.into()];

    while let Some(comma) = opt(punct(Token::Comma)).parse_next(input)? {
        children.push(comma.into());
        children.push(param.parse_next(input)?.into());
    }

    Ok(Node::new(Rule::Params, children))
}

/// `return_type := "void" | type_name`
fn return_type<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    alt((
        punct(Token::Void).map(Child::from),
        type_name.map(Child::from),
    ))
    .map(|child| Node::new(Rule::ReturnType, vec![child]))
    .parse_next(input)
}

/// Parse a method or constructor declaration.
///
/// ## Grammar:
///   `method_decl := modifier? "override"? return_type? IDENT "(" params? ")" (body | "=>" value_literal)`
///
/// Backtracks until the `(` after the name is seen, then commits.
fn method_decl<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    let mut children: Vec<Child<'src>> = Vec::new();

    if let Some(modifier) = opt(modifier).parse_next(input)? {
        children.push(modifier.into());
    }
    if let Some(keyword) = opt(punct(Token::Override)).parse_next(input)? {
        children.push(keyword.into());
    }

    let (return_type, name, open) = alt((
        (return_type, identifier, punct(Token::LeftParen))
            .map(|(return_type, name, open)| (Some(return_type), name, open)),
        (identifier, punct(Token::LeftParen)).map(|(name, open)| (None, name, open)),
    ))
    .parse_next(input)?;

    if let Some(return_type) = return_type {
        children.push(return_type.into());
    }
    children.push(name.into());
    children.push(open.into());

    cut_err(input, |input| {
        if peek_token(input) != Some(Token::RightParen) {
            children.push(params.parse_next(input)?.into());
        }
        children.push(
            punct(Token::RightParen)
                .context(Context::Label("`)` closing the parameter list"))
                .parse_next(input)?
                .into(),
        );

        if let Some(arrow) = opt(punct(Token::FatArrow)).parse_next(input)? {
            children.push(arrow.into());
            children.push(value_literal.parse_next(input)?.into());
        } else {
            children.push(
                body.context(Context::Label("method body"))
                    .parse_next(input)?
                    .into(),
            );
        }

        Ok(Node::new(Rule::MethodDecl, children))
    })
}

/// `accessor := VISIBILITY? ("get" | "set" | "init") (";" | body | "=>" value_literal)`
fn accessor<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    let mut children: Vec<Child<'src>> = Vec::new();

    if let Some(visibility) = opt(token_where(|token| {
        matches!(token, Token::Public | Token::Private | Token::Protected)
    }))
    .parse_next(input)?
    {
        children.push(visibility.into());
    }

    children.push(
        token_where(|token| matches!(token, Token::Identifier("get" | "set" | "init")))
            .context(Context::Label("`get`, `set` or `init`"))
            .parse_next(input)?
            .into(),
    );

    let rest = match peek_token(input) {
        Some(Token::LeftBrace) => body.parse_next(input)?,
        Some(Token::FatArrow) => {
            children.push(punct(Token::FatArrow).parse_next(input)?.into());
            value_literal.parse_next(input)?
        }
        _ => semicolon.parse_next(input)?,
    };
    children.push(rest.into());

    Ok(Node::new(Rule::Accessor, children))
}

/// `"{" accessor+ "}"`
fn accessor_list<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    let open = punct(Token::LeftBrace).parse_next(input)?;

    let (accessors, close): (Vec<Node<'src>>, Leaf<'src>) = repeat_till(
        1..,
        accessor,
        punct(Token::RightBrace).context(Context::Label("`}` closing the accessors")),
    )
    .parse_next(input)?;

    let mut children: Vec<Child<'src>> = vec![open.into()];
    children.extend(accessors.into_iter().map(Child::from));
    children.push(close.into());

    Ok(Node::new(Rule::AccessorList, children))
}

/// Parse a field or property declaration.
///
/// ## Grammar:
///   `attr_decl := modifier? type_name IDENT ("=" value_literal | "=>" value_literal | ";" | accessor_list ("=" value_literal)?)`
///
/// The `=>` form is an expression-bodied property; its value is kept in
/// the tree but is not an initializer.
fn attr_decl<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    let mut children: Vec<Child<'src>> = Vec::new();

    if let Some(modifier) = opt(modifier).parse_next(input)? {
        children.push(modifier.into());
    }
    children.push(
        type_name
            .context(Context::Label("member type"))
            .parse_next(input)?
            .into(),
    );
    children.push(
        identifier
            .context(Context::Label("member name"))
            .parse_next(input)?
            .into(),
    );

    match peek_token(input) {
        Some(Token::Equals) => {
            children.push(punct(Token::Equals).parse_next(input)?.into());
            children.push(value_literal.parse_next(input)?.into());
        }
        Some(Token::FatArrow) => {
            children.push(punct(Token::FatArrow).parse_next(input)?.into());
            children.push(value_literal.parse_next(input)?.into());
        }
        Some(Token::LeftBrace) => {
            children.push(accessor_list.parse_next(input)?.into());
            if let Some(equals) = opt(punct(Token::Equals)).parse_next(input)? {
                children.push(equals.into());
                children.push(value_literal.parse_next(input)?.into());
            }
        }
        _ => {
            children.push(
                semicolon
                    .context(Context::Label("`;`, `=`, `=>` or `{` after the member name"))
                    .parse_next(input)?
                    .into(),
            );
        }
    }

    Ok(Node::new(Rule::AttrDecl, children))
}

/// A class member: method first, attribute as the fallback.
fn member<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    let checkpoint = input.checkpoint();

    match method_decl(input) {
        Err(ErrMode::Backtrack(_)) => {
            input.reset(&checkpoint);
            cut_err(input, attr_decl)
        }
        result => result,
    }
}

/// `base_list := ":" type_name ("," type_name)*`
fn base_list<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    let mut children: Vec<Child<'src>> = vec![punct(Token::Colon).parse_next(input)?.into()];

    children.push(
        type_name
            .context(Context::Label("base type"))
            .parse_next(input)?
            .into(),
    );
    while let Some(comma) = opt(punct(Token::Comma)).parse_next(input)? {
        children.push(comma.into());
        children.push(type_name.parse_next(input)?.into());
    }

    Ok(Node::new(Rule::BaseList, children))
}

/// Parse a class declaration.
///
/// ## Grammar:
///   `class_decl := modifier? "partial"? "class" IDENT base_list? "{" member* "}" ";"?`
fn class_decl<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    let mut children: Vec<Child<'src>> = Vec::new();

    if let Some(modifier) = opt(modifier).parse_next(input)? {
        children.push(modifier.into());
    }
    if let Some(keyword) = opt(punct(Token::Partial)).parse_next(input)? {
        children.push(keyword.into());
    }
    children.push(punct(Token::Class).parse_next(input)?.into());

    cut_err(input, |input| {
        children.push(
            identifier
                .context(Context::Label("class name"))
                .parse_next(input)?
                .into(),
        );
        if let Some(bases) = opt(base_list).parse_next(input)? {
            children.push(bases.into());
        }
        children.push(
            punct(Token::LeftBrace)
                .context(Context::Label("`{` opening the class body"))
                .parse_next(input)?
                .into(),
        );

        let (members, close): (Vec<Node<'src>>, Leaf<'src>) =
            repeat_till(0.., member, punct(Token::RightBrace)).parse_next(input)?;
        children.extend(members.into_iter().map(Child::from));
        children.push(close.into());

        if let Some(semicolon) = opt(punct(Token::Semicolon)).parse_next(input)? {
            children.push(semicolon.into());
        }

        Ok(Node::new(Rule::ClassDecl, children))
    })
}

/// `enum_value := IDENT ("=" (INTEGER | NUMBER))?`
fn enum_value<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    let mut children: Vec<Child<'src>> = vec![
        identifier
            .context(Context::Label("enum member"))
            .parse_next(input)?
            .into(),
    ];

    if let Some(equals) = opt(punct(Token::Equals)).parse_next(input)? {
        children.push(equals.into());
        children.push(
            token_where(|token| {
                matches!(token, Token::IntegerLiteral(_) | Token::NumberLiteral(_))
            })
            .context(Context::Label("integer enum value"))
            .parse_next(input)?
            .into(),
        );
    }

    Ok(Node::new(Rule::EnumValue, children))
}

/// `enum_body := (enum_value ",")* enum_value?`
fn enum_body<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    let mut children: Vec<Child<'src>> = Vec::new();

    while peek_token(input) != Some(Token::RightBrace) {
        children.push(enum_value.parse_next(input)?.into());
        match opt(punct(Token::Comma)).parse_next(input)? {
            Some(comma) => children.push(comma.into()),
            None => break,
        }
    }

    Ok(Node::new(Rule::EnumBody, children))
}

/// Parse an enum declaration.
///
/// ## Grammar:
///   `enum_decl := modifier? "enum" IDENT (":" IDENT)? "{" enum_body "}" ";"?`
fn enum_decl<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    let mut children: Vec<Child<'src>> = Vec::new();

    if let Some(modifier) = opt(modifier).parse_next(input)? {
        children.push(modifier.into());
    }
    children.push(punct(Token::Enum).parse_next(input)?.into());

    cut_err(input, |input| {
        children.push(
            identifier
                .context(Context::Label("enum name"))
                .parse_next(input)?
                .into(),
        );
        if let Some(colon) = opt(punct(Token::Colon)).parse_next(input)? {
            children.push(colon.into());
            children.push(
                identifier
                    .context(Context::Label("underlying type"))
                    .parse_next(input)?
                    .into(),
            );
        }
        children.push(
            punct(Token::LeftBrace)
                .context(Context::Label("`{` opening the enum body"))
                .parse_next(input)?
                .into(),
        );
        children.push(enum_body.parse_next(input)?.into());
        children.push(
            punct(Token::RightBrace)
                .context(Context::Label("`}` closing the enum body"))
                .parse_next(input)?
                .into(),
        );

        if let Some(semicolon) = opt(punct(Token::Semicolon)).parse_next(input)? {
            children.push(semicolon.into());
        }

        Ok(Node::new(Rule::EnumDecl, children))
    })
}

/// `type_decl := class_decl | enum_decl`
///
/// Looks past modifiers and `partial` for the discriminating keyword.
fn type_decl<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    let keyword = input
        .iter()
        .map(|token| token.token)
        .find(|token| !is_modifier(token) && *token != Token::Partial);

    match keyword {
        Some(Token::Class) => class_decl.parse_next(input),
        Some(Token::Enum) => enum_decl.parse_next(input),
        _ => {
            let mut error = ContextError::new();
            error.push(Context::Label("class or enum declaration"));
            error.push(Context::Code(ErrorCode::E102));
            Err(ErrMode::Backtrack(error))
        }
    }
}

/// Parse a namespace with its type declarations.
///
/// ## Grammar:
///   `namespace_decl := "namespace" qualified_name ("{" type_decl* "}" | ";" type_decl*)`
///
/// The declarations of a file-scoped namespace run until the end of the
/// unit or the next `namespace`.
fn namespace_decl<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    let mut children: Vec<Child<'src>> = vec![
        punct(Token::Namespace)
            .context(Context::Label("namespace declaration"))
            .parse_next(input)?
            .into(),
    ];

    cut_err(input, |input| {
        children.push(
            identifier
                .context(Context::Label("namespace name"))
                .parse_next(input)?
                .into(),
        );

        match peek_token(input) {
            Some(Token::Semicolon) => {
                children.push(semicolon.parse_next(input)?.into());
                while !matches!(peek_token(input), None | Some(Token::Namespace)) {
                    children.push(cut_err(input, type_decl)?.into());
                }
            }
            _ => {
                children.push(
                    punct(Token::LeftBrace)
                        .context(Context::Label("`{` or `;` after the namespace name"))
                        .parse_next(input)?
                        .into(),
                );
                let (declarations, close): (Vec<Node<'src>>, Leaf<'src>) = repeat_till(
                    0..,
                    |input: &mut Input<'_, 'src>| cut_err(input, type_decl),
                    punct(Token::RightBrace),
                )
                .parse_next(input)?;
                children.extend(declarations.into_iter().map(Child::from));
                children.push(close.into());
            }
        }

        Ok(Node::new(Rule::NamespaceDecl, children))
    })
}

/// `import := "using" "static"? qualified_name ";"`
fn import<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    let mut children: Vec<Child<'src>> = vec![punct(Token::Using).parse_next(input)?.into()];

    cut_err(input, |input| {
        if let Some(keyword) = opt(punct(Token::Static)).parse_next(input)? {
            children.push(keyword.into());
        }
        children.push(
            identifier
                .context(Context::Label("imported namespace"))
                .parse_next(input)?
                .into(),
        );
        children.push(semicolon.parse_next(input)?.into());

        Ok(Node::new(Rule::Import, children))
    })
}

/// `unit := import* namespace_decl+`
fn compilation_unit<'src>(input: &mut Input<'_, 'src>) -> IResult<Node<'src>> {
    let imports: Vec<Node<'src>> = repeat(0.., import).parse_next(input)?;
    let mut children: Vec<Child<'src>> = imports.into_iter().map(Child::from).collect();

    loop {
        children.push(cut_err(input, namespace_decl)?.into());
        if input.is_empty() {
            break;
        }
    }

    Ok(Node::new(Rule::CompilationUnit, children))
}

/// Convert a winnow error into a [`Diagnostic`].
///
/// The primary label marks the token the parser stopped at. When the failed
/// construct had already consumed tokens, a secondary label marks where it
/// began.
fn convert_error(
    error: PError,
    tokens: &[PositionedToken<'_>],
    current_remaining: usize,
) -> Diagnostic {
    let context = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    // The innermost construct pushes its start offset first
    let start_remaining = context.context().find_map(|ctx| match ctx {
        Context::StartOffset(n) => Some(*n),
        _ => None,
    });
    let code = context
        .context()
        .find_map(|ctx| match ctx {
            Context::Code(code) => Some(*code),
            _ => None,
        })
        .unwrap_or(ErrorCode::E100);
    let expected = context.context().find_map(|ctx| match ctx {
        Context::Label(label) => Some(*label),
        _ => None,
    });

    let end_offset = tokens.len() - current_remaining;
    let start_offset = start_remaining.map(|r| tokens.len() - r);

    let Some(found) = tokens.get(end_offset) else {
        let end = tokens.last().map_or(0, |token| token.span.end());
        let message = match expected {
            Some(label) => format!("unexpected end of input: expected {label}"),
            None => "unexpected end of input".to_string(),
        };
        return Diagnostic::error(message)
            .with_code(ErrorCode::E101)
            .with_label(Span::new(end..end), ErrorCode::E101.description())
            .with_help("the unit ends before the declaration is complete");
    };

    let message = match expected {
        Some(label) => format!("unexpected token: expected {label}"),
        None => format!("unexpected token `{}`", found.token),
    };

    let mut diag = Diagnostic::error(message)
        .with_code(code)
        .with_label(found.span, format!("unexpected `{}`", found.token));

    if let Some(start) = start_offset.filter(|start| *start < end_offset) {
        diag = diag.with_secondary_label(tokens[start].span, "while parsing this declaration");
    }

    match code {
        ErrorCode::E102 => diag.with_help("only classes and enums may appear inside a namespace"),
        _ => diag,
    }
}

/// Build the concrete parse tree of a compilation unit.
///
/// `source` must be the text `tokens` were produced from; opaque regions are
/// sliced out of it.
///
/// Parsing stops at the first grammar error.
pub fn build_tree<'src>(
    source: &'src str,
    tokens: &[PositionedToken<'src>],
) -> Result<Node<'src>, Diagnostic> {
    let mut input = Stateful {
        input: TokenSlice::new(tokens),
        state: source,
    };

    match compilation_unit.parse_next(&mut input) {
        Ok(unit) => Ok(unit),
        Err(e) => {
            let current_remaining = input.eof_offset();
            Err(convert_error(e, tokens, current_remaining))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn with_input<'src, O>(
        source: &'src str,
        parser: impl FnOnce(&mut Input<'_, 'src>) -> IResult<O>,
    ) -> (IResult<O>, usize) {
        let tokens = tokenize(source).expect("Failed to tokenize input");
        let mut input = Stateful {
            input: TokenSlice::new(&tokens),
            state: source,
        };
        let result = parser(&mut input);
        let remaining = input.eof_offset();
        (result, remaining)
    }

    fn parse_type(source: &str) -> String {
        let (result, remaining) = with_input(source, |input| type_name.parse_next(input));
        let node = result.expect("type should parse");
        assert_eq!(remaining, 0, "type {source:?} left tokens behind");
        node.to_string()
    }

    #[test]
    fn test_type_name_shapes() {
        assert_eq!(parse_type("int"), "(type_name int)");
        assert_eq!(
            parse_type("List<Foo>"),
            "(type_name List < (type_name Foo) >)"
        );
        assert_eq!(
            parse_type("Dictionary<string, List<int>>"),
            "(type_name Dictionary < (type_name string) , (type_name List < (type_name int) >) >)"
        );
        assert_eq!(parse_type("int?"), "(type_name int ?)");
        assert_eq!(parse_type("int[,][]"), "(type_name int [ , ] [ ])");
    }

    #[test]
    fn test_modifier_takes_at_most_two() {
        let (result, remaining) = with_input("public static static", |input| {
            modifier.parse_next(input)
        });
        assert_eq!(result.unwrap().children().len(), 2);
        assert_eq!(remaining, 1);
    }

    #[test]
    fn test_body_is_one_leaf() {
        let source = "{ if (x) { y(); } else { \"}\"; } }";
        let (result, remaining) = with_input(source, |input| body.parse_next(input));
        let leaf = result.unwrap();
        assert_eq!(leaf.kind(), TokenKind::Body);
        assert_eq!(leaf.text(), source);
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_unbalanced_body_is_an_error() {
        let (result, _) = with_input("{ { }", |input| body.parse_next(input));
        assert!(matches!(result, Err(ErrMode::Cut(_))));
    }

    #[test]
    fn test_value_literal_stops_at_outer_semicolon() {
        let source = "new List<int> { F(a; b), 2 }; next";
        let (result, remaining) = with_input(source, |input| value_literal.parse_next(input));
        let leaf = result.unwrap();
        assert_eq!(leaf.kind(), TokenKind::ValueLiteral);
        assert_eq!(leaf.text(), "new List<int> { F(a; b), 2 };");
        assert_eq!(remaining, 1);
    }

    #[test]
    fn test_value_literal_keeps_raw_spacing() {
        let (result, _) = with_input("\"a  b\"  ;", |input| value_literal.parse_next(input));
        assert_eq!(result.unwrap().text(), "\"a  b\"  ;");
    }

    #[test]
    fn test_value_literal_needs_a_value() {
        let (result, _) = with_input(";", |input| value_literal.parse_next(input));
        assert!(result.is_err());
    }

    #[test]
    fn test_method_backtracks_on_attribute() {
        let (result, remaining) = with_input("private int x;", |input| {
            method_decl.parse_next(input)
        });
        assert!(matches!(result, Err(ErrMode::Backtrack(_))));
        assert!(remaining > 0);

        let (result, remaining) = with_input("private int x;", |input| member.parse_next(input));
        assert_eq!(result.unwrap().rule(), Rule::AttrDecl);
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_expression_bodied_property_is_an_attribute() {
        let (result, remaining) = with_input("public int Count => items.Count;", |input| {
            member.parse_next(input)
        });
        let node = result.unwrap();
        assert_eq!(node.rule(), Rule::AttrDecl);
        assert_eq!(remaining, 0);

        let texts: Vec<_> = node
            .children()
            .iter()
            .filter_map(Child::as_token)
            .map(|leaf| leaf.text())
            .collect();
        assert_eq!(texts, ["Count", "=>", "items.Count;"]);
    }

    #[test]
    fn test_constructor_has_no_return_type() {
        let (result, _) = with_input("public Foo(int a) { }", |input| member.parse_next(input));
        let node = result.unwrap();
        assert_eq!(node.rule(), Rule::MethodDecl);
        assert!(
            node.children()
                .iter()
                .filter_map(Child::as_node)
                .all(|child| child.rule() != Rule::ReturnType)
        );
    }

    #[test]
    fn test_type_decl_dispatch_peeks_past_modifiers() {
        let (result, _) = with_input("public static partial class A { }", |input| {
            type_decl.parse_next(input)
        });
        assert_eq!(result.unwrap().rule(), Rule::ClassDecl);

        let (result, _) = with_input("public enum B { }", |input| type_decl.parse_next(input));
        assert_eq!(result.unwrap().rule(), Rule::EnumDecl);

        let (result, remaining) = with_input("public int x;", |input| type_decl.parse_next(input));
        assert!(matches!(result, Err(ErrMode::Backtrack(_))));
        assert_eq!(remaining, 4);
    }

    #[test]
    fn test_build_tree_error_labels_offending_token() {
        let source = "namespace App { class Foo { int x } }";
        let tokens = tokenize(source).unwrap();
        let diag = build_tree(source, &tokens).unwrap_err();

        assert_eq!(diag.code(), Some(ErrorCode::E100));
        let brace = source.rfind("} }").unwrap();
        assert_eq!(diag.primary_span(), Some(Span::new(brace..brace + 1)));
        assert!(diag.labels().iter().any(|label| label.is_secondary()));
    }

    #[test]
    fn test_build_tree_error_at_end_of_input() {
        let source = "namespace App { class Foo {";
        let tokens = tokenize(source).unwrap();
        let diag = build_tree(source, &tokens).unwrap_err();

        assert_eq!(diag.code(), Some(ErrorCode::E101));
        let end = source.len();
        assert_eq!(diag.primary_span(), Some(Span::new(end..end)));
    }

    #[test]
    fn test_build_tree_rejects_non_type_in_namespace() {
        let source = "namespace App { int x; }";
        let tokens = tokenize(source).unwrap();
        let diag = build_tree(source, &tokens).unwrap_err();

        assert_eq!(diag.code(), Some(ErrorCode::E102));
        assert!(diag.help().is_some());
    }
}
