//! Semantic resolvers.
//!
//! Small pure functions that turn parse-tree fragments into model values.
//! They only look at the tree through the queries in [`crate::tree`].

use classmap_core::model::{ParameterDirection, Visibility};
use thiserror::Error;

use crate::{
    span::Span,
    tokens::TokenKind,
    tree::{self, Leaf, Node, Rule},
};

/// A parameter default that is neither a signed integer nor a string.
///
/// Carries enough to report the literal or keep it verbatim, depending on
/// the caller's policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported default value `{text}` ({kind})")]
pub struct UnsupportedLiteral {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

/// Visibility of a declaration from the visibility keyword in its
/// `modifier`; `Private` when there is none.
///
/// `static` alone does not change visibility.
pub fn resolve_visibility(decl: &Node<'_>) -> Visibility {
    tree::first_child_rule(decl, Rule::Modifier)
        .and_then(|modifier| tree::first_child_token(modifier, TokenKind::Visibility))
        .map(|keyword| match keyword.text() {
            "public" => Visibility::Public,
            "protected" => Visibility::Protected,
            _ => Visibility::Private,
        })
        .unwrap_or_default()
}

/// Direction of a `param` node: `out` is [`ParameterDirection::Out`],
/// `ref` is [`ParameterDirection::InOut`], anything else is
/// [`ParameterDirection::In`].
pub fn resolve_direction(param: &Node<'_>) -> ParameterDirection {
    match tree::first_child_token(param, TokenKind::Direction).map(Leaf::text) {
        Some("out") => ParameterDirection::Out,
        Some("ref") => ParameterDirection::InOut,
        _ => ParameterDirection::In,
    }
}

/// Flattened text of the first `rule` child of `node`.
///
/// Leaf texts are concatenated without separators, so `List< int >`
/// becomes `List<int>` and `Dictionary<string, int>` becomes
/// `Dictionary<string,int>`. Returns `None` when there is no such child or
/// when it holds only the `void` keyword.
pub fn resolve_type_name(node: &Node<'_>, rule: Rule) -> Option<String> {
    let child = tree::first_child_rule(node, rule)?;

    let mut leaves = tree::tokens(child).peekable();
    if leaves
        .peek()
        .is_some_and(|leaf| leaf.kind() == TokenKind::Void)
    {
        return None;
    }

    Some(leaves.map(Leaf::text).collect())
}

/// Removes the trailing `;` of a raw initializer and trims whitespace.
pub fn strip_literal_terminator(text: &str) -> &str {
    text.strip_suffix(';').unwrap_or(text).trim()
}

/// Raw default literal of a `param` node.
///
/// Integer and string literals are returned verbatim, quotes and sign
/// included. Any other literal kind is reported as [`UnsupportedLiteral`]
/// so the caller can decide what to do with it.
pub fn resolve_default(param: &Node<'_>) -> Result<Option<String>, UnsupportedLiteral> {
    let Some(value) = tree::first_child_rule(param, Rule::DefaultValue)
        .and_then(|default| tree::tokens(default).next())
    else {
        return Ok(None);
    };

    match value.kind() {
        TokenKind::IntegerLiteral | TokenKind::StringLiteral => Ok(Some(value.text().to_string())),
        kind => Err(UnsupportedLiteral {
            kind,
            text: value.text().to_string(),
            span: value.span(),
        }),
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{lexer, parser};

    // ===================
    // Strategies
    // ===================

    fn identifier_strategy() -> impl Strategy<Value = String> {
        "[A-Z][a-zA-Z0-9_]{0,8}"
    }

    /// Type expressions in their flattened form: generics, nullable and
    /// array suffixes.
    fn type_strategy() -> impl Strategy<Value = String> {
        let leaf = identifier_strategy();
        leaf.prop_recursive(3, 12, 3, |inner| {
            (
                identifier_strategy(),
                prop::collection::vec(inner, 1..=3),
                any::<bool>(),
                prop::collection::vec(0usize..3, 0..=2),
            )
                .prop_map(|(name, args, nullable, ranks)| {
                    let mut text = format!("{name}<{}>", args.join(","));
                    if nullable {
                        text.push('?');
                    }
                    for commas in ranks {
                        text.push('[');
                        text.push_str(&",".repeat(commas));
                        text.push(']');
                    }
                    text
                })
        })
    }

    /// Re-spaces a flattened type the way a person might write it.
    fn spaced(flat: &str) -> String {
        flat.replace(',', " , ").replace('<', " < ").replace('>', " > ")
    }

    // ===================
    // Property Test Functions
    // ===================

    fn reconstruct(type_text: &str) -> Option<String> {
        let source = format!("namespace N {{ class C {{ {type_text} value; }} }}");
        let tokens = lexer::tokenize(&source).ok()?;
        let unit = parser::build_tree(&source, &tokens).ok()?;
        let attrs = tree::all_descendants(&unit, Rule::AttrDecl);
        resolve_type_name(attrs.first()?, Rule::TypeName)
    }

    /// Reconstructing a type and parsing the result again is a fixpoint.
    fn check_type_reconstruction_idempotent(flat: &str) -> Result<(), TestCaseError> {
        let first = reconstruct(&spaced(flat));
        prop_assert_eq!(first.as_deref(), Some(flat));

        let second = reconstruct(flat);
        prop_assert_eq!(second.as_deref(), Some(flat));
        Ok(())
    }

    fn check_direction_total(keyword: &str) -> Result<(), TestCaseError> {
        let source = format!("namespace N {{ class C {{ void M({keyword} int a) {{ }} }} }}");
        let tokens = lexer::tokenize(&source).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let unit =
            parser::build_tree(&source, &tokens).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let params = tree::all_descendants(&unit, Rule::Param);

        let expected = match keyword {
            "out" => ParameterDirection::Out,
            "ref" => ParameterDirection::InOut,
            _ => ParameterDirection::In,
        };
        prop_assert_eq!(resolve_direction(params[0]), expected);
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn type_reconstruction_idempotent(flat in type_strategy()) {
            check_type_reconstruction_idempotent(&flat)?;
        }

        #[test]
        fn direction_is_total(keyword in prop::sample::select(vec!["", "out", "ref"])) {
            check_direction_total(keyword)?;
        }
    }
}
