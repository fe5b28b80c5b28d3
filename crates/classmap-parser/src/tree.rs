//! Concrete parse tree and the queries extraction runs over it.
//!
//! The parser keeps every significant token it matched, grouped under
//! [`Node`]s labelled with the grammar [`Rule`] that produced them. Method
//! bodies, accessor bodies and attribute initializers are not parsed; each
//! becomes a single synthesized [`Leaf`] of kind [`TokenKind::Body`] or
//! [`TokenKind::ValueLiteral`].
//!
//! Extraction never walks `children` by hand. It asks the four query
//! functions of this module:
//!
//! - [`first_child_token`] and [`first_child_rule`] look at immediate
//!   children only
//! - [`all_descendants`] searches the whole subtree in document order
//! - [`tokens`] yields every leaf under a node in document order

use std::fmt;

use crate::{span::Span, tokens::TokenKind};

/// Grammar production that produced a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    CompilationUnit,
    Import,
    NamespaceDecl,
    ClassDecl,
    EnumDecl,
    EnumBody,
    EnumValue,
    BaseList,
    Modifier,
    AttrDecl,
    AccessorList,
    Accessor,
    MethodDecl,
    ReturnType,
    Params,
    Param,
    DefaultValue,
    TypeName,
}

impl Rule {
    /// The grammar name of the rule, as used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::CompilationUnit => "compilation_unit",
            Rule::Import => "import",
            Rule::NamespaceDecl => "namespace_decl",
            Rule::ClassDecl => "class_decl",
            Rule::EnumDecl => "enum_decl",
            Rule::EnumBody => "enum_body",
            Rule::EnumValue => "enum_value",
            Rule::BaseList => "base_list",
            Rule::Modifier => "modifier",
            Rule::AttrDecl => "attr_decl",
            Rule::AccessorList => "accessor_list",
            Rule::Accessor => "accessor",
            Rule::MethodDecl => "method_decl",
            Rule::ReturnType => "return_type",
            Rule::Params => "params",
            Rule::Param => "param",
            Rule::DefaultValue => "default_value",
            Rule::TypeName => "type_name",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token kept in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaf<'src> {
    kind: TokenKind,
    text: &'src str,
    span: Span,
}

impl<'src> Leaf<'src> {
    pub fn new(kind: TokenKind, text: &'src str, span: Span) -> Self {
        Self { kind, text, span }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The source text of the leaf, exactly as written.
    pub fn text(&self) -> &'src str {
        self.text
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

/// An element of a node's child list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child<'src> {
    Token(Leaf<'src>),
    Node(Node<'src>),
}

impl<'src> Child<'src> {
    pub fn span(&self) -> Span {
        match self {
            Child::Token(leaf) => leaf.span(),
            Child::Node(node) => node.span(),
        }
    }

    pub fn as_token(&self) -> Option<&Leaf<'src>> {
        match self {
            Child::Token(leaf) => Some(leaf),
            Child::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node<'src>> {
        match self {
            Child::Node(node) => Some(node),
            Child::Token(_) => None,
        }
    }
}

impl<'src> From<Leaf<'src>> for Child<'src> {
    fn from(leaf: Leaf<'src>) -> Self {
        Child::Token(leaf)
    }
}

impl<'src> From<Node<'src>> for Child<'src> {
    fn from(node: Node<'src>) -> Self {
        Child::Node(node)
    }
}

/// A grammar rule application with its ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<'src> {
    rule: Rule,
    span: Span,
    children: Vec<Child<'src>>,
}

impl<'src> Node<'src> {
    /// Creates a node whose span covers all of its children.
    ///
    /// A node without children gets an empty span.
    pub fn new(rule: Rule, children: Vec<Child<'src>>) -> Self {
        let span = match (children.first(), children.last()) {
            (Some(first), Some(last)) => first.span().union(last.span()),
            _ => Span::default(),
        };
        Self {
            rule,
            span,
            children,
        }
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn children(&self) -> &[Child<'src>] {
        &self.children
    }
}

/// Writes the tree as nested s-expressions, one leaf text per token:
/// `(attr_decl (modifier public) (type_name int) x ;)`.
impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.rule)?;
        for child in &self.children {
            match child {
                Child::Token(leaf) => write!(f, " {}", leaf.text())?,
                Child::Node(node) => write!(f, " {node}")?,
            }
        }
        write!(f, ")")
    }
}

/// Returns the first immediate child leaf of the given kind.
pub fn first_child_token<'a, 'src>(node: &'a Node<'src>, kind: TokenKind) -> Option<&'a Leaf<'src>> {
    node.children
        .iter()
        .filter_map(Child::as_token)
        .find(|leaf| leaf.kind() == kind)
}

/// Returns the first immediate child node produced by `rule`.
pub fn first_child_rule<'a, 'src>(node: &'a Node<'src>, rule: Rule) -> Option<&'a Node<'src>> {
    node.children
        .iter()
        .filter_map(Child::as_node)
        .find(|child| child.rule() == rule)
}

/// Returns every node produced by `rule` in the subtree rooted at `node`,
/// `node` itself included, in document (pre-)order.
pub fn all_descendants<'a, 'src>(node: &'a Node<'src>, rule: Rule) -> Vec<&'a Node<'src>> {
    let mut found = Vec::new();
    collect_descendants(node, rule, &mut found);
    found
}

fn collect_descendants<'a, 'src>(node: &'a Node<'src>, rule: Rule, found: &mut Vec<&'a Node<'src>>) {
    if node.rule == rule {
        found.push(node);
    }
    for child in node.children.iter().filter_map(Child::as_node) {
        collect_descendants(child, rule, found);
    }
}

/// Iterates over every leaf under `node` in document order.
pub fn tokens<'a, 'src>(node: &'a Node<'src>) -> Tokens<'a, 'src> {
    Tokens {
        stack: vec![node.children.iter()],
    }
}

/// Depth-first leaf iterator returned by [`tokens`].
#[derive(Debug, Clone)]
pub struct Tokens<'a, 'src> {
    stack: Vec<std::slice::Iter<'a, Child<'src>>>,
}

impl<'a, 'src> Iterator for Tokens<'a, 'src> {
    type Item = &'a Leaf<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let children = self.stack.last_mut()?;
            match children.next() {
                Some(Child::Token(leaf)) => return Some(leaf),
                Some(Child::Node(node)) => self.stack.push(node.children.iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: TokenKind, text: &'static str, start: usize) -> Child<'static> {
        Leaf::new(kind, text, Span::new(start..start + text.len())).into()
    }

    /// `public List<int> items;` by hand.
    fn sample_attribute() -> Node<'static> {
        let modifier = Node::new(Rule::Modifier, vec![leaf(TokenKind::Visibility, "public", 0)]);
        let inner = Node::new(Rule::TypeName, vec![leaf(TokenKind::Identifier, "int", 12)]);
        let type_name = Node::new(
            Rule::TypeName,
            vec![
                leaf(TokenKind::Identifier, "List", 7),
                leaf(TokenKind::Punctuation, "<", 11),
                inner.into(),
                leaf(TokenKind::Punctuation, ">", 15),
            ],
        );
        Node::new(
            Rule::AttrDecl,
            vec![
                modifier.into(),
                type_name.into(),
                leaf(TokenKind::Identifier, "items", 17),
                leaf(TokenKind::Punctuation, ";", 22),
            ],
        )
    }

    #[test]
    fn test_node_span_covers_children() {
        let node = sample_attribute();
        assert_eq!(node.span().range(), 0..23);
        assert_eq!(Node::new(Rule::Params, Vec::new()).span(), Span::default());
    }

    #[test]
    fn test_first_child_token_is_immediate_only() {
        let node = sample_attribute();

        let name = first_child_token(&node, TokenKind::Identifier).unwrap();
        assert_eq!(name.text(), "items");

        // `public` sits one level down, inside the modifier
        assert!(first_child_token(&node, TokenKind::Visibility).is_none());
    }

    #[test]
    fn test_first_child_rule_is_immediate_only() {
        let node = sample_attribute();

        let type_name = first_child_rule(&node, Rule::TypeName).unwrap();
        assert_eq!(type_name.children().len(), 4);
        assert!(first_child_rule(&node, Rule::Param).is_none());
    }

    #[test]
    fn test_all_descendants_includes_self_in_document_order() {
        let node = sample_attribute();

        let type_names = all_descendants(&node, Rule::TypeName);
        assert_eq!(type_names.len(), 2);
        assert_eq!(type_names[0].span().range(), 7..16);
        assert_eq!(type_names[1].span().range(), 12..15);

        let itself = all_descendants(&node, Rule::AttrDecl);
        assert_eq!(itself.len(), 1);
        assert!(std::ptr::eq(itself[0], &node));
    }

    #[test]
    fn test_tokens_in_document_order() {
        let node = sample_attribute();
        let texts: Vec<_> = tokens(&node).map(Leaf::text).collect();
        assert_eq!(texts, ["public", "List", "<", "int", ">", "items", ";"]);
    }

    #[test]
    fn test_display_as_s_expression() {
        let node = sample_attribute();
        assert_eq!(
            node.to_string(),
            "(attr_decl (modifier public) (type_name List < (type_name int) >) items ;)"
        );
    }
}
