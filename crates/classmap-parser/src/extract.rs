//! Extraction phase: parse tree to structural model.
//!
//! The [`Extractor`] walks a compilation unit once, left to right, and emits
//! one entity per class or enum declaration in the order the declarations
//! appear. Everything it learns about the tree comes from the query
//! functions in [`crate::tree`] and the resolvers in [`crate::resolve`].

use log::{debug, trace, warn};
use thiserror::Error;

use classmap_core::{
    model::{Attribute, ClassEntity, EnumEntity, Entity, Method, Parameter, StructuralModel},
    policy::DefaultValuePolicy,
};

use crate::{
    error::{Diagnostic, ErrorCode},
    resolve::{self, UnsupportedLiteral},
    span::Span,
    tokens::TokenKind,
    tree::{self, Leaf, Node, Rule},
};

/// Options for the extraction phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    default_values: DefaultValuePolicy,
}

impl ExtractOptions {
    /// Create options with the given handling of unsupported parameter defaults.
    pub fn new(default_values: DefaultValuePolicy) -> Self {
        Self { default_values }
    }

    pub fn default_values(&self) -> DefaultValuePolicy {
        self.default_values
    }
}

/// Failures of the extraction phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// A matched production lacks a part the grammar always produces.
    ///
    /// The input was valid; the parser and the extractor disagree.
    #[error("`{rule}` has no {expected}")]
    MissingRequiredNode {
        rule: Rule,
        expected: &'static str,
        span: Span,
    },

    /// An unsupported parameter default under [`DefaultValuePolicy::Reject`].
    #[error(transparent)]
    UnsupportedDefault(#[from] UnsupportedLiteral),
}

impl From<ExtractError> for Diagnostic {
    fn from(error: ExtractError) -> Self {
        let message = error.to_string();
        match error {
            ExtractError::MissingRequiredNode { expected, span, .. } => {
                Diagnostic::error(format!("internal error: {message}"))
                    .with_code(ErrorCode::E300)
                    .with_label(span, format!("expected a {expected} here"))
                    .with_help(
                        "the declaration is valid but the extractor could not read it; \
                         this is a bug in classmap, please report it",
                    )
            }
            ExtractError::UnsupportedDefault(literal) => Diagnostic::error(message)
                .with_code(ErrorCode::E301)
                .with_label(literal.span, format!("{} default", literal.kind))
                .with_help(
                    "only signed integer and string literals are supported as parameter defaults",
                ),
        }
    }
}

type Result<T> = std::result::Result<T, ExtractError>;

/// Builds a [`StructuralModel`] from a `compilation_unit` tree.
#[derive(Debug, Clone, Copy)]
pub struct Extractor<'o> {
    options: &'o ExtractOptions,
}

impl<'o> Extractor<'o> {
    pub fn new(options: &'o ExtractOptions) -> Self {
        Self { options }
    }

    /// Extract every class and enum of the unit, in source order.
    pub fn build(&self, unit: &Node<'_>) -> Result<StructuralModel> {
        debug!("Extracting structural model");

        let mut entities = Vec::new();
        for namespace in tree::all_descendants(unit, Rule::NamespaceDecl) {
            self.extract_namespace(namespace, &mut entities)?;
        }

        debug!(entities = entities.len(); "Extraction completed");
        Ok(StructuralModel::new(entities))
    }

    fn extract_namespace(&self, namespace: &Node<'_>, entities: &mut Vec<Entity>) -> Result<()> {
        let name = required_token(namespace, TokenKind::Identifier, "namespace name")?.text();
        trace!(namespace = name; "Extracting namespace");

        // Classes and enums share one pass so mixed units keep their order
        for decl in namespace.children().iter().filter_map(|child| child.as_node()) {
            match decl.rule() {
                Rule::ClassDecl => entities.push(self.extract_class(name, decl)?.into()),
                Rule::EnumDecl => entities.push(extract_enum(name, decl)?.into()),
                _ => {}
            }
        }

        Ok(())
    }

    fn extract_class(&self, namespace: &str, class: &Node<'_>) -> Result<ClassEntity> {
        let name = required_token(class, TokenKind::Identifier, "class name")?.text();

        let attributes = tree::all_descendants(class, Rule::AttrDecl)
            .into_iter()
            .map(extract_attribute)
            .collect::<Result<Vec<_>>>()?;

        let methods = tree::all_descendants(class, Rule::MethodDecl)
            .into_iter()
            .map(|method| self.extract_method(method))
            .collect::<Result<Vec<_>>>()?;

        trace!(
            namespace = namespace,
            class = name,
            attributes = attributes.len(),
            methods = methods.len();
            "Extracted class"
        );

        Ok(ClassEntity::new(namespace, name, attributes, methods))
    }

    fn extract_method(&self, method: &Node<'_>) -> Result<Method> {
        let name = required_token(method, TokenKind::Identifier, "method name")?.text();
        let return_type = resolve::resolve_type_name(method, Rule::ReturnType);
        let visibility = resolve::resolve_visibility(method);

        let parameters = match tree::first_child_rule(method, Rule::Params) {
            Some(params) => tree::all_descendants(params, Rule::Param)
                .into_iter()
                .map(|param| self.extract_parameter(param))
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(Method::new(name, return_type, visibility, parameters))
    }

    fn extract_parameter(&self, param: &Node<'_>) -> Result<Parameter> {
        let name = required_token(param, TokenKind::Identifier, "parameter name")?.text();
        let type_name = required_type(param, "parameter type")?;
        let direction = resolve::resolve_direction(param);

        let default = match resolve::resolve_default(param) {
            Ok(default) => default,
            Err(literal) => match self.options.default_values() {
                DefaultValuePolicy::Drop => {
                    warn!(
                        parameter = name,
                        value = literal.text.as_str(),
                        kind:% = literal.kind;
                        "Dropping unsupported parameter default"
                    );
                    None
                }
                DefaultValuePolicy::Keep => Some(literal.text),
                DefaultValuePolicy::Reject => return Err(literal.into()),
            },
        };

        Ok(Parameter::new(name, type_name, direction, default))
    }
}

fn extract_attribute(attr: &Node<'_>) -> Result<Attribute> {
    let name = required_token(attr, TokenKind::Identifier, "attribute name")?.text();
    let type_name = required_type(attr, "attribute type")?;
    let visibility = resolve::resolve_visibility(attr);
    let initial_value = initializer(attr)
        .map(|value| resolve::strip_literal_terminator(value.text()).to_string());

    Ok(Attribute::new(name, type_name, visibility, initial_value))
}

/// The value literal directly after an `=` child. An expression body after
/// `=>` has no initializer.
fn initializer<'a, 'src>(attr: &'a Node<'src>) -> Option<&'a Leaf<'src>> {
    attr.children().windows(2).find_map(|pair| {
        match (pair[0].as_token(), pair[1].as_token()) {
            (Some(equals), Some(value))
                if equals.text() == "=" && value.kind() == TokenKind::ValueLiteral =>
            {
                Some(value)
            }
            _ => None,
        }
    })
}

fn extract_enum(namespace: &str, enumeration: &Node<'_>) -> Result<EnumEntity> {
    let name = required_token(enumeration, TokenKind::Identifier, "enum name")?.text();
    let body = tree::first_child_rule(enumeration, Rule::EnumBody).ok_or(
        ExtractError::MissingRequiredNode {
            rule: Rule::EnumDecl,
            expected: "enum body",
            span: enumeration.span(),
        },
    )?;

    let values = tree::all_descendants(body, Rule::EnumValue)
        .into_iter()
        .map(|value| {
            required_token(value, TokenKind::Identifier, "enum member name")
                .map(|leaf| leaf.text().to_string())
        })
        .collect::<Result<Vec<_>>>()?;

    trace!(namespace = namespace, enumeration = name, values = values.len(); "Extracted enum");

    Ok(EnumEntity::new(namespace, name, values))
}

fn required_token<'a, 'src>(
    node: &'a Node<'src>,
    kind: TokenKind,
    expected: &'static str,
) -> Result<&'a Leaf<'src>> {
    tree::first_child_token(node, kind).ok_or(ExtractError::MissingRequiredNode {
        rule: node.rule(),
        expected,
        span: node.span(),
    })
}

fn required_type(node: &Node<'_>, expected: &'static str) -> Result<String> {
    resolve::resolve_type_name(node, Rule::TypeName).ok_or(ExtractError::MissingRequiredNode {
        rule: node.rule(),
        expected,
        span: node.span(),
    })
}

#[cfg(test)]
mod tests {
    use classmap_core::model::{ParameterDirection, Visibility};

    use super::*;
    use crate::{lexer, parser, tree::Child};

    fn extract_with(source: &str, policy: DefaultValuePolicy) -> Result<StructuralModel> {
        let tokens = lexer::tokenize(source).expect("source should lex");
        let unit = parser::build_tree(source, &tokens).expect("source should parse");
        let options = ExtractOptions::new(policy);
        Extractor::new(&options).build(&unit)
    }

    fn extract(source: &str) -> StructuralModel {
        extract_with(source, DefaultValuePolicy::Drop).expect("source should extract")
    }

    fn only_method(model: &StructuralModel) -> &Method {
        let class = model.classes().next().expect("a class");
        assert_eq!(class.methods().len(), 1);
        &class.methods()[0]
    }

    #[test]
    fn test_interleaved_declarations_keep_source_order() {
        let model = extract(
            "namespace App { enum A { X } class B { } enum C { Y } class D { } }",
        );
        let names: Vec<_> = model.iter().map(Entity::name).collect();
        assert_eq!(names, ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_namespace_is_qualified_name() {
        let model = extract("namespace Company.Product.Core { class Foo { } }");
        assert_eq!(model.entities()[0].namespace(), "Company.Product.Core");
    }

    #[test]
    fn test_file_scoped_and_multiple_namespaces() {
        let model = extract("namespace A { class X { } } namespace B; enum Y { One }");
        assert_eq!(model.entities()[0].key(), ("A", "X"));
        assert_eq!(model.entities()[1].key(), ("B", "Y"));
    }

    #[test]
    fn test_attribute_initial_values() {
        let model = extract(
            r#"namespace N { class C {
                int a;
                int b = 0;
                List<int> c = new List<int> { 1, 2 } ;
                string D { get; set; } = "x";
            } }"#,
        );
        let class = model.classes().next().unwrap();
        let values: Vec<_> = class
            .attributes()
            .iter()
            .map(Attribute::initial_value)
            .collect();
        assert_eq!(
            values,
            [None, Some("0"), Some("new List<int> { 1, 2 }"), Some("\"x\"")]
        );
    }

    #[test]
    fn test_accessor_expression_is_not_an_initializer() {
        let model = extract("namespace N { class C { int Count { get => items.Length; } } }");
        let attr = &model.classes().next().unwrap().attributes()[0];
        assert_eq!(attr.name(), "Count");
        assert_eq!(attr.initial_value(), None);
    }

    #[test]
    fn test_expression_bodied_property_has_no_initial_value() {
        let model = extract(
            "namespace N { class C { public int Count => items.Count; private int total = 0; } }",
        );
        let attrs = model.classes().next().unwrap().attributes();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name(), "Count");
        assert_eq!(attrs[0].type_name(), "int");
        assert_eq!(attrs[0].visibility(), Visibility::Public);
        assert_eq!(attrs[0].initial_value(), None);
        assert_eq!(attrs[1].initial_value(), Some("0"));
    }

    #[test]
    fn test_method_parameters_in_order() {
        let model = extract(
            "namespace N { class C { public bool TryGet(string key, out int value, ref int hits = 3) { } } }",
        );
        let method = only_method(&model);
        assert_eq!(method.return_type(), Some("bool"));
        assert_eq!(method.visibility(), Visibility::Public);

        let params: Vec<_> = method
            .parameters()
            .iter()
            .map(|p| (p.name(), p.direction(), p.default()))
            .collect();
        assert_eq!(
            params,
            [
                ("key", ParameterDirection::In, None),
                ("value", ParameterDirection::Out, None),
                ("hits", ParameterDirection::InOut, Some("3")),
            ]
        );
    }

    #[test]
    fn test_constructor_and_expression_bodied_method() {
        let model = extract(
            "namespace N { class C { public C() { } public override string ToString() => \"C\"; } }",
        );
        let methods = model.classes().next().unwrap().methods();
        assert_eq!(methods[0].name(), "C");
        assert_eq!(methods[0].return_type(), None);
        assert_eq!(methods[1].name(), "ToString");
        assert_eq!(methods[1].return_type(), Some("string"));
    }

    #[test]
    fn test_enum_values_skip_explicit_numbers() {
        let model = extract("namespace N { enum Flags : byte { None = 0, Read = 1, Write = 2, } }");
        let enumeration = model.enums().next().unwrap();
        assert_eq!(enumeration.values(), ["None", "Read", "Write"]);
    }

    #[test]
    fn test_unsupported_default_policies() {
        let source = "namespace N { class C { void M(double ratio = 0.5) { } } }";

        let dropped = extract_with(source, DefaultValuePolicy::Drop).unwrap();
        assert_eq!(only_method(&dropped).parameters()[0].default(), None);

        let kept = extract_with(source, DefaultValuePolicy::Keep).unwrap();
        assert_eq!(only_method(&kept).parameters()[0].default(), Some("0.5"));

        let err = extract_with(source, DefaultValuePolicy::Reject).unwrap_err();
        assert!(matches!(
            &err,
            ExtractError::UnsupportedDefault(literal) if literal.text == "0.5"
        ));

        let diag = Diagnostic::from(err);
        assert_eq!(diag.code(), Some(ErrorCode::E301));
        let offset = source.find("0.5").unwrap();
        assert_eq!(diag.primary_span(), Some(Span::new(offset..offset + 3)));
    }

    #[test]
    fn test_exponent_default_follows_policy() {
        let source = "namespace N { class C { void M(double eps = 1e-5, int n = 2) { } } }";

        let dropped = extract_with(source, DefaultValuePolicy::Drop).unwrap();
        let params = only_method(&dropped).parameters();
        assert_eq!(params[0].default(), None);
        assert_eq!(params[1].default(), Some("2"));

        let kept = extract_with(source, DefaultValuePolicy::Keep).unwrap();
        assert_eq!(only_method(&kept).parameters()[0].default(), Some("1e-5"));
    }

    #[test]
    fn test_missing_required_node_is_reported() {
        // A class node without its name cannot come from the parser
        let class_keyword = Leaf::new(TokenKind::Class, "class", Span::new(14..19));
        let class = Node::new(Rule::ClassDecl, vec![Child::from(class_keyword)]);
        let namespace = Node::new(
            Rule::NamespaceDecl,
            vec![
                Leaf::new(TokenKind::Namespace, "namespace", Span::new(0..9)).into(),
                Leaf::new(TokenKind::Identifier, "App", Span::new(10..13)).into(),
                class.into(),
            ],
        );
        let unit = Node::new(Rule::CompilationUnit, vec![namespace.into()]);

        let options = ExtractOptions::default();
        let err = Extractor::new(&options).build(&unit).unwrap_err();
        assert_eq!(
            err,
            ExtractError::MissingRequiredNode {
                rule: Rule::ClassDecl,
                expected: "class name",
                span: Span::new(14..19),
            }
        );

        let diag = Diagnostic::from(err);
        assert_eq!(diag.code(), Some(ErrorCode::E300));
        assert!(diag.message().starts_with("internal error"));
        assert!(diag.help().is_some_and(|help| help.contains("bug")));
    }
}
