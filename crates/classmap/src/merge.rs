//! Diagram merger.
//!
//! Folds entities that describe the same logical declaration (same
//! namespace and name) into one, left to right. This consolidates partial
//! classes and the same type seen in several units.
//!
//! - The first occurrence of a key fixes the output position
//! - Class attributes are unioned by name and methods by overload signature
//! - Enum values are unioned by text
//!
//! In every union the first occurrence wins and keeps its position.

use indexmap::{IndexMap, IndexSet, map::Entry};
use log::{debug, warn};

use classmap_core::model::{
    Attribute, ClassEntity, EnumEntity, Entity, Method, StructuralModel,
};

type Key = (String, String);
type Signature = (String, Vec<String>);

/// An entity being folded, with its members indexed for union.
enum Pending {
    Class {
        attributes: IndexMap<String, Attribute>,
        methods: IndexMap<Signature, Method>,
    },
    Enum {
        values: IndexSet<String>,
    },
}

impl Pending {
    fn new(entity: Entity) -> Self {
        let mut pending = match &entity {
            Entity::Class(_) => Pending::Class {
                attributes: IndexMap::new(),
                methods: IndexMap::new(),
            },
            Entity::Enum(_) => Pending::Enum {
                values: IndexSet::new(),
            },
        };
        pending.absorb(entity);
        pending
    }

    /// Folds `entity` in. Returns `false` when the kinds do not match.
    fn absorb(&mut self, entity: Entity) -> bool {
        match (self, entity) {
            (Pending::Class { attributes, methods }, Entity::Class(class)) => {
                for attribute in class.attributes() {
                    attributes
                        .entry(attribute.name().to_string())
                        .or_insert_with(|| attribute.clone());
                }
                for method in class.methods() {
                    let (name, types) = method.signature();
                    let signature = (
                        name.to_string(),
                        types.into_iter().map(str::to_string).collect(),
                    );
                    methods.entry(signature).or_insert_with(|| method.clone());
                }
                true
            }
            (Pending::Enum { values }, Entity::Enum(enumeration)) => {
                values.extend(enumeration.values().iter().cloned());
                true
            }
            _ => false,
        }
    }

    fn finish(self, (namespace, name): Key) -> Entity {
        match self {
            Pending::Class {
                attributes,
                methods,
            } => ClassEntity::new(
                namespace,
                name,
                attributes.into_values().collect(),
                methods.into_values().collect(),
            )
            .into(),
            Pending::Enum { values } => {
                EnumEntity::new(namespace, name, values.into_iter().collect()).into()
            }
        }
    }
}

/// Merge entities sharing a `(namespace, name)` key.
///
/// The fold is deterministic and cannot fail. A class and an enum with the
/// same key cannot be combined: the first one is kept and the later one is
/// dropped with a warning.
///
/// # Example
///
/// ```
/// # use classmap::merge::merge;
/// # use classmap::model::{Attribute, ClassEntity, StructuralModel, Visibility};
/// let x = Attribute::new("x", "int", Visibility::Private, None);
/// let y = Attribute::new("y", "int", Visibility::Private, None);
/// let model = StructuralModel::new(vec![
///     ClassEntity::new("App", "Foo", vec![x], Vec::new()).into(),
///     ClassEntity::new("App", "Foo", vec![y], Vec::new()).into(),
/// ]);
///
/// let merged = merge(model);
/// assert_eq!(merged.len(), 1);
/// assert_eq!(merged.classes().next().unwrap().attributes().len(), 2);
/// ```
pub fn merge(model: StructuralModel) -> StructuralModel {
    let before = model.len();
    let mut pending: IndexMap<Key, Pending> = IndexMap::with_capacity(before);

    for entity in model {
        let key = (entity.namespace().to_string(), entity.name().to_string());
        match pending.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(Pending::new(entity));
            }
            Entry::Occupied(mut slot) => {
                let description = entity.to_string();
                if !slot.get_mut().absorb(entity) {
                    warn!(
                        entity = description.as_str();
                        "Dropping declaration whose kind conflicts with an earlier one"
                    );
                }
            }
        }
    }

    let merged: StructuralModel = pending
        .into_iter()
        .map(|(key, entity)| entity.finish(key))
        .collect();

    debug!(before = before, after = merged.len(); "Merged structural model");
    merged
}

#[cfg(test)]
mod tests {
    use classmap_core::model::{Parameter, ParameterDirection, Visibility};

    use super::*;

    fn attr(name: &str, type_name: &str) -> Attribute {
        Attribute::new(name, type_name, Visibility::Private, None)
    }

    fn method(name: &str, params: &[&str]) -> Method {
        let parameters = params
            .iter()
            .enumerate()
            .map(|(i, type_name)| {
                Parameter::new(format!("p{i}"), *type_name, ParameterDirection::In, None)
            })
            .collect();
        Method::new(name, None, Visibility::Public, parameters)
    }

    fn class(name: &str, attributes: Vec<Attribute>, methods: Vec<Method>) -> Entity {
        ClassEntity::new("App", name, attributes, methods).into()
    }

    fn enumeration(name: &str, values: &[&str]) -> Entity {
        EnumEntity::new("App", name, values.iter().map(|v| v.to_string()).collect()).into()
    }

    fn attr_names(entity: &Entity) -> Vec<&str> {
        entity
            .as_class()
            .unwrap()
            .attributes()
            .iter()
            .map(Attribute::name)
            .collect()
    }

    #[test]
    fn test_two_units_with_same_class() {
        let model = StructuralModel::new(vec![
            class("Foo", vec![attr("x", "int")], Vec::new()),
            class("Foo", vec![attr("y", "int")], Vec::new()),
        ]);

        let merged = merge(model);
        assert_eq!(merged.len(), 1);
        assert_eq!(attr_names(&merged.entities()[0]), ["x", "y"]);
    }

    #[test]
    fn test_first_attribute_wins() {
        let model = StructuralModel::new(vec![
            class("Foo", vec![attr("x", "int")], Vec::new()),
            class("Foo", vec![attr("x", "long"), attr("z", "int")], Vec::new()),
        ]);

        let merged = merge(model);
        let foo = merged.entities()[0].as_class().unwrap();
        assert_eq!(foo.attributes()[0].type_name(), "int");
        assert_eq!(foo.attributes().len(), 2);
    }

    #[test]
    fn test_overloads_are_kept_duplicates_are_not() {
        let model = StructuralModel::new(vec![
            class("Foo", Vec::new(), vec![method("Add", &["int"])]),
            class(
                "Foo",
                Vec::new(),
                vec![method("Add", &["int"]), method("Add", &["string"])],
            ),
        ]);

        let merged = merge(model);
        let foo = merged.entities()[0].as_class().unwrap();
        let signatures: Vec<_> = foo.methods().iter().map(Method::signature).collect();
        assert_eq!(
            signatures,
            [("Add", vec!["int"]), ("Add", vec!["string"])]
        );
    }

    #[test]
    fn test_first_occurrence_anchors_position() {
        let model = StructuralModel::new(vec![
            class("A", Vec::new(), Vec::new()),
            enumeration("B", &["One"]),
            class("C", Vec::new(), Vec::new()),
            class("A", vec![attr("late", "int")], Vec::new()),
            enumeration("B", &["Two", "One"]),
        ]);

        let merged = merge(model);
        let names: Vec<_> = merged.iter().map(Entity::name).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(attr_names(&merged.entities()[0]), ["late"]);
        assert_eq!(merged.entities()[1].as_enum().unwrap().values(), ["One", "Two"]);
    }

    #[test]
    fn test_namespace_is_part_of_the_key() {
        let model = StructuralModel::new(vec![
            ClassEntity::new("A", "Foo", Vec::new(), Vec::new()).into(),
            ClassEntity::new("B", "Foo", Vec::new(), Vec::new()).into(),
        ]);
        assert_eq!(merge(model).len(), 2);
    }

    #[test]
    fn test_kind_conflict_keeps_first() {
        let model = StructuralModel::new(vec![
            enumeration("Foo", &["X"]),
            class("Foo", vec![attr("x", "int")], Vec::new()),
        ]);

        let merged = merge(model);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.entities()[0].as_enum().unwrap().values(), ["X"]);
    }

    #[test]
    fn test_empty_model() {
        assert!(merge(StructuralModel::default()).is_empty());
    }
}
