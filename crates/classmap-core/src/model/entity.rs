//! Namespace-scoped entities and the structural model.
//!
//! An [`Entity`] is either a class or an enumeration. The two kinds share
//! only their identity (namespace and name), so they are modelled as a sum
//! type instead of a common trait.

use std::{fmt, slice, vec};

use serde::{Deserialize, Serialize};

use crate::model::member::{Attribute, Method};

/// A class declaration with its attributes and methods in source order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassEntity {
    namespace: String,
    name: String,
    attributes: Vec<Attribute>,
    methods: Vec<Method>,
}

impl ClassEntity {
    /// Creates a new class entity.
    ///
    /// `namespace` and `name` must not be empty.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        attributes: Vec<Attribute>,
        methods: Vec<Method>,
    ) -> Self {
        let namespace = namespace.into();
        let name = name.into();
        debug_assert!(!namespace.is_empty(), "class namespace must not be empty");
        debug_assert!(!name.is_empty(), "class name must not be empty");

        Self {
            namespace,
            name,
            attributes,
            methods,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }
}

/// An enumeration declaration with its member names in source order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumEntity {
    namespace: String,
    name: String,
    values: Vec<String>,
}

impl EnumEntity {
    /// Creates a new enum entity.
    ///
    /// `namespace` and `name` must not be empty.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, values: Vec<String>) -> Self {
        let namespace = namespace.into();
        let name = name.into();
        debug_assert!(!namespace.is_empty(), "enum namespace must not be empty");
        debug_assert!(!name.is_empty(), "enum name must not be empty");

        Self {
            namespace,
            name,
            values,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// A top-level declaration extracted from a source unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    Class(ClassEntity),
    Enum(EnumEntity),
}

impl Entity {
    /// Returns the namespace the entity is declared in.
    pub fn namespace(&self) -> &str {
        match self {
            Entity::Class(class) => class.namespace(),
            Entity::Enum(enumeration) => enumeration.namespace(),
        }
    }

    /// Returns the declared name of the entity.
    pub fn name(&self) -> &str {
        match self {
            Entity::Class(class) => class.name(),
            Entity::Enum(enumeration) => enumeration.name(),
        }
    }

    /// Returns the merge key: two entities with equal keys describe the same
    /// logical declaration.
    pub fn key(&self) -> (&str, &str) {
        (self.namespace(), self.name())
    }

    /// Returns the class, if this entity is one.
    pub fn as_class(&self) -> Option<&ClassEntity> {
        match self {
            Entity::Class(class) => Some(class),
            Entity::Enum(_) => None,
        }
    }

    /// Returns the enumeration, if this entity is one.
    pub fn as_enum(&self) -> Option<&EnumEntity> {
        match self {
            Entity::Enum(enumeration) => Some(enumeration),
            Entity::Class(_) => None,
        }
    }
}

impl From<ClassEntity> for Entity {
    fn from(class: ClassEntity) -> Self {
        Entity::Class(class)
    }
}

impl From<EnumEntity> for Entity {
    fn from(enumeration: EnumEntity) -> Self {
        Entity::Enum(enumeration)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace(), self.name())
    }
}

/// The ordered output of an extraction run.
///
/// Entity order follows source order and drives rendering order
/// downstream, so it is never sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuralModel {
    entities: Vec<Entity>,
}

impl StructuralModel {
    /// Creates a model from entities in their final order.
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    /// Iterates over the classes of the model, skipping enumerations.
    pub fn classes(&self) -> impl Iterator<Item = &ClassEntity> {
        self.entities.iter().filter_map(Entity::as_class)
    }

    /// Iterates over the enumerations of the model, skipping classes.
    pub fn enums(&self) -> impl Iterator<Item = &EnumEntity> {
        self.entities.iter().filter_map(Entity::as_enum)
    }

    /// Finds the first entity with the given merge key.
    pub fn find(&self, namespace: &str, name: &str) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|entity| entity.key() == (namespace, name))
    }
}

impl FromIterator<Entity> for StructuralModel {
    fn from_iter<T: IntoIterator<Item = Entity>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for StructuralModel {
    type Item = Entity;
    type IntoIter = vec::IntoIter<Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

impl<'a> IntoIterator for &'a StructuralModel {
    type Item = &'a Entity;
    type IntoIter = slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
