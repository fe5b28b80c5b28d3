//! Class member types.
//!
//! Attributes, methods and method parameters together with the enums that
//! qualify them. `Display` implementations produce UML class diagram notation:
//!
//! ```text
//! - count: int = 0
//! + Add(in item: T, out index: int): bool
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Flattened textual form of a type expression such as `List<Foo>`,
/// `int[]` or `Dictionary<string,int>`.
pub type TypeName = String;

/// Access level of a declaration.
///
/// A declaration without a visibility keyword is [`Visibility::Private`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
    Protected,
}

impl Visibility {
    /// UML symbol for this visibility level.
    pub fn symbol(&self) -> char {
        match self {
            Visibility::Public => '+',
            Visibility::Private => '-',
            Visibility::Protected => '#',
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Data flow direction of a method parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterDirection {
    /// Plain by-value parameter.
    #[default]
    In,
    /// `out` parameter.
    Out,
    /// `ref` parameter.
    InOut,
}

impl fmt::Display for ParameterDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterDirection::In => write!(f, "in"),
            ParameterDirection::Out => write!(f, "out"),
            ParameterDirection::InOut => write!(f, "inout"),
        }
    }
}

/// A field or property of a class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    name: String,
    type_name: TypeName,
    visibility: Visibility,
    initial_value: Option<String>,
}

impl Attribute {
    /// Creates a new attribute.
    ///
    /// # Arguments
    ///
    /// * `name` - Identifier of the attribute.
    /// * `type_name` - Flattened type text.
    /// * `visibility` - Access level.
    /// * `initial_value` - Raw initializer text, already stripped of its terminator.
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<TypeName>,
        visibility: Visibility,
        initial_value: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            visibility,
            initial_value,
        }
    }

    /// Returns the attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the attribute type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the access level.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Returns the raw initializer text, if the attribute has one.
    pub fn initial_value(&self) -> Option<&str> {
        self.initial_value.as_deref()
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.visibility, self.name, self.type_name)?;
        if let Some(value) = &self.initial_value {
            write!(f, " = {value}")?;
        }
        Ok(())
    }
}

/// A single method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    name: String,
    type_name: TypeName,
    direction: ParameterDirection,
    default: Option<String>,
}

impl Parameter {
    /// Creates a new parameter.
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<TypeName>,
        direction: ParameterDirection,
        default: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            direction,
            default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn direction(&self) -> ParameterDirection {
        self.direction
    }

    /// Returns the raw default literal (`-1`, `"text"`), if any.
    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.direction, self.name, self.type_name)?;
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

/// A method or constructor of a class.
///
/// `return_type` is `None` both for `void` methods and for constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Method {
    name: String,
    return_type: Option<TypeName>,
    visibility: Visibility,
    parameters: Vec<Parameter>,
}

impl Method {
    /// Creates a new method.
    ///
    /// # Arguments
    ///
    /// * `name` - Identifier of the method.
    /// * `return_type` - Return type, `None` for `void` and constructors.
    /// * `visibility` - Access level.
    /// * `parameters` - Parameters in declaration order.
    pub fn new(
        name: impl Into<String>,
        return_type: Option<TypeName>,
        visibility: Visibility,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self {
            name: name.into(),
            return_type,
            visibility,
            parameters,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> Option<&str> {
        self.return_type.as_deref()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Returns the overload signature of this method: its name and the
    /// ordered list of parameter types.
    ///
    /// Two methods with equal signatures are the same member; methods that
    /// differ only in parameter types are distinct overloads.
    pub fn signature(&self) -> (&str, Vec<&str>) {
        (
            &self.name,
            self.parameters.iter().map(Parameter::type_name).collect(),
        )
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.visibility, self.name)?;
        for (index, parameter) in self.parameters.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{parameter}")?;
        }
        write!(f, ")")?;
        if let Some(return_type) = &self.return_type {
            write!(f, ": {return_type}")?;
        }
        Ok(())
    }
}
