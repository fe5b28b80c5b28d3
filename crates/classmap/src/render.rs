//! Rendering of structural models.
//!
//! This module provides the [`Renderer`] trait, the last stage of the
//! classmap pipeline, and [`TextRenderer`], a plain text backend.
//!
//! # Pipeline Position
//!
//! ```text
//! Source Units
//!     ↓ parse + extract
//! Structural Model (per unit)
//!     ↓ merge
//! Structural Model
//!     ↓ render (this module)
//! Output Text
//! ```

use std::fmt::Write as _;

use classmap_core::model::{ClassEntity, Entity, EnumEntity, StructuralModel};

use crate::{config::RenderConfig, error::ClassmapError};

/// Abstraction for model rendering backends.
///
/// Implementors draw every entity of a [`StructuralModel`] in model order.
pub trait Renderer {
    /// Renders `model` to the backend's output format.
    ///
    /// # Errors
    ///
    /// Returns [`ClassmapError::Render`] if the model cannot be drawn.
    fn render(&self, model: &StructuralModel, config: &RenderConfig)
    -> Result<String, ClassmapError>;
}

/// Draws each entity as a UML class box in plain text.
///
/// ```text
/// +------------------+
/// |     App.Foo      |
/// +------------------+
/// | - x: int         |
/// +------------------+
/// | + Name(): string |
/// +------------------+
/// ```
///
/// Enumerations get an `<<enumeration>>` stereotype above the name and a
/// single compartment of values. Empty compartments are drawn as one blank
/// row. Boxes are separated by an empty line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl TextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for TextRenderer {
    fn render(
        &self,
        model: &StructuralModel,
        config: &RenderConfig,
    ) -> Result<String, ClassmapError> {
        let mut out = String::new();
        for (index, entity) in model.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            let entity_box = match entity {
                Entity::Class(class) => class_box(entity, class),
                Entity::Enum(enumeration) => enum_box(entity, enumeration),
            };
            entity_box
                .write_to(&mut out, config.padding())
                .map_err(|err| ClassmapError::Render(format!("cannot draw {entity}: {err}")))?;
        }
        Ok(out)
    }
}

/// Rows of one box before layout: centered header rows followed by
/// left-aligned compartments.
struct EntityBox {
    header: Vec<String>,
    compartments: Vec<Vec<String>>,
}

fn class_box(entity: &Entity, class: &ClassEntity) -> EntityBox {
    EntityBox {
        header: vec![entity.to_string()],
        compartments: vec![
            class.attributes().iter().map(ToString::to_string).collect(),
            class.methods().iter().map(ToString::to_string).collect(),
        ],
    }
}

fn enum_box(entity: &Entity, enumeration: &EnumEntity) -> EntityBox {
    EntityBox {
        header: vec!["<<enumeration>>".to_string(), entity.to_string()],
        compartments: vec![enumeration.values().to_vec()],
    }
}

impl EntityBox {
    fn content_width(&self) -> usize {
        self.header
            .iter()
            .chain(self.compartments.iter().flatten())
            .map(|row| row.chars().count())
            .max()
            .unwrap_or(0)
    }

    fn write_to(&self, out: &mut String, padding: usize) -> std::fmt::Result {
        let width = self.content_width();
        let border = format!("+{}+", "-".repeat(width + 2 * padding));
        let pad = " ".repeat(padding);

        writeln!(out, "{border}")?;
        for row in &self.header {
            let len = row.chars().count();
            let left = (width - len) / 2;
            let right = width - len - left;
            writeln!(
                out,
                "|{pad}{}{row}{}{pad}|",
                " ".repeat(left),
                " ".repeat(right)
            )?;
        }
        writeln!(out, "{border}")?;

        for compartment in &self.compartments {
            if compartment.is_empty() {
                writeln!(out, "|{pad}{}{pad}|", " ".repeat(width))?;
            }
            for row in compartment {
                let fill = width - row.chars().count();
                writeln!(out, "|{pad}{row}{}{pad}|", " ".repeat(fill))?;
            }
            writeln!(out, "{border}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use classmap_core::model::{Attribute, Method, Visibility};

    use super::*;

    fn render(model: &StructuralModel, padding: usize) -> String {
        TextRenderer::new()
            .render(model, &RenderConfig::new(padding))
            .expect("text rendering should not fail")
    }

    #[test]
    fn test_class_box() {
        let model = StructuralModel::new(vec![
            ClassEntity::new(
                "App",
                "Foo",
                vec![Attribute::new("x", "int", Visibility::Private, None)],
                vec![Method::new(
                    "Name",
                    Some("string".to_string()),
                    Visibility::Public,
                    vec![],
                )],
            )
            .into(),
        ]);

        let expected = "\
+------------------+
|     App.Foo      |
+------------------+
| - x: int         |
+------------------+
| + Name(): string |
+------------------+
";
        assert_eq!(render(&model, 1), expected);
    }

    #[test]
    fn test_enum_box() {
        let model = StructuralModel::new(vec![
            EnumEntity::new(
                "App",
                "Color",
                vec!["Red".into(), "Green".into(), "Blue".into()],
            )
            .into(),
        ]);

        let expected = "\
+-----------------+
| <<enumeration>> |
|    App.Color    |
+-----------------+
| Red             |
| Green           |
| Blue            |
+-----------------+
";
        assert_eq!(render(&model, 1), expected);
    }

    #[test]
    fn test_empty_compartments_and_padding() {
        let model = StructuralModel::new(vec![ClassEntity::new("N", "C", vec![], vec![]).into()]);

        let expected = "\
+-------+
|  N.C  |
+-------+
|       |
+-------+
|       |
+-------+
";
        assert_eq!(render(&model, 2), expected);
    }

    #[test]
    fn test_boxes_follow_model_order() {
        let model = StructuralModel::new(vec![
            ClassEntity::new("N", "B", vec![], vec![]).into(),
            EnumEntity::new("N", "A", vec!["X".into()]).into(),
        ]);

        let output = render(&model, 0);
        let b = output.find("N.B").unwrap();
        let a = output.find("N.A").unwrap();
        assert!(b < a);
        assert!(output.contains("+---+\n\n+"));
    }

    #[test]
    fn test_empty_model_renders_nothing() {
        assert_eq!(render(&StructuralModel::default(), 1), "");
    }
}
