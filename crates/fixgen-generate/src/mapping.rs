use serde_json::{Map, Value, json};

use fixgen_core::{ClassRegistry, ClassSpec, FieldSpec, TypeClass};

use crate::errors::GenerationError;
use crate::generators::FieldRole;

/// Renders the nested search-index mapping of a class.
///
/// Referenced classes are inlined as `properties` blocks until either the
/// depth cap is reached or the class already appears on the current path;
/// past that point the reference collapses to `{"type": "<TypeName>"}`.
#[derive(Debug, Clone, Copy)]
pub struct MappingRenderer<'a> {
    registry: &'a ClassRegistry,
    max_levels: usize,
}

impl<'a> MappingRenderer<'a> {
    pub fn new(registry: &'a ClassRegistry, max_levels: usize) -> Self {
        Self {
            registry,
            max_levels,
        }
    }

    pub fn render(&self, class: &ClassSpec) -> Result<Value, GenerationError> {
        let mut path = Vec::new();
        self.render_at(class, 0, &mut path)
    }

    fn render_at(
        &self,
        class: &ClassSpec,
        depth: usize,
        path: &mut Vec<String>,
    ) -> Result<Value, GenerationError> {
        if depth > self.max_levels {
            return Err(GenerationError::Invariant(format!(
                "mapping for '{}' entered at depth {depth}, above the limit of {}",
                class.name, self.max_levels
            )));
        }

        path.push(class.name.clone());
        let mut properties = Map::new();
        for (position, field) in class.fields.iter().enumerate() {
            let entry = self.field_entry(field, FieldRole::for_position(position), depth, path)?;
            properties.insert(field.name.clone(), entry);
        }
        path.pop();

        Ok(json!({ "properties": properties }))
    }

    fn field_entry(
        &self,
        field: &FieldSpec,
        role: FieldRole,
        depth: usize,
        path: &mut Vec<String>,
    ) -> Result<Value, GenerationError> {
        if role.is_identifier() {
            return Ok(json!({ "type": "keyword" }));
        }

        let entry = match field.type_class() {
            TypeClass::Text => json!({
                "type": "text",
                "fields": { "keyword": { "type": "keyword" } }
            }),
            TypeClass::Date => json!({ "type": "date" }),
            TypeClass::Bool | TypeClass::Integer | TypeClass::Decimal => {
                json!({ "type": scalar_type(&field.type_name) })
            }
            TypeClass::Reference => match self.registry.resolve(field) {
                Some(target)
                    if depth < self.max_levels && !path.iter().any(|name| name == &target.name) =>
                {
                    self.render_at(target, depth + 1, path)?
                }
                _ => json!({ "type": field.type_name }),
            },
        };
        Ok(entry)
    }
}

/// Render a class mapping with the given nesting limit.
pub fn render_mapping(
    class: &ClassSpec,
    registry: &ClassRegistry,
    max_levels: usize,
) -> Result<Value, GenerationError> {
    MappingRenderer::new(registry, max_levels).render(class)
}

fn scalar_type(type_name: &str) -> &str {
    match type_name {
        "boolean" | "Boolean" => "boolean",
        "byte" | "Byte" => "byte",
        "short" | "Short" => "short",
        "int" | "Integer" => "integer",
        "long" | "Long" | "BigInteger" => "long",
        "float" | "Float" => "float",
        "double" | "Double" | "BigDecimal" => "double",
        other => other,
    }
}
