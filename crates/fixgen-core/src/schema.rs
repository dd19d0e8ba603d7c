use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::field::FieldSpec;

/// Validated schema description: package metadata plus the classes that
/// survived per-class validation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SchemaConfig {
    pub package: String,
    #[serde(default)]
    pub imports: Vec<String>,
    pub author: Option<String>,
    pub version: Option<String>,
    pub classes: Vec<ClassSpec>,
}

/// One schema entity.
///
/// Field order is significant: the first field is the identifier and the
/// second is the unique/display field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClassSpec {
    pub name: String,
    pub caption: String,
    pub path: Option<String>,
    pub plural: Option<String>,
    #[serde(default)]
    pub cacheable: bool,
    pub fields: Vec<FieldSpec>,
}

impl ClassSpec {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        let name = name.into();
        Self {
            caption: name.clone(),
            name,
            path: None,
            plural: None,
            cacheable: false,
            fields,
        }
    }

    pub fn identifier(&self) -> Option<&FieldSpec> {
        self.fields.first()
    }

    pub fn display_field(&self) -> Option<&FieldSpec> {
        self.fields.get(1)
    }

    /// Field names in alphabetical order.
    pub fn sorted_field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.iter().map(|field| field.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Directory-friendly name (`OrderLine` -> `order_line`).
    pub fn snake_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len() + 4);
        for (index, ch) in self.name.chars().enumerate() {
            if ch.is_uppercase() {
                if index > 0 {
                    out.push('_');
                }
                out.extend(ch.to_lowercase());
            } else {
                out.push(ch);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_and_display_follow_declaration_order() {
        let class = ClassSpec::new(
            "OrderLine",
            vec![
                FieldSpec::new("id", "String"),
                FieldSpec::new("sku", "String"),
                FieldSpec::new("amount", "double"),
            ],
        );

        assert_eq!(class.identifier().map(|f| f.name.as_str()), Some("id"));
        assert_eq!(class.display_field().map(|f| f.name.as_str()), Some("sku"));
        assert_eq!(class.sorted_field_names(), vec!["amount", "id", "sku"]);
        assert_eq!(class.snake_name(), "order_line");
    }
}
