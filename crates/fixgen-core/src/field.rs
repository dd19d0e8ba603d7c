use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Collection wrapper around a field's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ContainerKind {
    #[serde(alias = "list")]
    List,
    #[serde(alias = "set")]
    Set,
}

/// Declarative validation constraints attached to a field.
///
/// Keys follow the bean-validation annotation names used by the generated
/// code (`notNull`, `decimalMin`, `sizeMax`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "is_false")]
    pub not_null: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub not_empty: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub not_blank: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub email: bool,
    /// Marks the identifier field. Only valid on the first field of a class.
    #[serde(default, skip_serializing_if = "is_false")]
    pub identifier: bool,
    /// Field supports `_from`/`_to` range filters.
    #[serde(default, skip_serializing_if = "is_false")]
    pub range: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_min: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_max: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Broad classification of a declared type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Bool,
    Date,
    Integer,
    Decimal,
    Text,
    /// Anything else: a class name to resolve through the registry.
    Reference,
}

impl TypeClass {
    pub fn of(type_name: &str) -> Self {
        match type_name {
            "boolean" | "Boolean" => TypeClass::Bool,
            "Date" | "ZonedDateTime" => TypeClass::Date,
            "byte" | "Byte" | "short" | "Short" | "int" | "Integer" | "long" | "Long"
            | "BigInteger" => TypeClass::Integer,
            "float" | "Float" | "double" | "Double" | "BigDecimal" => TypeClass::Decimal,
            "String" | "char" | "Character" => TypeClass::Text,
            _ => TypeClass::Reference,
        }
    }
}

const PRIMITIVE_KEYWORDS: &[&str] = &[
    "boolean", "byte", "short", "int", "long", "float", "double", "char",
];

/// One field of a schema class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerKind>,
    #[serde(flatten)]
    pub constraints: Constraints,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            container: None,
            constraints: Constraints::default(),
        }
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_container(mut self, container: ContainerKind) -> Self {
        self.container = Some(container);
        self
    }

    pub fn type_class(&self) -> TypeClass {
        TypeClass::of(&self.type_name)
    }

    pub fn is_bool(&self) -> bool {
        self.type_class() == TypeClass::Bool
    }

    pub fn is_date(&self) -> bool {
        self.type_class() == TypeClass::Date
    }

    pub fn is_integer(&self) -> bool {
        self.type_class() == TypeClass::Integer
    }

    /// Integer or decimal.
    pub fn is_number(&self) -> bool {
        matches!(self.type_class(), TypeClass::Integer | TypeClass::Decimal)
    }

    pub fn is_string(&self) -> bool {
        self.type_class() == TypeClass::Text
    }

    pub fn is_reference(&self) -> bool {
        self.type_class() == TypeClass::Reference
    }

    /// True for Java primitive keywords, which can never hold null.
    pub fn is_primitive(&self) -> bool {
        PRIMITIVE_KEYWORDS.contains(&self.type_name.as_str())
    }

    pub fn is_nullable(&self) -> bool {
        let c = &self.constraints;
        !self.is_primitive() && !c.not_null && !c.not_empty && !c.not_blank
    }

    pub fn is_container(&self) -> bool {
        self.container.is_some()
    }

    pub fn is_range(&self) -> bool {
        self.constraints.range
    }

    /// Values of this field can be compared with `<`/`>`.
    pub fn is_orderable(&self) -> bool {
        self.is_date() || self.is_number()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_java_type_names() {
        assert_eq!(TypeClass::of("boolean"), TypeClass::Bool);
        assert_eq!(TypeClass::of("ZonedDateTime"), TypeClass::Date);
        assert_eq!(TypeClass::of("Long"), TypeClass::Integer);
        assert_eq!(TypeClass::of("BigDecimal"), TypeClass::Decimal);
        assert_eq!(TypeClass::of("String"), TypeClass::Text);
        assert_eq!(TypeClass::of("Address"), TypeClass::Reference);
    }

    #[test]
    fn nullable_requires_boxed_type_without_presence_constraints() {
        assert!(FieldSpec::new("name", "String").is_nullable());
        assert!(!FieldSpec::new("count", "int").is_nullable());
        assert!(FieldSpec::new("count", "Integer").is_nullable());

        let not_blank = FieldSpec::new("name", "String").with_constraints(Constraints {
            not_blank: true,
            ..Constraints::default()
        });
        assert!(!not_blank.is_nullable());
    }

    #[test]
    fn deserializes_flattened_constraints() {
        let field: FieldSpec = serde_json::from_value(serde_json::json!({
            "name": "price",
            "type": "double",
            "min": 0,
            "max": 1000,
            "range": true
        }))
        .expect("parse field");

        assert_eq!(field.constraints.min, Some(0));
        assert_eq!(field.constraints.max, Some(1000));
        assert!(field.is_range());
        assert!(field.is_orderable());
        assert!(field.is_primitive());
    }
}
