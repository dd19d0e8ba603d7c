use std::collections::BTreeMap;

use crate::field::FieldSpec;
use crate::schema::{ClassSpec, SchemaConfig};

/// Class lookup by name, used to resolve object-reference field types.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: BTreeMap<String, ClassSpec>,
}

impl ClassRegistry {
    pub fn new(classes: &[ClassSpec]) -> Self {
        let classes = classes
            .iter()
            .map(|class| (class.name.clone(), class.clone()))
            .collect();
        Self { classes }
    }

    pub fn from_config(config: &SchemaConfig) -> Self {
        Self::new(&config.classes)
    }

    /// Resolve a reference field to its class. Scalar fields never resolve.
    pub fn resolve(&self, field: &FieldSpec) -> Option<&ClassSpec> {
        if !field.is_reference() {
            return None;
        }
        self.classes.get(&field.type_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassSpec> {
        self.classes.values()
    }
}
