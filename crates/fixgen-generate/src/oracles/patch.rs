use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use fixgen_core::ClassSpec;

use crate::errors::GenerationError;
use crate::generators::SampleRow;

const NULL_BODY: &str = "The request body may not be null";
const EMPTY_BODY: &str = "The request body may not be empty";

/// A PATCH request body the service must reject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchCase {
    /// `None` stands for an absent request body.
    pub payload: Option<String>,
    pub target_id: String,
    pub message: String,
}

/// Absent and empty bodies first, then one unknown property per field.
pub fn enumerate_patch_invalid(
    class: &ClassSpec,
    row: &SampleRow,
) -> Result<Vec<PatchCase>, GenerationError> {
    let target_id = row.id_string();
    let mut cases = vec![
        PatchCase {
            payload: None,
            target_id: target_id.clone(),
            message: NULL_BODY.to_string(),
        },
        PatchCase {
            payload: Some("{}".to_string()),
            target_id: target_id.clone(),
            message: EMPTY_BODY.to_string(),
        },
    ];

    let known = class.sorted_field_names().join(", ");
    for (position, field) in class.fields.iter().enumerate() {
        let unknown = format!("{}_", field.name);
        let value = row
            .values
            .get(position)
            .map(|value| value.to_json())
            .unwrap_or(Value::Null);
        let mut body = Map::new();
        body.insert(unknown.clone(), value);
        cases.push(PatchCase {
            payload: Some(serde_json::to_string(&Value::Object(body))?),
            target_id: target_id.clone(),
            message: format!(
                "The request body field, {unknown}, is not a valid property - [{known}]."
            ),
        });
    }

    Ok(cases)
}

#[cfg(test)]
mod tests {
    use fixgen_core::FieldSpec;

    use super::*;
    use crate::generators::SampleValue;

    #[test]
    fn generic_cases_come_first_then_one_per_field() {
        let class = ClassSpec::new(
            "Widget",
            vec![
                FieldSpec::new("id", "String"),
                FieldSpec::new("name", "String"),
                FieldSpec::new("active", "boolean"),
            ],
        );
        let row = SampleRow {
            index: 0,
            values: vec![
                SampleValue::Text("id_1".to_string()),
                SampleValue::Text("name_2".to_string()),
                SampleValue::Bool(true),
            ],
            payload: String::new(),
        };

        let cases = enumerate_patch_invalid(&class, &row).unwrap();
        assert_eq!(cases.len(), 5);
        assert!(cases.iter().all(|case| case.target_id == "id_1"));
        assert_eq!(cases[0].payload, None);
        assert_eq!(cases[0].message, "The request body may not be null");
        assert_eq!(cases[1].payload.as_deref(), Some("{}"));
        assert_eq!(cases[1].message, "The request body may not be empty");
        assert_eq!(cases[3].payload.as_deref(), Some(r#"{"name_":"name_2"}"#));
        assert_eq!(
            cases[4].message,
            "The request body field, active_, is not a valid property - [active, id, name]."
        );
    }
}
