use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use fixgen_core::ClassSpec;

use crate::generators::SampleSet;
use crate::oracles::{InvalidCase, PatchCase, SearchCase};

/// The fixture families written for every class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureKind {
    Index,
    Update,
    SearchData,
    Search,
    Invalid,
    InvalidPatch,
}

impl FixtureKind {
    pub fn file_stem(self) -> &'static str {
        match self {
            FixtureKind::Index => "index",
            FixtureKind::Update => "update",
            FixtureKind::SearchData => "search-data",
            FixtureKind::Search => "search",
            FixtureKind::Invalid => "invalid",
            FixtureKind::InvalidPatch => "invalid-patch",
        }
    }

    /// Kinds that get a JSON twin next to the CSV file.
    pub fn writes_json(self) -> bool {
        matches!(self, FixtureKind::Invalid | FixtureKind::InvalidPatch)
    }
}

/// Ordered records destined for one fixture file.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub kind: FixtureKind,
    pub class_name: String,
    pub header: Vec<String>,
    pub records: Vec<Vec<Value>>,
}

impl Fixture {
    /// `payload` followed by one column per field.
    pub fn from_rows(kind: FixtureKind, class: &ClassSpec, set: &SampleSet) -> Self {
        let header = std::iter::once("payload".to_string())
            .chain(class.fields.iter().map(|field| field.name.clone()))
            .collect();
        let records = set
            .rows
            .iter()
            .map(|row| {
                std::iter::once(Value::String(row.payload.clone()))
                    .chain(row.values.iter().map(|value| value.to_json()))
                    .collect()
            })
            .collect();
        Self {
            kind,
            class_name: class.name.clone(),
            header,
            records,
        }
    }

    pub fn from_search(class: &ClassSpec, cases: &[SearchCase]) -> Self {
        let records = cases
            .iter()
            .map(|case| {
                vec![
                    Value::String(case.filter.to_string()),
                    Value::from(case.count),
                    Value::from(case.ids.clone()),
                ]
            })
            .collect();
        Self::with_header(FixtureKind::Search, class, ["filter", "count", "ids"], records)
    }

    pub fn from_invalid(class: &ClassSpec, cases: &[InvalidCase]) -> Self {
        let records = cases
            .iter()
            .map(|case| {
                vec![
                    Value::String(case.payload.clone()),
                    Value::String(case.field.clone()),
                    Value::String(case.message.clone()),
                ]
            })
            .collect();
        Self::with_header(
            FixtureKind::Invalid,
            class,
            ["payload", "field", "message"],
            records,
        )
    }

    pub fn from_patch(class: &ClassSpec, cases: &[PatchCase]) -> Self {
        let records = cases
            .iter()
            .map(|case| {
                vec![
                    case.payload.clone().map(Value::String).unwrap_or(Value::Null),
                    Value::String(case.target_id.clone()),
                    Value::String(case.message.clone()),
                ]
            })
            .collect();
        Self::with_header(
            FixtureKind::InvalidPatch,
            class,
            ["payload", "id", "message"],
            records,
        )
    }

    fn with_header<const N: usize>(
        kind: FixtureKind,
        class: &ClassSpec,
        header: [&str; N],
        records: Vec<Vec<Value>>,
    ) -> Self {
        Self {
            kind,
            class_name: class.name.clone(),
            header: header.iter().map(|name| name.to_string()).collect(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records as an array of objects keyed by header.
    pub fn to_json(&self) -> Value {
        let records = self
            .records
            .iter()
            .map(|record| {
                let object: Map<String, Value> = self
                    .header
                    .iter()
                    .cloned()
                    .zip(record.iter().cloned())
                    .collect();
                Value::Object(object)
            })
            .collect();
        Value::Array(records)
    }

    /// Records rendered as CSV cells.
    pub fn cells(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.records
            .iter()
            .map(|record| record.iter().map(cell).collect())
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::oracles::SearchKind;

    #[test]
    fn patch_fixture_keeps_absent_body_as_null() {
        let class = ClassSpec::new("Widget", Vec::new());
        let fixture = Fixture::from_patch(
            &class,
            &[PatchCase {
                payload: None,
                target_id: "id_1".to_string(),
                message: "The request body may not be null".to_string(),
            }],
        );

        assert_eq!(
            fixture.to_json(),
            json!([{ "payload": null, "id": "id_1", "message": "The request body may not be null" }])
        );
        let cells: Vec<Vec<String>> = fixture.cells().collect();
        assert_eq!(cells, vec![vec!["", "id_1", "The request body may not be null"]]);
    }

    #[test]
    fn search_cells_render_json_text() {
        let class = ClassSpec::new("Widget", Vec::new());
        let fixture = Fixture::from_search(
            &class,
            &[SearchCase {
                kind: SearchKind::Exact,
                field: "name".to_string(),
                filter: json!({ "name": "name_3" }),
                count: 1,
                ids: vec!["id_1".to_string()],
            }],
        );

        assert_eq!(fixture.header, vec!["filter", "count", "ids"]);
        let cells: Vec<Vec<String>> = fixture.cells().collect();
        assert_eq!(cells, vec![vec![r#"{"name":"name_3"}"#, "1", r#"["id_1"]"#]]);
    }

    #[test]
    fn file_stems_are_distinct() {
        let kinds = [
            FixtureKind::Index,
            FixtureKind::Update,
            FixtureKind::SearchData,
            FixtureKind::Search,
            FixtureKind::Invalid,
            FixtureKind::InvalidPatch,
        ];
        let mut stems: Vec<&str> = kinds.iter().map(|kind| kind.file_stem()).collect();
        stems.sort_unstable();
        stems.dedup();
        assert_eq!(stems.len(), kinds.len());
        assert!(FixtureKind::Invalid.writes_json());
        assert!(!FixtureKind::Search.writes_json());
    }
}
