use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use fixgen_core::{ClassSpec, FieldSpec};

use crate::errors::GenerationError;
use crate::generators::{SampleRow, SampleSet, SampleValue};

const NUMERIC_SHIFT: i64 = 1000;
const TEXT_SENTINEL: &str = "invalid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    Exact,
    Negative,
    Exists,
    Missing,
    Range,
    InvertedRange,
    Term,
}

/// A search filter with the result expected from the sample rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCase {
    pub kind: SearchKind,
    pub field: String,
    pub filter: Value,
    pub count: usize,
    /// Identifiers of matching rows, in generation order.
    pub ids: Vec<String>,
}

/// Build the search cases for a class by replaying each filter over every row.
pub fn build_search_cases(
    class: &ClassSpec,
    set: &SampleSet,
) -> Result<Vec<SearchCase>, GenerationError> {
    let reference = set.row0()?;
    let mut cases = Vec::new();

    let display = class.display_field().map(|field| field.name.as_str());

    for (position, field) in class.fields.iter().enumerate() {
        if field.is_range() && !field.is_orderable() {
            return Err(GenerationError::Invariant(format!(
                "range search on '{}.{}' needs a numeric or date type, found '{}'",
                class.name, field.name, field.type_name
            )));
        }
        let probe = reference
            .values
            .get(position)
            .map(SampleValue::first_element)
            .cloned()
            .unwrap_or(SampleValue::Null);
        // Nested objects and absent values only get existence cases.
        let comparable = !matches!(probe, SampleValue::Null | SampleValue::Object(_));

        if comparable {
            let exact = scan(set, position, |value| value.matches(&probe));
            if field.is_string() && exact.len() != 1 {
                return Err(GenerationError::Invariant(format!(
                    "exact search on '{}.{}' matched {} rows, expected only the first",
                    class.name,
                    field.name,
                    exact.len()
                )));
            }
            cases.push(case(SearchKind::Exact, field, [(field.name.clone(), &probe)], exact));

            let negative = shift_down(&probe);
            let ids = scan(set, position, |value| value.matches(&negative));
            cases.push(case(
                SearchKind::Negative,
                field,
                [(field.name.clone(), &negative)],
                ids,
            ));
        }

        if field.is_nullable() {
            let key = format!("has_{}", field.name);
            let present = scan(set, position, |value| !value.is_null());
            let absent = scan(set, position, SampleValue::is_null);
            cases.push(case(
                SearchKind::Exists,
                field,
                [(key.clone(), &SampleValue::Bool(true))],
                present,
            ));
            cases.push(case(
                SearchKind::Missing,
                field,
                [(key, &SampleValue::Bool(false))],
                absent,
            ));
        }

        if !comparable {
            continue;
        }

        if field.is_range() {
            range_cases(field, position, &probe, set, &mut cases);
        }

        if display == Some(field.name.as_str()) && field.is_string() {
            let ids = scan(set, position, |value| value.matches(&probe));
            cases.push(case(
                SearchKind::Term,
                field,
                [("term".to_string(), &probe)],
                ids,
            ));
        }
    }

    Ok(cases)
}

fn range_cases(
    field: &FieldSpec,
    position: usize,
    probe: &SampleValue,
    set: &SampleSet,
    cases: &mut Vec<SearchCase>,
) {
    let from_key = format!("{}_from", field.name);
    let to_key = format!("{}_to", field.name);

    let ids = scan(set, position, |value| value.within(probe, probe));
    cases.push(case(
        SearchKind::Range,
        field,
        [(from_key.clone(), probe), (to_key.clone(), probe)],
        ids,
    ));

    let high = shift_up(probe);
    let low = shift_down(probe);
    let ids = scan(set, position, |value| value.within(&high, &low));
    cases.push(case(
        SearchKind::InvertedRange,
        field,
        [(from_key, &high), (to_key, &low)],
        ids,
    ));
}

fn scan(set: &SampleSet, position: usize, pred: impl Fn(&SampleValue) -> bool) -> Vec<String> {
    set.rows
        .iter()
        .filter(|row| row.values.get(position).is_some_and(&pred))
        .map(SampleRow::id_string)
        .collect()
}

fn case<const N: usize>(
    kind: SearchKind,
    field: &FieldSpec,
    filter: [(String, &SampleValue); N],
    ids: Vec<String>,
) -> SearchCase {
    let filter: Map<String, Value> = filter
        .into_iter()
        .map(|(key, value)| (key, value.to_json()))
        .collect();
    SearchCase {
        kind,
        field: field.name.clone(),
        filter: Value::Object(filter),
        count: ids.len(),
        ids,
    }
}

/// A value of the same type that no sample row holds.
pub fn shift_down(value: &SampleValue) -> SampleValue {
    match value {
        SampleValue::Bool(flag) => SampleValue::Bool(!flag),
        SampleValue::Int(number) => SampleValue::Int(number.saturating_sub(NUMERIC_SHIFT)),
        SampleValue::Float(number) => SampleValue::Float(number - NUMERIC_SHIFT as f64),
        SampleValue::Instant(instant) => SampleValue::Instant(*instant - Duration::days(1)),
        _ => SampleValue::Text(TEXT_SENTINEL.to_string()),
    }
}

/// Upper end of an inverted range.
pub fn shift_up(value: &SampleValue) -> SampleValue {
    match value {
        SampleValue::Int(number) => SampleValue::Int(number.saturating_add(NUMERIC_SHIFT)),
        SampleValue::Float(number) => SampleValue::Float(number + NUMERIC_SHIFT as f64),
        SampleValue::Instant(instant) => SampleValue::Instant(*instant + Duration::days(1)),
        other => shift_down(other),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use fixgen_core::Constraints;
    use serde_json::json;

    use super::*;
    use crate::generators::FixtureVariant;

    fn row(index: usize, values: Vec<SampleValue>) -> SampleRow {
        SampleRow {
            index,
            values,
            payload: String::new(),
        }
    }

    fn text(value: &str) -> SampleValue {
        SampleValue::Text(value.to_string())
    }

    fn set(rows: Vec<SampleRow>) -> SampleSet {
        SampleSet {
            class_name: "Widget".to_string(),
            variant: FixtureVariant::Search,
            rows,
        }
    }

    fn widget() -> ClassSpec {
        ClassSpec::new(
            "Widget",
            vec![
                FieldSpec::new("id", "String").with_constraints(Constraints {
                    not_null: true,
                    ..Constraints::default()
                }),
                FieldSpec::new("name", "String").with_constraints(Constraints {
                    not_blank: true,
                    ..Constraints::default()
                }),
                FieldSpec::new("price", "double").with_constraints(Constraints {
                    min: Some(0),
                    max: Some(1000),
                    range: true,
                    ..Constraints::default()
                }),
            ],
        )
    }

    fn widget_rows() -> SampleSet {
        set(vec![
            row(0, vec![text("id_1"), text("name_3"), SampleValue::Int(500)]),
            row(1, vec![text("id_2"), text("name_6"), SampleValue::Int(500)]),
            row(2, vec![text("id_3"), text("name_9"), SampleValue::Int(20)]),
        ])
    }

    fn find<'a>(cases: &'a [SearchCase], kind: SearchKind, field: &str) -> &'a SearchCase {
        cases
            .iter()
            .find(|case| case.kind == kind && case.field == field)
            .unwrap()
    }

    #[test]
    fn exact_search_on_string_matches_first_row_only() {
        let cases = build_search_cases(&widget(), &widget_rows()).unwrap();
        let exact = find(&cases, SearchKind::Exact, "name");
        assert_eq!(exact.filter, json!({"name": "name_3"}));
        assert_eq!(exact.count, 1);
        assert_eq!(exact.ids, vec!["id_1"]);

        let term = find(&cases, SearchKind::Term, "name");
        assert_eq!(term.filter, json!({"term": "name_3"}));
        assert_eq!(term.ids, vec!["id_1"]);
    }

    #[test]
    fn numeric_exact_search_counts_every_equal_row() {
        let cases = build_search_cases(&widget(), &widget_rows()).unwrap();
        let exact = find(&cases, SearchKind::Exact, "price");
        assert_eq!(exact.ids, vec!["id_1", "id_2"]);

        let negative = find(&cases, SearchKind::Negative, "price");
        assert_eq!(negative.filter, json!({"price": -500}));
        assert_eq!(negative.count, 0);
    }

    #[test]
    fn inverted_range_shifts_bounds_and_matches_nothing() {
        let cases = build_search_cases(&widget(), &widget_rows()).unwrap();
        let range = find(&cases, SearchKind::Range, "price");
        assert_eq!(range.filter, json!({"price_from": 500, "price_to": 500}));
        assert_eq!(range.count, 2);

        let inverted = find(&cases, SearchKind::InvertedRange, "price");
        assert_eq!(inverted.filter, json!({"price_from": 1500, "price_to": -500}));
        assert_eq!(inverted.count, 0);
        assert!(inverted.ids.is_empty());
    }

    #[test]
    fn existence_covers_all_rows_for_nullable_fields() {
        let class = ClassSpec::new(
            "Tag",
            vec![FieldSpec::new("id", "String"), FieldSpec::new("label", "String")],
        );
        let rows = set(vec![
            row(0, vec![text("id_1"), text("label_3")]),
            row(1, vec![text("id_2"), text("label_6")]),
        ]);
        let cases = build_search_cases(&class, &rows).unwrap();

        let exists = find(&cases, SearchKind::Exists, "label");
        assert_eq!(exists.filter, json!({"has_label": true}));
        assert_eq!(exists.count, 2);
        let missing = find(&cases, SearchKind::Missing, "label");
        assert_eq!(missing.filter, json!({"has_label": false}));
        assert_eq!(missing.count, 0);

        // `name` in the widget is notBlank, so it gets no existence cases.
        let cases = build_search_cases(&widget(), &widget_rows()).unwrap();
        assert!(!cases
            .iter()
            .any(|case| case.kind == SearchKind::Exists && case.field == "name"));
    }

    #[test]
    fn duplicate_string_match_is_an_invariant_error() {
        let rows = set(vec![
            row(0, vec![text("id_1"), text("same"), SampleValue::Int(1)]),
            row(1, vec![text("id_2"), text("same"), SampleValue::Int(2)]),
        ]);
        let err = build_search_cases(&widget(), &rows).unwrap_err();
        assert!(matches!(err, GenerationError::Invariant(_)));
    }

    #[test]
    fn containers_compare_by_membership() {
        let class = ClassSpec::new(
            "Post",
            vec![
                FieldSpec::new("id", "String"),
                FieldSpec::new("flags", "boolean")
                    .with_container(fixgen_core::ContainerKind::Set),
            ],
        );
        let rows = set(vec![
            row(0, vec![text("id_1"), SampleValue::List(vec![SampleValue::Bool(true)])]),
            row(1, vec![text("id_2"), SampleValue::List(vec![SampleValue::Bool(false)])]),
            row(2, vec![text("id_3"), SampleValue::List(vec![SampleValue::Bool(true)])]),
        ]);
        let cases = build_search_cases(&class, &rows).unwrap();
        let exact = find(&cases, SearchKind::Exact, "flags");
        assert_eq!(exact.filter, json!({"flags": true}));
        assert_eq!(exact.ids, vec!["id_1", "id_3"]);
        let negative = find(&cases, SearchKind::Negative, "flags");
        assert_eq!(negative.ids, vec!["id_2"]);
    }

    #[test]
    fn range_on_text_is_rejected() {
        let class = ClassSpec::new(
            "Widget",
            vec![
                FieldSpec::new("id", "String"),
                FieldSpec::new("name", "String").with_constraints(Constraints {
                    range: true,
                    ..Constraints::default()
                }),
            ],
        );
        let rows = set(vec![row(0, vec![text("id_1"), text("name_3")])]);
        let err = build_search_cases(&class, &rows).unwrap_err();
        assert!(matches!(err, GenerationError::Invariant(_)));
    }

    fn order(buyer: Constraints) -> ClassSpec {
        ClassSpec::new(
            "Order",
            vec![
                FieldSpec::new("id", "String"),
                FieldSpec::new("label", "String"),
                FieldSpec::new("buyer", "Customer").with_constraints(buyer),
            ],
        )
    }

    fn buyer(id: &str) -> SampleValue {
        SampleValue::Object(vec![("id".to_string(), text(id))])
    }

    #[test]
    fn nested_reference_gets_existence_cases_only() {
        let rows = set(vec![
            row(0, vec![text("id_1"), text("label_3"), buyer("id_1")]),
            row(1, vec![text("id_2"), text("label_6"), buyer("id_2")]),
            row(2, vec![text("id_3"), text("label_9"), buyer("id_3")]),
        ]);
        let cases = build_search_cases(&order(Constraints::default()), &rows).unwrap();

        let buyer_kinds: Vec<SearchKind> = cases
            .iter()
            .filter(|case| case.field == "buyer")
            .map(|case| case.kind)
            .collect();
        assert_eq!(buyer_kinds, vec![SearchKind::Exists, SearchKind::Missing]);

        let exists = find(&cases, SearchKind::Exists, "buyer");
        assert_eq!(exists.filter, json!({"has_buyer": true}));
        assert_eq!(exists.ids, vec!["id_1", "id_2", "id_3"]);
        let missing = find(&cases, SearchKind::Missing, "buyer");
        assert_eq!(missing.filter, json!({"has_buyer": false}));
        assert_eq!(missing.count, 0);
    }

    #[test]
    fn range_on_reference_is_rejected() {
        let rows = set(vec![row(0, vec![text("id_1"), text("label_3"), buyer("id_1")])]);
        let class = order(Constraints {
            range: true,
            ..Constraints::default()
        });
        let err = build_search_cases(&class, &rows).unwrap_err();
        assert!(matches!(err, GenerationError::Invariant(message) if message.contains("Order.buyer")));
    }

    #[test]
    fn dates_shift_by_one_day() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 5, 3, 0).unwrap();
        assert_eq!(
            shift_up(&SampleValue::Instant(instant)),
            SampleValue::Instant(Utc.with_ymd_and_hms(2024, 1, 2, 5, 3, 0).unwrap())
        );
        assert_eq!(
            shift_down(&SampleValue::Instant(instant)),
            SampleValue::Instant(Utc.with_ymd_and_hms(2023, 12, 31, 5, 3, 0).unwrap())
        );
        assert_eq!(shift_down(&text("x")), text("invalid"));
    }
}
