use crate::errors::GenerationError;
use crate::fixture::Fixture;

/// Render a fixture as CSV bytes, header first.
///
/// Cells are quoted only when needed, using `quote` so that JSON payloads
/// with embedded double quotes stay readable.
pub fn render_csv(fixture: &Fixture, quote: char) -> Result<Vec<u8>, GenerationError> {
    let quote = u8::try_from(quote)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            GenerationError::InvalidOptions(format!("quote character '{quote}' is not ASCII"))
        })?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote(quote)
        .from_writer(Vec::new());

    writer.write_record(&fixture.header)?;
    for record in fixture.cells() {
        writer.write_record(&record)?;
    }
    writer.flush()?;

    writer
        .into_inner()
        .map_err(|err| GenerationError::Io(err.into_error()))
}

#[cfg(test)]
mod tests {
    use fixgen_core::ClassSpec;

    use super::*;
    use crate::oracles::InvalidCase;

    #[test]
    fn json_payloads_are_quoted_with_the_configured_character() {
        let class = ClassSpec::new("Widget", Vec::new());
        let fixture = Fixture::from_invalid(
            &class,
            &[InvalidCase {
                payload: r#"{"id":"id_1","name":""}"#.to_string(),
                field: "name".to_string(),
                message: "must not be blank".to_string(),
            }],
        );

        let bytes = render_csv(&fixture, '\'').unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "payload,field,message\n'{\"id\":\"id_1\",\"name\":\"\"}',name,must not be blank\n"
        );
    }

    #[test]
    fn non_ascii_quote_is_rejected() {
        let class = ClassSpec::new("Widget", Vec::new());
        let fixture = Fixture::from_invalid(&class, &[]);
        let err = render_csv(&fixture, '«').unwrap_err();
        assert!(matches!(err, GenerationError::InvalidOptions(_)));
    }
}
