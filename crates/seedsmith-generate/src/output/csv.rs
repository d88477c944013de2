use crate::errors::Result;
use crate::output::EntityRecords;

/// Header row then one row per record; entities separated by a blank line.
pub fn render(blocks: &[EntityRecords<'_>]) -> Result<String> {
    let mut sections = Vec::with_capacity(blocks.len());
    for block in blocks {
        sections.push(render_block(block)?);
    }
    Ok(sections.join("\n"))
}

fn render_block(block: &EntityRecords<'_>) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    let header: Vec<&str> = block
        .columns
        .iter()
        .map(|column| column.column_hint.as_str())
        .collect();
    writer.write_record(&header)?;

    for row in &block.rows {
        let record: Vec<String> = row.iter().map(|value| value.to_text()).collect();
        writer.write_record(&record)?;
    }

    writer.flush().map_err(csv::Error::from)?;
    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::GeneratedValue;
    use seedsmith_core::{EntityDescriptor, PropertyDescriptor};

    #[test]
    fn quotes_fields_with_separators() {
        let entity = EntityDescriptor::new("Note", "Notes.Note");
        let id = PropertyDescriptor::new("Id", "int", "Notes.Note");
        let text = PropertyDescriptor::new("Text", "string", "Notes.Note");
        let block = EntityRecords {
            entity: &entity,
            columns: vec![&id, &text],
            rows: vec![
                vec![
                    GeneratedValue::Int(1),
                    GeneratedValue::Text("plain".to_string()),
                ],
                vec![
                    GeneratedValue::Int(2),
                    GeneratedValue::Text("a, \"quoted\"\nline".to_string()),
                ],
            ],
        };

        let output = render(&[block]).expect("render csv");
        assert_eq!(
            output,
            "Id,Text\n1,plain\n2,\"a, \"\"quoted\"\"\nline\"\n"
        );
    }
}
