use crate::generators::GeneratedValue;
use crate::output::EntityRecords;

/// One `INSERT` per record inside a single transaction.
pub fn render(blocks: &[EntityRecords<'_>]) -> String {
    let mut out = String::from("BEGIN TRANSACTION;\n");

    for block in blocks {
        if block.rows.is_empty() {
            continue;
        }
        let columns: Vec<String> = block
            .columns
            .iter()
            .map(|column| quote_identifier(&column.column_hint))
            .collect();
        let prefix = format!(
            "INSERT INTO {} ({}) VALUES",
            quote_identifier(block.entity.storage_name()),
            columns.join(", ")
        );

        out.push('\n');
        out.push_str(&format!("-- {}\n", block.name()));
        for row in &block.rows {
            let values: Vec<String> = row.iter().map(literal).collect();
            out.push_str(&format!("{prefix} ({});\n", values.join(", ")));
        }
    }

    out.push_str("\nCOMMIT TRANSACTION;\n");
    out
}

fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

fn quote_text(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn literal(value: &GeneratedValue) -> String {
    match value {
        GeneratedValue::Null => "NULL".to_string(),
        GeneratedValue::Bool(flag) => String::from(if *flag { "1" } else { "0" }),
        GeneratedValue::Int(number) => number.to_string(),
        GeneratedValue::Decimal(number) => number.to_string(),
        GeneratedValue::Enum { value, .. } => value.to_string(),
        other => quote_text(&other.to_text()),
    }
}
