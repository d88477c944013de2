use crate::output::{EntityRecords, pluralize};

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";
const GROUP_ROOT: &str = "SeedData";

/// Self-closing element per record under a pluralized root.
///
/// Several entities nest their groups under `<SeedData>`.
pub fn render(blocks: &[EntityRecords<'_>]) -> String {
    let mut out = String::from(DECLARATION);
    match blocks {
        [single] => write_group(&mut out, single, ""),
        _ => {
            out.push_str(&format!("<{GROUP_ROOT}>\n"));
            for block in blocks {
                write_group(&mut out, block, "  ");
            }
            out.push_str(&format!("</{GROUP_ROOT}>\n"));
        }
    }
    out
}

fn write_group(out: &mut String, block: &EntityRecords<'_>, indent: &str) {
    let element = element_name(block.name());
    let group = pluralize(&element);

    if block.rows.is_empty() {
        out.push_str(&format!("{indent}<{group} />\n"));
        return;
    }

    out.push_str(&format!("{indent}<{group}>\n"));
    for row in &block.rows {
        let attributes: Vec<String> = block
            .fields(row)
            .filter(|(_, value)| !value.is_null())
            .map(|(column, value)| {
                format!(
                    "{}=\"{}\"",
                    element_name(&column.column_hint),
                    escape(&value.to_text())
                )
            })
            .collect();
        out.push_str(&format!("{indent}  <{element} {} />\n", attributes.join(" ")));
    }
    out.push_str(&format!("{indent}</{group}>\n"));
}

/// Keep only characters legal in an XML name.
fn element_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.'))
        .collect();
    match cleaned.chars().next() {
        Some(first) if first.is_alphabetic() || first == '_' => cleaned,
        _ => format!("_{cleaned}"),
    }
}

pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            other => escaped.push(other),
        }
    }
    escaped
}
