use chrono::{Datelike, Timelike};

use seedsmith_core::{PropertyDescriptor, ScalarKind};

use crate::generators::GeneratedValue;
use crate::model::SourceStyle;
use crate::output::{EntityRecords, pluralize};

const INDENT: &str = "    ";

/// One static generator routine per entity.
pub fn render(blocks: &[EntityRecords<'_>], style: SourceStyle) -> String {
    let methods: Vec<String> = blocks
        .iter()
        .map(|block| match style {
            SourceStyle::ObjectInitializer => object_initializer(block),
            SourceStyle::Assignment => assignment(block),
        })
        .collect();
    methods.join("\n")
}

fn signature(block: &EntityRecords<'_>) -> String {
    let name = block.name();
    format!(
        "public static List<{name}> Generate{}()\n{{\n",
        pluralize(name)
    )
}

fn object_initializer(block: &EntityRecords<'_>) -> String {
    let name = block.name();
    let mut out = signature(block);
    out.push_str(&format!("{INDENT}return new List<{name}>\n{INDENT}{{\n"));

    for row in &block.rows {
        out.push_str(&format!("{INDENT}{INDENT}new {name}\n{INDENT}{INDENT}{{\n"));
        for (column, value) in block.fields(row) {
            out.push_str(&format!(
                "{INDENT}{INDENT}{INDENT}{} = {},\n",
                column.name,
                literal(column, value)
            ));
        }
        out.push_str(&format!("{INDENT}{INDENT}}},\n"));
    }

    out.push_str(&format!("{INDENT}}};\n}}\n"));
    out
}

fn assignment(block: &EntityRecords<'_>) -> String {
    let name = block.name();
    let list = lower_first(&pluralize(name));
    let item = lower_first(name);
    let mut out = signature(block);
    out.push_str(&format!("{INDENT}var {list} = new List<{name}>();\n"));

    for (position, row) in block.rows.iter().enumerate() {
        let variable = format!("{item}{}", position + 1);
        out.push_str(&format!("\n{INDENT}var {variable} = new {name}();\n"));
        for (column, value) in block.fields(row) {
            out.push_str(&format!(
                "{INDENT}{variable}.{} = {};\n",
                column.name,
                literal(column, value)
            ));
        }
        out.push_str(&format!("{INDENT}{list}.Add({variable});\n"));
    }

    out.push_str(&format!("\n{INDENT}return {list};\n}}\n"));
    out
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Source literal for a value, shaped by the property's declared type.
fn literal(column: &PropertyDescriptor, value: &GeneratedValue) -> String {
    let declared = column.declared_type_name.trim_end_matches('?');
    match value {
        GeneratedValue::Null => "null".to_string(),
        GeneratedValue::Bool(flag) => flag.to_string(),
        GeneratedValue::Int(number) => match declared {
            "long" | "Int64" => format!("{number}L"),
            _ => number.to_string(),
        },
        GeneratedValue::Decimal(number) => decimal_literal(declared, *number),
        GeneratedValue::Text(text) => string_literal(text),
        GeneratedValue::Char(ch) => match ch {
            '\'' => "'\\''".to_string(),
            '\\' => "'\\\\'".to_string(),
            other => format!("'{other}'"),
        },
        GeneratedValue::Guid(uuid) => format!("Guid.Parse(\"{}\")", uuid.hyphenated()),
        GeneratedValue::Date(date) => match ScalarKind::from_type_name(declared) {
            ScalarKind::Date => format!(
                "new DateOnly({}, {}, {})",
                date.year(),
                date.month(),
                date.day()
            ),
            _ => format!(
                "new DateTime({}, {}, {})",
                date.year(),
                date.month(),
                date.day()
            ),
        },
        GeneratedValue::DateTime(stamp) => {
            if stamp.time() == chrono::NaiveTime::MIN {
                format!(
                    "new DateTime({}, {}, {})",
                    stamp.year(),
                    stamp.month(),
                    stamp.day()
                )
            } else {
                format!(
                    "new DateTime({}, {}, {}, {}, {}, {})",
                    stamp.year(),
                    stamp.month(),
                    stamp.day(),
                    stamp.hour(),
                    stamp.minute(),
                    stamp.second()
                )
            }
        }
        GeneratedValue::Time(time) => match declared {
            "TimeSpan" => format!(
                "new TimeSpan({}, {}, {})",
                time.hour(),
                time.minute(),
                time.second()
            ),
            _ => format!(
                "new TimeOnly({}, {}, {})",
                time.hour(),
                time.minute(),
                time.second()
            ),
        },
        GeneratedValue::Enum { name, .. } => format!("{declared}.{name}"),
    }
}

fn decimal_literal(declared: &str, number: f64) -> String {
    let mut rendered = number.to_string();
    match ScalarKind::from_type_name(declared) {
        ScalarKind::Integer => return format!("{}", number.trunc() as i64),
        ScalarKind::Decimal if matches!(declared, "double" | "Double") => {
            if !rendered.contains('.') {
                rendered.push_str(".0");
            }
            return rendered;
        }
        ScalarKind::Decimal if matches!(declared, "float" | "Single") => {
            return format!("{rendered}f");
        }
        _ => {}
    }
    format!("{rendered}m")
}

fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
