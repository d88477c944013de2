use serde_json::{Map, Value};

use crate::errors::Result;
use crate::output::EntityRecords;

/// One entity renders as an array of objects; several as an object keyed by entity.
pub fn render(blocks: &[EntityRecords<'_>]) -> Result<String> {
    let document = match blocks {
        [single] => records(single),
        _ => {
            let mut grouped = Map::new();
            for block in blocks {
                grouped.insert(block.name().to_string(), records(block));
            }
            Value::Object(grouped)
        }
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

fn records(block: &EntityRecords<'_>) -> Value {
    let rows = block
        .rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = block
                .fields(row)
                .map(|(column, value)| (column.name.clone(), value.to_json()))
                .collect();
            Value::Object(object)
        })
        .collect();
    Value::Array(rows)
}
