//! Output writers, one per format.

pub mod csv;
pub mod json;
pub mod source;
pub mod sql;
pub mod xml;

use seedsmith_core::{EntityDescriptor, PropertyDescriptor};
use seedsmith_plan::OutputFormat;

use crate::errors::Result;
use crate::generators::GeneratedValue;
use crate::model::GenerateOptions;

/// Generated records of one entity, columns in property order.
#[derive(Debug, Clone)]
pub struct EntityRecords<'a> {
    pub entity: &'a EntityDescriptor,
    pub columns: Vec<&'a PropertyDescriptor>,
    pub rows: Vec<Vec<GeneratedValue>>,
}

impl EntityRecords<'_> {
    pub fn name(&self) -> &str {
        &self.entity.name
    }

    /// Column/value pairs of one row.
    pub fn fields<'r>(
        &'r self,
        row: &'r [GeneratedValue],
    ) -> impl Iterator<Item = (&'r PropertyDescriptor, &'r GeneratedValue)> {
        self.columns.iter().copied().zip(row.iter())
    }
}

/// Render every block in the requested format.
pub fn render(blocks: &[EntityRecords<'_>], options: &GenerateOptions) -> Result<String> {
    match options.format {
        OutputFormat::SourceCode => Ok(source::render(blocks, options.source_style)),
        OutputFormat::Json => json::render(blocks),
        OutputFormat::Csv => csv::render(blocks),
        OutputFormat::Sql => Ok(sql::render(blocks)),
        OutputFormat::Xml => Ok(xml::render(blocks)),
    }
}

/// English plural of an entity name, used for collection and element names.
pub fn pluralize(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if let Some(stem) = name.strip_suffix('y') {
        let before = stem.chars().last().map(|ch| ch.to_ascii_lowercase());
        if before.is_some_and(|ch| !"aeiou".contains(ch)) {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        return format!("{name}es");
    }
    format!("{name}s")
}
