//! Converts records back to BibTeX text, or to YAML for export.

use super::entry::{BibData, BibEntry};
use crate::error::Result;
use serde_yaml::{Mapping, Value};

/// Format every record, separated by a blank line.
pub fn format_bibdata(data: &BibData) -> String {
    let mut out = data
        .iter()
        .map(|(citekey, entry)| format_entry(citekey, entry))
        .collect::<Vec<_>>()
        .join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

pub fn format_entry(citekey: &str, entry: &BibEntry) -> String {
    let mut result = String::new();

    result.push('@');
    result.push_str(&entry.entry_type);
    result.push('{');
    result.push_str(citekey);
    result.push_str(",\n");

    for field in &entry.fields {
        result.push_str("    ");
        result.push_str(&field.key);
        result.push_str(" = ");
        result.push_str(&format_field_value(&field.value));
        result.push_str(",\n");
    }

    result.push('}');
    result
}

/// Format every record as a YAML mapping of citekey to
/// `{type, <field>: <value>...}`, keeping record and field order.
pub fn format_yaml(data: &BibData) -> Result<String> {
    let mut root = Mapping::new();
    for (citekey, entry) in data.iter() {
        let mut record = Mapping::new();
        record.insert("type".into(), entry.entry_type.clone().into());
        for field in &entry.fields {
            record.insert(field.key.clone().into(), field.value.clone().into());
        }
        root.insert(citekey.into(), Value::Mapping(record));
    }
    if root.is_empty() {
        return Ok(String::new());
    }
    Ok(serde_yaml::to_string(&root)?)
}

/// Numbers are written bare, everything else braced so LaTeX survives.
fn format_field_value(value: &str) -> String {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return value.to_string();
    }
    format!("{{{}}}", value)
}
