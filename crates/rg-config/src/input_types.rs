//! Input-type declaration files: the symbol source for static validation.
//!
//! ```toml
//! CurrentYear = "int"
//! Tags = "list<string>"
//!
//! [Person]
//! Name = "string"
//! Birthdate = "date"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use rg_lang::Type;

/// Parse declarations into `(name, type)` pairs, sorted by name.
pub fn parse_input_types(text: &str) -> anyhow::Result<Vec<(String, Type)>> {
    let table: toml::Table = toml::from_str(text)?;
    table
        .into_iter()
        .map(|(name, value)| {
            let ty = to_type(&value).with_context(|| format!("input {name:?}"))?;
            Ok((name, ty))
        })
        .collect()
}

pub fn load_input_types(path: impl AsRef<Path>) -> anyhow::Result<Vec<(String, Type)>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    parse_input_types(&text).with_context(|| format!("in {}", path.display()))
}

fn to_type(value: &toml::Value) -> anyhow::Result<Type> {
    match value {
        toml::Value::String(name) => name.parse::<Type>().map_err(anyhow::Error::msg),
        toml::Value::Table(fields) => {
            let mut out = BTreeMap::new();
            for (field, v) in fields {
                let ty = to_type(v).with_context(|| format!("field {field:?}"))?;
                out.insert(field.clone(), ty);
            }
            Ok(Type::Record(out))
        }
        other => anyhow::bail!(
            "expected a type name or a table, found {}",
            other.type_str()
        ),
    }
}
