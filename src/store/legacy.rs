//! Reader for the INI dialect of config files written by earlier versions of hchk:
//! `[section]` headers and unquoted `key = value` lines.

use anyhow::{bail, Result};


/// Keys whose values are read as integers.
const INTEGER_KEYS: [&str; 2] = ["period", "grace"];


pub fn parse(text: &str) -> Result<toml::Table>
{
    let mut table = toml::Table::new();
    let mut current: Option<(String, toml::Table)> = None;

    for (index, line) in text.lines().enumerate() {
        let lineno = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let Some(name) = header.strip_suffix(']') else {
                bail!("line {}: unterminated section header", lineno);
            };
            finish_section(&mut table, current.take())?;
            current = Some((name.trim().to_string(), toml::Table::new()));
            continue;
        }

        let Some((key, raw)) = split_option(line) else {
            bail!("line {}: expected `key = value`", lineno);
        };
        let Some((_, section)) = current.as_mut() else {
            bail!("line {}: option outside of a section", lineno);
        };
        let key = key.to_lowercase();
        let value = to_value(&key, raw);
        section.insert(key, value);
    }

    finish_section(&mut table, current)?;
    Ok(table)
}

fn finish_section(table: &mut toml::Table, section: Option<(String, toml::Table)>) -> Result<()>
{
    let Some((name, values)) = section else { return Ok(()); };
    if table.contains_key(&name) {
        bail!("duplicate section [{}]", name);
    }
    table.insert(name, toml::Value::Table(values));
    Ok(())
}

/// Splits at the first `=` or `:`.
fn split_option(line: &str) -> Option<(&str, &str)>
{
    let pos = line.find(['=', ':'])?;
    let key = line[..pos].trim();
    if key.is_empty() {
        return None;
    }
    Some((key, line[pos + 1..].trim()))
}

fn to_value(key: &str, raw: &str) -> toml::Value
{
    if INTEGER_KEYS.contains(&key) {
        if let Ok(n) = raw.parse::<i64>() {
            return toml::Value::Integer(n);
        }
    }
    toml::Value::String(raw.to_string())
}
