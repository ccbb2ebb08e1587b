//! Serialization name tags.
//!
//! A field tag is a quoted literal, either backquoted or double-quoted, that
//! holds space-separated `key:"value"` pairs:
//!
//! ```text
//! `json:"name,omitempty" xml:"Name"`
//! ```
//!
//! The `json` value up to its first comma names the serialized property.

use crate::error::{Error, Result};

/// Tag key carrying the serialized property name.
pub const NAME_KEY: &str = "json";

/// A parsed tag value: `name[,flag,...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagValue {
    pub name: String,
    pub flags: Vec<String>,
}

impl TagValue {
    pub fn parse(value: &str) -> Self {
        let mut parts = value.split(',');
        let name = parts.next().unwrap_or_default().to_string();
        let flags = parts.filter(|f| !f.is_empty()).map(str::to_string).collect();
        Self { name, flags }
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }
}

/// Remove the quotes around a raw tag literal.
pub fn unquote(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.len() >= 2 && raw.starts_with('`') && raw.ends_with('`') {
        let inner = &raw[1..raw.len() - 1];
        return if inner.contains('`') {
            None
        } else {
            Some(inner.to_string())
        };
    }
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return unescape(&raw[1..raw.len() - 1]);
    }
    None
}

fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                '\\' => out.push('\\'),
                '"' => out.push('"'),
                _ => return None,
            },
            '"' => return None,
            c => out.push(c),
        }
    }
    Some(out)
}

/// Look up `key` in an unquoted tag body.
///
/// Bodies that stop being well formed end the lookup with `None`, the same as
/// a missing key.
pub fn lookup<'a>(body: &'a str, key: &str) -> Option<&'a str> {
    let mut rest = body;
    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            return None;
        }
        let colon = rest.find(':')?;
        let name = &rest[..colon];
        if name.is_empty() || name.contains([' ', '"']) {
            return None;
        }
        let after = rest[colon + 1..].strip_prefix('"')?;
        let mut end = None;
        let mut escaped = false;
        for (i, c) in after.char_indices() {
            match c {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => {
                    end = Some(i);
                    break;
                }
                _ => escaped = false,
            }
        }
        let end = end?;
        if name == key {
            return Some(&after[..end]);
        }
        rest = &after[end + 1..];
    }
}

/// The serialized property name carried by a field tag, if any.
///
/// Returns `Ok(None)` when there is no tag, the tag is blank, or its name
/// part is empty. A tag that is not a valid quoted literal is an error.
pub fn property_name(field: &str, raw: Option<&str>) -> Result<Option<String>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let body = unquote(raw).ok_or_else(|| Error::MalformedTag {
        field: field.to_string(),
        tag: raw.to_string(),
    })?;
    if body.trim().is_empty() {
        return Ok(None);
    }
    let name = lookup(&body, NAME_KEY)
        .map(TagValue::parse)
        .map(|value| value.name)
        .filter(|name| !name.is_empty());
    Ok(name)
}

/// Render a tag literal naming a property, as the Rust front end does.
pub fn render(name: &str, flags: &[&str]) -> String {
    let mut value = name.to_string();
    for flag in flags {
        value.push(',');
        value.push_str(flag);
    }
    format!("`{}:\"{}\"`", NAME_KEY, value)
}
