//! Doc comment and serde attribute extraction.

use log::debug;
use syn::meta::ParseNestedMeta;

/// Serde attributes of one field that affect its serialized form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldAttrs {
    /// `rename = ".."` or `rename(serialize = "..")`
    pub rename: Option<String>,
    /// `skip` or `skip_serializing`
    pub skip: bool,
    /// `skip_serializing_if = ".."`
    pub omit_empty: bool,
    pub flatten: bool,
}

/// The doc comment of an item, one line per `///` line.
pub fn doc_comment(attrs: &[syn::Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            syn::Meta::NameValue(syn::MetaNameValue {
                value:
                    syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(text),
                        ..
                    }),
                ..
            }) => Some(text.value()),
            _ => None,
        })
        .flat_map(|text| {
            text.lines()
                .map(|line| line.strip_prefix(' ').unwrap_or(line).to_string())
                .collect::<Vec<_>>()
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// The container-level `rename_all` rule.
pub fn rename_all(attrs: &[syn::Attribute]) -> Option<String> {
    let mut rule = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                if meta.input.peek(syn::Token![=]) {
                    rule = Some(string_value(&meta)?);
                } else {
                    meta.parse_nested_meta(|inner| {
                        if inner.path.is_ident("serialize") {
                            rule = Some(string_value(&inner)?);
                            Ok(())
                        } else {
                            skip_value(&inner)
                        }
                    })?;
                }
                Ok(())
            } else {
                skip_value(&meta)
            }
        });
        if let Err(e) = parsed {
            debug!("Ignoring unparsable serde attribute: {}", e);
        }
    }
    rule
}

/// The serde attributes of a field.
pub fn field_attrs(attrs: &[syn::Attribute]) -> FieldAttrs {
    let mut found = FieldAttrs::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if meta.input.peek(syn::Token![=]) {
                    found.rename = Some(string_value(&meta)?);
                } else {
                    meta.parse_nested_meta(|inner| {
                        if inner.path.is_ident("serialize") {
                            found.rename = Some(string_value(&inner)?);
                            Ok(())
                        } else {
                            skip_value(&inner)
                        }
                    })?;
                }
                return Ok(());
            }
            if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                found.skip = true;
            } else if meta.path.is_ident("skip_serializing_if") {
                found.omit_empty = true;
            } else if meta.path.is_ident("flatten") {
                found.flatten = true;
            }
            skip_value(&meta)
        });
        if let Err(e) = parsed {
            debug!("Ignoring unparsable serde attribute: {}", e);
        }
    }
    found
}

fn string_value(meta: &ParseNestedMeta) -> syn::Result<String> {
    let lit: syn::LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}

/// Consume whatever follows a meta item we do not care about.
fn skip_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_value(&inner))?;
    }
    Ok(())
}

/// Apply a serde `rename_all` rule to a snake_case field name.
pub fn rename_field(name: &str, rule: &str) -> String {
    match rule {
        "lowercase" => name.to_lowercase(),
        "UPPERCASE" => name.to_uppercase(),
        "PascalCase" => pascal_case(name),
        "camelCase" => {
            let pascal = pascal_case(name);
            let mut chars = pascal.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => pascal,
            }
        }
        "snake_case" => name.to_string(),
        "SCREAMING_SNAKE_CASE" => name.to_uppercase(),
        "kebab-case" => name.replace('_', "-"),
        "SCREAMING-KEBAB-CASE" => name.replace('_', "-").to_uppercase(),
        other => {
            debug!("Unknown rename_all rule {:?}", other);
            name.to_string()
        }
    }
}

fn pascal_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut capitalize = true;
    for ch in name.chars() {
        if ch == '_' {
            capitalize = true;
        } else if capitalize {
            result.extend(ch.to_uppercase());
            capitalize = false;
        } else {
            result.push(ch);
        }
    }
    result
}
