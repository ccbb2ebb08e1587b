//! Single-line validation directives found in documentation blocks.
//!
//! A directive is `<keyword>: <value>` or, for flags, the bare keyword:
//!
//! ```text
//! minimum: >3
//! maxLength: 20
//! pattern: ^[a-z]+$
//! itemsMinimum: 1
//! required
//! ```
//!
//! Keywords are compared case-insensitively with spaces, dots, dashes and
//! underscores removed, so `items.min length` and `itemsMinLength` are the same
//! keyword. Parsed directives are applied through a [`DirectiveTable`].

use crate::schema::Schema;
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

static LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9 ._\-]*?)\s*(?::\s*(.*?))?\s*$").unwrap()
});

static BOUND_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(<=|>=|<|>|=)?\s*([+-]?(?:\d+\.)?\d+)$").unwrap());

static NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:\d+\.)?\d+$").unwrap());

/// Recognized directive keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Maximum,
    Minimum,
    MultipleOf,
    MinLength,
    MaxLength,
    Pattern,
    MinItems,
    MaxItems,
    Unique,
    Required,
    ReadOnly,
}

impl Keyword {
    /// Keywords that also exist in an `items` flavor.
    pub const ITEMS_FAMILY: [Keyword; 9] = [
        Keyword::Maximum,
        Keyword::Minimum,
        Keyword::MultipleOf,
        Keyword::MinLength,
        Keyword::MaxLength,
        Keyword::Pattern,
        Keyword::MinItems,
        Keyword::MaxItems,
        Keyword::Unique,
    ];

    fn from_normalized(word: &str) -> Option<Self> {
        let keyword = match word {
            "maximum" | "max" => Keyword::Maximum,
            "minimum" | "min" => Keyword::Minimum,
            "multipleof" => Keyword::MultipleOf,
            "minlength" | "minimumlength" => Keyword::MinLength,
            "maxlength" | "maximumlength" => Keyword::MaxLength,
            "pattern" => Keyword::Pattern,
            "minitems" | "minimumitems" => Keyword::MinItems,
            "maxitems" | "maximumitems" => Keyword::MaxItems,
            "unique" => Keyword::Unique,
            "required" => Keyword::Required,
            "readonly" => Keyword::ReadOnly,
            _ => return None,
        };
        Some(keyword)
    }

    /// Whether the keyword may appear without a value.
    pub fn is_flag(self) -> bool {
        matches!(self, Keyword::Unique | Keyword::Required | Keyword::ReadOnly)
    }
}

/// One parsed directive line.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub keyword: Keyword,
    /// Applies to the `items` of an array rather than the property itself
    pub items: bool,
    pub value: Option<String>,
}

impl Directive {
    /// Parse one documentation line. Returns `None` for anything that is not
    /// a recognized directive.
    pub fn parse_line(line: &str) -> Option<Self> {
        let caps = LINE_REGEX.captures(line.trim())?;
        let normalized: String = caps[1]
            .chars()
            .filter(|c| !matches!(*c, ' ' | '.' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        let (items, word) = match normalized.strip_prefix("items") {
            Some(rest) if !rest.is_empty() => (true, rest),
            _ => (false, normalized.as_str()),
        };
        let keyword = Keyword::from_normalized(word)?;
        if items && !Keyword::ITEMS_FAMILY.contains(&keyword) {
            return None;
        }

        let value = caps.get(2).map(|m| m.as_str().to_string());
        if value.is_none() && !keyword.is_flag() {
            return None;
        }
        // A keyword followed by a value it cannot take is prose
        if !accepts(keyword, value.as_deref()) {
            return None;
        }
        Some(Self {
            keyword,
            items,
            value,
        })
    }
}

/// Where a table entry writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    keyword: Keyword,
    items: bool,
}

/// Keyword-to-setter lookup table for one property.
///
/// Each directive is offered to the entries in order and the first entry
/// with the same keyword and flavor claims it. Directives apply in line
/// order, so a repeated keyword ends with its last value.
#[derive(Debug, Clone)]
pub struct DirectiveTable {
    entries: Vec<Entry>,
}

impl DirectiveTable {
    /// Table for an inline property. `with_items` enables the `items`
    /// flavored entries, which take priority over the plain ones.
    pub fn for_property(with_items: bool) -> Self {
        let mut entries = Vec::new();
        if with_items {
            entries.extend(Keyword::ITEMS_FAMILY.iter().map(|&keyword| Entry {
                keyword,
                items: true,
            }));
        }
        entries.extend(
            Keyword::ITEMS_FAMILY
                .iter()
                .chain(&[Keyword::Required, Keyword::ReadOnly])
                .map(|&keyword| Entry {
                    keyword,
                    items: false,
                }),
        );
        Self { entries }
    }

    /// Table for a property that is a reference: only `required` applies.
    pub fn for_reference() -> Self {
        Self {
            entries: vec![Entry {
                keyword: Keyword::Required,
                items: false,
            }],
        }
    }

    /// Apply directives to `property`, recorded in `owner` as `name`.
    pub fn apply(&self, directives: &[Directive], owner: &mut Schema, name: &str, property: &mut Schema) {
        for directive in directives {
            let claimed = self
                .entries
                .iter()
                .find(|e| e.keyword == directive.keyword && e.items == directive.items);
            let Some(entry) = claimed else {
                debug!("Directive {:?} does not apply to property {}", directive.keyword, name);
                continue;
            };

            let applied = if entry.keyword == Keyword::Required {
                parse_flag(directive.value.as_deref()).map(|required| {
                    if required {
                        owner.add_required(name);
                    } else {
                        owner.remove_required(name);
                    }
                })
            } else if entry.items {
                match property.items.as_deref_mut() {
                    Some(items) => set_value(items, entry.keyword, directive.value.as_deref()),
                    None => None,
                }
            } else {
                set_value(property, entry.keyword, directive.value.as_deref())
            };

            if applied.is_none() {
                debug!(
                    "Ignoring directive {:?} with value {:?} on property {}",
                    directive.keyword, directive.value, name
                );
            }
        }
    }
}

/// Set one validation on a schema. `None` when the value does not parse.
fn set_value(schema: &mut Schema, keyword: Keyword, value: Option<&str>) -> Option<()> {
    match keyword {
        Keyword::Maximum => {
            let (op, bound) = parse_bound(value?)?;
            if !matches!(op, "" | "<" | "<=" | "=") {
                return None;
            }
            schema.maximum = Some(bound);
            schema.exclusive_maximum = op == "<";
        }
        Keyword::Minimum => {
            let (op, bound) = parse_bound(value?)?;
            if !matches!(op, "" | ">" | ">=" | "=") {
                return None;
            }
            schema.minimum = Some(bound);
            schema.exclusive_minimum = op == ">";
        }
        Keyword::MultipleOf => schema.multiple_of = Some(parse_number(value?)?),
        Keyword::MinLength => schema.min_length = Some(parse_count(value?)?),
        Keyword::MaxLength => schema.max_length = Some(parse_count(value?)?),
        Keyword::MinItems => schema.min_items = Some(parse_count(value?)?),
        Keyword::MaxItems => schema.max_items = Some(parse_count(value?)?),
        Keyword::Pattern => {
            let pattern = value?;
            if pattern.is_empty() || Regex::new(pattern).is_err() {
                return None;
            }
            schema.pattern = Some(pattern.to_string());
        }
        Keyword::Unique => schema.unique_items = parse_flag(value)?,
        Keyword::ReadOnly => schema.read_only = parse_flag(value)?,
        Keyword::Required => return None,
    }
    Some(())
}

/// Whether `value` is well formed for `keyword`.
fn accepts(keyword: Keyword, value: Option<&str>) -> bool {
    match keyword {
        Keyword::Required => parse_flag(value).is_some(),
        _ => set_value(&mut Schema::default(), keyword, value).is_some(),
    }
}

fn parse_bound(value: &str) -> Option<(&str, f64)> {
    let caps = BOUND_REGEX.captures(value.trim())?;
    let op = caps.get(1).map_or("", |m| m.as_str());
    let number = caps.get(2)?.as_str().parse().ok()?;
    Some((op, number))
}

fn parse_number(value: &str) -> Option<f64> {
    let value = value.trim();
    if !NUMBER_REGEX.is_match(value) {
        return None;
    }
    value.parse().ok()
}

fn parse_count(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Bare flags mean `true`.
fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value.map(str::trim) {
        None | Some("") => Some(true),
        Some(v) if v.eq_ignore_ascii_case("true") => Some(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Some(false),
        Some(_) => None,
    }
}
