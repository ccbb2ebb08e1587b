//! Documentation block parsing.
//!
//! A documentation block is split into prose and directives. Prose is the
//! text before the first directive line; its first paragraph is the title and
//! the remaining paragraphs are the description. Marker lines
//! (`swagger:model`, `swagger:strfmt`, `swagger:allOf`) never count as prose.

use crate::directive::Directive;
use regex::Regex;
use std::sync::LazyLock;

static MODEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?swagger:model(?:\s+(\S+))?\s*$").unwrap());

static STRFMT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?swagger:strfmt(?:\s+(\S+))?\s*$").unwrap());

static ALL_OF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?swagger:allOf\b").unwrap());

static MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?swagger:[A-Za-z]+").unwrap());

/// The structured content of one documentation block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
    /// Prose paragraphs, each a list of lines
    paragraphs: Vec<Vec<String>>,
    /// Directives in line order
    pub directives: Vec<Directive>,
}

impl Annotation {
    pub fn parse(doc: Option<&str>) -> Self {
        let mut annotation = Annotation::default();
        let Some(doc) = doc else {
            return annotation;
        };

        let mut paragraph: Vec<String> = Vec::new();
        let mut in_directives = false;
        for line in doc.lines().map(clean_line) {
            if MARKER_REGEX.is_match(line) {
                continue;
            }
            if let Some(directive) = Directive::parse_line(line) {
                annotation.directives.push(directive);
                in_directives = true;
                continue;
            }
            if in_directives {
                continue;
            }
            if line.is_empty() {
                if !paragraph.is_empty() {
                    annotation.paragraphs.push(std::mem::take(&mut paragraph));
                }
            } else {
                paragraph.push(line.to_string());
            }
        }
        if !paragraph.is_empty() {
            annotation.paragraphs.push(paragraph);
        }
        annotation
    }

    /// The first paragraph.
    pub fn title(&self) -> Option<String> {
        self.paragraphs.first().map(|p| p.join("\n"))
    }

    /// Every paragraph after the first.
    pub fn description(&self) -> Option<String> {
        join_paragraphs(self.paragraphs.iter().skip(1))
    }

    /// All prose, used where a block has no separate title.
    pub fn text(&self) -> Option<String> {
        join_paragraphs(self.paragraphs.iter())
    }
}

fn join_paragraphs<'a>(paragraphs: impl Iterator<Item = &'a Vec<String>>) -> Option<String> {
    let joined: Vec<String> = paragraphs.map(|p| p.join("\n")).collect();
    if joined.is_empty() {
        None
    } else {
        Some(joined.join("\n\n"))
    }
}

/// Strip comment markers a front end may have left on a doc line.
fn clean_line(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix("///")
        .or_else(|| line.strip_prefix("//"))
        .or_else(|| line.strip_prefix("* "))
        .unwrap_or(line);
    line.trim()
}

fn marker_value(doc: Option<&str>, regex: &Regex) -> Option<String> {
    doc?.lines().map(clean_line).find_map(|line| {
        regex
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// The external name set by a `swagger:model <name>` line; first match wins.
pub fn model_name(doc: Option<&str>) -> Option<String> {
    marker_value(doc, &MODEL_REGEX)
}

/// Whether the block carries a `swagger:model` line, with or without a name.
pub fn is_model(doc: Option<&str>) -> bool {
    doc.is_some_and(|doc| doc.lines().map(clean_line).any(|l| MODEL_REGEX.is_match(l)))
}

/// The format name set by a `swagger:strfmt <name>` line.
pub fn strfmt_name(doc: Option<&str>) -> Option<String> {
    marker_value(doc, &STRFMT_REGEX)
}

/// Whether the block marks an embedded type as an `allOf` member.
pub fn is_all_of_member(doc: Option<&str>) -> bool {
    doc.is_some_and(|doc| doc.lines().map(clean_line).any(|l| ALL_OF_REGEX.is_match(l)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::Keyword;

    #[test]
    fn test_title_and_description() {
        let doc = "A pet in the store.\n\nPets have a name\nand some tags.\n\nThey are sold.";
        let annotation = Annotation::parse(Some(doc));
        assert_eq!(annotation.title().as_deref(), Some("A pet in the store."));
        assert_eq!(
            annotation.description().as_deref(),
            Some("Pets have a name\nand some tags.\n\nThey are sold.")
        );
        assert!(annotation.directives.is_empty());
    }

    #[test]
    fn test_single_paragraph_is_title() {
        let annotation = Annotation::parse(Some("The name of the pet"));
        assert_eq!(annotation.title().as_deref(), Some("The name of the pet"));
        assert_eq!(annotation.description(), None);
        assert_eq!(annotation.text().as_deref(), Some("The name of the pet"));
    }

    #[test]
    fn test_directives_end_prose() {
        let doc = "The name of the pet\n\nminLength: 3\nmaxLength: 20\ntrailing words are ignored";
        let annotation = Annotation::parse(Some(doc));
        assert_eq!(annotation.text().as_deref(), Some("The name of the pet"));
        let keywords: Vec<Keyword> = annotation.directives.iter().map(|d| d.keyword).collect();
        assert_eq!(keywords, vec![Keyword::MinLength, Keyword::MaxLength]);
    }

    #[test]
    fn test_keyword_prose_stays_prose() {
        let doc = "A pet.\n\nMax: five pets per owner.\nSold in pairs.\n\nmaximum: 5";
        let annotation = Annotation::parse(Some(doc));
        assert_eq!(annotation.title().as_deref(), Some("A pet."));
        assert_eq!(
            annotation.description().as_deref(),
            Some("Max: five pets per owner.\nSold in pairs.")
        );
        let keywords: Vec<Keyword> = annotation.directives.iter().map(|d| d.keyword).collect();
        assert_eq!(keywords, vec![Keyword::Maximum]);
    }

    #[test]
    fn test_markers_are_not_prose() {
        let doc = "swagger:model pet\nA pet.\n+swagger:allOf";
        let annotation = Annotation::parse(Some(doc));
        assert_eq!(annotation.title().as_deref(), Some("A pet."));
    }

    #[test]
    fn test_comment_markers_are_stripped() {
        let doc = "/// A pet.\n///\n/// More about pets.";
        let annotation = Annotation::parse(Some(doc));
        assert_eq!(annotation.title().as_deref(), Some("A pet."));
        assert_eq!(annotation.description().as_deref(), Some("More about pets."));
    }

    #[test]
    fn test_empty_doc() {
        let annotation = Annotation::parse(None);
        assert_eq!(annotation.title(), None);
        assert_eq!(annotation.text(), None);
        assert_eq!(Annotation::parse(Some("\n\n")).title(), None);
    }

    #[test]
    fn test_model_name_first_match_wins() {
        let doc = "A pet\nswagger:model pet\nswagger:model animal";
        assert_eq!(model_name(Some(doc)).as_deref(), Some("pet"));
        assert!(is_model(Some(doc)));

        assert_eq!(model_name(Some("swagger:model")), None);
        assert!(is_model(Some("swagger:model")));
        assert_eq!(model_name(Some("A pet")), None);
        assert!(!is_model(None));
    }

    #[test]
    fn test_strfmt_and_all_of() {
        assert_eq!(strfmt_name(Some("An email.\nswagger:strfmt email")).as_deref(), Some("email"));
        assert_eq!(strfmt_name(Some("swagger:strfmt")), None);
        assert!(is_all_of_member(Some("swagger:allOf")));
        assert!(!is_all_of_member(Some("swagger:allOfThem")));
        assert!(!is_all_of_member(None));
    }
}
