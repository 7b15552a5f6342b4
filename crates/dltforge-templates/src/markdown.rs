//! Markdown section splitting
//!
//! Both templates and resolved documents are viewed as a preamble followed by
//! a flat list of ATX-heading sections. A section may carry one anchor
//! marker line (`<!-- anchor: NAME -->`), which is lifted out of the body
//! and written back directly under the heading on render.
//!
//! Heading and anchor lines inside fenced code blocks are body text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static HEADING: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(#{1,6})[ \t]+(\S.*?)[ \t]*$").expect("heading pattern is valid")
});

static ANCHOR: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[ \t]*<!--[ \t]*anchor:[ \t]*([A-Za-z0-9_.-]+)[ \t]*-->[ \t]*$")
        .expect("anchor pattern is valid")
});

/// One heading and the text that follows it up to the next heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownSection {
    /// Heading level, 1 through 6.
    pub level: u8,
    /// Heading text without the leading `#`s.
    pub heading: String,
    /// Anchor declared by a marker line in this section.
    pub anchor: Option<String>,
    /// Body text, marker line removed.
    pub body: String,
}

impl MarkdownSection {
    #[must_use]
    pub fn new(level: u8, heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level,
            heading: heading.into(),
            anchor: None,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }
}

/// A markdown document split into preamble and sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownDocument {
    pub preamble: String,
    pub sections: Vec<MarkdownSection>,
}

/// Why a markdown source could not be split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    AnchorBeforeHeading { anchor: String },
    MultipleAnchors { heading: String },
    DuplicateAnchor { anchor: String },
}

impl std::fmt::Display for SplitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AnchorBeforeHeading { anchor } => {
                write!(f, "anchor '{anchor}' appears before the first heading")
            }
            Self::MultipleAnchors { heading } => {
                write!(f, "section '{heading}' declares more than one anchor")
            }
            Self::DuplicateAnchor { anchor } => {
                write!(f, "anchor '{anchor}' is declared more than once")
            }
        }
    }
}

/// Canonical anchor marker line (without newline).
#[must_use]
pub fn anchor_marker(name: &str) -> String {
    format!("<!-- anchor: {name} -->")
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Split `source` into a preamble and sections.
pub fn split_sections(source: &str) -> Result<MarkdownDocument, SplitError> {
    let mut doc = MarkdownDocument::default();
    let mut current: Option<MarkdownSection> = None;
    let mut seen_anchors = BTreeSet::new();
    let mut in_fence = false;

    for line in source.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);

        if is_fence(content) {
            in_fence = !in_fence;
        } else if !in_fence {
            if let Some(caps) = HEADING.captures(content) {
                if let Some(section) = current.take() {
                    doc.sections.push(section);
                }
                // The pattern limits the run of '#' to six.
                let level = u8::try_from(caps[1].len()).unwrap_or(6);
                current = Some(MarkdownSection::new(level, &caps[2], String::new()));
                continue;
            }

            if let Some(caps) = ANCHOR.captures(content) {
                let name = caps[1].to_string();
                let Some(section) = current.as_mut() else {
                    return Err(SplitError::AnchorBeforeHeading { anchor: name });
                };
                if section.anchor.is_some() {
                    return Err(SplitError::MultipleAnchors {
                        heading: section.heading.clone(),
                    });
                }
                if !seen_anchors.insert(name.clone()) {
                    return Err(SplitError::DuplicateAnchor { anchor: name });
                }
                section.anchor = Some(name);
                continue;
            }
        }

        match current.as_mut() {
            Some(section) => section.body.push_str(line),
            None => doc.preamble.push_str(line),
        }
    }

    if let Some(section) = current {
        doc.sections.push(section);
    }

    Ok(doc)
}

/// Why `text` cannot be spliced into a section body without changing the
/// document structure, if it cannot.
///
/// Anchor marker lines would declare anchors, and an unbalanced code fence
/// would hide every heading and anchor after it.
#[must_use]
pub fn structural_conflict(text: &str) -> Option<String> {
    let mut fences = 0usize;
    for line in text.lines() {
        if let Some(caps) = ANCHOR.captures(line) {
            return Some(format!("contains the anchor marker for '{}'", &caps[1]));
        }
        if is_fence(line) {
            fences += 1;
        }
    }
    (fences % 2 == 1).then(|| "opens a code fence it does not close".to_string())
}

/// Render a document back to markdown.
///
/// Each anchor marker is written on the line after its heading.
#[must_use]
pub fn render(doc: &MarkdownDocument) -> String {
    let mut out = doc.preamble.clone();
    for section in &doc.sections {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&"#".repeat(usize::from(section.level)));
        out.push(' ');
        out.push_str(&section.heading);
        out.push('\n');
        if let Some(anchor) = &section.anchor {
            out.push_str(&anchor_marker(anchor));
            out.push('\n');
        }
        out.push_str(&section.body);
    }
    out
}

/// Split off a leading `---` YAML front matter block.
///
/// Returns the YAML text (if any) and the remaining body.
#[must_use]
pub fn split_front_matter(source: &str) -> (Option<&str>, &str) {
    let Some(after_open) = source
        .strip_prefix("---\n")
        .or_else(|| source.strip_prefix("---\r\n"))
    else {
        return (None, source);
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == "---" {
            let yaml = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    (None, source)
}
