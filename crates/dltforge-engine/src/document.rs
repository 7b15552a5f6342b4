use dltforge_templates::markdown::{self, MarkdownDocument, MarkdownSection};
use dltforge_utils::error::TemplateError;

/// A fully resolved document: no placeholders remain.
///
/// Anchors survive resolution and rendering so that a written main spec can
/// be read back and receive further appendices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDocument {
    pub preamble: String,
    pub sections: Vec<MarkdownSection>,
}

impl ResolvedDocument {
    /// Parse a document previously written by [`render`](Self::render).
    ///
    /// `source` names the document in errors, normally its path.
    pub fn parse(source: &str, text: &str) -> Result<Self, TemplateError> {
        markdown::split_sections(text)
            .map(Self::from)
            .map_err(|e| TemplateError::Invalid {
                id: source.to_string(),
                reason: e.to_string(),
            })
    }

    #[must_use]
    pub fn render(&self) -> String {
        markdown::render(&MarkdownDocument {
            preamble: self.preamble.clone(),
            sections: self.sections.clone(),
        })
    }

    #[must_use]
    pub fn headings(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.heading.as_str()).collect()
    }

    #[must_use]
    pub fn anchors(&self) -> Vec<String> {
        self.sections
            .iter()
            .filter_map(|s| s.anchor.clone())
            .collect()
    }

    /// Index of the section carrying `anchor`.
    #[must_use]
    pub fn find_anchor(&self, anchor: &str) -> Option<usize> {
        self.sections
            .iter()
            .position(|s| s.anchor.as_deref() == Some(anchor))
    }
}

impl From<MarkdownDocument> for ResolvedDocument {
    fn from(doc: MarkdownDocument) -> Self {
        Self {
            preamble: doc.preamble,
            sections: doc.sections,
        }
    }
}
