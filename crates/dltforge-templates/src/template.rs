use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use dltforge_utils::error::TemplateError;

use crate::lexer::{self, Token};
use crate::markdown::{self, MarkdownSection};

/// Whether a template produces a standalone document or merges into one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    #[default]
    Document,
    Appendix,
}

impl TemplateKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Appendix => "appendix",
        }
    }
}

/// YAML front matter of a template file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FrontMatter {
    id: Option<String>,
    #[serde(default)]
    kind: TemplateKind,
    description: Option<String>,
    target_anchor: Option<String>,
    #[serde(default)]
    placeholders: Vec<String>,
    #[serde(default)]
    prompts: BTreeMap<String, String>,
}

/// A template section with its heading and body lexed into tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    level: u8,
    heading: Vec<Token>,
    body: Vec<Token>,
    anchor: Option<String>,
}

impl Section {
    /// Build a section from raw heading and body text.
    #[must_use]
    pub fn new(level: u8, heading: &str, body: &str) -> Self {
        Self {
            level: level.clamp(1, 6),
            heading: lexer::tokenize(heading),
            body: lexer::tokenize(body),
            anchor: None,
        }
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    fn from_markdown(section: &MarkdownSection) -> Self {
        Self {
            level: section.level,
            heading: lexer::tokenize(&section.heading),
            body: lexer::tokenize(&section.body),
            anchor: section.anchor.clone(),
        }
    }

    #[must_use]
    pub fn level(&self) -> u8 {
        self.level
    }

    #[must_use]
    pub fn heading(&self) -> &[Token] {
        &self.heading
    }

    #[must_use]
    pub fn body(&self) -> &[Token] {
        &self.body
    }

    #[must_use]
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }
}

/// A parsed template.
///
/// Templates are immutable once parsed; [`crate::TemplateStore`] owns them
/// and hands out shared references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    id: String,
    kind: TemplateKind,
    description: Option<String>,
    target_anchor: Option<String>,
    declared: BTreeSet<String>,
    prompts: BTreeMap<String, String>,
    preamble: Vec<Token>,
    sections: Vec<Section>,
}

/// Listing entry for a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSummary {
    pub id: String,
    pub kind: TemplateKind,
    pub description: Option<String>,
    pub target_anchor: Option<String>,
    pub placeholders: Vec<String>,
}

impl Template {
    /// Build a document template programmatically.
    pub fn new(
        id: impl Into<String>,
        preamble: &str,
        sections: Vec<Section>,
    ) -> Result<Self, TemplateError> {
        let template = Self {
            id: id.into(),
            kind: TemplateKind::Document,
            description: None,
            target_anchor: None,
            declared: BTreeSet::new(),
            prompts: BTreeMap::new(),
            preamble: lexer::tokenize(preamble),
            sections,
        };
        template.validate()?;
        Ok(template)
    }

    /// Turn this template into an appendix targeting `anchor`.
    pub fn into_appendix(mut self, anchor: impl Into<String>) -> Result<Self, TemplateError> {
        self.kind = TemplateKind::Appendix;
        self.target_anchor = Some(anchor.into());
        self.validate()?;
        Ok(self)
    }

    /// Parse a template file.
    ///
    /// `default_id` is used when the front matter does not name the template,
    /// normally the file stem.
    pub fn parse(default_id: &str, source: &str) -> Result<Self, TemplateError> {
        let invalid = |id: &str, reason: String| TemplateError::Invalid {
            id: id.to_string(),
            reason,
        };

        let (yaml, body) = markdown::split_front_matter(source);
        let front: FrontMatter = match yaml {
            Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml)
                .map_err(|e| invalid(default_id, format!("front matter: {e}")))?,
            _ => FrontMatter::default(),
        };

        let id = front.id.unwrap_or_else(|| default_id.to_string());
        let doc = markdown::split_sections(body).map_err(|e| invalid(&id, e.to_string()))?;

        for key in &front.placeholders {
            if !lexer::is_valid_key(key) {
                return Err(invalid(&id, format!("declared placeholder '{key}' is not a valid key")));
            }
        }

        let template = Self {
            id,
            kind: front.kind,
            description: front.description,
            target_anchor: front.target_anchor,
            declared: front.placeholders.into_iter().collect(),
            prompts: front.prompts,
            preamble: lexer::tokenize(&doc.preamble),
            sections: doc.sections.iter().map(Section::from_markdown).collect(),
        };
        template.validate()?;
        Ok(template)
    }

    fn validate(&self) -> Result<(), TemplateError> {
        let invalid = |reason: String| TemplateError::Invalid {
            id: self.id.clone(),
            reason,
        };

        if self.id.is_empty() || !lexer::is_valid_key(&self.id) {
            return Err(invalid(format!("'{}' is not a valid template id", self.id)));
        }

        match (self.kind, &self.target_anchor) {
            (TemplateKind::Appendix, None) => {
                return Err(invalid("appendix templates must set target_anchor".to_string()));
            }
            (TemplateKind::Document, Some(_)) => {
                return Err(invalid(
                    "target_anchor is only valid for appendix templates".to_string(),
                ));
            }
            _ => {}
        }

        let mut anchors = BTreeSet::new();
        for section in &self.sections {
            if !(1..=6).contains(&section.level) {
                return Err(invalid(format!("heading level {} out of range", section.level)));
            }
            if let Some(anchor) = &section.anchor
                && !anchors.insert(anchor.as_str())
            {
                return Err(invalid(format!("anchor '{anchor}' is declared more than once")));
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn target_anchor(&self) -> Option<&str> {
        self.target_anchor.as_deref()
    }

    #[must_use]
    pub fn preamble(&self) -> &[Token] {
        &self.preamble
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Prompt text shown when asking the user for `key`.
    #[must_use]
    pub fn prompt_for(&self, key: &str) -> Option<&str> {
        self.prompts.get(key).map(String::as_str)
    }

    /// Anchors declared by this template, in document order.
    #[must_use]
    pub fn anchors(&self) -> Vec<&str> {
        self.sections.iter().filter_map(Section::anchor).collect()
    }

    fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.preamble.iter().chain(
            self.sections
                .iter()
                .flat_map(|s| s.heading.iter().chain(s.body.iter())),
        )
    }

    /// Every placeholder key referenced anywhere in the template.
    #[must_use]
    pub fn placeholders(&self) -> BTreeSet<String> {
        self.tokens()
            .filter_map(Token::key)
            .map(str::to_string)
            .collect()
    }

    /// Keys with at least one required (`{key}`) occurrence.
    #[must_use]
    pub fn required_placeholders(&self) -> BTreeSet<String> {
        self.tokens()
            .filter_map(|token| match token {
                Token::Placeholder {
                    key,
                    optional: false,
                } => Some(key.clone()),
                _ => None,
            })
            .collect()
    }

    /// Declared keys the template body never references.
    #[must_use]
    pub fn unused_declared(&self) -> Vec<String> {
        let referenced = self.placeholders();
        self.declared
            .iter()
            .filter(|key| !referenced.contains(*key))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            id: self.id.clone(),
            kind: self.kind,
            description: self.description.clone(),
            target_anchor: self.target_anchor.clone(),
            placeholders: self.placeholders().into_iter().collect(),
        }
    }
}

/// Every placeholder key referenced by `template`, sorted.
#[must_use]
pub fn list_placeholders(template: &Template) -> Vec<String> {
    template.placeholders().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const APPENDIX: &str = "\
---
id: appendix_demo
kind: appendix
description: Demo appendix
target_anchor: auth
placeholders: [token_url, unused]
prompts:
  token_url: OAuth token endpoint
---
## OAuth flow
Tokens come from {token_url} for {api_name}.
Scopes: {scopes?}
";

    #[test]
    fn test_parse_front_matter_and_sections() {
        let template = Template::parse("fallback", APPENDIX).unwrap();
        assert_eq!(template.id(), "appendix_demo");
        assert_eq!(template.kind(), TemplateKind::Appendix);
        assert_eq!(template.target_anchor(), Some("auth"));
        assert_eq!(template.description(), Some("Demo appendix"));
        assert_eq!(template.prompt_for("token_url"), Some("OAuth token endpoint"));
        assert_eq!(template.sections().len(), 1);
        assert_eq!(template.sections()[0].level(), 2);
    }

    #[test]
    fn test_placeholder_sets() {
        let template = Template::parse("fallback", APPENDIX).unwrap();
        assert_eq!(
            list_placeholders(&template),
            vec!["api_name", "scopes", "token_url"]
        );
        assert_eq!(
            template.required_placeholders().into_iter().collect::<Vec<_>>(),
            vec!["api_name", "token_url"]
        );
        assert_eq!(template.unused_declared(), vec!["unused"]);
    }

    #[test]
    fn test_required_wins_over_optional_occurrence() {
        let template = Template::new(
            "t",
            "",
            vec![Section::new(1, "{name?}", "{name}")],
        )
        .unwrap();
        assert!(template.required_placeholders().contains("name"));
    }

    #[test]
    fn test_into_appendix_requires_valid_anchor() {
        let template = Template::new("extra", "", vec![Section::new(2, "Extra", "{api_name}")])
            .unwrap()
            .into_appendix("pagination")
            .unwrap();
        assert_eq!(template.kind(), TemplateKind::Appendix);
        assert_eq!(template.target_anchor(), Some("pagination"));
    }

    #[test]
    fn test_default_id_from_caller() {
        let template = Template::parse("research", "# Research {api_name}\n").unwrap();
        assert_eq!(template.id(), "research");
        assert_eq!(template.kind(), TemplateKind::Document);
    }

    #[test]
    fn test_appendix_without_anchor_is_invalid() {
        let err = Template::parse("x", "---\nkind: appendix\n---\n# A\n").unwrap_err();
        assert!(matches!(err, TemplateError::Invalid { .. }));
    }

    #[test]
    fn test_unknown_front_matter_key_is_invalid() {
        let err = Template::parse("x", "---\nbogus: 1\n---\n# A\n").unwrap_err();
        assert!(matches!(err, TemplateError::Invalid { ref reason, .. } if reason.contains("front matter")));
    }

    #[test]
    fn test_duplicate_anchor_is_invalid() {
        let err = Template::parse(
            "x",
            "# A\n<!-- anchor: a -->\n# B\n<!-- anchor: a -->\n",
        )
        .unwrap_err();
        assert!(matches!(err, TemplateError::Invalid { .. }));

        let err = Template::new(
            "x",
            "",
            vec![
                Section::new(1, "A", "").with_anchor("a"),
                Section::new(1, "B", "").with_anchor("a"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, TemplateError::Invalid { .. }));
    }

    #[test]
    fn test_invalid_declared_key() {
        let err = Template::parse("x", "---\nplaceholders: ['bad key']\n---\n# A\n").unwrap_err();
        assert!(matches!(err, TemplateError::Invalid { ref reason, .. } if reason.contains("bad key")));
    }

    #[test]
    fn test_anchors_in_document_order() {
        let template = Template::parse(
            "host",
            "# T\n## Auth\n<!-- anchor: auth -->\n## Retry\n<!-- anchor: retry -->\n",
        )
        .unwrap();
        assert_eq!(template.anchors(), vec!["auth", "retry"]);
    }
}
