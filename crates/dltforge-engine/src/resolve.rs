//! Placeholder resolution
//!
//! Resolution scans every token of a template before substituting anything,
//! so all unbound required keys are reported in one
//! [`ResolveError::MissingBindings`]. Substituted values are inserted
//! verbatim and never re-scanned for placeholders. Values that would add an
//! anchor marker or leave a code fence open in a body are rejected, since the
//! written spec is parsed again for every appendix merge.

use serde::Serialize;
use std::collections::BTreeSet;

use dltforge_templates::{MarkdownSection, Template, Token, structural_conflict, tokenize};
use dltforge_utils::error::ResolveError;

use crate::bindings::Bindings;
use crate::document::ResolvedDocument;

/// A required key the caller still has to supply, with the prompt to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeedsInput {
    pub key: String,
    pub prompt: String,
}

fn missing_required<'a>(
    tokens: impl IntoIterator<Item = &'a Token>,
    bindings: &Bindings,
) -> BTreeSet<String> {
    tokens
        .into_iter()
        .filter_map(|token| match token {
            Token::Placeholder {
                key,
                optional: false,
            } if bindings.get(key).is_none() => Some(key.clone()),
            _ => None,
        })
        .collect()
}

fn substitute(tokens: &[Token], bindings: &Bindings) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Placeholder { key, .. } => out.push_str(bindings.get(key).unwrap_or_default()),
        }
    }
    out
}

fn check_body_values(template: &Template, bindings: &Bindings) -> Result<(), ResolveError> {
    let body_tokens = template
        .preamble()
        .iter()
        .chain(template.sections().iter().flat_map(|s| s.body().iter()));
    let keys: BTreeSet<&str> = body_tokens.filter_map(Token::key).collect();

    for key in keys {
        if let Some(reason) = bindings.get(key).and_then(structural_conflict) {
            return Err(ResolveError::UnsafeValue {
                template: template.id().to_string(),
                key: key.to_string(),
                reason,
            });
        }
    }
    Ok(())
}

fn template_tokens(template: &Template) -> impl Iterator<Item = &Token> {
    template.preamble().iter().chain(
        template
            .sections()
            .iter()
            .flat_map(|s| s.heading().iter().chain(s.body().iter())),
    )
}

/// Resolve every placeholder in `template`.
///
/// Optional placeholders that are unbound resolve to the empty string.
pub fn resolve(template: &Template, bindings: &Bindings) -> Result<ResolvedDocument, ResolveError> {
    let missing = missing_required(template_tokens(template), bindings);
    if !missing.is_empty() {
        return Err(ResolveError::MissingBindings {
            template: template.id().to_string(),
            keys: missing.into_iter().collect(),
        });
    }

    check_body_values(template, bindings)?;

    for key in template.unused_declared() {
        tracing::warn!(
            template = %template.id(),
            key = %key,
            "Declared placeholder is never referenced"
        );
    }

    let referenced = template.placeholders();
    for key in bindings.keys().filter(|key| !referenced.contains(*key)) {
        tracing::debug!(template = %template.id(), key = %key, "Binding not used by template");
    }

    let sections = template
        .sections()
        .iter()
        .map(|section| MarkdownSection {
            level: section.level(),
            heading: substitute(section.heading(), bindings).replace(['\r', '\n'], " "),
            anchor: section.anchor().map(str::to_string),
            body: substitute(section.body(), bindings),
        })
        .collect();

    tracing::debug!(template = %template.id(), "Resolved template");

    Ok(ResolvedDocument {
        preamble: substitute(template.preamble(), bindings),
        sections,
    })
}

/// Resolve a single line of template text, such as an output path pattern.
///
/// `name` identifies the text in errors.
pub fn resolve_text(name: &str, text: &str, bindings: &Bindings) -> Result<String, ResolveError> {
    let tokens = tokenize(text);
    let missing = missing_required(&tokens, bindings);
    if !missing.is_empty() {
        return Err(ResolveError::MissingBindings {
            template: name.to_string(),
            keys: missing.into_iter().collect(),
        });
    }
    Ok(substitute(&tokens, bindings))
}

/// Required keys of `template` that `bindings` does not supply, sorted.
#[must_use]
pub fn needs_input(template: &Template, bindings: &Bindings) -> Vec<NeedsInput> {
    missing_required(template_tokens(template), bindings)
        .into_iter()
        .map(|key| {
            let prompt = template
                .prompt_for(&key)
                .map_or_else(|| format!("Value for '{key}'"), str::to_string);
            NeedsInput { key, prompt }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dltforge_templates::Section;

    fn spec_template() -> Template {
        Template::parse(
            "spec_main",
            "---\nprompts:\n  base_url: Base URL of the API\n---\n\
             # {api_name} spec\nDate: {date}\n## Source\n<!-- anchor: source -->\n\
             client = {\"base_url\": \"{base_url}\"}\nNotes: {notes?}\n",
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_substitutes_all_keys() {
        let bindings = Bindings::new()
            .with("api_name", "github")
            .with("date", "2026-01-26")
            .with("base_url", "https://api.github.com");
        let doc = resolve(&spec_template(), &bindings).unwrap();
        assert_eq!(doc.headings(), vec!["github spec", "Source"]);
        assert_eq!(doc.sections[0].body, "Date: 2026-01-26\n");
        assert_eq!(
            doc.sections[1].body,
            "client = {\"base_url\": \"https://api.github.com\"}\nNotes: \n"
        );
        assert_eq!(doc.sections[1].anchor.as_deref(), Some("source"));
    }

    #[test]
    fn test_missing_keys_are_batched_and_sorted() {
        let bindings = Bindings::new().with("date", "2026-01-26");
        let err = resolve(&spec_template(), &bindings).unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingBindings {
                template: "spec_main".to_string(),
                keys: vec!["api_name".to_string(), "base_url".to_string()],
            }
        );
    }

    #[test]
    fn test_missing_sentinel_counts_as_unbound() {
        let mut bindings = Bindings::new()
            .with("api_name", "github")
            .with("date", "2026-01-26");
        bindings.mark_missing("base_url");
        let err = resolve(&spec_template(), &bindings).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::MissingBindings { ref keys, .. } if keys == &["base_url"]
        ));
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let template = Template::new("t", "", vec![Section::new(1, "T", "{a}")]).unwrap();
        let bindings = Bindings::new().with("a", "{b}");
        let doc = resolve(&template, &bindings).unwrap();
        assert_eq!(doc.sections[0].body, "{b}");
    }

    #[test]
    fn test_multi_line_values_cannot_inject_structure() {
        let bindings = Bindings::new()
            .with("api_name", "github")
            .with("date", "2026-01-26")
            .with("base_url", "https://x")
            .with("notes", "see below\n<!-- anchor: auth -->\n");
        let err = resolve(&spec_template(), &bindings).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnsafeValue { ref key, .. } if key == "notes"
        ));

        let bindings = bindings.with("notes", "```python\nclient = RESTClient()");
        assert!(matches!(
            resolve(&spec_template(), &bindings),
            Err(ResolveError::UnsafeValue { .. })
        ));

        let bindings = bindings.with("notes", "```python\nclient = RESTClient()\n```");
        let doc = resolve(&spec_template(), &bindings).unwrap();
        assert!(doc.sections[1].body.contains("RESTClient()"));
    }

    #[test]
    fn test_output_path_scenario() {
        let bindings = Bindings::new()
            .with("api_name", "github")
            .with("date", "2026-01-26");
        assert_eq!(
            resolve_text(
                "path",
                "specs/{date}_011_spec_dlt_rest_client_{api_name}.md",
                &bindings
            )
            .unwrap(),
            "specs/2026-01-26_011_spec_dlt_rest_client_github.md"
        );
    }

    #[test]
    fn test_needs_input_uses_prompts() {
        let bindings = Bindings::new().with("api_name", "github");
        let needed = needs_input(&spec_template(), &bindings);
        assert_eq!(
            needed,
            vec![
                NeedsInput {
                    key: "base_url".to_string(),
                    prompt: "Base URL of the API".to_string(),
                },
                NeedsInput {
                    key: "date".to_string(),
                    prompt: "Value for 'date'".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_declared_but_unused_is_not_required() {
        let template = Template::parse(
            "t",
            "---\nplaceholders: [api_name, never_used]\n---\n# {api_name}\n",
        )
        .unwrap();
        let bindings = Bindings::new().with("api_name", "github");
        assert!(resolve(&template, &bindings).is_ok());
    }
}
