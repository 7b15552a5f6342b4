//! Document generation and appendix merging against the filesystem.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

use dltforge_templates::{Template, TemplateKind, TemplateStore};
use dltforge_utils::atomic_write::{read_file_with_crlf_tolerance, write_file_atomic};
use dltforge_utils::canonicalization::content_hash;
use dltforge_utils::error::TemplateError;

use crate::append::append;
use crate::bindings::Bindings;
use crate::document::ResolvedDocument;
use crate::resolve::resolve;

/// A document written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenDocument {
    pub path: Utf8PathBuf,
    pub blake3: String,
    pub bytes_written: usize,
    pub sections: usize,
}

fn write_document(path: &Utf8Path, doc: &ResolvedDocument) -> Result<WrittenDocument> {
    let content = doc.render();
    let result = write_file_atomic(path, &content)?;
    for warning in &result.warnings {
        tracing::warn!(path = %path, "{warning}");
    }
    Ok(WrittenDocument {
        path: path.to_path_buf(),
        blake3: content_hash(&content),
        bytes_written: result.bytes_written,
        sections: doc.sections.len(),
    })
}

/// Resolve document template `template_id` and write it to `path`.
pub fn generate_document(
    store: &TemplateStore,
    template_id: &str,
    bindings: &Bindings,
    path: &Utf8Path,
) -> Result<WrittenDocument> {
    let template = store.load(template_id)?;
    if template.kind() != TemplateKind::Document {
        return Err(TemplateError::Invalid {
            id: template_id.to_string(),
            reason: "appendix templates cannot be written as standalone documents".to_string(),
        }
        .into());
    }

    let doc = resolve(template, bindings)?;
    let written = write_document(path, &doc)?;
    tracing::info!(
        template = %template_id,
        path = %written.path,
        sections = written.sections,
        "Document written"
    );
    Ok(written)
}

fn appendix_anchor(template: &Template) -> Result<&str, TemplateError> {
    match (template.kind(), template.target_anchor()) {
        (TemplateKind::Appendix, Some(anchor)) => Ok(anchor),
        _ => Err(TemplateError::Invalid {
            id: template.id().to_string(),
            reason: "not an appendix template with a target_anchor".to_string(),
        }),
    }
}

/// Resolve appendix `appendix_id` and merge it into the document at `path`.
///
/// The host is re-read from disk, so earlier merges are preserved.
pub fn merge_appendix(
    store: &TemplateStore,
    appendix_id: &str,
    bindings: &Bindings,
    path: &Utf8Path,
) -> Result<WrittenDocument> {
    let template = store.load(appendix_id)?;
    let anchor = appendix_anchor(template)?;

    let text = read_file_with_crlf_tolerance(path)
        .with_context(|| format!("Failed to read main spec for appendix '{appendix_id}'"))?;
    let host = ResolvedDocument::parse(path.as_str(), &text)?;
    let resolved = resolve(template, bindings)?;
    let merged = append(&host, &resolved, anchor)?;

    let written = write_document(path, &merged)?;
    tracing::info!(
        template = %appendix_id,
        anchor = %anchor,
        path = %written.path,
        "Appendix merged"
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dltforge_templates::SPEC_MAIN_TEMPLATE;
    use dltforge_utils::error::{AppendError, ResolveError};
    use tempfile::TempDir;

    fn spec_bindings() -> Bindings {
        Bindings::new()
            .with("api_name", "github")
            .with("date", "2026-01-26")
            .with("destination", "duckdb")
            .with("base_url", "https://api.github.com")
    }

    #[test]
    fn test_generate_and_merge_builtin_spec() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap();
        let path = dir.join("specs/spec.md");
        let store = TemplateStore::builtin().unwrap();

        let written =
            generate_document(&store, SPEC_MAIN_TEMPLATE, &spec_bindings(), &path).unwrap();
        let before = written.sections;
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("<!-- anchor: pagination -->"));
        assert!(text.contains("https://api.github.com"));

        let merged = merge_appendix(&store, "appendix_pagination", &spec_bindings(), &path).unwrap();
        assert!(merged.sections > before);
        assert_ne!(merged.blake3, written.blake3);

        let doc = ResolvedDocument::parse(path.as_str(), &std::fs::read_to_string(&path).unwrap())
            .unwrap();
        let headings = doc.headings();
        let pagination = headings.iter().position(|h| *h == "Pagination").unwrap();
        assert_eq!(headings[pagination + 1], "Appendix: Mixed Pagination");
        assert_eq!(headings[pagination + 3], "Resource Override");
        assert_eq!(headings[pagination + 4], "Incremental Loading");
    }

    #[test]
    fn test_generate_reports_missing_base_url() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap();
        let store = TemplateStore::builtin().unwrap();
        let bindings = Bindings::new()
            .with("api_name", "github")
            .with("date", "2026-01-26")
            .with("destination", "duckdb");

        let err = generate_document(&store, SPEC_MAIN_TEMPLATE, &bindings, &dir.join("s.md"))
            .unwrap_err();
        let resolve_err = err.downcast_ref::<ResolveError>().unwrap();
        assert_eq!(
            resolve_err,
            &ResolveError::MissingBindings {
                template: SPEC_MAIN_TEMPLATE.to_string(),
                keys: vec!["base_url".to_string()],
            }
        );
        assert!(!dir.join("s.md").exists());
    }

    #[test]
    fn test_merge_into_document_without_anchor_fails() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap();
        let path = dir.join("plain.md");
        std::fs::write(&path, "# Plain\n## Section\n").unwrap();
        let store = TemplateStore::builtin().unwrap();

        let err = merge_appendix(&store, "appendix_auth", &spec_bindings(), &path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppendError>(),
            Some(AppendError::AnchorNotFound { anchor, .. }) if anchor == "auth"
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Plain\n## Section\n");
    }

    #[test]
    fn test_appendix_cannot_be_generated_standalone() {
        let temp = TempDir::new().unwrap();
        let dir = Utf8Path::from_path(temp.path()).unwrap();
        let store = TemplateStore::builtin().unwrap();
        let err = generate_document(&store, "appendix_auth", &spec_bindings(), &dir.join("a.md"))
            .unwrap_err();
        assert!(err.downcast_ref::<TemplateError>().is_some());
    }
}
