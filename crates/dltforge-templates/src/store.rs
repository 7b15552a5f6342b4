use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;

use dltforge_utils::error::{ForgeError, TemplateError};

use crate::template::{Template, TemplateSummary};

/// Template id of the research document.
pub const RESEARCH_TEMPLATE: &str = "research";

/// Template id of the main dlt REST client spec.
pub const SPEC_MAIN_TEMPLATE: &str = "spec_main";

/// Templates compiled into the binary.
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (RESEARCH_TEMPLATE, include_str!("../templates/research.md")),
    (SPEC_MAIN_TEMPLATE, include_str!("../templates/spec_main.md")),
    (
        "appendix_auth",
        include_str!("../templates/appendix_auth.md"),
    ),
    (
        "appendix_pagination",
        include_str!("../templates/appendix_pagination.md"),
    ),
    (
        "appendix_incremental",
        include_str!("../templates/appendix_incremental.md"),
    ),
    (
        "appendix_retry",
        include_str!("../templates/appendix_retry.md"),
    ),
];

/// Where a registered template came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOrigin {
    Builtin,
    File(Utf8PathBuf),
    Programmatic,
}

impl std::fmt::Display for TemplateOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin => f.write_str("builtin"),
            Self::File(path) => write!(f, "{path}"),
            Self::Programmatic => f.write_str("programmatic"),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    template: Template,
    origin: TemplateOrigin,
}

/// Registry of templates keyed by id.
///
/// Loaded once at startup; lookups hand out shared references.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    entries: BTreeMap<String, Entry>,
}

impl TemplateStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the built-in templates.
    pub fn builtin() -> Result<Self, TemplateError> {
        let mut store = Self::new();
        for (id, source) in BUILTIN_TEMPLATES {
            let template = Template::parse(id, source)?;
            store.register(template, TemplateOrigin::Builtin);
        }
        Ok(store)
    }

    /// Built-in templates overlaid with every `*.md` file in `dir`.
    ///
    /// A file whose id matches a built-in template replaces it.
    pub fn with_dir(dir: &Utf8Path) -> Result<Self, ForgeError> {
        let mut store = Self::builtin()?;
        store.load_dir(dir)?;
        Ok(store)
    }

    /// Load every `*.md` file in `dir`, returning how many were loaded.
    pub fn load_dir(&mut self, dir: &Utf8Path) -> Result<usize, ForgeError> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir.as_std_path())? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "md")
                && path.is_file()
                && let Ok(utf8) = Utf8PathBuf::from_path_buf(path)
            {
                paths.push(utf8);
            }
        }
        paths.sort();

        for path in &paths {
            let stem = path.file_stem().unwrap_or_default();
            let source = std::fs::read_to_string(path.as_std_path())?;
            let template = Template::parse(stem, &source)?;
            let id = template.id().to_string();
            if let Some(previous) = self.register(template, TemplateOrigin::File(path.clone())) {
                tracing::info!(template = %id, path = %path, "Template overrides {previous}");
            } else {
                tracing::debug!(template = %id, path = %path, "Loaded template");
            }
        }

        Ok(paths.len())
    }

    /// Register a template, returning the origin of any template it replaced.
    pub fn register(&mut self, template: Template, origin: TemplateOrigin) -> Option<TemplateOrigin> {
        let id = template.id().to_string();
        self.entries
            .insert(id, Entry { template, origin })
            .map(|previous| previous.origin)
    }

    /// Look up a template by id.
    pub fn load(&self, id: &str) -> Result<&Template, TemplateError> {
        self.entries
            .get(id)
            .map(|entry| &entry.template)
            .ok_or_else(|| TemplateError::NotFound {
                id: id.to_string(),
                available: self.ids(),
            })
    }

    #[must_use]
    pub fn origin(&self, id: &str) -> Option<&TemplateOrigin> {
        self.entries.get(id).map(|entry| &entry.origin)
    }

    /// Registered ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Summaries of every registered template, sorted by id.
    #[must_use]
    pub fn list(&self) -> Vec<TemplateSummary> {
        self.entries
            .values()
            .map(|entry| entry.template.summary())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Raw source of a built-in template.
#[must_use]
pub fn builtin_source(id: &str) -> Option<&'static str> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|(builtin_id, _)| *builtin_id == id)
        .map(|(_, source)| *source)
}
