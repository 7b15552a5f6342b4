use camino::Utf8PathBuf;

use dltforge_utils::error::ResolveError;

use crate::bindings::Bindings;
use crate::resolve::resolve_text;

/// Output path of the research document, relative to the output directory.
pub const RESEARCH_PATH_PATTERN: &str = "research/{date}_001_research_{api_name}.md";

/// Output path of the main spec, relative to the output directory.
pub const SPEC_PATH_PATTERN: &str = "specs/{date}_011_spec_dlt_rest_client_{api_name}.md";

/// `research/YYYY-MM-DD_001_research_{api_name}.md`
pub fn research_path(bindings: &Bindings) -> Result<Utf8PathBuf, ResolveError> {
    resolve_text("research output path", RESEARCH_PATH_PATTERN, bindings).map(Utf8PathBuf::from)
}

/// `specs/YYYY-MM-DD_011_spec_dlt_rest_client_{api_name}.md`
pub fn spec_path(bindings: &Bindings) -> Result<Utf8PathBuf, ResolveError> {
    resolve_text("spec output path", SPEC_PATH_PATTERN, bindings).map(Utf8PathBuf::from)
}
