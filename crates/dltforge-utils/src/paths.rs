use camino::{Utf8Path, Utf8PathBuf};

/// Name of the per-project dltforge directory.
pub const PROJECT_DIR_NAME: &str = ".dltforge";

/// Configuration file name inside [`PROJECT_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory holding one workflow state file per API.
pub const STATE_DIR_NAME: &str = "state";

/// `<root>/.dltforge`
#[must_use]
pub fn project_dir(root: &Utf8Path) -> Utf8PathBuf {
    root.join(PROJECT_DIR_NAME)
}

/// `<root>/.dltforge/config.toml`
#[must_use]
pub fn config_path(root: &Utf8Path) -> Utf8PathBuf {
    project_dir(root).join(CONFIG_FILE_NAME)
}

/// `<root>/.dltforge/state`
#[must_use]
pub fn state_dir(root: &Utf8Path) -> Utf8PathBuf {
    project_dir(root).join(STATE_DIR_NAME)
}

/// `<root>/.dltforge/state/<api_name>.json`
#[must_use]
pub fn state_path(root: &Utf8Path, api_name: &str) -> Utf8PathBuf {
    state_dir(root).join(format!("{api_name}.json"))
}

/// Join `path` onto `root` unless it is already absolute.
#[must_use]
pub fn resolve_against(root: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_path_layout() {
        let root = Utf8Path::new("/work/project");
        assert_eq!(
            state_path(root, "github"),
            Utf8PathBuf::from("/work/project/.dltforge/state/github.json")
        );
        assert_eq!(
            config_path(root),
            Utf8PathBuf::from("/work/project/.dltforge/config.toml")
        );
    }

    #[test]
    fn test_resolve_against_keeps_absolute_paths() {
        let root = Utf8Path::new("/work");
        assert_eq!(
            resolve_against(root, Utf8Path::new("specs/a.md")),
            Utf8PathBuf::from("/work/specs/a.md")
        );
        assert_eq!(
            resolve_against(root, Utf8Path::new("/tmp/a.md")),
            Utf8PathBuf::from("/tmp/a.md")
        );
    }
}
