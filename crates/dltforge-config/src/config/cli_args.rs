use camino::Utf8PathBuf;

/// CLI arguments for configuration override
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<Utf8PathBuf>,
    pub destination: Option<String>,
    pub output_dir: Option<String>,
    pub template_dir: Option<String>,
    pub verbose: Option<bool>,
}
