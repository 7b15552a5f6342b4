//! Logging infrastructure for dltforge
//!
//! Structured logging via `tracing`. Library crates emit events with
//! `api_name`, `phase` and `template` fields; the CLI installs the
//! subscriber once at startup.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Default filter when `RUST_LOG` is unset.
#[must_use]
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "dltforge=debug,dltforge_engine=debug,dltforge_templates=debug,info"
    } else {
        "dltforge=info,dltforge_engine=info,dltforge_templates=info,warn"
    }
}

/// Initialize the tracing subscriber.
///
/// Logs go to stderr so that command output on stdout stays parseable.
/// Verbose mode adds targets and span close events.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .without_time()
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Span wrapping a single command invocation.
pub fn command_span(command: &str, api_name: Option<&str>) -> tracing::Span {
    tracing::info_span!(
        "command",
        command = %command,
        api_name = %api_name.unwrap_or("-"),
    )
}
