//! Logging setup for the peco CLI.
//!
//! Logs go to stderr so `peco plan` output on stdout stays machine-readable.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "peco_plan=debug,peco_cli=debug";
const QUIET_FILTER: &str = "peco_plan=error,peco_cli=error";
const DEFAULT_FILTER: &str = "peco_plan=info,peco_cli=info";

/// Pick the filter directives for the global flags.
///
/// `--verbose` wins over `--quiet`; with neither, `RUST_LOG` is honoured.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}
