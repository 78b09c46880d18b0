//! Logging setup

use tracing_subscriber::EnvFilter;

const MOLE_CRATES: [&str; 6] = ["mole", "mole_core", "mole_fetch", "mole_rag", "mole_llm", "mole_cli"];

/// Directives used when `RUST_LOG` is not set
pub fn default_directives(verbose: bool) -> String {
    if verbose {
        let crates: Vec<String> = MOLE_CRATES.iter().map(|name| format!("{}=debug", name)).collect();
        format!("warn,{}", crates.join(","))
    } else {
        "warn".to_string()
    }
}

/// Install the global subscriber. Logs go to stderr so they never mix with
/// answers printed on stdout. Calling this twice is harmless.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
