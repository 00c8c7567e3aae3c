use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Logs go to stderr; stdout carries the converted batch.
pub fn init_cli_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .try_init();
}
