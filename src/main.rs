use clap::Parser;
use msgrule::cli::{self, Cli};
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "MSGRULE_LOG";

fn main() {
    // handle broken pipe gracefully (e.g., when piping to `head` or `jq` that exits early)
    reset_sigpipe();
    init_logging();

    let cli = Cli::parse();

    if let Err(code) = cli::run(cli) {
        std::process::exit(code);
    }
}

/// log to stderr, filtered by MSGRULE_LOG (e.g. "msgrule=debug"), warn by default
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// reset SIGPIPE to default behavior (terminate process) instead of panicking
/// this is the standard Unix behavior for CLI tools
fn reset_sigpipe() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}
