use tracing_subscriber::EnvFilter;

use crate::args::GlobalArgs;

/// Install the global subscriber: fmt layer to stderr, level from the
/// verbosity flags unless `RUST_LOG` overrides it.
pub fn init(args: &GlobalArgs) {
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
