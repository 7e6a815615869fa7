use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout stays clean for the rendered report.
/// `RUST_LOG` wins over the verbosity flag when set.
pub fn init(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
