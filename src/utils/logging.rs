//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Initialize logging on stderr.
///
/// `RUST_LOG` wins when set; otherwise verbosity maps 0/1/2+ to
/// info/debug/trace. `json` switches to line-delimited JSON output.
pub fn init(verbosity: u8, json: bool) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cutline={}", default_level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
