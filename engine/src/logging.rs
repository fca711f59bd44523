use tracing::Level;

/// Install a stderr `tracing` subscriber. `verbosity` counts `-v` flags:
/// 0 → warn, 1 → info, 2 → debug, more → trace. Safe to call twice.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
