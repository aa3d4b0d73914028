use context_log_sink::{event, fields, Level, LogConfig, LoggingState};

fn main() {
    let mut state = LoggingState::new();
    state
        .setup(LogConfig::new("demo-app").with_level(Level::Debug))
        .expect("set up logging");

    let log = state.get_logger("demo");
    log.info("console-only logging is active");
    log.debug_with("connection accepted", fields! { peer = "10.0.0.7:4431" });
    event!(log, Level::Warn, "queue depth is high", depth = 1042, limit = 1000);

    // Legacy printf-style call sites resolve to the same record shape.
    log.printf(
        Level::Info,
        "%s and %s land in the same sinks",
        &[serde_json::json!("structured"), serde_json::json!("legacy")],
    );
}
