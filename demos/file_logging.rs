use context_log_sink::{fields, LogConfig, LoggingState};

fn main() {
    let mut state = LoggingState::new();
    state
        .setup(
            LogConfig::new("demo-app")
                .with_file("logs/demo-app.log")
                .with_max_bytes(64 * 1024)
                .with_backup_count(3)
                .with_call_info(true),
        )
        .expect("set up logging");

    let log = state.get_logger("demo");
    for index in 0..1000 {
        log.info_with("writing to the rotating file", fields! { index = index });
    }

    println!("wrote logs/demo-app.log (rotated at 64 KiB, 3 backups kept)");
}
