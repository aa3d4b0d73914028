use std::sync::Arc;

use crate::record::{CallSite, Level, Payload, RawRecord};
use crate::state::DispatchRoot;

/// Forwards `log` facade call sites into the installed sink set, so
/// printf-style `log::info!` calls resolve to the same canonical records
/// as structured calls. The facade hands over its message already
/// substituted, which satisfies the resolve-exactly-once rule; target,
/// module and file/line map onto logger name and call site.
pub struct LegacyBridge {
    root: Arc<DispatchRoot>,
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => Level::Trace,
            log::Level::Debug => Level::Debug,
            log::Level::Info => Level::Info,
            log::Level::Warn => Level::Warn,
            log::Level::Error => Level::Error,
        }
    }
}

impl log::Log for LegacyBridge {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        // Thresholds are applied per sink.
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let callsite = match (record.file_static(), record.line()) {
            (Some(file), Some(line)) => Some(CallSite {
                module: record.module_path_static(),
                file,
                line,
                function: None,
            }),
            _ => None,
        };

        let raw = RawRecord {
            logger: record.target().to_string(),
            level: record.level().into(),
            payload: Payload::Legacy {
                template: record.args().to_string(),
                args: Vec::new(),
            },
            callsite,
        };
        self.root.dispatch(&raw);
    }

    fn flush(&self) {}
}

/// Claim the `log` facade for `root`.
///
/// The facade can only be claimed once per process; a later claim (a
/// second `LoggingState`, or another crate's logger) is a degraded
/// condition, not a setup failure, so the error is swallowed. Re-running
/// `setup` on the state that owns the facade keeps working because the
/// bridge reads the sink set through the shared root.
pub(crate) fn install(root: Arc<DispatchRoot>, level: Level) {
    let filter = match level {
        Level::Trace => log::LevelFilter::Trace,
        Level::Debug => log::LevelFilter::Debug,
        Level::Info => log::LevelFilter::Info,
        Level::Warn => log::LevelFilter::Warn,
        Level::Error => log::LevelFilter::Error,
    };
    log::set_max_level(filter);
    let _ = log::set_boxed_logger(Box::new(LegacyBridge { root }));
}
