use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::config::LogConfig;
use crate::error::SetupError;
use crate::factory;
use crate::logger::Logger;
use crate::pipeline::ProcessorPipeline;
use crate::record::RawRecord;
use crate::sink::Sink;

/// Fan-out point between loggers and the installed sink set.
///
/// The set is held behind an atomic pointer swap so ordinary log calls
/// read it lock-free while `setup`/`cleanup` replace it wholesale. There
/// is deliberately no finer-grained locking: a record racing a
/// reconfiguration lands in either the old or the new set, never in a
/// half-installed one.
pub struct DispatchRoot {
    sinks: ArcSwap<Vec<Arc<dyn Sink>>>,
}

impl DispatchRoot {
    fn new() -> Self {
        Self {
            sinks: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Hand `raw` to every installed sink. Thresholds are applied by the
    /// sinks themselves.
    pub fn dispatch(&self, raw: &RawRecord) {
        for sink in self.sinks.load().iter() {
            sink.submit(raw);
        }
    }

    fn install(&self, sinks: Vec<Arc<dyn Sink>>) {
        self.sinks.store(Arc::new(sinks));
    }

    /// Number of currently installed sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.load().len()
    }
}

/// Owner of the active logging configuration.
///
/// Holds the installed sink set and the shared pipeline configuration,
/// with `setup` and `cleanup` as its only mutators. One instance is meant
/// to live at the process entry point for the lifetime of the process;
/// reconfiguration is a whole-state swap, so re-running `setup` any number
/// of times leaves exactly the sinks of the most recent call installed.
///
/// Calling `setup` concurrently with steady-state logging is the caller's
/// responsibility to avoid: records dispatched during the swap land in
/// either the outgoing or the incoming sink set.
pub struct LoggingState {
    root: Arc<DispatchRoot>,
    active: Option<LogConfig>,
}

impl LoggingState {
    pub fn new() -> Self {
        Self {
            root: Arc::new(DispatchRoot::new()),
            active: None,
        }
    }

    /// Install the sinks described by `config`, replacing any previously
    /// installed configuration.
    ///
    /// **Effects**
    /// - Emits a stderr advisory when overwriting an existing
    ///   configuration, unless suppressed via `warn_on_overwrite`.
    /// - Tears down the previous sink set before constructing the new
    ///   one.
    /// - On the first call, claims the `log` facade so printf-style call
    ///   sites reach the same sinks (with the `log-bridge` feature).
    ///
    /// **Returns**
    /// - `Err(..)` if hostname resolution fails or the file destination
    ///   cannot be prepared; no sinks are installed in that case.
    pub fn setup(&mut self, config: LogConfig) -> Result<(), SetupError> {
        if self.active.is_some() && config.warn_on_overwrite {
            eprintln!("logging has already been set up, overwriting existing configuration");
        }
        self.cleanup();

        let pipeline = Arc::new(ProcessorPipeline::new(&config));
        let sinks = factory::build_sinks(&config, pipeline)?;
        self.root.install(sinks);

        #[cfg(feature = "log-bridge")]
        crate::bridge::install(Arc::clone(&self.root), config.level);

        self.active = Some(config);
        Ok(())
    }

    /// Remove every sink this instance registered. Safe to call on an
    /// already-clean state.
    pub fn cleanup(&mut self) {
        self.root.install(Vec::new());
        self.active = None;
    }

    /// Handle for producing records under `name`, bound to this state's
    /// dispatch root. Cheap to create and to clone.
    pub fn get_logger(&self, name: impl Into<String>) -> Logger {
        Logger::new(name, Arc::clone(&self.root))
    }

    pub fn is_configured(&self) -> bool {
        self.active.is_some()
    }

    /// Number of currently installed sinks. Reconfiguration keeps this at
    /// the count produced by the most recent `setup`, no matter how many
    /// times `setup` ran.
    pub fn sink_count(&self) -> usize {
        self.root.sink_count()
    }
}

impl Default for LoggingState {
    fn default() -> Self {
        Self::new()
    }
}
