use std::sync::Arc;

use crate::config::LogConfig;
use crate::console::ConsoleSink;
use crate::enrich::ContextEnrichment;
use crate::error::SetupError;
use crate::file::FileSink;
use crate::pipeline::ProcessorPipeline;
use crate::sink::Sink;

/// Build the sink set for the active configuration.
///
/// The console sink is always created; the rotating-file sink only when a
/// file path is configured. Each sink gets its own [`ContextEnrichment`]
/// instance while both share the single pipeline built from the same
/// configuration. Any construction error is fatal: the caller installs
/// either the complete set or nothing.
pub fn build_sinks(
    config: &LogConfig,
    pipeline: Arc<ProcessorPipeline>,
) -> Result<Vec<Arc<dyn Sink>>, SetupError> {
    let mut sinks: Vec<Arc<dyn Sink>> = Vec::new();

    let console = ConsoleSink::stdout(
        config,
        ContextEnrichment::new(&config.application)?,
        Arc::clone(&pipeline),
    );
    sinks.push(Arc::new(console));

    if let Some(path) = &config.file_path {
        let file = FileSink::create(
            config,
            path,
            ContextEnrichment::new(&config.application)?,
            pipeline,
        )?;
        sinks.push(Arc::new(file));
    }

    Ok(sinks)
}
