use crate::config::LogConfig;
use crate::enrich::ContextEnrichment;
use crate::pipeline::ProcessorPipeline;
use crate::record::{value_to_text, FieldMap, Level, RawRecord};
use crate::sink::Sink;
use colored::Colorize;
use std::io::{IsTerminal, Write};
use std::sync::{Arc, Mutex};

/// Keys rendered in the fixed leading part of a console line and therefore
/// excluded from the trailing key=value section.
const LEADING_KEYS: [&str; 3] = ["timestamp", "level", "logger"];

/// Human-readable single-line renderer for the console sink.
///
/// Layout: timestamp, bracketed severity, event text, bracketed logger
/// name, then the remaining fields as sorted `key=value` pairs. Colors are
/// applied per element when the destination supports them.
pub struct ConsoleRenderer {
    message_field: String,
    color: bool,
}

impl ConsoleRenderer {
    pub fn new(message_field: impl Into<String>, color: bool) -> Self {
        Self {
            message_field: message_field.into(),
            color,
        }
    }

    pub fn render(&self, fields: &FieldMap, level: Level) -> String {
        let timestamp = fields
            .get("timestamp")
            .map(value_to_text)
            .unwrap_or_default();
        let message = fields
            .get(&self.message_field)
            .map(value_to_text)
            .unwrap_or_default();
        let logger = fields.get("logger").map(value_to_text).unwrap_or_default();

        let level_label = format!("{:<8}", level.as_str());
        let mut line = if self.color {
            let level_label = match level {
                Level::Trace => level_label.magenta(),
                Level::Debug => level_label.blue(),
                Level::Info => level_label.green(),
                Level::Warn => level_label.yellow(),
                Level::Error => level_label.red().bold(),
            };
            format!(
                "{} [{}] {} [{}]",
                timestamp.dimmed(),
                level_label,
                message.bold(),
                logger.blue(),
            )
        } else {
            format!("{timestamp} [{level_label}] {message} [{logger}]")
        };

        for (key, value) in fields {
            if key == &self.message_field || LEADING_KEYS.contains(&key.as_str()) {
                continue;
            }
            let pair = if self.color {
                format!(" {}={}", key.cyan(), value_to_text(value))
            } else {
                format!(" {}={}", key, value_to_text(value))
            };
            line.push_str(&pair);
        }

        line
    }
}

/// Console implementation of [`Sink`] writing one line per record to the
/// standard output stream.
pub struct ConsoleSink {
    threshold: Level,
    enrich: ContextEnrichment,
    pipeline: Arc<ProcessorPipeline>,
    renderer: ConsoleRenderer,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    /// Sink writing to stdout, colorized when stdout is a terminal.
    pub fn stdout(
        config: &LogConfig,
        enrich: ContextEnrichment,
        pipeline: Arc<ProcessorPipeline>,
    ) -> Self {
        let color = std::io::stdout().is_terminal();
        Self::with_writer(config, enrich, pipeline, Box::new(std::io::stdout()), color)
    }

    /// Sink writing to an arbitrary destination. Used by tests to capture
    /// output in memory.
    pub fn with_writer(
        config: &LogConfig,
        enrich: ContextEnrichment,
        pipeline: Arc<ProcessorPipeline>,
        writer: Box<dyn Write + Send>,
        color: bool,
    ) -> Self {
        Self {
            threshold: config.level,
            enrich,
            pipeline,
            renderer: ConsoleRenderer::new(config.message_field.clone(), color),
            writer: Mutex::new(writer),
        }
    }
}

impl Sink for ConsoleSink {
    fn threshold(&self) -> Level {
        self.threshold
    }

    fn submit(&self, raw: &RawRecord) {
        if raw.level < self.threshold {
            return;
        }

        let mut fields = self.enrich.apply(raw);
        self.pipeline.run(raw, &mut fields);
        let mut line = self.renderer.render(&fields, raw.level);
        line.push('\n');

        // Single write_all so interleaved threads never split a line.
        let result = match self.writer.lock() {
            Ok(mut writer) => writer.write_all(line.as_bytes()),
            Err(_) => return,
        };
        if let Err(e) = result {
            eprintln!("console sink write failed: {}", e);
        }
    }
}
