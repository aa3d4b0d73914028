use crate::config::LogConfig;
use crate::enrich::ContextEnrichment;
use crate::error::SetupError;
use crate::pipeline::ProcessorPipeline;
use crate::record::{FieldMap, Level, RawRecord};
use crate::rotate::RotatingFileWriter;
use crate::sink::Sink;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Newline-delimited JSON renderer for the file sink. Every canonical
/// field ends up in the object; nothing is stripped.
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn render(&self, fields: &FieldMap) -> String {
        serde_json::to_string(fields).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Rotating-file implementation of [`Sink`] writing one JSON object per
/// line, UTF-8, rotated at the configured byte threshold.
pub struct FileSink {
    threshold: Level,
    enrich: ContextEnrichment,
    pipeline: Arc<ProcessorPipeline>,
    renderer: JsonRenderer,
    // Single writer lock: concurrent threads never corrupt a line or
    // split a rotation.
    writer: Mutex<RotatingFileWriter>,
}

impl FileSink {
    /// Open the rotating destination at `path`, creating the containing
    /// directory first if absent.
    ///
    /// **Returns**
    /// - `Ok(..)` with the sink ready to receive records.
    /// - `Err(SetupError::CreateDirectory)` if the directory cannot be
    ///   created for a reason other than already existing.
    /// - `Err(SetupError::OpenLogFile)` if the destination cannot be
    ///   opened.
    pub fn create(
        config: &LogConfig,
        path: &Path,
        enrich: ContextEnrichment,
        pipeline: Arc<ProcessorPipeline>,
    ) -> Result<Self, SetupError> {
        if let Some(directory) = path.parent() {
            if !directory.as_os_str().is_empty() {
                std::fs::create_dir_all(directory).map_err(|source| {
                    SetupError::CreateDirectory {
                        path: directory.to_path_buf(),
                        source,
                    }
                })?;
            }
        }

        let writer = RotatingFileWriter::open(path, config.max_bytes, config.backup_count)
            .map_err(|source| SetupError::OpenLogFile {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            threshold: config.level,
            enrich,
            pipeline,
            renderer: JsonRenderer,
            writer: Mutex::new(writer),
        })
    }
}

impl Sink for FileSink {
    fn threshold(&self) -> Level {
        self.threshold
    }

    fn submit(&self, raw: &RawRecord) {
        if raw.level < self.threshold {
            return;
        }

        let mut fields = self.enrich.apply(raw);
        self.pipeline.run(raw, &mut fields);
        let mut line = self.renderer.render(&fields);
        line.push('\n');

        let result = match self.writer.lock() {
            Ok(mut writer) => writer.write_line(line.as_bytes()),
            Err(_) => return,
        };
        if let Err(e) = result {
            eprintln!("file sink write failed: {}", e);
        }
    }
}
