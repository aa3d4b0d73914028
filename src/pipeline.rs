use crate::config::LogConfig;
use crate::enrich::process_name;
use crate::record::{resolve_template, value_to_text, CallSite, FieldMap, RawRecord, EVENT_KEY};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

/// Bookkeeping keys consumed by their stage and never rendered.
pub const POSITIONAL_ARGS_KEY: &str = "positional_args";
pub const STACK_INFO_KEY: &str = "stack_info";
pub const EXC_INFO_KEY: &str = "exc_info";

/// One step of the shared transformation chain applied to every canonical
/// record before sink-specific rendering.
///
/// Stages are pure with respect to shared state: they only mutate the
/// in-flight field map. The raw record is passed alongside because the
/// early stages attach data (level, logger name, call site) that lives on
/// the record rather than in the field map.
pub trait Stage: Send + Sync {
    fn apply(&self, raw: &RawRecord, fields: &mut FieldMap);
}

/// Attach the lowercase severity label. Runs first so every later stage
/// can rely on `level` being present.
struct AddLogLevel;

impl Stage for AddLogLevel {
    fn apply(&self, raw: &RawRecord, fields: &mut FieldMap) {
        fields.insert(
            "level".to_string(),
            Value::String(raw.level.as_str().to_string()),
        );
    }
}

/// Attach the originating logger's name.
struct AddLoggerName;

impl Stage for AddLoggerName {
    fn apply(&self, raw: &RawRecord, fields: &mut FieldMap) {
        fields.insert("logger".to_string(), Value::String(raw.logger.clone()));
    }
}

/// Resolve any remaining template substitution carried in the field map.
///
/// Enrichment already resolves the legacy payload shape; this stage covers
/// call paths that merged a `positional_args` array into a structured
/// record instead. The key is consumed either way.
struct FormatPositionalArgs;

impl Stage for FormatPositionalArgs {
    fn apply(&self, _raw: &RawRecord, fields: &mut FieldMap) {
        let Some(args) = fields.remove(POSITIONAL_ARGS_KEY) else {
            return;
        };
        let Value::Array(args) = args else {
            return;
        };
        if let Some(Value::String(template)) = fields.get(EVENT_KEY) {
            let resolved = resolve_template(template, &args);
            fields.insert(EVENT_KEY.to_string(), Value::String(resolved));
        }
    }
}

/// Move captured backtrace text into the rendered `stack` field.
struct RenderStackInfo;

impl Stage for RenderStackInfo {
    fn apply(&self, _raw: &RawRecord, fields: &mut FieldMap) {
        if let Some(stack) = fields.remove(STACK_INFO_KEY) {
            fields.insert("stack".to_string(), Value::String(value_to_text(&stack)));
        }
    }
}

/// Stamp the current time in ISO-8601 with microsecond precision.
struct AddTimestamp;

impl Stage for AddTimestamp {
    fn apply(&self, _raw: &RawRecord, fields: &mut FieldMap) {
        fields.insert(
            "timestamp".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
    }
}

/// Render an attached error chain into the `exception` text field.
///
/// The chain arrives as an array of source messages, outermost first.
struct FormatException;

impl Stage for FormatException {
    fn apply(&self, _raw: &RawRecord, fields: &mut FieldMap) {
        let Some(info) = fields.remove(EXC_INFO_KEY) else {
            return;
        };
        let text = match info {
            Value::Array(parts) => parts
                .iter()
                .map(value_to_text)
                .collect::<Vec<_>>()
                .join("\ncaused by: "),
            other => value_to_text(&other),
        };
        fields.insert("exception".to_string(), Value::String(text));
    }
}

/// Guarantee every value reaching a renderer is valid decoded text.
///
/// Rust strings are UTF-8 by construction; values that crossed an OS
/// boundary were decoded lossily at capture. What remains here is coercing
/// a non-string event value to text so renderers can treat the message
/// field as a string unconditionally.
struct DecodeUnicode;

impl Stage for DecodeUnicode {
    fn apply(&self, _raw: &RawRecord, fields: &mut FieldMap) {
        if let Some(event) = fields.get(EVENT_KEY) {
            if !event.is_string() {
                let coerced = value_to_text(event);
                fields.insert(EVENT_KEY.to_string(), Value::String(coerced));
            }
        }
    }
}

/// Attach call-site parameters: module, file path, function name, line
/// number, process name and thread name. Only part of the pipeline when
/// call-site capture is enabled, and must run before the final rename so
/// renderers see the complete record.
struct AddCallsiteParams {
    process_name: String,
}

impl AddCallsiteParams {
    fn new() -> Self {
        Self {
            process_name: process_name(),
        }
    }
}

impl Stage for AddCallsiteParams {
    fn apply(&self, raw: &RawRecord, fields: &mut FieldMap) {
        fields.insert(
            "process_name".to_string(),
            Value::String(self.process_name.clone()),
        );
        let thread = std::thread::current();
        fields.insert(
            "thread_name".to_string(),
            Value::String(thread.name().unwrap_or("unnamed").to_string()),
        );

        let Some(CallSite {
            module,
            file,
            line,
            function,
        }) = raw.callsite
        else {
            return;
        };
        if let Some(module) = module {
            fields.insert("module".to_string(), Value::String(module.to_string()));
        }
        fields.insert("pathname".to_string(), Value::String(file.to_string()));
        fields.insert("lineno".to_string(), Value::from(line));
        if let Some(function) = function {
            let short = function.rsplit("::").next().unwrap_or(function);
            fields.insert("func_name".to_string(), Value::String(short.to_string()));
        }
    }
}

/// Rename the internal event key to the configured message-field name.
/// Always the last stage so every earlier stage sees a stable key.
struct RenameEvent {
    message_field: String,
}

impl Stage for RenameEvent {
    fn apply(&self, _raw: &RawRecord, fields: &mut FieldMap) {
        if self.message_field == EVENT_KEY {
            return;
        }
        if let Some(event) = fields.remove(EVENT_KEY) {
            fields.insert(self.message_field.clone(), event);
        }
    }
}

/// Ordered, fixed sequence of transformations shared by all sinks.
///
/// The order is load-bearing: call-site capture runs before the event
/// rename, and the rename runs last. Configuration only includes or
/// excludes the optional call-site stage; it never reorders.
pub struct ProcessorPipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl ProcessorPipeline {
    pub fn new(config: &LogConfig) -> Self {
        let mut stages: Vec<Box<dyn Stage>> = vec![
            Box::new(AddLogLevel),
            Box::new(AddLoggerName),
            Box::new(FormatPositionalArgs),
            Box::new(RenderStackInfo),
            Box::new(AddTimestamp),
            Box::new(FormatException),
            Box::new(DecodeUnicode),
        ];

        if config.add_call_info {
            stages.push(Box::new(AddCallsiteParams::new()));
        }

        stages.push(Box::new(RenameEvent {
            message_field: config.message_field.clone(),
        }));

        Self { stages }
    }

    /// Run every stage over `fields` in order.
    pub fn run(&self, raw: &RawRecord, fields: &mut FieldMap) {
        for stage in &self.stages {
            stage.apply(raw, fields);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Level, Payload};
    use serde_json::json;

    fn raw_with(callsite: Option<CallSite>) -> RawRecord {
        RawRecord {
            logger: "pipeline-test".to_string(),
            level: Level::Warn,
            payload: Payload::Structured(FieldMap::new()),
            callsite,
        }
    }

    fn event_fields(text: &str) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert(EVENT_KEY.to_string(), json!(text));
        fields
    }

    #[test]
    fn base_stages_attach_level_logger_and_timestamp() {
        let pipeline = ProcessorPipeline::new(&LogConfig::new("example-app"));
        let mut fields = event_fields("hello");

        pipeline.run(&raw_with(None), &mut fields);

        assert_eq!(fields["level"], json!("warn"));
        assert_eq!(fields["logger"], json!("pipeline-test"));
        let timestamp = fields["timestamp"].as_str().unwrap();
        assert!(timestamp.ends_with('Z'), "not ISO-8601 UTC: {timestamp}");
        assert_eq!(fields["message"], json!("hello"));
        assert!(!fields.contains_key(EVENT_KEY));
    }

    #[test]
    fn positional_args_are_resolved_and_consumed() {
        let pipeline = ProcessorPipeline::new(&LogConfig::new("example-app"));
        let mut fields = event_fields("%s and %s");
        fields.insert(POSITIONAL_ARGS_KEY.to_string(), json!(["A", "B"]));

        pipeline.run(&raw_with(None), &mut fields);

        assert_eq!(fields["message"], json!("A and B"));
        assert!(!fields.contains_key(POSITIONAL_ARGS_KEY));
    }

    #[test]
    fn exception_chain_is_rendered_to_text() {
        let pipeline = ProcessorPipeline::new(&LogConfig::new("example-app"));
        let mut fields = event_fields("db write failed");
        fields.insert(EXC_INFO_KEY.to_string(), json!(["io error", "disk full"]));

        pipeline.run(&raw_with(None), &mut fields);

        assert_eq!(
            fields["exception"],
            json!("io error\ncaused by: disk full")
        );
        assert!(!fields.contains_key(EXC_INFO_KEY));
    }

    #[test]
    fn stack_info_is_rendered_to_text() {
        let pipeline = ProcessorPipeline::new(&LogConfig::new("example-app"));
        let mut fields = event_fields("capturing a problem");
        fields.insert(STACK_INFO_KEY.to_string(), json!("frame 0\nframe 1"));

        pipeline.run(&raw_with(None), &mut fields);

        assert_eq!(fields["stack"], json!("frame 0\nframe 1"));
        assert!(!fields.contains_key(STACK_INFO_KEY));
    }

    #[test]
    fn non_string_event_is_coerced_to_text() {
        let pipeline = ProcessorPipeline::new(&LogConfig::new("example-app"));
        let mut fields = FieldMap::new();
        fields.insert(EVENT_KEY.to_string(), json!(42));

        pipeline.run(&raw_with(None), &mut fields);

        assert_eq!(fields["message"], json!("42"));
    }

    #[test]
    fn callsite_stage_is_excluded_by_default() {
        let pipeline = ProcessorPipeline::new(&LogConfig::new("example-app"));
        let callsite = CallSite {
            module: Some("example::module"),
            file: "src/example.rs",
            line: 42,
            function: Some("example::module::run"),
        };
        let mut fields = event_fields("hello");

        pipeline.run(&raw_with(Some(callsite)), &mut fields);

        assert!(!fields.contains_key("pathname"));
        assert!(!fields.contains_key("func_name"));
        assert!(!fields.contains_key("lineno"));
        assert!(!fields.contains_key("process_name"));
        assert!(!fields.contains_key("thread_name"));
    }

    #[test]
    fn callsite_stage_attaches_location_and_identity() {
        let config = LogConfig::new("example-app").with_call_info(true);
        let pipeline = ProcessorPipeline::new(&config);
        let callsite = CallSite {
            module: Some("example::module"),
            file: "src/example.rs",
            line: 42,
            function: Some("example::module::run"),
        };
        let mut fields = event_fields("hello");

        pipeline.run(&raw_with(Some(callsite)), &mut fields);

        assert_eq!(fields["module"], json!("example::module"));
        assert_eq!(fields["pathname"], json!("src/example.rs"));
        assert_eq!(fields["lineno"], json!(42));
        assert_eq!(fields["func_name"], json!("run"));
        assert!(fields["process_name"].is_string());
        assert!(fields["thread_name"].is_string());
    }

    #[test]
    fn message_field_rename_runs_last() {
        let config = LogConfig::new("example-app").with_message_field("msg");
        let pipeline = ProcessorPipeline::new(&config);
        let mut fields = event_fields("renamed");

        pipeline.run(&raw_with(None), &mut fields);

        assert_eq!(fields["msg"], json!("renamed"));
        assert!(!fields.contains_key("message"));
        assert!(!fields.contains_key(EVENT_KEY));
    }
}
