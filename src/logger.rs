use serde_json::Value;
use std::panic::Location;
use std::sync::Arc;

use crate::record::{CallSite, FieldMap, Level, Payload, RawRecord, EVENT_KEY};
use crate::state::DispatchRoot;

/// Named handle for producing records, bound to a dispatch root.
///
/// Cloning is cheap; clones share the root, so a logger created before a
/// reconfiguration keeps working against whatever sink set is installed
/// at the moment of each call.
#[derive(Clone)]
pub struct Logger {
    name: String,
    root: Arc<DispatchRoot>,
}

impl Logger {
    pub(crate) fn new(name: impl Into<String>, root: Arc<DispatchRoot>) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// General entry point: dispatch `payload` at `level` with an
    /// optionally captured call site. The capture macros route through
    /// here.
    pub fn log(&self, level: Level, payload: Payload, callsite: Option<CallSite>) {
        let raw = RawRecord {
            logger: self.name.clone(),
            level,
            payload,
            callsite,
        };
        self.root.dispatch(&raw);
    }

    #[track_caller]
    pub fn trace(&self, event: &str) {
        self.structured(Level::Trace, event, FieldMap::new(), Location::caller());
    }

    #[track_caller]
    pub fn debug(&self, event: &str) {
        self.structured(Level::Debug, event, FieldMap::new(), Location::caller());
    }

    #[track_caller]
    pub fn info(&self, event: &str) {
        self.structured(Level::Info, event, FieldMap::new(), Location::caller());
    }

    #[track_caller]
    pub fn warn(&self, event: &str) {
        self.structured(Level::Warn, event, FieldMap::new(), Location::caller());
    }

    #[track_caller]
    pub fn error(&self, event: &str) {
        self.structured(Level::Error, event, FieldMap::new(), Location::caller());
    }

    #[track_caller]
    pub fn trace_with(&self, event: &str, fields: FieldMap) {
        self.structured(Level::Trace, event, fields, Location::caller());
    }

    #[track_caller]
    pub fn debug_with(&self, event: &str, fields: FieldMap) {
        self.structured(Level::Debug, event, fields, Location::caller());
    }

    #[track_caller]
    pub fn info_with(&self, event: &str, fields: FieldMap) {
        self.structured(Level::Info, event, fields, Location::caller());
    }

    #[track_caller]
    pub fn warn_with(&self, event: &str, fields: FieldMap) {
        self.structured(Level::Warn, event, fields, Location::caller());
    }

    #[track_caller]
    pub fn error_with(&self, event: &str, fields: FieldMap) {
        self.structured(Level::Error, event, fields, Location::caller());
    }

    /// printf-style call: `%s`-template plus positional arguments,
    /// resolved exactly once during enrichment.
    #[track_caller]
    pub fn printf(&self, level: Level, template: &str, args: &[Value]) {
        let callsite = from_location(Location::caller());
        self.log(
            level,
            Payload::Legacy {
                template: template.to_string(),
                args: args.to_vec(),
            },
            Some(callsite),
        );
    }

    fn structured(
        &self,
        level: Level,
        event: &str,
        mut fields: FieldMap,
        location: &'static Location<'static>,
    ) {
        fields.insert(EVENT_KEY.to_string(), Value::String(event.to_string()));
        self.log(
            level,
            Payload::Structured(fields),
            Some(from_location(location)),
        );
    }
}

fn from_location(location: &'static Location<'static>) -> CallSite {
    CallSite {
        module: None,
        file: location.file(),
        line: location.line(),
        function: None,
    }
}

/// Render an error and its source chain into a field value for the
/// exception-formatting stage, outermost error first.
///
/// ```
/// use context_log_sink::logger::error_chain;
/// use context_log_sink::pipeline::EXC_INFO_KEY;
/// use context_log_sink::fields;
///
/// let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
/// let fields = fields! { exc_info = error_chain(&err) };
/// assert!(fields.contains_key(EXC_INFO_KEY));
/// ```
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> Value {
    let mut parts = Vec::new();
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
        parts.push(Value::String(e.to_string()));
        current = e.source();
    }
    Value::Array(parts)
}

/// Capture the current backtrace as a field value for the stack-rendering
/// stage.
pub fn capture_stack() -> Value {
    Value::String(std::backtrace::Backtrace::force_capture().to_string())
}

/// Build a [`FieldMap`](crate::record::FieldMap) from `key = value` pairs.
/// Values are anything `serde_json::json!` accepts.
#[macro_export]
macro_rules! fields {
    () => { $crate::record::FieldMap::new() };
    ($($key:ident = $value:expr),+ $(,)?) => {{
        let mut map = $crate::record::FieldMap::new();
        $( map.insert(stringify!($key).to_string(), $crate::__serde_json::json!($value)); )+
        map
    }};
}

/// Capture the full call site: module, file, line and enclosing function.
#[macro_export]
macro_rules! callsite {
    () => {{
        fn __here() {}
        fn __name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let __name = __name_of(__here);
        $crate::record::CallSite {
            module: ::core::option::Option::Some(::core::module_path!()),
            file: ::core::file!(),
            line: ::core::line!(),
            function: ::core::option::Option::Some(
                __name.strip_suffix("::__here").unwrap_or(__name),
            ),
        }
    }};
}

/// Structured log call with full call-site capture.
///
/// ```
/// use context_log_sink::{event, LoggingState, Level, LogConfig};
///
/// let mut state = LoggingState::new();
/// state.setup(LogConfig::new("example-app")).unwrap();
/// let log = state.get_logger("demo");
/// event!(log, Level::Info, "user logged in", user = "bob", attempt = 2);
/// ```
#[macro_export]
macro_rules! event {
    ($logger:expr, $level:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {{
        let mut __fields = $crate::record::FieldMap::new();
        __fields.insert(
            $crate::record::EVENT_KEY.to_string(),
            $crate::__serde_json::Value::String(::std::string::ToString::to_string(&$event)),
        );
        $( __fields.insert(stringify!($key).to_string(), $crate::__serde_json::json!($value)); )*
        $logger.log(
            $level,
            $crate::record::Payload::Structured(__fields),
            ::core::option::Option::Some($crate::callsite!()),
        );
    }};
}
