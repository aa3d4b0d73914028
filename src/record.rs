use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Field container shared by raw and canonical records.
pub type FieldMap = BTreeMap<String, Value>;

/// Internal key the event text lives under until the final rename stage.
pub const EVENT_KEY: &str = "event";

/// Severity of a record, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    /// Lowercase label used in rendered records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type returned when parsing a level name.
#[derive(thiserror::Error, Debug)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" | "critical" | "fatal" => Ok(Level::Error),
            other => Err(ParseLevelError(other.to_string())),
        }
    }
}

/// Source location captured at a log call site.
///
/// `module` and `function` are only available to the capture macros; the
/// `#[track_caller]` method path fills in `file` and `line` alone.
#[derive(Debug, Clone, Copy)]
pub struct CallSite {
    pub module: Option<&'static str>,
    pub file: &'static str,
    pub line: u32,
    pub function: Option<&'static str>,
}

/// Body of a raw call-site record before normalization.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Key/value event produced by the structured API. The event text is
    /// stored under [`EVENT_KEY`].
    Structured(FieldMap),
    /// printf-style template plus positional substitution arguments,
    /// resolved exactly once during enrichment.
    Legacy { template: String, args: Vec<Value> },
}

/// A log call as it leaves the call site, before enrichment.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub logger: String,
    pub level: Level,
    pub payload: Payload,
    pub callsite: Option<CallSite>,
}

/// Substitute positional arguments into a `%s`-style template.
///
/// `%%` escapes a literal percent sign. Placeholders beyond the supplied
/// arguments are left in place rather than failing, since template
/// resolution runs on the logging hot path and must never raise.
pub fn resolve_template(template: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut next_arg = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(&placeholder) if placeholder == 's' || placeholder == 'd' => {
                chars.next();
                match next_arg.next() {
                    Some(value) => out.push_str(&value_to_text(value)),
                    None => {
                        out.push('%');
                        out.push(placeholder);
                    }
                }
            }
            _ => out.push('%'),
        }
    }

    out
}

/// Render a field value as plain text, without the quotes JSON would add
/// around strings.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn level_parsing_accepts_aliases_and_case() {
        assert_eq!("INFO".parse::<Level>().unwrap(), Level::Info);
        assert_eq!("warning".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("critical".parse::<Level>().unwrap(), Level::Error);
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn level_ordering_matches_severity() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn template_resolution_substitutes_each_argument_once() {
        let resolved = resolve_template("%s and %s", &[json!("A"), json!("B")]);
        assert_eq!(resolved, "A and B");
    }

    #[test]
    fn template_resolution_renders_non_string_arguments() {
        let resolved = resolve_template("attempt %d of %d", &[json!(2), json!(5)]);
        assert_eq!(resolved, "attempt 2 of 5");
    }

    #[test]
    fn template_resolution_keeps_unmatched_placeholders() {
        let resolved = resolve_template("%s and %s", &[json!("A")]);
        assert_eq!(resolved, "A and %s");
    }

    #[test]
    fn template_resolution_unescapes_percent() {
        let resolved = resolve_template("100%% of %s", &[json!("cases")]);
        assert_eq!(resolved, "100% of cases");
    }
}
