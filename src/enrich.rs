use crate::env;
use crate::error::SetupError;
use crate::record::{resolve_template, FieldMap, Payload, RawRecord, EVENT_KEY};
use serde_json::Value;

/// Normalizes a raw call-site record into canonical structured form and
/// injects the fixed context fields.
///
/// Each sink owns its own instance so the `process_name` overwrite below
/// stays isolated per sink; all instances behave identically today.
/// Construction happens during `setup`, which is where hostname
/// resolution failures surface as fatal configuration errors. This stage
/// never drops records.
#[derive(Debug, Clone)]
pub struct ContextEnrichment {
    hostname: String,
    application: String,
    app_version: String,
    process_name: String,
}

impl ContextEnrichment {
    /// Resolve the context fields for `application`.
    ///
    /// **Returns**
    /// - `Ok(..)` with hostname, application name and application version
    ///   resolved.
    /// - `Err(SetupError::Hostname)` if the OS reports no usable hostname.
    ///
    /// A missing application version is not an error; the `app_version`
    /// field degrades to the literal `"none"`.
    pub fn new(application: &str) -> Result<Self, SetupError> {
        let hostname = gethostname::gethostname().to_string_lossy().into_owned();
        if hostname.is_empty() {
            return Err(SetupError::Hostname);
        }

        Ok(Self {
            hostname,
            application: application.to_string(),
            app_version: env::application_version(application),
            process_name: process_name(),
        })
    }

    /// Produce the canonical field map for `raw`.
    ///
    /// A structured payload is kept as-is; a legacy payload is resolved to
    /// a single string and wrapped under the internal event key. The
    /// unresolved template/argument pair never leaves this method.
    pub fn apply(&self, raw: &RawRecord) -> FieldMap {
        let mut fields = match &raw.payload {
            Payload::Structured(map) => map.clone(),
            Payload::Legacy { template, args } => {
                let mut map = FieldMap::new();
                map.insert(
                    EVENT_KEY.to_string(),
                    Value::String(resolve_template(template, args)),
                );
                map
            }
        };

        fields.insert("hostname".to_string(), Value::String(self.hostname.clone()));
        fields.insert(
            "application".to_string(),
            Value::String(self.application.clone()),
        );
        fields.insert(
            "app_version".to_string(),
            Value::String(self.app_version.clone()),
        );

        // Overwrite process_name only when a caller already populated it.
        // The call-site capture stage is the path that adds the field; a
        // record without it stays without it.
        if fields.contains_key("process_name") {
            fields.insert(
                "process_name".to_string(),
                Value::String(self.process_name.clone()),
            );
        }

        fields
    }
}

/// Name of the current OS process, from the executable file stem.
pub(crate) fn process_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|path| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "unknown".to_string())
}
