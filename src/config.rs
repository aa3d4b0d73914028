use crate::env;
use crate::record::Level;
use std::path::PathBuf;

/// Configuration for one call to [`LoggingState::setup`].
///
/// Controls the severity threshold shared by all sinks, whether a rotating
/// JSON file sink is installed next to the console sink, the rotation
/// limits of that file, call-site capture, and the name of the field the
/// event text is rendered under.
///
/// **Fields**
/// - `application`: value of the `application` context field and the key
///   used for version lookup.
/// - `level`: records below this severity are dropped by every sink.
/// - `file_path`: enables the rotating-file sink when set.
/// - `max_bytes`: rotation trigger size for the file sink.
/// - `backup_count`: number of rotated backup files retained.
/// - `add_call_info`: attach module/path/function/line and process/thread
///   identity to every record.
/// - `warn_on_overwrite`: emit an advisory when `setup` replaces an
///   existing configuration.
/// - `message_field`: key the event text is stored under in rendered
///   output.
///
/// [`LoggingState::setup`]: crate::state::LoggingState::setup
#[derive(Clone, Debug)]
pub struct LogConfig {
    pub application: String,
    pub level: Level,
    pub file_path: Option<PathBuf>,
    pub max_bytes: u64,
    pub backup_count: usize,
    pub add_call_info: bool,
    pub warn_on_overwrite: bool,
    pub message_field: String,
}

impl LogConfig {
    /// Console-only configuration with defaults matching typical service
    /// deployments: `info` threshold, 1 MiB rotation size, 5 backups.
    pub fn new(application: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            level: Level::Info,
            file_path: None,
            max_bytes: 1024 * 1024,
            backup_count: 5,
            add_call_info: false,
            warn_on_overwrite: true,
            message_field: "message".to_string(),
        }
    }

    /// Build a configuration from the `CONTEXT_LOG_*` environment
    /// variables, falling back to the defaults of [`LogConfig::new`].
    /// Malformed values are ignored rather than failing startup.
    pub fn from_env(application: impl Into<String>) -> Self {
        let mut config = Self::new(application);

        if let Ok(level) = env::env_or(env::LOG_LEVEL_ENV, "info").parse() {
            config.level = level;
        }
        let file = env::env_or(env::LOG_FILE_ENV, "");
        if !file.is_empty() {
            config.file_path = Some(PathBuf::from(file));
        }
        if let Ok(max_bytes) = env::env_or(env::LOG_MAX_BYTES_ENV, "").parse() {
            config.max_bytes = max_bytes;
        }
        if let Ok(backup_count) = env::env_or(env::LOG_BACKUP_COUNT_ENV, "").parse() {
            config.backup_count = backup_count;
        }

        config
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_backup_count(mut self, backup_count: usize) -> Self {
        self.backup_count = backup_count;
        self
    }

    pub fn with_call_info(mut self, add_call_info: bool) -> Self {
        self.add_call_info = add_call_info;
        self
    }

    pub fn with_warn_on_overwrite(mut self, warn_on_overwrite: bool) -> Self {
        self.warn_on_overwrite = warn_on_overwrite;
        self
    }

    pub fn with_message_field(mut self, message_field: impl Into<String>) -> Self {
        self.message_field = message_field.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn from_env_overrides_defaults() {
        std::env::set_var(env::LOG_LEVEL_ENV, "debug");
        std::env::set_var(env::LOG_FILE_ENV, "/tmp/env-app.log");
        std::env::set_var(env::LOG_MAX_BYTES_ENV, "2048");
        std::env::set_var(env::LOG_BACKUP_COUNT_ENV, "7");

        let config = LogConfig::from_env("env-app");
        assert_eq!(config.level, Level::Debug);
        assert_eq!(
            config.file_path.as_deref(),
            Some(Path::new("/tmp/env-app.log"))
        );
        assert_eq!(config.max_bytes, 2048);
        assert_eq!(config.backup_count, 7);

        std::env::remove_var(env::LOG_LEVEL_ENV);
        std::env::remove_var(env::LOG_FILE_ENV);
        std::env::remove_var(env::LOG_MAX_BYTES_ENV);
        std::env::remove_var(env::LOG_BACKUP_COUNT_ENV);
    }

    #[test]
    fn defaults_are_console_only() {
        let config = LogConfig::new("example-app");
        assert_eq!(config.application, "example-app");
        assert_eq!(config.level, Level::Info);
        assert!(config.file_path.is_none());
        assert_eq!(config.max_bytes, 1024 * 1024);
        assert_eq!(config.backup_count, 5);
        assert!(!config.add_call_info);
        assert!(config.warn_on_overwrite);
        assert_eq!(config.message_field, "message");
    }

    #[test]
    fn builder_methods_override_defaults() {
        let config = LogConfig::new("example-app")
            .with_level(Level::Debug)
            .with_file("/tmp/example.log")
            .with_max_bytes(512)
            .with_backup_count(2)
            .with_call_info(true)
            .with_warn_on_overwrite(false)
            .with_message_field("msg");

        assert_eq!(config.level, Level::Debug);
        assert_eq!(config.file_path.as_deref().unwrap().to_str(), Some("/tmp/example.log"));
        assert_eq!(config.max_bytes, 512);
        assert_eq!(config.backup_count, 2);
        assert!(config.add_call_info);
        assert!(!config.warn_on_overwrite);
        assert_eq!(config.message_field, "msg");
    }
}
