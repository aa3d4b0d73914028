/// Environment variable names used by this crate for convenient
/// configuration of logging from services.
///
/// These are purely helpers; the core sink types remain decoupled from
/// environment access.

/// Minimum severity, e.g. `info` or `debug`.
pub const LOG_LEVEL_ENV: &str = "CONTEXT_LOG_LEVEL";

/// Path of the rotating JSON log file. Unset means console-only.
pub const LOG_FILE_ENV: &str = "CONTEXT_LOG_FILE";

/// Rotation trigger size in bytes for the file sink.
pub const LOG_MAX_BYTES_ENV: &str = "CONTEXT_LOG_MAX_BYTES";

/// Number of rotated backup files retained.
pub const LOG_BACKUP_COUNT_ENV: &str = "CONTEXT_LOG_BACKUP_COUNT";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Resolve the installed version of an application from its
/// `<APPLICATION>_VERSION` environment variable (name uppercased, dashes
/// mapped to underscores). Missing metadata is not an error; the literal
/// `"none"` is returned instead.
pub fn application_version(application: &str) -> String {
    let key = format!(
        "{}_VERSION",
        application.to_uppercase().replace('-', "_")
    );
    std::env::var(key).unwrap_or_else(|_| "none".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_to_default() {
        assert_eq!(env_or("CONTEXT_LOG_SINK_UNSET_VAR", "fallback"), "fallback");
    }

    #[test]
    fn version_lookup_degrades_to_none() {
        assert_eq!(application_version("no-such-app-installed"), "none");
    }

    #[test]
    fn version_lookup_reads_env_metadata() {
        std::env::set_var("VERSIONED_DEMO_APP_VERSION", "1.2.3");
        assert_eq!(application_version("versioned-demo-app"), "1.2.3");
        std::env::remove_var("VERSIONED_DEMO_APP_VERSION");
    }
}
