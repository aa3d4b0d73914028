use std::io;
use std::path::PathBuf;

/// Error type returned when installing a logging configuration fails.
///
/// Everything here is fatal to `setup`: the caller gets no partially
/// installed sink set. Degraded conditions (missing application version,
/// pre-existing log directory) never surface through this type.
#[derive(thiserror::Error, Debug)]
pub enum SetupError {
    #[error("could not resolve the local hostname")]
    Hostname,

    #[error("could not create log directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not open log file {path}: {source}")]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
