pub mod record;
pub mod error;
pub mod config;
pub mod env;
pub mod enrich;
pub mod pipeline;
pub mod sink;
pub mod console;
pub mod file;
pub mod rotate;
pub mod factory;
pub mod logger;
pub mod state;
pub mod noop_sink;

#[cfg(feature = "log-bridge")]
pub mod bridge;

pub use config::LogConfig;
pub use error::SetupError;
pub use logger::Logger;
pub use record::{FieldMap, Level, Payload, RawRecord};
pub use state::LoggingState;

#[doc(hidden)]
pub use serde_json as __serde_json;
