use crate::record::{Level, RawRecord};
use crate::sink::Sink;

/// A sink that simply drops all records.
///
/// Useful for measuring the overhead of the dispatch path itself without
/// any I/O, and for unit tests that don't care about persistence.
#[derive(Clone, Copy, Default)]
pub struct NoopSink;

impl Sink for NoopSink {
    fn threshold(&self) -> Level {
        Level::Trace
    }

    fn submit(&self, _raw: &RawRecord) {}
}
