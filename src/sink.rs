use crate::record::{Level, RawRecord};

/// Destination for records produced by the logging facade.
///
/// Implementations own a renderer, a severity threshold and a private
/// enrichment stage, and are responsible for writing the rendered record
/// to a concrete destination (stdout, rotating file, etc). Dispatch calls
/// `submit` synchronously on the calling thread at the moment a log call
/// is made.
pub trait Sink: Send + Sync {
    /// Minimum severity this sink accepts. Records below the threshold
    /// are dropped without being enriched or rendered.
    fn threshold(&self) -> Level;

    /// Enrich, transform, render and write a single record.
    ///
    /// **Parameters**
    /// - `raw`: the call-site record, not yet normalized. Each sink runs
    ///   its own enrichment instance followed by the shared pipeline.
    ///
    /// Logging is fire-and-forget: no error occurring while processing an
    /// individual record may raise past the logging call site. A write
    /// failure is reported on stderr and the record is lost; a slow
    /// destination blocks only the calling thread for that one write.
    fn submit(&self, raw: &RawRecord);
}
