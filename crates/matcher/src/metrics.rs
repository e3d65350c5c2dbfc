// Metrics hooks for the `matcher` crate.
//
// A `ScanMetrics` implementation is handed to a `Scanner` with
// `Scanner::with_metrics`; every call to `Scanner::scan` then reports its
// latency and counts. This keeps instrumentation decoupled from any specific
// metrics backend.
use std::time::Duration;

use perceptual::Modality;

/// Metrics observer for scans.
pub trait ScanMetrics: Send + Sync {
    /// Record the outcome of a scan.
    ///
    /// `modality` is the source item's modality, `latency` the wall-clock time
    /// of the whole scan including fingerprint extraction, `compared` the
    /// number of candidates whose similarity was computed and `hits` the
    /// number of matches returned.
    fn record_scan(&self, modality: Modality, latency: Duration, compared: usize, hits: usize);
}
