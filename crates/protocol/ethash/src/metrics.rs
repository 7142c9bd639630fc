//! Metrics for the proof-of-work engine.

/// Container for the metric identifiers of the engine.
#[derive(Debug, Clone)]
pub struct Metrics;

impl Metrics {
    /// Identifier for the counter of successfully verified headers.
    pub const HEADERS_VERIFIED: &'static str = "ember_ethash_headers_verified";

    /// Identifier for the counter of rejected headers, labelled by error kind.
    pub const HEADER_VERIFICATION_FAILURES: &'static str = "ember_ethash_header_verification_failures";

    /// Identifier for the counter of light cache generations.
    pub const CACHE_GENERATIONS: &'static str = "ember_ethash_cache_generations";

    /// Identifier for the counter of full dataset generations.
    pub const DATASET_GENERATIONS: &'static str = "ember_ethash_dataset_generations";

    /// Identifier for the gauge of batch verification workers currently running.
    pub const BATCH_WORKERS: &'static str = "ember_ethash_batch_workers";

    /// Initializes metrics for the engine.
    ///
    /// This does two things:
    /// * Describes the engine metrics.
    /// * Initializes the metrics to 0 so they can be queried immediately.
    #[cfg(feature = "metrics")]
    pub fn init() {
        Self::describe();
        Self::zero();
    }

    #[cfg(feature = "metrics")]
    fn describe() {
        metrics::describe_counter!(
            Self::HEADERS_VERIFIED,
            metrics::Unit::Count,
            "Headers that passed verification"
        );
        metrics::describe_counter!(
            Self::HEADER_VERIFICATION_FAILURES,
            metrics::Unit::Count,
            "Headers that failed verification"
        );
        metrics::describe_counter!(
            Self::CACHE_GENERATIONS,
            metrics::Unit::Count,
            "Light verification caches generated"
        );
        metrics::describe_counter!(
            Self::DATASET_GENERATIONS,
            metrics::Unit::Count,
            "Full verification datasets generated"
        );
        metrics::describe_gauge!(
            Self::BATCH_WORKERS,
            metrics::Unit::Count,
            "Batch verification workers currently running"
        );
    }

    #[cfg(feature = "metrics")]
    fn zero() {
        metrics::counter!(Self::HEADERS_VERIFIED).increment(0);
        metrics::counter!(Self::CACHE_GENERATIONS).increment(0);
        metrics::counter!(Self::DATASET_GENERATIONS).increment(0);
        metrics::gauge!(Self::BATCH_WORKERS).set(0.0);
    }
}
