//! Prometheus metrics for the cache client.

use metrics::{counter, describe_counter};

/// Metric names for the cache client.
pub mod names {
    /// Reads that found a value.
    pub const CACHE_HITS_TOTAL: &str = "keystone_cache_hits_total";
    /// Reads that found nothing.
    pub const CACHE_MISSES_TOTAL: &str = "keystone_cache_misses_total";
    /// Typed reads whose stored value did not decode into the requested type.
    pub const CACHE_TYPE_MISMATCHES_TOTAL: &str = "keystone_cache_type_mismatches_total";
    /// Successful writes.
    pub const CACHE_WRITES_TOTAL: &str = "keystone_cache_writes_total";
    /// Writes that failed and were returned to the caller.
    pub const CACHE_WRITE_FAILURES_TOTAL: &str = "keystone_cache_write_failures_total";
    /// Store failures on reads and deletes that were logged and swallowed.
    pub const CACHE_CONTAINED_ERRORS_TOTAL: &str = "keystone_cache_contained_errors_total";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(names::CACHE_HITS_TOTAL, "Total number of cache hits");
    describe_counter!(names::CACHE_MISSES_TOTAL, "Total number of cache misses");
    describe_counter!(
        names::CACHE_TYPE_MISMATCHES_TOTAL,
        "Total number of cached values that did not match the requested type"
    );
    describe_counter!(names::CACHE_WRITES_TOTAL, "Total number of successful cache writes");
    describe_counter!(
        names::CACHE_WRITE_FAILURES_TOTAL,
        "Total number of cache writes that failed"
    );
    describe_counter!(
        names::CACHE_CONTAINED_ERRORS_TOTAL,
        "Total number of store errors on reads and deletes that were not propagated"
    );
}

/// Cache metrics recorder.
#[derive(Clone)]
pub struct CacheMetrics;

impl CacheMetrics {
    pub fn hit(category: &'static str) {
        counter!(names::CACHE_HITS_TOTAL, "category" => category).increment(1);
    }

    pub fn miss(category: &'static str) {
        counter!(names::CACHE_MISSES_TOTAL, "category" => category).increment(1);
    }

    pub fn type_mismatch(category: &'static str, expected: &'static str) {
        counter!(
            names::CACHE_TYPE_MISMATCHES_TOTAL,
            "category" => category,
            "expected" => expected
        )
        .increment(1);
    }

    pub fn write(category: &'static str) {
        counter!(names::CACHE_WRITES_TOTAL, "category" => category).increment(1);
    }

    pub fn write_failed(category: &'static str) {
        counter!(names::CACHE_WRITE_FAILURES_TOTAL, "category" => category).increment(1);
    }

    /// Record a store error that was logged instead of returned.
    pub fn contained_error(category: &'static str, operation: &'static str) {
        counter!(
            names::CACHE_CONTAINED_ERRORS_TOTAL,
            "category" => category,
            "operation" => operation
        )
        .increment(1);
    }
}
