//! Verification metrics
//!
//! Recorded through the `metrics` facade; the embedding application chooses
//! the exporter.

use metrics::{counter, histogram};

/// Metric names
pub mod names {
    pub const VERIFICATIONS_TOTAL: &str = "dualgate_verifications_total";
    pub const VERIFICATION_DURATION_SECONDS: &str = "dualgate_verification_duration_seconds";
    pub const DIRECTORY_ATTEMPTS_TOTAL: &str = "dualgate_directory_attempts_total";
    pub const DIRECTORY_CHECKS_TOTAL: &str = "dualgate_directory_checks_total";
    pub const SECOND_FACTOR_CHECKS_TOTAL: &str = "dualgate_second_factor_checks_total";
    pub const ATTRIBUTE_LOOKUPS_TOTAL: &str = "dualgate_attribute_lookups_total";
}

pub fn record_verification(outcome: &'static str, duration_secs: f64) {
    counter!(names::VERIFICATIONS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::VERIFICATION_DURATION_SECONDS).record(duration_secs);
}

pub fn record_directory_attempt() {
    counter!(names::DIRECTORY_ATTEMPTS_TOTAL).increment(1);
}

/// Result of a full directory check: success, rejected, unreachable, bypassed or empty
pub fn record_directory_check(result: &'static str) {
    counter!(names::DIRECTORY_CHECKS_TOTAL, "result" => result).increment(1);
}

pub fn record_second_factor_check(result: &'static str) {
    counter!(names::SECOND_FACTOR_CHECKS_TOTAL, "result" => result).increment(1);
}

pub fn record_attribute_lookup(success: bool) {
    counter!(
        names::ATTRIBUTE_LOOKUPS_TOTAL,
        "status" => if success { "success" } else { "error" }
    )
    .increment(1);
}
