//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus, statsd);
//! without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `tag_classifier_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider` : provider name (e.g. "huggingface", "onnx")
//! - `policy` : aggregation policy ("concatenate" | "per_tag_mean")
//! - `status` : outcome: "ok", "invalid_input" or "error"

/// Total `classify_tags` calls.
///
/// Labels: `provider`, `policy`, `status` ("ok" | "invalid_input" | "error").
pub const CLASSIFICATIONS_TOTAL: &str = "tag_classifier_classifications_total";

/// Duration of a `classify_tags` call in seconds, model calls included.
///
/// Labels: `provider`, `policy`.
pub const CLASSIFICATION_DURATION_SECONDS: &str = "tag_classifier_classification_duration_seconds";

/// Total calls into the classification provider.
///
/// Labels: `provider`, `status` ("ok" | "error").
pub const MODEL_CALLS_TOTAL: &str = "tag_classifier_model_calls_total";
