//! Public types for the tag classifier API.

mod distribution;
mod options;
mod request;
mod result;

pub use distribution::ScoreDistribution;
pub use options::{AggregationPolicy, ClassifyOptions};
pub use request::ClassifyRequest;
pub use result::ClassificationResult;
