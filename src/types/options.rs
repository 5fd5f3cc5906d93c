//! Classification options and aggregation policy

use serde::{Deserialize, Serialize};

/// Per-request classification flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyOptions {
    /// Judge each category independently instead of picking exactly one.
    #[serde(default)]
    pub multi_label: bool,
    /// Attach the full distribution to the result.
    #[serde(default)]
    pub return_scores: bool,
}

impl ClassifyOptions {
    pub fn multi_label(mut self, multi_label: bool) -> Self {
        self.multi_label = multi_label;
        self
    }

    pub fn return_scores(mut self, return_scores: bool) -> Self {
        self.return_scores = return_scores;
        self
    }
}

/// How scores for several tags are combined into one distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// Join all tags into one text and classify it with a single model call.
    #[default]
    Concatenate,

    /// Classify every tag on its own and average the per-category scores.
    ///
    /// In single-label mode the average is renormalized to sum to 1.
    PerTagMean,
}

impl AggregationPolicy {
    /// Policy name for logs and metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Concatenate => "concatenate",
            Self::PerTagMean => "per_tag_mean",
        }
    }
}
