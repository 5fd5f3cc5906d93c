//! Tag aggregation on top of a zero-shot classification provider.
//!
//! [`TagClassifier`] turns a tag list and a category list into one
//! [`ClassificationResult`]. With the default
//! [`AggregationPolicy::Concatenate`] the tags are joined into a single text
//! and the provider is called once; with [`AggregationPolicy::PerTagMean`]
//! every tag is classified separately and the scores are averaged.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::providers::{ClassifyProvider, LabelScores};
use crate::telemetry;
use crate::types::{AggregationPolicy, ClassificationResult, ClassifyOptions, ScoreDistribution};
use crate::{ClassifierError, Result};

/// Separator used to join tags into one text.
pub const DEFAULT_SEPARATOR: &str = ", ";

/// Slack allowed on provider scores before they count as out of range.
const SCORE_TOLERANCE: f32 = 1e-4;

/// Assigns tag lists to the most probable category.
///
/// Holds the provider as an immutable shared handle; one instance serves
/// every request.
pub struct TagClassifier {
    provider: Arc<dyn ClassifyProvider>,
    policy: AggregationPolicy,
    separator: String,
}

impl TagClassifier {
    pub fn new(provider: Arc<dyn ClassifyProvider>) -> Self {
        Self {
            provider,
            policy: AggregationPolicy::default(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    pub fn with_policy(mut self, policy: AggregationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Separator placed between tags under [`AggregationPolicy::Concatenate`].
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Model identifier reported by the provider.
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn policy(&self) -> AggregationPolicy {
        self.policy
    }

    /// Classify a tag list into one of `categories`.
    ///
    /// # Errors
    ///
    /// - [`ClassifierError::InvalidInput`] when `tags` is empty, fewer than two
    ///   categories are given, or a category is repeated.
    /// - [`ClassifierError::Model`] when the provider returns a distribution
    ///   that is missing a category or holds an out-of-range score.
    /// - Any provider error, unchanged.
    pub async fn classify_tags(
        &self,
        tags: &[&str],
        categories: &[&str],
        options: ClassifyOptions,
    ) -> Result<ClassificationResult> {
        let start = Instant::now();
        let outcome = self.aggregate(tags, categories, options).await;
        self.record(start, &outcome);

        match &outcome {
            Ok(result) => info!(
                provider = self.provider.name(),
                tags = tags.len(),
                categories = categories.len(),
                category = %result.category,
                score = result.score,
                "classified tags"
            ),
            Err(e) if e.is_client_error() => warn!(error = %e, "rejected classification request"),
            Err(e) => warn!(provider = self.provider.name(), error = %e, "classification failed"),
        }

        outcome
    }

    /// Classify a single tag in single-label mode.
    pub async fn classify_single_tag(
        &self,
        tag: &str,
        categories: &[&str],
        return_scores: bool,
    ) -> Result<ClassificationResult> {
        let options = ClassifyOptions::default().return_scores(return_scores);
        self.classify_tags(&[tag], categories, options).await
    }

    async fn aggregate(
        &self,
        tags: &[&str],
        categories: &[&str],
        options: ClassifyOptions,
    ) -> Result<ClassificationResult> {
        validate_request(tags, categories)?;

        let distribution = match self.policy {
            AggregationPolicy::Concatenate => {
                let text = tags.join(self.separator.as_str());
                self.score(&text, categories, options.multi_label).await?
            }
            AggregationPolicy::PerTagMean => {
                self.mean_over_tags(tags, categories, options.multi_label)
                    .await?
            }
        };

        ClassificationResult::from_distribution(distribution, options.return_scores)
            .ok_or(ClassifierError::EmptyResponse)
    }

    async fn mean_over_tags(
        &self,
        tags: &[&str],
        categories: &[&str],
        multi_label: bool,
    ) -> Result<ScoreDistribution> {
        let mut sums = vec![0.0f32; categories.len()];
        for tag in tags {
            let distribution = self.score(tag, categories, multi_label).await?;
            for (sum, (_, score)) in sums.iter_mut().zip(distribution.iter()) {
                *sum += score;
            }
        }

        let count = tags.len() as f32;
        let mut mean: ScoreDistribution = categories
            .iter()
            .zip(sums)
            .map(|(category, sum)| (category.to_string(), sum / count))
            .collect();
        if !multi_label {
            mean.normalize();
        }
        Ok(mean)
    }

    /// One provider call, validated into a distribution in category order.
    async fn score(
        &self,
        text: &str,
        categories: &[&str],
        multi_label: bool,
    ) -> Result<ScoreDistribution> {
        debug!(provider = self.provider.name(), text, multi_label, "calling provider");

        let raw = self
            .provider
            .classify_zero_shot(text, categories, multi_label)
            .await;

        let status = if raw.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::MODEL_CALLS_TOTAL,
            "provider" => self.provider.name().to_owned(),
            "status" => status,
        )
        .increment(1);

        collect_distribution(raw?, categories)
    }

    /// Record outcome metrics (counter + histogram).
    fn record(&self, start: Instant, outcome: &Result<ClassificationResult>) {
        let status = match outcome {
            Ok(_) => "ok",
            Err(e) if e.is_client_error() => "invalid_input",
            Err(_) => "error",
        };
        metrics::counter!(telemetry::CLASSIFICATIONS_TOTAL,
            "provider" => self.provider.name().to_owned(),
            "policy" => self.policy.name(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::CLASSIFICATION_DURATION_SECONDS,
            "provider" => self.provider.name().to_owned(),
            "policy" => self.policy.name(),
        )
        .record(start.elapsed().as_secs_f64());
    }
}

/// Check the semantic preconditions of a classification request.
pub fn validate_request(tags: &[&str], categories: &[&str]) -> Result<()> {
    if tags.is_empty() {
        return Err(ClassifierError::InvalidInput(
            "tags must not be empty".to_string(),
        ));
    }
    if categories.len() < 2 {
        return Err(ClassifierError::InvalidInput(
            "at least 2 categories required".to_string(),
        ));
    }
    for (i, category) in categories.iter().enumerate() {
        if categories[..i].contains(category) {
            return Err(ClassifierError::InvalidInput(format!(
                "duplicate category: {category}"
            )));
        }
    }
    Ok(())
}

/// Order provider scores by `categories`, rejecting malformed output.
fn collect_distribution(mut raw: LabelScores, categories: &[&str]) -> Result<ScoreDistribution> {
    let mut distribution = ScoreDistribution::with_capacity(categories.len());
    for category in categories {
        let score = raw.remove(*category).ok_or_else(|| {
            ClassifierError::Model(format!("missing score for category '{category}'"))
        })?;
        if !score.is_finite() || !(-SCORE_TOLERANCE..=1.0 + SCORE_TOLERANCE).contains(&score) {
            return Err(ClassifierError::Model(format!(
                "score {score} for category '{category}' is outside [0, 1]"
            )));
        }
        distribution.push(*category, score.clamp(0.0, 1.0));
    }

    if let Some(label) = raw.keys().next() {
        return Err(ClassifierError::Model(format!(
            "unexpected label '{label}' in model output"
        )));
    }
    Ok(distribution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, f32)]) -> LabelScores {
        pairs.iter().map(|(l, s)| (l.to_string(), *s)).collect()
    }

    #[test]
    fn validate_rejects_empty_tags() {
        let err = validate_request(&[], &["a", "b"]).unwrap_err();
        assert_eq!(err.to_string(), "invalid input: tags must not be empty");
    }

    #[test]
    fn validate_rejects_single_category() {
        let err = validate_request(&["dog"], &["animals"]).unwrap_err();
        assert_eq!(err.to_string(), "invalid input: at least 2 categories required");
    }

    #[test]
    fn validate_checks_tags_before_categories() {
        let err = validate_request(&[], &[]).unwrap_err();
        assert!(err.to_string().contains("tags must not be empty"));
    }

    #[test]
    fn validate_rejects_duplicates() {
        let err = validate_request(&["dog"], &["animals", "animals"]).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidInput(ref m) if m.contains("animals")));
    }

    #[test]
    fn collect_orders_by_categories() {
        let d = collect_distribution(raw(&[("b", 0.3), ("a", 0.7)]), &["a", "b"]).unwrap();
        let order: Vec<&str> = d.categories().collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn collect_rejects_missing_category() {
        let err = collect_distribution(raw(&[("a", 1.0)]), &["a", "b"]).unwrap_err();
        assert!(matches!(err, ClassifierError::Model(ref m) if m.contains("'b'")));
    }

    #[test]
    fn collect_rejects_out_of_range() {
        for bad in [1.5, -0.2, f32::NAN, f32::INFINITY] {
            let err = collect_distribution(raw(&[("a", bad), ("b", 0.1)]), &["a", "b"]);
            assert!(matches!(err, Err(ClassifierError::Model(_))), "{bad} accepted");
        }
    }

    #[test]
    fn collect_clamps_rounding_noise() {
        let d = collect_distribution(raw(&[("a", 1.00001), ("b", 0.0)]), &["a", "b"]).unwrap();
        assert_eq!(d.get("a"), Some(1.0));
    }

    #[test]
    fn collect_rejects_unknown_label() {
        let err =
            collect_distribution(raw(&[("a", 0.5), ("b", 0.3), ("c", 0.2)]), &["a", "b"]).unwrap_err();
        assert!(matches!(err, ClassifierError::Model(ref m) if m.contains("'c'")));
    }
}
