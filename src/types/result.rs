//! Classification result type

use serde::{Deserialize, Serialize};

use super::ScoreDistribution;

/// Outcome of classifying a tag list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct ClassificationResult {
    /// Most probable category.
    pub category: String,
    /// Probability of `category` (0.0 to 1.0).
    pub score: f32,
    /// Every category's score in request order, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "server", schema(value_type = Option<Object>))]
    pub all_scores: Option<ScoreDistribution>,
}

impl ClassificationResult {
    /// Build a result from a distribution, picking the best category.
    ///
    /// Returns `None` for an empty distribution.
    pub fn from_distribution(distribution: ScoreDistribution, return_scores: bool) -> Option<Self> {
        let (category, score) = distribution
            .best()
            .map(|(label, score)| (label.to_string(), score))?;
        Some(Self {
            category,
            score,
            all_scores: return_scores.then_some(distribution),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omits_all_scores_when_absent() {
        let result = ClassificationResult {
            category: "animals".into(),
            score: 0.9,
            all_scores: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("all_scores").is_none());
        assert_eq!(json["category"], "animals");
    }

    #[test]
    fn from_distribution_keeps_scores_on_request() {
        let dist: ScoreDistribution = [("food".to_string(), 0.2), ("sports".to_string(), 0.8)]
            .into_iter()
            .collect();

        let result = ClassificationResult::from_distribution(dist.clone(), true).unwrap();
        assert_eq!(result.category, "sports");
        assert_eq!(result.all_scores, Some(dist.clone()));

        let result = ClassificationResult::from_distribution(dist, false).unwrap();
        assert!(result.all_scores.is_none());
    }
}
