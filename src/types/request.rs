//! Wire form of a classification request.

use serde::{Deserialize, Serialize};

use super::ClassifyOptions;

/// Body of `POST /classify`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct ClassifyRequest {
    /// Tags describing one item, e.g. image tags.
    #[cfg_attr(feature = "server", schema(example = json!(["dog", "park", "outdoor"])))]
    pub tags: Vec<String>,
    /// Candidate categories, at least two and unique.
    #[cfg_attr(feature = "server", schema(example = json!(["animals", "landscape", "portrait"])))]
    pub categories: Vec<String>,
    #[serde(default)]
    pub multi_label: bool,
    #[serde(default)]
    pub return_scores: bool,
}

impl ClassifyRequest {
    pub fn new(
        tags: impl IntoIterator<Item = impl Into<String>>,
        categories: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            categories: categories.into_iter().map(Into::into).collect(),
            multi_label: false,
            return_scores: false,
        }
    }

    pub fn multi_label(mut self, enabled: bool) -> Self {
        self.multi_label = enabled;
        self
    }

    pub fn return_scores(mut self, enabled: bool) -> Self {
        self.return_scores = enabled;
        self
    }

    pub fn options(&self) -> ClassifyOptions {
        ClassifyOptions::default()
            .multi_label(self.multi_label)
            .return_scores(self.return_scores)
    }

    /// Borrowed views of tags and categories, as [`TagClassifier`](crate::TagClassifier) takes them.
    pub fn as_slices(&self) -> (Vec<&str>, Vec<&str>) {
        (
            self.tags.iter().map(String::as_str).collect(),
            self.categories.iter().map(String::as_str).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_default_to_false() {
        let req: ClassifyRequest =
            serde_json::from_str(r#"{"tags":["dog"],"categories":["a","b"]}"#).unwrap();
        assert!(!req.multi_label);
        assert!(!req.return_scores);
        assert_eq!(req.options(), ClassifyOptions::default());
    }

    #[test]
    fn missing_categories_is_rejected() {
        let err = serde_json::from_str::<ClassifyRequest>(r#"{"tags":["dog"]}"#).unwrap_err();
        assert!(err.to_string().contains("categories"));
    }

    #[test]
    fn builder_sets_flags() {
        let req = ClassifyRequest::new(["dog", "park"], ["animals", "sports"])
            .multi_label(true)
            .return_scores(true);
        let (tags, categories) = req.as_slices();
        assert_eq!(tags, vec!["dog", "park"]);
        assert_eq!(categories, vec!["animals", "sports"]);
        assert!(req.options().multi_label);
    }
}
