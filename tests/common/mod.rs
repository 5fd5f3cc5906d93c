//! Deterministic providers shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tag_classifier::providers::{ClassifyProvider, LabelScores};
use tag_classifier::{ClassifierError, Result};

/// Scores each label by how many keywords it shares with the text.
///
/// Single-label output is a softmax over the match counts; multi-label
/// output maps each label to `0.9` on a hit and `0.1` otherwise.
pub struct KeywordProvider {
    keywords: HashMap<String, Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl KeywordProvider {
    pub fn new(keywords: &[(&str, &[&str])]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|(label, words)| {
                    (label.to_string(), words.iter().map(|w| w.to_string()).collect())
                })
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The standard scenario vocabulary.
    pub fn photos() -> Self {
        Self::new(&[
            ("animals", &["dog", "cat", "bird", "hund"]),
            ("landscape", &["mountains", "sunset", "hiking", "lake"]),
            ("portrait", &["woman", "face", "smiling", "close-up"]),
            ("architecture", &["building", "bridge", "tower"]),
            ("sports", &["ball", "running"]),
            ("technology", &["laptop", "phone"]),
        ])
    }

    /// Texts seen so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn hits(&self, text: &str, label: &str) -> usize {
        let text = text.to_lowercase();
        self.keywords
            .get(label)
            .map(|words| words.iter().filter(|w| text.contains(w.as_str())).count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl ClassifyProvider for KeywordProvider {
    fn name(&self) -> &str {
        "keyword"
    }

    fn model(&self) -> &str {
        "test/keyword-model"
    }

    async fn classify_zero_shot(
        &self,
        text: &str,
        labels: &[&str],
        multi_label: bool,
    ) -> Result<LabelScores> {
        self.calls.lock().unwrap().push(text.to_string());

        if multi_label {
            return Ok(labels
                .iter()
                .map(|l| (l.to_string(), if self.hits(text, l) > 0 { 0.9 } else { 0.1 }))
                .collect());
        }

        let exp: Vec<f32> = labels
            .iter()
            .map(|l| (self.hits(text, l) as f32).exp())
            .collect();
        let sum: f32 = exp.iter().sum();
        Ok(labels
            .iter()
            .zip(exp)
            .map(|(l, e)| (l.to_string(), e / sum))
            .collect())
    }
}

/// Returns the same scores for every call, whatever the text.
pub struct FixedProvider(pub Vec<(&'static str, f32)>);

#[async_trait]
impl ClassifyProvider for FixedProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    fn model(&self) -> &str {
        "test/fixed-model"
    }

    async fn classify_zero_shot(
        &self,
        _text: &str,
        _labels: &[&str],
        _multi_label: bool,
    ) -> Result<LabelScores> {
        Ok(self.0.iter().map(|(l, s)| (l.to_string(), *s)).collect())
    }
}

/// Fails every call with the error built by the given constructor.
pub struct FailingProvider(pub fn() -> ClassifierError);

#[async_trait]
impl ClassifyProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    fn model(&self) -> &str {
        "test/failing-model"
    }

    async fn classify_zero_shot(
        &self,
        _text: &str,
        _labels: &[&str],
        _multi_label: bool,
    ) -> Result<LabelScores> {
        Err((self.0)())
    }
}

pub fn sum_scores(result: &tag_classifier::ClassificationResult) -> f32 {
    result
        .all_scores
        .as_ref()
        .map(|d| d.total())
        .unwrap_or_default()
}
