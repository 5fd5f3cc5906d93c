//! Live integration tests for HuggingFaceClient.
//!
//! These tests hit the real HuggingFace Inference API and are `#[ignore]` by default.
//!
//! Run with: `HF_API_KEY=hf_xxx cargo test --test huggingface_live_test --features huggingface -- --ignored`
#![cfg(feature = "huggingface")]

use std::sync::Arc;

use tag_classifier::providers::HuggingFaceClient;
use tag_classifier::{ClassifyOptions, TagClassifier};

const MODEL: &str = "MoritzLaurer/deberta-v3-base-zeroshot-v2.0";

fn classifier() -> TagClassifier {
    let key = std::env::var("HF_API_KEY")
        .expect("HF_API_KEY environment variable must be set for live tests");
    TagClassifier::new(Arc::new(HuggingFaceClient::new(key, MODEL).unwrap()))
}

#[tokio::test]
#[ignore = "requires HF_API_KEY"]
async fn test_live_english_tags() {
    let result = classifier()
        .classify_tags(
            &["dog", "park", "outdoor"],
            &["animals", "sports", "technology"],
            ClassifyOptions::default().return_scores(true),
        )
        .await
        .expect("live classify should succeed");

    assert_eq!(result.category, "animals");
    let total = result.all_scores.unwrap().total();
    assert!((total - 1.0).abs() < 1e-3, "scores summed to {total}");
}

#[tokio::test]
#[ignore = "requires HF_API_KEY"]
async fn test_live_german_tags() {
    let result = classifier()
        .classify_tags(
            &["Hund", "Park", "spielend"],
            &["Tiere", "Landschaft", "Portrait", "Architektur"],
            ClassifyOptions::default(),
        )
        .await
        .expect("live classify should succeed");

    assert_eq!(result.category, "Tiere");
}

#[tokio::test]
#[ignore = "requires HF_API_KEY"]
async fn test_live_multi_label() {
    let result = classifier()
        .classify_tags(
            &["sunset", "mountains", "hiking"],
            &["landscape", "outdoor activity", "architecture"],
            ClassifyOptions::default().multi_label(true).return_scores(true),
        )
        .await
        .expect("live classify should succeed");

    let all = result.all_scores.unwrap();
    assert!(all.iter().all(|(_, s)| (0.0..=1.0).contains(&s)));
    assert_ne!(result.category, "architecture");
}
