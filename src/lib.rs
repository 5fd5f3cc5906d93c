//! Tag classifier - zero-shot assignment of tag lists to categories
//!
//! A [`TagClassifier`] takes a list of descriptive tags and a caller-supplied
//! list of candidate categories and returns the category a zero-shot NLI
//! model finds most probable, optionally with the full score distribution.
//! The model sits behind the [`ClassifyProvider`](providers::ClassifyProvider)
//! trait: the hosted HuggingFace inference API by default, or a local ONNX
//! model with the `local-inference` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tag_classifier::providers::HuggingFaceClient;
//! use tag_classifier::{ClassifyOptions, TagClassifier};
//!
//! #[tokio::main]
//! async fn main() -> tag_classifier::Result<()> {
//!     let provider = HuggingFaceClient::new(
//!         "hf_your_key",
//!         "MoritzLaurer/deberta-v3-base-zeroshot-v2.0",
//!     )?;
//!     let classifier = TagClassifier::new(Arc::new(provider));
//!
//!     let result = classifier
//!         .classify_tags(
//!             &["dog", "park", "outdoor"],
//!             &["animals", "sports", "technology"],
//!             ClassifyOptions::default().return_scores(true),
//!         )
//!         .await?;
//!
//!     println!("{} ({:.3})", result.category, result.score);
//!     Ok(())
//! }
//! ```
//!
//! # Serving over HTTP (requires `server` feature)
//!
//! The `tagd` binary exposes the classifier as a JSON API
//! (`POST /classify`, `GET /`, `GET /info`); see [`server`].

pub mod classifier;
#[cfg(feature = "client")]
pub mod client;
pub mod error;
pub mod model;
pub mod providers;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use classifier::TagClassifier;
pub use error::{ClassifierError, Result};
pub use model::Device;
pub use version::{PKG_VERSION, version_string};

pub use types::{
    AggregationPolicy, ClassificationResult, ClassifyOptions, ClassifyRequest, ScoreDistribution,
};
