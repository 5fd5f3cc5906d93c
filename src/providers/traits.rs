//! Provider trait for the zero-shot classification capability.
//!
//! A provider answers one question: given a text and candidate labels, how
//! probable is each label? Everything above that (validation, tag joining,
//! averaging, argmax) lives in [`TagClassifier`](crate::TagClassifier), so a
//! provider can be swapped for a deterministic stub in tests.
//!
//! # Example
//!
//! ```ignore
//! struct Fixed;
//!
//! #[async_trait]
//! impl ClassifyProvider for Fixed {
//!     fn name(&self) -> &str { "fixed" }
//!     fn model(&self) -> &str { "fixed-model" }
//!
//!     async fn classify_zero_shot(&self, _text: &str, labels: &[&str], _multi_label: bool)
//!         -> Result<LabelScores>
//!     {
//!         let p = 1.0 / labels.len() as f32;
//!         Ok(labels.iter().map(|l| (l.to_string(), p)).collect())
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::Result;

/// Raw provider output: label → probability.
pub type LabelScores = HashMap<String, f32>;

/// Provider for zero-shot text classification.
#[async_trait]
pub trait ClassifyProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Model identifier the provider was initialised with.
    fn model(&self) -> &str;

    /// Score `text` against every candidate label.
    ///
    /// With `multi_label = false` the scores are expected to sum to 1; with
    /// `multi_label = true` each label is scored independently.
    async fn classify_zero_shot(
        &self,
        text: &str,
        labels: &[&str],
        multi_label: bool,
    ) -> Result<LabelScores>;
}

/// Decorator that lets at most one classification run at a time.
///
/// Used for backends that are not safe (or not efficient) to call
/// concurrently, such as a single local inference session.
pub struct SerializedProvider {
    inner: Arc<dyn ClassifyProvider>,
    gate: Mutex<()>,
}

impl SerializedProvider {
    pub fn new(inner: Arc<dyn ClassifyProvider>) -> Self {
        Self {
            inner,
            gate: Mutex::new(()),
        }
    }
}

#[async_trait]
impl ClassifyProvider for SerializedProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn classify_zero_shot(
        &self,
        text: &str,
        labels: &[&str],
        multi_label: bool,
    ) -> Result<LabelScores> {
        let _guard = self.gate.lock().await;
        debug!(provider = self.inner.name(), "acquired inference gate");
        self.inner
            .classify_zero_shot(text, labels, multi_label)
            .await
    }
}
