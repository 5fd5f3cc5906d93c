//! Shared application state.

use std::sync::Arc;

use crate::TagClassifier;

/// Handed to every handler; cloning only bumps the reference count.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<TagClassifier>,
}

impl AppState {
    pub fn new(classifier: TagClassifier) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }

    pub fn model(&self) -> &str {
        self.classifier.model()
    }
}
