//! Client library for talking to a running tagd.
//!
//! Provides [`ClassifierClient`], a typed wrapper over the JSON API.

mod classifier_client;

pub use classifier_client::{ClassifierClient, DEFAULT_URL, HealthResponse, InfoResponse};
