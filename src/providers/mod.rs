//! Zero-shot classification providers.
//!
//! Each provider implements [`ClassifyProvider`]. The HuggingFace client
//! calls the hosted inference API; the ONNX provider runs an NLI model locally.

pub mod traits;

#[cfg(feature = "huggingface")]
pub mod huggingface;
#[cfg(feature = "local-inference")]
pub mod onnx_zero_shot;

pub use traits::{ClassifyProvider, LabelScores, SerializedProvider};

#[cfg(feature = "huggingface")]
pub use huggingface::HuggingFaceClient;
#[cfg(feature = "local-inference")]
pub use onnx_zero_shot::{LocalZeroShotModel, OnnxZeroShotProvider};
