//! Local zero-shot classification via ONNX Runtime.
//!
//! Uses an NLI cross-encoder: each candidate label becomes the hypothesis
//! `"This example is {label}."` and is paired with the text as premise.
//! Single-label scores are a softmax of the entailment logits across labels;
//! multi-label scores are a per-label softmax over contradiction/entailment.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use serde::Deserialize;
use tracing::{debug, info};

use super::traits::{ClassifyProvider, LabelScores};
use crate::error::{ClassifierError, Result};
use crate::model::Device;

/// Default hypothesis template; `{}` is replaced by the candidate label.
pub const DEFAULT_HYPOTHESIS_TEMPLATE: &str = "This example is {}.";

/// Supported local zero-shot models.
#[derive(Debug, Clone)]
pub enum LocalZeroShotModel {
    /// MoritzLaurer/deberta-v3-base-zeroshot-v2.0: binary entailment head.
    DebertaV3BaseZeroshotV2,
    /// cross-encoder/nli-deberta-v3-small: three-way NLI head, faster.
    NliDebertaV3Small,
    /// Custom model from local paths.
    Custom {
        model_path: PathBuf,
        tokenizer_path: PathBuf,
        config_path: PathBuf,
        /// Whether the ONNX graph takes a `token_type_ids` input.
        token_type_ids: bool,
    },
}

impl LocalZeroShotModel {
    /// Resolve a configured model identifier to a known model.
    pub fn from_repo_id(repo_id: &str) -> Option<Self> {
        match repo_id {
            "MoritzLaurer/deberta-v3-base-zeroshot-v2.0" => Some(Self::DebertaV3BaseZeroshotV2),
            "cross-encoder/nli-deberta-v3-small" => Some(Self::NliDebertaV3Small),
            _ => None,
        }
    }

    /// Get the HuggingFace repo ID for this model.
    pub fn repo_id(&self) -> Option<&'static str> {
        match self {
            Self::DebertaV3BaseZeroshotV2 => Some("MoritzLaurer/deberta-v3-base-zeroshot-v2.0"),
            Self::NliDebertaV3Small => Some("cross-encoder/nli-deberta-v3-small"),
            Self::Custom { .. } => None,
        }
    }

    /// Get the model name for display.
    pub fn name(&self) -> &str {
        match self {
            Self::DebertaV3BaseZeroshotV2 => "deberta-v3-base-zeroshot-v2.0",
            Self::NliDebertaV3Small => "nli-deberta-v3-small",
            Self::Custom { model_path, .. } => model_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("custom"),
        }
    }

    fn uses_token_type_ids(&self) -> bool {
        match self {
            Self::DebertaV3BaseZeroshotV2 => false,
            Self::NliDebertaV3Small => true,
            Self::Custom { token_type_ids, .. } => *token_type_ids,
        }
    }

    /// Resolve model, tokenizer and config paths, downloading if needed.
    fn resolve_paths(&self, cache_dir: &Path) -> Result<ModelFiles> {
        match self {
            Self::Custom {
                model_path,
                tokenizer_path,
                config_path,
                ..
            } => Ok(ModelFiles {
                model: model_path.clone(),
                tokenizer: tokenizer_path.clone(),
                config: config_path.clone(),
            }),
            _ => {
                let repo_id = self.repo_id().ok_or_else(|| {
                    ClassifierError::Configuration(format!("no repository for {}", self.name()))
                })?;
                download_model(repo_id, cache_dir)
            }
        }
    }
}

struct ModelFiles {
    model: PathBuf,
    tokenizer: PathBuf,
    config: PathBuf,
}

/// Logit positions of the NLI head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntailmentLabels {
    pub entailment: usize,
    /// `contradiction`, or `not_entailment` for binary heads.
    pub contradiction: usize,
    pub num_labels: usize,
}

#[derive(Deserialize)]
struct ModelConfig {
    id2label: std::collections::HashMap<String, String>,
}

impl EntailmentLabels {
    /// Read the label layout from a HuggingFace `config.json`.
    pub fn from_config_json(json: &str) -> Result<Self> {
        let config: ModelConfig = serde_json::from_str(json)?;

        let mut entailment = None;
        let mut contradiction = None;
        for (id, label) in &config.id2label {
            let index: usize = id.parse().map_err(|_| {
                ClassifierError::Configuration(format!("invalid id2label key '{id}'"))
            })?;
            match label.to_lowercase().replace('-', "_").as_str() {
                "entailment" => entailment = Some(index),
                "contradiction" | "not_entailment" => contradiction = Some(index),
                _ => {}
            }
        }

        let (Some(entailment), Some(contradiction)) = (entailment, contradiction) else {
            return Err(ClassifierError::Configuration(
                "model config lacks entailment/contradiction labels".to_string(),
            ));
        };

        // Label indices address the logits row, which has one entry per label.
        let num_labels = config.id2label.len();
        if let Some(index) = [entailment, contradiction].into_iter().find(|i| *i >= num_labels) {
            return Err(ClassifierError::Configuration(format!(
                "id2label index {index} out of range for {num_labels} labels"
            )));
        }

        Ok(Self {
            entailment,
            contradiction,
            num_labels,
        })
    }
}

struct OnnxSession {
    session: Session,
    tokenizer: tokenizers::Tokenizer,
    labels: EntailmentLabels,
    token_type_ids: bool,
}

/// Local zero-shot provider using ONNX Runtime.
///
/// The session is behind a mutex and runs on the blocking pool, so calls
/// are serialized regardless of how many requests arrive.
pub struct OnnxZeroShotProvider {
    model_id: String,
    hypothesis_template: String,
    inner: Arc<Mutex<OnnxSession>>,
}

impl OnnxZeroShotProvider {
    /// Create a new provider with the specified model.
    ///
    /// Downloads the model into `cache_dir` (or the default cache) if needed.
    pub fn new(model: LocalZeroShotModel, device: Device, cache_dir: Option<&Path>) -> Result<Self> {
        let cache_dir = cache_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(get_cache_dir);
        let files = model.resolve_paths(&cache_dir)?;

        let config_json = std::fs::read_to_string(&files.config).map_err(|e| {
            ClassifierError::Configuration(format!("Failed to read {:?}: {e}", files.config))
        })?;
        let labels = EntailmentLabels::from_config_json(&config_json)?;

        let session = build_session(&files.model, &device)?;
        let tokenizer = tokenizers::Tokenizer::from_file(&files.tokenizer).map_err(|e| {
            ClassifierError::Configuration(format!("Failed to load tokenizer: {}", e))
        })?;

        info!(model = model.name(), device = %device, "loaded local zero-shot model");

        Ok(Self {
            model_id: model
                .repo_id()
                .map(str::to_string)
                .unwrap_or_else(|| model.name().to_string()),
            hypothesis_template: DEFAULT_HYPOTHESIS_TEMPLATE.to_string(),
            inner: Arc::new(Mutex::new(OnnxSession {
                session,
                tokenizer,
                labels,
                token_type_ids: model.uses_token_type_ids(),
            })),
        })
    }

    /// Replace the hypothesis template. `{}` marks where the label goes.
    pub fn with_hypothesis_template(mut self, template: impl Into<String>) -> Self {
        self.hypothesis_template = template.into();
        self
    }
}

impl OnnxSession {
    /// Score every label against `text`.
    fn classify(
        &mut self,
        text: &str,
        hypotheses: &[String],
        multi_label: bool,
    ) -> Result<Vec<f32>> {
        let mut pairs = Vec::with_capacity(hypotheses.len());
        for hypothesis in hypotheses {
            let logits = self.run_pair(text, hypothesis)?;
            if logits.len() != self.labels.num_labels {
                return Err(ClassifierError::Model(format!(
                    "expected {} logits, got {}",
                    self.labels.num_labels,
                    logits.len()
                )));
            }
            pairs.push((
                logits[self.labels.contradiction],
                logits[self.labels.entailment],
            ));
        }

        Ok(if multi_label {
            multi_label_scores(&pairs)
        } else {
            let entailment: Vec<f32> = pairs.iter().map(|(_, e)| *e).collect();
            softmax(&entailment)
        })
    }

    /// Tokenize a premise/hypothesis pair and return the logits row.
    fn run_pair(&mut self, premise: &str, hypothesis: &str) -> Result<Vec<f32>> {
        use ort::value::TensorRef;

        let encoding = self
            .tokenizer
            .encode((premise, hypothesis), true)
            .map_err(|e| ClassifierError::DataError(format!("Tokenization failed: {}", e)))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let type_ids: Vec<i64> = encoding.get_type_ids().iter().map(|&t| t as i64).collect();

        let shape = [1_usize, input_ids.len()];

        let input_ids_tensor = TensorRef::from_array_view((shape, input_ids.as_slice()))
            .map_err(|e| tensor_err("input_ids", e))?;
        let attention_mask_tensor = TensorRef::from_array_view((shape, attention_mask.as_slice()))
            .map_err(|e| tensor_err("attention_mask", e))?;

        let outputs = if self.token_type_ids {
            let token_type_ids_tensor = TensorRef::from_array_view((shape, type_ids.as_slice()))
                .map_err(|e| tensor_err("token_type_ids", e))?;
            self.session
                .run(ort::inputs![
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                    "token_type_ids" => token_type_ids_tensor,
                ])
                .map_err(|e| ClassifierError::Model(format!("ONNX inference failed: {}", e)))?
        } else {
            self.session
                .run(ort::inputs![
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                ])
                .map_err(|e| ClassifierError::Model(format!("ONNX inference failed: {}", e)))?
        };

        let logits = outputs
            .get("logits")
            .ok_or_else(|| ClassifierError::Model("No logits output found".to_string()))?;

        let (_, logits_data) = logits
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Model(format!("Failed to extract logits: {}", e)))?;

        Ok(logits_data.to_vec())
    }
}

#[async_trait]
impl ClassifyProvider for OnnxZeroShotProvider {
    fn name(&self) -> &str {
        "onnx"
    }

    fn model(&self) -> &str {
        &self.model_id
    }

    async fn classify_zero_shot(
        &self,
        text: &str,
        labels: &[&str],
        multi_label: bool,
    ) -> Result<LabelScores> {
        let text = text.to_string();
        let owned_labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        let hypotheses: Vec<String> = labels
            .iter()
            .map(|label| self.hypothesis_template.replace("{}", label))
            .collect();
        let inner = Arc::clone(&self.inner);

        debug!(labels = labels.len(), multi_label, "running local zero-shot inference");

        let scores = tokio::task::spawn_blocking(move || {
            let mut session = inner
                .lock()
                .map_err(|_| ClassifierError::Model("inference session poisoned".to_string()))?;
            session.classify(&text, &hypotheses, multi_label)
        })
        .await
        .map_err(|e| ClassifierError::Model(format!("inference task failed: {e}")))??;

        Ok(owned_labels.into_iter().zip(scores).collect())
    }
}

fn tensor_err(name: &str, e: impl std::fmt::Display) -> ClassifierError {
    ClassifierError::DataError(format!("Failed to create {name} tensor: {e}"))
}

/// Per-label probability of entailment against contradiction.
fn multi_label_scores(pairs: &[(f32, f32)]) -> Vec<f32> {
    pairs
        .iter()
        .map(|&(contradiction, entailment)| softmax(&[contradiction, entailment])[1])
        .collect()
}

/// Softmax function.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|x| x / sum).collect()
}

/// Build an ONNX session with the appropriate execution provider.
fn build_session(model_path: &Path, device: &Device) -> Result<Session> {
    let builder = Session::builder()
        .map_err(|e| ClassifierError::Configuration(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| ClassifierError::Configuration(format!("Failed to set optimization level: {}", e)))?;

    // Configure execution provider based on device
    let builder = match device {
        Device::Cpu => builder,
        #[cfg(feature = "cuda")]
        Device::Cuda { device_id } => {
            use ort::execution_providers::CUDAExecutionProvider;
            builder
                .with_execution_providers([
                    CUDAExecutionProvider::default()
                        .with_device_id(*device_id as i32)
                        .build(),
                ])
                .map_err(|e| {
                    ClassifierError::Configuration(format!("Failed to configure CUDA: {}", e))
                })?
        }
        #[cfg(not(feature = "cuda"))]
        Device::Cuda { .. } => {
            return Err(ClassifierError::Configuration(
                "built without CUDA support; rebuild with the `cuda` feature".to_string(),
            ));
        }
    };

    builder
        .commit_from_file(model_path)
        .map_err(|e| ClassifierError::Configuration(format!("Failed to load ONNX model: {}", e)))
}

/// Get the cache directory for models.
fn get_cache_dir() -> PathBuf {
    std::env::var("TAG_CLASSIFIER_CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join("tag-classifier")
                .join("models")
        })
}

/// Download model, tokenizer and config from HuggingFace Hub.
fn download_model(repo_id: &str, cache_dir: &Path) -> Result<ModelFiles> {
    use hf_hub::api::sync::ApiBuilder;

    let api = ApiBuilder::new()
        .with_cache_dir(cache_dir.to_path_buf())
        .build()
        .map_err(|e| {
            ClassifierError::Configuration(format!("Failed to initialize HF Hub API: {}", e))
        })?;

    let repo = api.model(repo_id.to_string());
    let fetch = |file: &str| {
        repo.get(file).map_err(|e| {
            ClassifierError::Configuration(format!("Failed to download {file} from {repo_id}: {e}"))
        })
    };

    Ok(ModelFiles {
        model: fetch("onnx/model.onnx")?,
        tokenizer: fetch("tokenizer.json")?,
        config: fetch("config.json")?,
    })
}
