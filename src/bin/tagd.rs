//! tagd - tag classifier daemon.
//!
//! Serves a [`TagClassifier`](tag_classifier::TagClassifier) over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tag_classifier::providers::{ClassifyProvider, SerializedProvider};
use tag_classifier::server::config::{Backend, Config, LogFormat, ModelConfig, Secrets};
use tag_classifier::server::{self, AppState};
use tag_classifier::{ClassifierError, TagClassifier};

/// Tag classifier daemon: zero-shot tag classification over HTTP.
#[derive(Parser)]
#[command(name = "tagd")]
#[command(version = tag_classifier::PKG_VERSION)]
#[command(about = "Tag classifier HTTP service")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind.
    #[arg(long, env = "TAG_CLASSIFIER_HOST")]
    host: Option<String>,

    /// Port to bind.
    #[arg(short, long, env = "TAG_CLASSIFIER_PORT")]
    port: Option<u16>,

    /// Zero-shot model (HuggingFace repo id).
    #[arg(short, long, env = "TAG_CLASSIFIER_MODEL")]
    model: Option<String>,

    /// Device for local inference: cpu, cuda or cuda:<index>.
    #[arg(long, env = "TAG_CLASSIFIER_DEVICE")]
    device: Option<String>,

    /// Provider backend: huggingface or local.
    #[arg(long, env = "TAG_CLASSIFIER_BACKEND")]
    backend: Option<Backend>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(model) = self.model {
            config.model.name = model;
        }
        if let Some(device) = self.device {
            config.model.device = device;
        }
        if let Some(backend) = self.backend {
            config.model.backend = backend;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);

    init_tracing(&config.server.log_level, config.server.log_format);

    let secrets = Secrets::load()?;
    let provider = build_provider(&config.model, &secrets)?;
    let classifier = TagClassifier::new(provider)
        .with_policy(config.model.policy)
        .with_separator(config.model.separator.clone());

    let addr = config.server.socket_addr()?;
    info!(
        version = tag_classifier::version_string(),
        %addr,
        model = classifier.model(),
        provider = classifier.provider_name(),
        policy = classifier.policy().name(),
        device = %config.model.device,
        "tagd starting"
    );
    info!(docs = %format!("http://{addr}/docs"), redoc = %format!("http://{addr}/redoc"), "api documentation");

    let router = server::build_router(AppState::new(classifier), &config.server.limits);
    server::serve(addr, router).await?;

    Ok(())
}

fn init_tracing(default_level: &str, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Build the provider named by `model.backend`, serialized if configured.
fn build_provider(
    model: &ModelConfig,
    secrets: &Secrets,
) -> Result<Arc<dyn ClassifyProvider>, ClassifierError> {
    let provider: Arc<dyn ClassifyProvider> = match model.backend {
        Backend::Huggingface => build_huggingface(model, secrets)?,
        Backend::Local => build_local(model)?,
    };

    if model.serialize_inference() {
        Ok(Arc::new(SerializedProvider::new(provider)))
    } else {
        Ok(provider)
    }
}

#[cfg(feature = "huggingface")]
fn build_huggingface(
    model: &ModelConfig,
    secrets: &Secrets,
) -> Result<Arc<dyn ClassifyProvider>, ClassifierError> {
    use tag_classifier::providers::HuggingFaceClient;

    let api_key = secrets.huggingface_api_key().ok_or_else(|| {
        ClassifierError::Configuration(
            "no HuggingFace API key: set HF_API_KEY or add [huggingface] to secrets.toml"
                .to_string(),
        )
    })?;

    if model.device()?.is_gpu() {
        warn!(device = %model.device, "device is ignored by the huggingface backend");
    }

    let client = match &model.base_url {
        Some(url) => HuggingFaceClient::with_base_url(api_key, &model.name, url)?,
        None => HuggingFaceClient::new(api_key, &model.name)?,
    };
    Ok(Arc::new(client))
}

#[cfg(not(feature = "huggingface"))]
fn build_huggingface(
    _model: &ModelConfig,
    _secrets: &Secrets,
) -> Result<Arc<dyn ClassifyProvider>, ClassifierError> {
    Err(ClassifierError::Configuration(
        "backend 'huggingface' requires the huggingface feature".to_string(),
    ))
}

#[cfg(feature = "local-inference")]
fn build_local(model: &ModelConfig) -> Result<Arc<dyn ClassifyProvider>, ClassifierError> {
    use tag_classifier::providers::{LocalZeroShotModel, OnnxZeroShotProvider};

    let local = LocalZeroShotModel::from_repo_id(&model.name).ok_or_else(|| {
        ClassifierError::Configuration(format!(
            "model '{}' is not available for local inference",
            model.name
        ))
    })?;
    let device = model.device()?;

    info!(model = %model.name, %device, "loading local model");
    let provider = OnnxZeroShotProvider::new(local, device, model.models_dir.as_deref())?;
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "local-inference"))]
fn build_local(_model: &ModelConfig) -> Result<Arc<dyn ClassifyProvider>, ClassifierError> {
    Err(ClassifierError::Configuration(
        "backend 'local' requires the local-inference feature".to_string(),
    ))
}
