use crate::{EngineError, EngineResult, ModelInfo, ModelStatus, engine::SpeechEngine};

use std::{collections::HashMap, panic::Location, path::{Path, PathBuf}};

use async_trait::async_trait;
use error_location::ErrorLocation;
use futures_util::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// GGUF magic header, little-endian ("GGUF").
const GGUF_MAGIC: u32 = 0x4655_4747;
/// GGML magic header used by whisper model files.
const GGML_MAGIC: u32 = 0x6767_6d6c;
/// Smallest size any model file can plausibly have.
const MIN_MODEL_BYTES: u64 = 1024;

/// On-disk format of an engine's model files, for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// Single-file GGUF (magic-checked).
    Gguf,
    /// GGML binary as used by whisper (magic-checked).
    Ggml,
    /// Opaque artifact, size-checked only.
    Raw,
}

/// Catalog entry describing one downloadable model.
struct ModelSpec {
    name: &'static str,
    filename: &'static str,
    size_mb: u32,
    url: &'static str,
    description: &'static str,
}

const PARAKEET_CATALOG: &[ModelSpec] = &[ModelSpec {
    name: "parakeet-tdt-0.6b-v3",
    filename: "parakeet-tdt-0.6b-v3.onnx",
    size_mb: 640,
    url: "https://huggingface.co/nvidia/parakeet-tdt-0.6b-v3/resolve/main/parakeet-tdt-0.6b-v3.onnx",
    description: "English streaming model, fastest option",
}];

const MULTILINGUAL_CATALOG: &[ModelSpec] = &[
    ModelSpec {
        name: "multilingual-0.6b-q8_0",
        filename: "multilingual-0.6b-q8_0.gguf",
        size_mb: 1350,
        url: "https://huggingface.co/confab-app/asr-multilingual-gguf/resolve/main/multilingual-0.6b-q8_0.gguf",
        description: "8-bit quantized, best speed/quality balance",
    },
    ModelSpec {
        name: "multilingual-0.6b-f16",
        filename: "multilingual-0.6b-f16.gguf",
        size_mb: 1880,
        url: "https://huggingface.co/confab-app/asr-multilingual-gguf/resolve/main/multilingual-0.6b-f16.gguf",
        description: "Half-precision, highest accuracy",
    },
];

const WHISPER_CATALOG: &[ModelSpec] = &[
    ModelSpec {
        name: "ggml-base.en",
        filename: "ggml-base.en.bin",
        size_mb: 142,
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.en.bin",
        description: "English base model",
    },
    ModelSpec {
        name: "ggml-large-v3",
        filename: "ggml-large-v3.bin",
        size_mb: 2950,
        url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-large-v3.bin",
        description: "Multilingual large model",
    },
];

/// Catalog-driven local engine: models are single files in a per-engine
/// directory, validated by format magic and size.
pub struct LocalModelEngine {
    name: &'static str,
    models_dir: PathBuf,
    format: ModelFormat,
    catalog: &'static [ModelSpec],
    /// Model name -> completion percent for in-flight downloads.
    downloads: RwLock<HashMap<String, u8>>,
    client: reqwest::Client,
}

impl LocalModelEngine {
    fn new(
        name: &'static str,
        models_dir: PathBuf,
        format: ModelFormat,
        catalog: &'static [ModelSpec],
    ) -> Self {
        Self {
            name,
            models_dir,
            format,
            catalog,
            downloads: RwLock::new(HashMap::new()),
            client: reqwest::Client::new(),
        }
    }

    /// Parakeet engine rooted at `models_dir`.
    pub fn parakeet(models_dir: PathBuf) -> Self {
        Self::new("parakeet", models_dir, ModelFormat::Raw, PARAKEET_CATALOG)
    }

    /// Multilingual GGUF engine rooted at `models_dir`.
    pub fn multilingual(models_dir: PathBuf) -> Self {
        Self::new(
            "multilingual",
            models_dir,
            ModelFormat::Gguf,
            MULTILINGUAL_CATALOG,
        )
    }

    /// Whisper engine rooted at `models_dir`.
    pub fn local_whisper(models_dir: PathBuf) -> Self {
        Self::new(
            "local-whisper",
            models_dir,
            ModelFormat::Ggml,
            WHISPER_CATALOG,
        )
    }

    /// Validate an on-disk model file by size and format magic.
    async fn validate_file(&self, path: &Path) -> EngineResult<()> {
        let metadata = tokio::fs::metadata(path).await?;

        if metadata.len() < MIN_MODEL_BYTES {
            return Err(EngineError::InvalidModelFile {
                path: path.to_path_buf(),
                reason: format!("file too small: {} bytes", metadata.len()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let expected = match self.format {
            ModelFormat::Gguf => GGUF_MAGIC,
            ModelFormat::Ggml => GGML_MAGIC,
            ModelFormat::Raw => return Ok(()),
        };

        let mut file = tokio::fs::File::open(path).await?;
        let mut magic_bytes = [0u8; 4];
        file.read_exact(&mut magic_bytes).await?;

        let magic = u32::from_le_bytes(magic_bytes);
        if magic != expected {
            return Err(EngineError::InvalidModelFile {
                path: path.to_path_buf(),
                reason: format!("bad magic header 0x{magic:08X}, expected 0x{expected:08X}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    async fn status_for(&self, spec: &ModelSpec) -> ModelStatus {
        if let Some(progress) = self.downloads.read().await.get(spec.name) {
            return ModelStatus::Downloading {
                progress: *progress,
            };
        }

        let path = self.models_dir.join(spec.filename);
        if !path.exists() {
            return ModelStatus::Missing;
        }

        match self.validate_file(&path).await {
            Ok(()) => ModelStatus::Available,
            Err(e) => {
                warn!(engine = self.name, model = spec.name, error = %e, "Model file failed validation");
                let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                ModelStatus::Corrupted {
                    file_size,
                    expected_min_size: u64::from(spec.size_mb) * 1024 * 1024,
                }
            }
        }
    }

    #[track_caller]
    fn spec(&self, name: &str) -> EngineResult<&'static ModelSpec> {
        self.catalog
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| EngineError::UnknownModel {
                name: name.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    async fn stream_to_disk(&self, spec: &ModelSpec) -> EngineResult<()> {
        let final_path = self.models_dir.join(spec.filename);
        let part_path = self.models_dir.join(format!("{}.part", spec.filename));

        let response = self.client.get(spec.url).send().await.map_err(|e| {
            EngineError::DownloadFailed {
                name: spec.name.to_string(),
                reason: format!("request failed: {e}"),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        if !response.status().is_success() {
            return Err(EngineError::DownloadFailed {
                name: spec.name.to_string(),
                reason: format!("server returned {}", response.status()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let total_bytes = response.content_length().unwrap_or(0);
        let mut downloaded: u64 = 0;

        let mut file = tokio::fs::File::create(&part_path).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| EngineError::DownloadFailed {
                name: spec.name.to_string(),
                reason: format!("stream interrupted: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if total_bytes > 0 {
                let percent = ((downloaded as f64 / total_bytes as f64) * 100.0).min(100.0) as u8;
                self.downloads
                    .write()
                    .await
                    .insert(spec.name.to_string(), percent);
            }
        }

        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&part_path, &final_path).await?;
        self.validate_file(&final_path).await?;

        Ok(())
    }
}

#[async_trait]
impl SpeechEngine for LocalModelEngine {
    fn name(&self) -> &str {
        self.name
    }

    #[instrument(skip(self), fields(engine = self.name))]
    async fn init(&self) -> EngineResult<()> {
        if !self.models_dir.exists() {
            tokio::fs::create_dir_all(&self.models_dir)
                .await
                .map_err(|_| EngineError::ModelsDirUnavailable {
                    path: self.models_dir.clone(),
                    location: ErrorLocation::from(Location::caller()),
                })?;
            debug!(engine = self.name, dir = ?self.models_dir, "Created models directory");
        }
        Ok(())
    }

    async fn has_available_models(&self) -> EngineResult<bool> {
        let models = self.available_models().await?;
        Ok(models.iter().any(|m| m.status.is_available()))
    }

    async fn available_models(&self) -> EngineResult<Vec<ModelInfo>> {
        if !self.models_dir.exists() {
            return Err(EngineError::ModelsDirUnavailable {
                path: self.models_dir.clone(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut models = Vec::with_capacity(self.catalog.len());
        for spec in self.catalog {
            models.push(ModelInfo {
                name: spec.name.to_string(),
                path: self.models_dir.join(spec.filename),
                size_mb: spec.size_mb,
                status: self.status_for(spec).await,
                description: spec.description.to_string(),
            });
        }

        Ok(models)
    }

    #[instrument(skip(self), fields(engine = self.name))]
    async fn download_model(&self, name: &str) -> EngineResult<()> {
        let spec = self.spec(name)?;
        self.init().await?;

        {
            let mut downloads = self.downloads.write().await;
            if downloads.contains_key(name) {
                debug!(engine = self.name, model = name, "Download already in flight");
                return Ok(());
            }
            downloads.insert(name.to_string(), 0);
        }

        info!(engine = self.name, model = name, size_mb = spec.size_mb, "Model download started");

        let result = self.stream_to_disk(spec).await;
        self.downloads.write().await.remove(name);

        match &result {
            Ok(()) => info!(engine = self.name, model = name, "Model download complete"),
            Err(e) => {
                // Leave no partial file behind for the next discovery pass.
                let part_path = self.models_dir.join(format!("{}.part", spec.filename));
                let _ = std::fs::remove_file(part_path);
                warn!(engine = self.name, model = name, error = %e, "Model download failed");
            }
        }

        result
    }
}
