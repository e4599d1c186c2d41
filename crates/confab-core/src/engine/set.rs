use crate::{LocalModelEngine, Provider, engine::SpeechEngine};

use std::{path::PathBuf, sync::Arc};

/// The three local engines, keyed by provider.
///
/// Cloud providers have no entry here; `local()` returning `None` is what
/// makes the readiness prober treat them as always ready.
pub struct EngineSet {
    parakeet: Arc<dyn SpeechEngine>,
    multilingual: Arc<dyn SpeechEngine>,
    local_whisper: Arc<dyn SpeechEngine>,
}

impl EngineSet {
    /// Build the production engines under one models root directory.
    pub fn open(models_root: PathBuf) -> Self {
        Self {
            parakeet: Arc::new(LocalModelEngine::parakeet(models_root.join("parakeet"))),
            multilingual: Arc::new(LocalModelEngine::multilingual(
                models_root.join("multilingual"),
            )),
            local_whisper: Arc::new(LocalModelEngine::local_whisper(
                models_root.join("whisper"),
            )),
        }
    }

    /// Assemble a set from arbitrary engines (used by tests).
    pub fn from_engines(
        parakeet: Arc<dyn SpeechEngine>,
        multilingual: Arc<dyn SpeechEngine>,
        local_whisper: Arc<dyn SpeechEngine>,
    ) -> Self {
        Self {
            parakeet,
            multilingual,
            local_whisper,
        }
    }

    /// The engine backing a local provider, `None` for cloud providers.
    pub fn local(&self, provider: &Provider) -> Option<&Arc<dyn SpeechEngine>> {
        match provider {
            Provider::Parakeet => Some(&self.parakeet),
            Provider::Multilingual => Some(&self.multilingual),
            Provider::LocalWhisper => Some(&self.local_whisper),
            Provider::Cloud(_) => None,
        }
    }

    /// Look up an engine by its stable name (route parameters).
    pub fn by_name(&self, name: &str) -> Option<&Arc<dyn SpeechEngine>> {
        self.all().into_iter().find(|e| e.name() == name)
    }

    /// All engines, for listings.
    pub fn all(&self) -> [&Arc<dyn SpeechEngine>; 3] {
        [&self.parakeet, &self.multilingual, &self.local_whisper]
    }
}
