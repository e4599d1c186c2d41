//! Confab Core Library
//!
//! Engine-facing surface for the Confab session coordinator: transcription
//! provider identity, local model catalogs with status reporting, and the
//! readiness prober that gates session starts.
//!
//! # Example
//!
//! ```no_run
//! use confab_core::{EngineSet, Provider, ReadinessProber};
//!
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engines = EngineSet::open(PathBuf::from("models"));
//!     let prober = ReadinessProber::new(engines.into());
//!
//!     if prober.check_ready(&Provider::Parakeet).await {
//!         println!("parakeet has a usable model");
//!     }
//! }
//! ```

mod engine;
mod error;
mod model;
mod provider;
mod readiness;

pub use {
    engine::{EngineSet, LocalModelEngine, ModelFormat, SpeechEngine},
    error::{EngineError, Result as EngineResult},
    model::{ModelInfo, ModelStatus},
    provider::Provider,
    readiness::ReadinessProber,
};

#[cfg(test)]
mod tests;
