//! Model loading and text generation.
//!
//! The weights are loaded exactly once, before any request is serviced, and
//! shared read-only across all invocations handled by this process.

mod types;
mod worker;

pub use types::{
    format_prompt, Completion, CompletionChoice, FinishReason, GenerationParams, ModelInfo, Usage,
    PROMPT_TEMPLATE,
};

use std::thread::{self, JoinHandle};

use async_trait::async_trait;
use crossbeam_channel::Sender;
use tokio::sync::oneshot;
use tracing::info;

use crate::config::ModelConfig;
use crate::{Error, Result};

/// Seam between the request handler and the inference engine.
#[async_trait]
pub trait CompletionEngine: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Completion>;
}

/// llama.cpp-backed engine. Holds the handle to the inference thread that owns
/// the loaded weights; generation requests are serviced one at a time.
pub struct LlamaEngine {
    command_tx: Sender<worker::Command>,
    worker: Option<JoinHandle<()>>,
    info: ModelInfo,
}

impl LlamaEngine {
    /// Loads the model and spawns the inference thread.
    ///
    /// Returns an error if the backend cannot be initialized or the weights
    /// file is missing or unreadable. Callers treat that as fatal: the process
    /// must not begin serving requests without a loaded model.
    pub async fn load(config: ModelConfig) -> Result<Self> {
        let params = GenerationParams {
            max_tokens: config.max_tokens,
            ..GenerationParams::default()
        };

        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let (ready_tx, ready_rx) = oneshot::channel();

        let worker = thread::Builder::new()
            .name("llama-worker".to_string())
            .spawn(move || worker::run(config, params, command_rx, ready_tx))?;

        let info = ready_rx
            .await
            .map_err(|_| Error::engine("inference thread exited before reporting readiness"))??;

        info!(
            "Model loaded: {} ({} params, vocab {}, trained ctx {})",
            info.path, info.param_count, info.vocab_size, info.context_length
        );

        Ok(Self {
            command_tx,
            worker: Some(worker),
            info,
        })
    }

    /// Metadata captured when the weights were loaded.
    pub fn model_info(&self) -> &ModelInfo {
        &self.info
    }
}

#[async_trait]
impl CompletionEngine for LlamaEngine {
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        let (respond_to, response_rx) = oneshot::channel();

        self.command_tx
            .send(worker::Command::Generate {
                prompt: prompt.to_string(),
                respond_to,
            })
            .map_err(|_| Error::engine("inference thread is not running"))?;

        response_rx
            .await
            .map_err(|_| Error::engine("inference thread dropped the request"))?
    }
}

impl Drop for LlamaEngine {
    fn drop(&mut self) {
        let _ = self.command_tx.send(worker::Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
