//! Dedicated inference thread.
//!
//! llama-cpp-2 handle types (`LlamaBackend`, `LlamaModel`, `LlamaContext`)
//! contain raw pointers that are not `Send`, so the backend and the loaded
//! weights live on this thread for the life of the process. The async side
//! submits commands over a channel and awaits a oneshot reply per request.

use std::num::NonZeroU32;
use std::path::Path;

use chrono::Utc;
use crossbeam_channel::Receiver;
use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel, Special};
use llama_cpp_2::sampling::LlamaSampler;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::config::ModelConfig;
use crate::engine::types::{
    format_prompt, Completion, CompletionChoice, FinishReason, GenerationParams, ModelInfo, Usage,
};
use crate::{Error, Result};

/// Commands accepted by the inference thread.
pub(crate) enum Command {
    Generate {
        prompt: String,
        respond_to: oneshot::Sender<Result<Completion>>,
    },
    Shutdown,
}

/// Thread entry point: load the model, report readiness, then service
/// generation commands one at a time until shutdown.
pub(crate) fn run(
    config: ModelConfig,
    params: GenerationParams,
    commands: Receiver<Command>,
    ready: oneshot::Sender<Result<ModelInfo>>,
) {
    let backend = match LlamaBackend::init() {
        Ok(backend) => backend,
        Err(e) => {
            let _ = ready.send(Err(Error::engine(format!(
                "failed to initialize llama backend: {e}"
            ))));
            return;
        }
    };

    let model_params = LlamaModelParams::default().with_n_gpu_layers(config.gpu_layers);
    let model = match LlamaModel::load_from_file(&backend, &config.path, &model_params) {
        Ok(model) => model,
        Err(e) => {
            let _ = ready.send(Err(Error::engine(format!(
                "failed to load model from {}: {e}",
                config.path.display()
            ))));
            return;
        }
    };

    let info = ModelInfo {
        path: config.path.to_string_lossy().to_string(),
        vocab_size: model.n_vocab(),
        context_length: model.n_ctx_train(),
        param_count: model.n_params() as u64,
        size_bytes: model.size() as u64,
    };
    let model_name = model_file_name(&config.path);

    if ready.send(Ok(info)).is_err() {
        // Caller gave up during load; nothing left to serve.
        return;
    }

    while let Ok(command) = commands.recv() {
        match command {
            Command::Generate { prompt, respond_to } => {
                let result = generate(&backend, &model, &config, &params, &model_name, &prompt);
                if let Err(ref e) = result {
                    tracing::error!("Generation failed: {}", e);
                }
                let _ = respond_to.send(result);
            }
            Command::Shutdown => {
                tracing::debug!("Inference thread shutting down");
                break;
            }
        }
    }
}

fn model_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Runs one blocking generation call: fresh context, prompt decode, sampling
/// loop bounded by the configured token cap and the context window.
fn generate(
    backend: &LlamaBackend,
    model: &LlamaModel,
    config: &ModelConfig,
    params: &GenerationParams,
    model_name: &str,
    prompt: &str,
) -> Result<Completion> {
    let formatted = format_prompt(prompt);

    let n_ctx = NonZeroU32::new(config.context_length)
        .ok_or_else(|| Error::engine("context_length must be nonzero"))?;
    let ctx_params = LlamaContextParams::default()
        .with_n_ctx(Some(n_ctx))
        .with_n_batch(config.context_length)
        .with_n_threads(config.threads)
        .with_n_threads_batch(config.threads);

    let mut ctx = model
        .new_context(backend, ctx_params)
        .map_err(|e| Error::engine(format!("failed to create context: {e}")))?;

    let tokens = model
        .str_to_token(&formatted, AddBos::Always)
        .map_err(|e| Error::engine(format!("failed to tokenize prompt: {e}")))?;
    let prompt_tokens = tokens.len() as u32;

    if prompt_tokens >= config.context_length {
        return Err(Error::engine(format!(
            "prompt occupies {} tokens, context window is {}",
            prompt_tokens, config.context_length
        )));
    }

    let mut batch = LlamaBatch::new(config.context_length as usize, 1);
    for (i, token) in tokens.iter().enumerate() {
        let is_last = i == tokens.len() - 1;
        batch
            .add(*token, i as i32, &[0], is_last)
            .map_err(|e| Error::engine(format!("failed to add token to batch: {e}")))?;
    }

    ctx.decode(&mut batch)
        .map_err(|e| Error::engine(format!("failed to decode prompt: {e}")))?;

    let mut sampler = build_sampler(params);

    // Prompt and completion share the context window.
    let budget = params.max_tokens.min(config.context_length - prompt_tokens);

    let mut output_bytes: Vec<u8> = Vec::new();
    let mut finish_reason = FinishReason::Length;
    let mut completion_tokens = 0u32;
    let mut n_decoded = tokens.len() as i32;

    for _ in 0..budget {
        let new_token = sampler.sample(&ctx, batch.n_tokens() - 1);
        sampler.accept(new_token);

        if model.is_eog_token(new_token) {
            finish_reason = FinishReason::Stop;
            break;
        }

        let token_bytes = model
            .token_to_bytes(new_token, Special::Tokenize)
            .map_err(|e| Error::engine(format!("failed to convert token to bytes: {e}")))?;
        output_bytes.extend_from_slice(&token_bytes);
        completion_tokens += 1;

        batch.clear();
        batch
            .add(new_token, n_decoded, &[0], true)
            .map_err(|e| Error::engine(format!("failed to add token to batch: {e}")))?;

        ctx.decode(&mut batch)
            .map_err(|e| Error::engine(format!("failed to decode: {e}")))?;

        n_decoded += 1;
    }

    let generated = String::from_utf8_lossy(&output_bytes).into_owned();
    let text = if params.echo {
        format!("{formatted}{generated}")
    } else {
        generated
    };

    Ok(Completion {
        id: format!("cmpl-{}", Uuid::new_v4()),
        object: "text_completion".to_string(),
        created: Utc::now().timestamp(),
        model: model_name.to_string(),
        choices: vec![CompletionChoice {
            text,
            index: 0,
            logprobs: None,
            finish_reason,
        }],
        usage: Usage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        },
    })
}

fn build_sampler(params: &GenerationParams) -> LlamaSampler {
    if params.temperature < 0.01 {
        return LlamaSampler::greedy();
    }

    let seed = if params.seed == 0 {
        rand_seed()
    } else {
        params.seed
    };

    LlamaSampler::chain_simple([
        LlamaSampler::top_k(params.top_k as i32),
        LlamaSampler::top_p(params.top_p, 1),
        LlamaSampler::temp(params.temperature),
        LlamaSampler::dist(seed),
    ])
}

/// Generates a random seed using system entropy
fn rand_seed() -> u32 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};
    RandomState::new().build_hasher().finish() as u32
}
