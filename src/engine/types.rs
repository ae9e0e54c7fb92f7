use serde::{Deserialize, Serialize};

/// Fixed instruction template applied to every incoming prompt.
pub const PROMPT_TEMPLATE: &str = "Instruct: {prompt}\nOutput:";

/// Wraps a free-form prompt in the instruction template the model was tuned on.
pub fn format_prompt(prompt: &str) -> String {
    format!("Instruct: {prompt}\nOutput:")
}

/// Sampling parameters for a generation call.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    /// Temperature for sampling (below 0.01 switches to greedy)
    pub temperature: f32,
    /// Top-k sampling parameter
    pub top_k: u32,
    /// Top-p (nucleus) sampling parameter
    pub top_p: f32,
    /// Random seed for sampling (0 = random)
    pub seed: u32,
    /// Prepend the formatted prompt to the returned text
    pub echo: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.8,
            top_k: 40,
            top_p: 0.95,
            seed: 0,
            echo: true,
        }
    }
}

/// Model metadata captured once at load time.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Path the weights were loaded from
    pub path: String,
    /// Vocabulary size
    pub vocab_size: i32,
    /// Context length the model was trained with
    pub context_length: u32,
    /// Total parameter count
    pub param_count: u64,
    /// Model size in bytes
    pub size_bytes: u64,
}

/// One generation result, serialized verbatim into the response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<CompletionChoice>,
    pub usage: Usage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
    pub index: u32,
    pub logprobs: Option<serde_json::Value>,
    pub finish_reason: FinishReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    /// The model emitted an end-of-generation token
    Stop,
    /// The generation cap was reached
    Length,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
