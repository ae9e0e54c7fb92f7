use async_trait::async_trait;
use lambda_llm::{
    engine::{
        format_prompt, Completion, CompletionChoice, CompletionEngine, FinishReason, Usage,
    },
    Error, Result,
};
use std::sync::{Arc, Mutex};

/// Mock completion engine for testing
#[derive(Debug)]
pub struct MockEngine {
    pub completions: Arc<Mutex<Vec<Completion>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub error: Option<String>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            completions: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            error: None,
        }
    }

    pub fn with_completions(self, completions: Vec<Completion>) -> Self {
        *self.completions.lock().unwrap() = completions;
        self
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }

    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionEngine for MockEngine {
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(ref error) = self.error {
            return Err(Error::engine(error.clone()));
        }

        let mut completions = self.completions.lock().unwrap();
        if completions.is_empty() {
            return Err(Error::engine("No more mock completions available"));
        }

        Ok(completions.remove(0))
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

// Helper functions for creating test data

pub fn create_mock_completion(text: &str) -> Completion {
    Completion {
        id: "cmpl-test".to_string(),
        object: "text_completion".to_string(),
        created: 0,
        model: "phi-2.Q4_K_M.gguf".to_string(),
        choices: vec![CompletionChoice {
            text: text.to_string(),
            index: 0,
            logprobs: None,
            finish_reason: FinishReason::Stop,
        }],
        usage: Usage {
            prompt_tokens: 8,
            completion_tokens: 16,
            total_tokens: 24,
        },
    }
}

/// Builds the completion the real engine would produce for `prompt` with the
/// echo flag on: formatted prompt followed by generated text.
pub fn create_echoed_completion(prompt: &str, generated: &str) -> Completion {
    create_mock_completion(&format!("{}{}", format_prompt(prompt), generated))
}
