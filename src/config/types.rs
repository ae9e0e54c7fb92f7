use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Deploy-time model settings. These are fixed for the life of the process;
/// nothing here is reloadable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the quantized GGUF weights file.
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
    /// Token budget for prompt + completion combined.
    #[serde(default = "default_context_length")]
    pub context_length: u32,
    /// Worker threads for llama.cpp, sized to the deployment's CPU allocation.
    #[serde(default = "default_threads")]
    pub threads: i32,
    /// Cap on newly generated tokens per invocation.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Layers to offload to the GPU (0 = CPU only).
    #[serde(default)]
    pub gpu_layers: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            context_length: default_context_length(),
            threads: default_threads(),
            max_tokens: default_max_tokens(),
            gpu_layers: 0,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_model_path() -> PathBuf {
    PathBuf::from("./model/phi-2.Q4_K_M.gguf")
}

fn default_context_length() -> u32 {
    2048
}

fn default_threads() -> i32 {
    6
}

fn default_max_tokens() -> u32 {
    512
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}
