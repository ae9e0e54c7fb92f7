mod types;

pub use types::*;

use crate::Result;
use std::env;
use std::path::Path;
use tracing::debug;

/// Loads configuration from `CONFIG_PATH`, falling back to `./config.yaml`,
/// falling back to built-in defaults.
///
/// Every field has a default, so a deployment that bakes the model into the
/// image at the default path needs no configuration file at all.
pub async fn load() -> Result<Config> {
    if let Ok(path) = env::var("CONFIG_PATH") {
        return load_from(Path::new(&path)).await;
    }

    let default_path = Path::new("config.yaml");
    if default_path.exists() {
        load_from(default_path).await
    } else {
        debug!("No configuration file found, using built-in defaults");
        Ok(Config::default())
    }
}

pub async fn load_from(path: &Path) -> Result<Config> {
    debug!("Loading configuration from: {}", path.display());

    let config_str = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&config_str)?;

    Ok(config)
}
