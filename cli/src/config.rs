use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "vital").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("vital.db");

        Ok(Config { db_path, data_dir })
    }

    /// Estimation API key: `VITAL_API_KEY` env var, falling back to an
    /// `api_key` file in the data directory.
    pub fn load_api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var("VITAL_API_KEY") {
            let key = key.trim().to_string();
            if !key.is_empty() {
                return Ok(key);
            }
        }

        let path = self.data_dir.join("api_key");
        if path.exists() {
            let key = std::fs::read_to_string(&path).context("Failed to read API key file")?;
            let key = key.trim().to_string();
            if !key.is_empty() {
                return Ok(key);
            }
        }

        anyhow::bail!(
            "No estimation API key configured. Set VITAL_API_KEY or write the key to {}",
            path.display()
        )
    }
}
