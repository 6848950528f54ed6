use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::LedgerError;
use crate::insight::GeminiConfig;
use crate::utils::{app_data_dir, config_file_in, ensure_dir};

const TMP_SUFFIX: &str = "tmp";

/// Engine settings, stored as JSON in the app data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "es-MX".into(),
            currency: "MXN".into(),
            gemini_api_key: None,
            gemini_model: None,
            gemini_endpoint: None,
        }
    }
}

impl Config {
    /// Resolves the Gemini client settings, if a key is configured.
    ///
    /// `GEMINI_API_KEY` in the environment wins over the settings file;
    /// without a key from either source there is no collaborator.
    pub fn gemini(&self) -> Option<GeminiConfig> {
        self.resolve_gemini(std::env::var("GEMINI_API_KEY").ok())
    }

    fn resolve_gemini(&self, env_key: Option<String>) -> Option<GeminiConfig> {
        let api_key = env_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.gemini_api_key.clone())?;
        let mut config = GeminiConfig::new(api_key);
        if let Some(model) = &self.gemini_model {
            config = config.with_model(model.clone());
        }
        if let Some(endpoint) = &self.gemini_endpoint {
            config = config.with_endpoint(endpoint.clone());
        }
        Some(config)
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::from_base(app_data_dir())
    }

    #[cfg(test)]
    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self, LedgerError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
        })
    }

    /// Loads the settings, falling back to defaults when no file exists yet.
    pub fn load(&self) -> Result<Config, LedgerError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
