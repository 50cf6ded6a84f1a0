//! `settings.json` in the project directory

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.json";

const NAME_PREFIX: &str = "MyWebApplication";

const BUCKET_PREFIX: &str = "my-lambda-";

/// Names that tie local state to the deployed stack across runs
///
/// Keys this crate does not know about are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Settings {
    pub fn path(dir: &Path) -> PathBuf {
        dir.join(SETTINGS_FILE)
    }

    /// Read `settings.json` from `dir`, creating it as `{}` when missing
    pub fn load(dir: &Path) -> Result<Self> {
        let path = Self::path(dir);
        if !path.is_file() {
            tracing::info!("{} does not exist, initializing", SETTINGS_FILE);
            fs::write(&path, "{}")?;
        }

        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|source| ConfigError::InvalidSettings {
            path: path.clone(),
            source,
        })
    }

    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = Self::path(dir);
        fs::write(&path, serde_json::to_string(self)?)?;
        tracing::debug!("Saved {}", path.display());
        Ok(path)
    }

    /// Settle the application name
    ///
    /// A name already in the settings wins; otherwise `requested`, otherwise
    /// a generated one.
    pub fn resolve_name(&mut self, requested: Option<&str>) -> &str {
        if let Some(existing) = &self.name {
            tracing::warn!("Using name {} from {}", existing, SETTINGS_FILE);
        }
        self.name.get_or_insert_with(|| {
            requested
                .map(str::to_string)
                .unwrap_or_else(generate_app_name)
        })
    }

    pub fn function_name_or_default(&self, app_name: &str) -> String {
        self.function_name
            .clone()
            .unwrap_or_else(|| format!("{}Function", app_name))
    }

    pub fn rest_name_or_default(&self, app_name: &str) -> String {
        self.rest_name
            .clone()
            .unwrap_or_else(|| format!("{}Api", app_name))
    }

    /// The configured bucket, or a fresh generated name
    ///
    /// A generated name is not stored back into the settings.
    pub fn bucket_or_generated(&self) -> String {
        self.bucket.clone().unwrap_or_else(generate_bucket_name)
    }
}

/// `MyWebApplication` followed by the last group of a random UUID
pub fn generate_app_name() -> String {
    let id = uuid::Uuid::new_v4().to_string();
    let suffix = id.rsplit('-').next().unwrap_or(&id);
    format!("{}{}", NAME_PREFIX, suffix)
}

/// `my-lambda-` followed by a random UUID
pub fn generate_bucket_name() -> String {
    format!("{}{}", BUCKET_PREFIX, uuid::Uuid::new_v4())
}
