pub mod coords;
pub mod session;
pub mod taxonomy;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use session::{Session, SessionError, ViewMode};
pub use taxonomy::Taxonomy;

// --- Types ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct State {
    pub id: u32,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Domain {
    pub id: u32,
    pub name: String,
    pub subtitle: String,
    pub description: String,
    /// Presentation tag for the domain row, e.g. "text-sky-400"
    pub color: String,
    pub states: Vec<State>,
}

/// One classification of user input. Not persisted; superseded by the next run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DiagnosticResult {
    pub state_id: u32,
    pub analysis: String,
    pub recommendation: String,
}

// --- AI Settings ---

pub const DEFAULT_PROVIDER: &str = "google";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AiSettings {
    /// Bound for one classification call. Zero is not a usable bound and
    /// reads as the default.
    pub fn timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }
}

/// Resolve the config directory (~/.yonis/).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".yonis")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Read settings from `path`. Missing or unreadable files yield defaults.
pub fn read_settings_from(path: &Path) -> AiSettings {
    if !path.exists() {
        return AiSettings::default();
    }
    fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn write_settings_to(path: &Path, settings: &AiSettings) -> Result<(), String> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| e.to_string())?;
    }
    let json = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;
    fs::write(path, json).map_err(|e| e.to_string())
}

/// Settings from ~/.yonis/settings.json with environment overrides applied.
pub fn read_settings() -> AiSettings {
    let mut settings = read_settings_from(&settings_path());
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn write_settings(settings: &AiSettings) -> Result<(), String> {
    write_settings_to(&settings_path(), settings)
}

/// Overlay YONIS_PROVIDER / YONIS_MODEL / YONIS_API_KEY. Empty values are ignored.
pub fn apply_env_overrides<F>(settings: &mut AiSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    if let Some(v) = get("YONIS_PROVIDER") {
        settings.provider = v;
    }
    if let Some(v) = get("YONIS_MODEL") {
        settings.model = v;
    }
    if let Some(v) = get("YONIS_API_KEY") {
        settings.api_key = v;
    }
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}
