use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ─── Top-level config ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Name of the character the agent controls.
    #[serde(default = "default_character")]
    pub character: String,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub agent: AgentConfig,
}

fn default_character() -> String {
    "LukasAI".into()
}

// ─── Game API ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Bearer token for the game API.
    pub token: Option<String>,
}

fn default_api_base_url() -> String {
    "https://api.artifactsmmo.com".into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            token: None,
        }
    }
}

// ─── Chat provider ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// OpenAI-compatible chat completions base URL.
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f64,
}

fn default_provider_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            api_key: None,
            model: default_model(),
            temperature: 0.0,
        }
    }
}

// ─── Agent tuning ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Bound on plan-execute-replan transitions per run.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Bound on tool-use turns within one step.
    #[serde(default = "default_step_iterations")]
    pub step_iterations: u32,
    /// Default cycle count for the scripted fight routine.
    #[serde(default = "default_routine_cycles")]
    pub routine_cycles: u32,
    /// Map tile targeted by the fight routine.
    #[serde(default)]
    pub routine_x: i64,
    #[serde(default = "default_routine_y")]
    pub routine_y: i64,
}

fn default_max_iterations() -> u32 {
    50
}

fn default_step_iterations() -> u32 {
    10
}

fn default_routine_cycles() -> u32 {
    200
}

fn default_routine_y() -> i64 {
    1
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            step_iterations: default_step_iterations(),
            routine_cycles: default_routine_cycles(),
            routine_x: 0,
            routine_y: default_routine_y(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            character: default_character(),
            api: ApiConfig::default(),
            provider: ProviderConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

impl Config {
    /// Load `~/.artificer/config.toml`, writing a default file on first run.
    pub fn load_or_init() -> Result<Self, ConfigError> {
        let home = UserDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .ok_or_else(|| ConfigError::Load("could not find home directory".into()))?;
        let config_dir = home.join(".artificer");
        let config_path = config_dir.join("config.toml");

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        if config_path.exists() {
            let mut config = Self::load_from(&config_path)?;
            config.config_path = config_path;
            Ok(config)
        } else {
            let config = Self {
                config_path: config_path.clone(),
                ..Self::default()
            };
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config =
            toml::from_str(&contents).map_err(|err| ConfigError::Load(err.to_string()))?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|err| ConfigError::Load(err.to_string()))?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("ARTIFICER_TOKEN") {
            if !token.is_empty() {
                self.api.token = Some(token);
            }
        }

        if let Ok(key) = std::env::var("ARTIFICER_API_KEY") {
            if !key.is_empty() {
                self.provider.api_key = Some(key);
            }
        }

        if let Ok(character) = std::env::var("ARTIFICER_CHARACTER") {
            if !character.is_empty() {
                self.character = character;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.character.trim().is_empty() {
            return Err(ConfigError::Validation("character must not be empty".into()));
        }
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::Validation(
                "agent.max_iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
