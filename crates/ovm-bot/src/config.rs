use config::{Config as ConfigLoader, ConfigError, Environment, File};
use ovm_llm::ModelDescriptor;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub discord: DiscordConfig,
    pub history: HistoryConfig,
    /// Completion backends in priority order
    pub backends: Vec<BackendConfig>,
    pub vision: BackendConfig,
    #[serde(default)]
    pub attachments: AttachmentsConfig,
    #[serde(default)]
    pub presence: PresenceConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    pub logging: LoggingConfig,
    
    // Secrets (from ENV only)
    #[serde(default)]
    pub discord_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub support_forum_id: u64,
    pub staff_forum_id: u64,
    /// Guild whose name the presence updater rewrites
    pub guild_id: u64,
    #[serde(default = "default_activity")]
    pub activity: String,
}

impl DiscordConfig {
    /// Forums whose threads the bot answers in
    pub fn monitored_forums(&self) -> Vec<u64> {
        vec![self.support_forum_id, self.staff_forum_id]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_path")]
    pub path: PathBuf,
    /// Character cap per thread before it gets locked
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

/// Backend entry as written in TOML. The credential is named, not stored.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub name: String,
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the bearer token
    pub api_key_env: String,
}

impl BackendConfig {
    /// Resolve the credential from the process environment
    pub fn descriptor(&self) -> Result<ModelDescriptor, ConfigError> {
        self.descriptor_with(|name| std::env::var(name).ok())
    }
    
    pub fn descriptor_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<ModelDescriptor, ConfigError> {
        let api_key = lookup(&self.api_key_env).ok_or_else(|| {
            ConfigError::Message(format!(
                "{} environment variable is required by backend '{}'",
                self.api_key_env, self.name
            ))
        })?;
        
        Ok(ModelDescriptor::new(&self.name, &self.endpoint, api_key, &self.model))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentsConfig {
    #[serde(default = "default_text_extensions")]
    pub text_extensions: Vec<String>,
}

impl Default for AttachmentsConfig {
    fn default() -> Self {
        Self {
            text_extensions: default_text_extensions(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresenceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_weather_url")]
    pub weather_url: String,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_day_start_hour")]
    pub day_start_hour: u32,
    #[serde(default = "default_day_end_hour")]
    pub day_end_hour: u32,
    #[serde(default = "default_brand")]
    pub brand: String,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            location: default_location(),
            weather_url: default_weather_url(),
            interval_secs: default_interval_secs(),
            day_start_hour: default_day_start_hour(),
            day_end_hour: default_day_end_hour(),
            brand: default_brand(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptConfig {
    /// Replaces the built-in persona; `<username>` is substituted
    pub system_template: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_activity() -> String {
    "#support".to_string()
}

fn default_history_path() -> PathBuf {
    PathBuf::from("thread_histories.json")
}

fn default_max_chars() -> usize {
    130_000
}

fn default_text_extensions() -> Vec<String> {
    [".txt", ".js", ".py", ".log", ".json"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_location() -> String {
    "Berlin".to_string()
}

fn default_weather_url() -> String {
    "http://wttr.in".to_string()
}

fn default_interval_secs() -> u64 {
    3600
}

fn default_day_start_hour() -> u32 {
    6
}

fn default_day_end_hour() -> u32 {
    20
}

fn default_brand() -> String {
    "OneVM.eu".to_string()
}

impl Config {
    /// Load configuration from TOML files and environment variables
    /// 
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (`OVM__DISCORD__GUILD_ID`, `OVM__LOGGING__LEVEL`, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());
        
        let builder = ConfigLoader::builder()
            // 1. Load default config
            .add_source(File::with_name("config/default").required(false))
            // 2. Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // 3. Environment variables override everything
            .add_source(
                Environment::with_prefix("OVM")
                    .separator("__")
                    .try_parsing(true)
            );
        
        let config = builder.build()?;
        
        let mut cfg: Config = config.try_deserialize()?;
        
        // Load secrets from ENV (not in TOML)
        cfg.discord_token = std::env::var("DISCORD_TOKEN")
            .map_err(|_| ConfigError::Message("DISCORD_TOKEN environment variable is required".to_string()))?;
        
        // Fail at startup, not on the first message
        cfg.validate()?;
        cfg.backend_descriptors()?;
        cfg.vision.descriptor()?;
        
        Ok(cfg)
    }
    
    /// Reject ids Discord never hands out
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.presence.enabled && self.discord.guild_id == 0 {
            return Err(ConfigError::Message(
                "discord.guild_id must be set (OVM__DISCORD__GUILD_ID) while presence is enabled".to_string(),
            ));
        }
        Ok(())
    }
    
    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder()
            .add_source(File::from(path.as_ref()));
        
        let config = builder.build()?;
        config.try_deserialize()
    }
    
    /// Backends with credentials resolved, in priority order
    pub fn backend_descriptors(&self) -> Result<Vec<ModelDescriptor>, ConfigError> {
        if self.backends.is_empty() {
            return Err(ConfigError::Message("at least one [[backends]] entry is required".to_string()));
        }
        self.backends.iter().map(BackendConfig::descriptor).collect()
    }
}
