//! Configuration primitives for mentorbase installs.
//!
//! Stored in a machine-readable TOML file located at:
//!   %APPDATA%/MentorBase/config/config.toml on Windows
//!   $XDG_DATA_HOME/MentorBase/config/config.toml on Linux
//!   ~/Library/Application Support/MentorBase/config/config.toml on macOS
//!
//! Secrets (API keys, relay tokens) never live in this file; the config only
//! names the environment variables that hold them.

use serde::{Deserialize, Serialize};

/// Root configuration persisted per installation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Completion service endpoint and sampling options.
    #[serde(default)]
    pub completion: CompletionSettings,
    /// Quiz shape and assessed domain.
    #[serde(default)]
    pub quiz: QuizSettings,
    /// Where session records are written.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Follow-up email options.
    #[serde(default)]
    pub notifications: NotificationSettings,
}

impl AppConfig {
    /// Rejects values serde accepts but a session cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.quiz.question_count == 0 {
            bail!("quiz.question_count must be at least 1");
        }
        Ok(())
    }
}

/// Chat-completions endpoint used for quiz, summary and project generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSettings {
    #[serde(default = "default_completion_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_completion_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Request timeout enforced by the HTTP client.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            endpoint: default_completion_endpoint(),
            model: default_completion_model(),
            temperature: default_temperature(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_completion_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_completion_model() -> String {
    "gpt-4".to_string()
}

const fn default_temperature() -> f32 {
    0.5
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

const fn default_timeout_secs() -> u64 {
    120
}

/// Quiz generation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSettings {
    /// Number of questions every generated quiz must contain.
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    /// Technical domain the quiz and project recommendation target.
    #[serde(default = "default_domain")]
    pub domain: String,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            question_count: default_question_count(),
            domain: default_domain(),
        }
    }
}

const fn default_question_count() -> usize {
    10
}

fn default_domain() -> String {
    "data engineering".to_string()
}

/// Session record storage options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Container directory created under the workspace AI layer.
    #[serde(default = "default_container")]
    pub container: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            container: default_container(),
        }
    }
}

fn default_container() -> String {
    "mentee-results".to_string()
}

/// Which mail transport the dispatcher connects through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MailTransportKind {
    /// Spool `.eml` files into `outbox_dir` for an external relay to pick up.
    #[default]
    Outbox,
    /// POST each message to an authenticated HTTP mail relay.
    HttpRelay,
    /// Submit over SMTP with STARTTLS and login.
    Smtp,
}

/// Follow-up email settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,
    #[serde(default = "default_sender")]
    pub sender: String,
    /// Booking link included in every follow-up.
    #[serde(default = "default_scheduling_link")]
    pub scheduling_link: String,
    /// Closing lines appended after the booking link.
    #[serde(default = "default_signature")]
    pub signature: String,
    #[serde(default)]
    pub transport: MailTransportKind,
    /// Spool directory name under the workspace root (outbox transport).
    #[serde(default = "default_outbox_dir")]
    pub outbox_dir: String,
    /// Relay endpoint (http_relay transport).
    #[serde(default)]
    pub relay_url: Option<String>,
    /// Environment variable holding the relay bearer token.
    #[serde(default = "default_relay_token_env")]
    pub token_env: String,
    /// SMTP submission host (smtp transport).
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Login name; defaults to `sender`.
    #[serde(default)]
    pub smtp_username: Option<String>,
    /// Environment variable holding the SMTP password.
    #[serde(default = "default_smtp_password_env")]
    pub smtp_password_env: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: default_notifications_enabled(),
            sender: default_sender(),
            scheduling_link: default_scheduling_link(),
            signature: default_signature(),
            transport: MailTransportKind::default(),
            outbox_dir: default_outbox_dir(),
            relay_url: None,
            token_env: default_relay_token_env(),
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password_env: default_smtp_password_env(),
        }
    }
}

const fn default_notifications_enabled() -> bool {
    true
}

fn default_sender() -> String {
    "mentoring@localhost".to_string()
}

fn default_scheduling_link() -> String {
    "https://calendly.com/your-mentor/initial-meeting".to_string()
}

fn default_signature() -> String {
    "Looking forward to connecting!".to_string()
}

fn default_outbox_dir() -> String {
    "outbox".to_string()
}

fn default_relay_token_env() -> String {
    "MENTORBASE_MAIL_TOKEN".to_string()
}

const fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_password_env() -> String {
    "MENTORBASE_SMTP_PASSWORD".to_string()
}

/// Standard relative path to the config file (resolved per OS at runtime).
pub const CONFIG_FILE_NAME: &str = "config.toml";

use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Returns the root directory where mentorbase stores data.
///
/// Order of precedence:
/// 1. `MENTORBASE_HOME` environment variable.
/// 2. OS-specific data directory via `directories::BaseDirs`.
pub fn workspace_root() -> Result<PathBuf> {
    if let Ok(path) = env::var("MENTORBASE_HOME") {
        return Ok(PathBuf::from(path));
    }
    let base_dirs = BaseDirs::new().context("Unable to determine OS data directory")?;
    Ok(base_dirs.data_dir().join("MentorBase"))
}

pub fn config_dir() -> Result<PathBuf> {
    let root = workspace_root()?;
    Ok(root.join("config"))
}

/// Path to the config file.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Loads the configuration from disk or returns defaults.
pub fn load_or_default() -> Result<AppConfig> {
    let path = config_file_path()?;
    if path.exists() {
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let cfg: AppConfig = toml::from_str(&data)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        cfg.validate()
            .with_context(|| format!("Invalid config file {:?}", path))?;
        Ok(cfg)
    } else {
        Ok(AppConfig::default())
    }
}

/// Persists the configuration to disk.
pub fn save(config: &AppConfig) -> Result<()> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir)?;
    let path = config_file_path()?;
    let data = toml::to_string_pretty(config)?;
    fs::write(&path, data)?;
    Ok(())
}

/// Ensures the workspace structure exists (config/ and AI/ directories).
pub fn ensure_workspace_structure() -> Result<WorkspacePaths> {
    let root = workspace_root()?;
    WorkspacePaths::create(root)
}

/// Convenience struct exposing important workspace paths.
#[derive(Debug, Clone)]
pub struct WorkspacePaths {
    pub root: PathBuf,
    pub ai_dir: PathBuf,
}

impl WorkspacePaths {
    /// Creates the layout under an explicit root.
    pub fn create(root: PathBuf) -> Result<Self> {
        let ai_dir = root.join("AI");
        fs::create_dir_all(root.join("config"))?;
        fs::create_dir_all(&ai_dir)
            .with_context(|| format!("Failed to create AI layer {}", ai_dir.display()))?;
        Ok(Self { root, ai_dir })
    }

    pub fn storage_container(&self, config: &AppConfig) -> PathBuf {
        self.ai_dir.join(&config.storage.container)
    }

    pub fn outbox_dir(&self, config: &AppConfig) -> PathBuf {
        self.root.join(&config.notifications.outbox_dir)
    }

    pub fn events_log(&self) -> PathBuf {
        self.ai_dir.join("events.jsonl")
    }
}
