// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub activity: ActivityConfig,
}

/// Which chat backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    OpenAI,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub backend: BackendKind,
    pub model: String,
    /// Override for OpenAI-compatible gateways or a remote Ollama host.
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::OpenAI,
            model: "gpt-4o".into(),
            base_url: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekEntry {
    pub number: u8,
    pub title: String,
}

impl WeekEntry {
    fn new(number: u8, title: &str) -> Self {
        Self {
            number,
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Root holding intros/, practices/, practices_display/ and prompts/.
    pub dir: PathBuf,
    pub weeks: Vec<WeekEntry>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("content"),
            weeks: default_weeks(),
        }
    }
}

fn default_weeks() -> Vec<WeekEntry> {
    vec![
        WeekEntry::new(1, "Pause Before Reacting"),
        WeekEntry::new(2, "Notice Your Fullness"),
        WeekEntry::new(3, "Create Clarity and Consistency"),
        WeekEntry::new(4, "Identify Automatic Thoughts"),
        WeekEntry::new(5, "Feel Your Emotions Fully"),
        WeekEntry::new(6, "Practice Self-Compassion"),
        WeekEntry::new(7, "Letting Go"),
        WeekEntry::new(8, "Move Mindfully"),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// First assistant turn seeded into the model context.
    pub greeting: String,
    /// How many of the most recent transcript entries are shown.
    pub display_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: "Hi! I'm your coach for this week. How is the practice going so far?"
                .into(),
            display_limit: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Sheets,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    pub enabled: bool,
    pub sink: SinkKind,
    /// Google spreadsheet id (sink = "sheets").
    pub spreadsheet_id: Option<String>,
    /// Directory for `<sheet>.jsonl` files (sink = "file"); defaults to the data dir.
    pub dir: Option<PathBuf>,
    pub conversation_sheet: String,
    pub activity_sheet: String,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sink: SinkKind::File,
            spreadsheet_id: None,
            dir: None,
            conversation_sheet: default_conversation_sheet(),
            activity_sheet: default_activity_sheet(),
        }
    }
}

fn default_conversation_sheet() -> String {
    "conversations".into()
}

fn default_activity_sheet() -> String {
    "activity".into()
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
