use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod color;
pub mod config;
pub mod fragment;
pub mod history;
pub mod platform;
pub mod version;

pub use color::{ColorError, ColorTemplate, Palette, normalize_color_spec};
pub use config::{ApiConfig, AppConfig, MainConfig, config_dir};
pub use fragment::{ContentFragment, ErrorKind, ErrorReport};
pub use history::{History, HistoryEntry, MAX_HISTORY};
pub use platform::{PlatformProbe, SystemMetadata, detect_platform};
pub use version::is_newer;

pub type Result<T> = anyhow::Result<T>;

pub const DEFAULT_API_HOST: &str = "https://api.bashsenpai.com/v1";
pub const DASHBOARD_URL: &str = "https://bashsenpai.com/dashboard";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub at: DateTime<Utc>,
    pub kind: EventKind,
}

impl EventEnvelope {
    pub fn now(kind: EventKind) -> Self {
        Self {
            at: Utc::now(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum EventKind {
    QuestionSentV1 {
        question: String,
        persona: String,
        history_len: usize,
    },
    ExplainSentV1 {
        command: String,
    },
    ResponseParsedV1 {
        commands: usize,
        latest_version: Option<String>,
    },
    CommandExecutedV1 {
        command: String,
        status: Option<i32>,
    },
    LoginCompletedV1 {
        success: bool,
    },
    RequestFailedV1 {
        kind: ErrorKind,
        message: String,
    },
}
