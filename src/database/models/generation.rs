use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle of an `ai_generations` row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Queued => "queued",
            GenerationStatus::Processing => "processing",
            GenerationStatus::Completed => "completed",
            GenerationStatus::Failed => "failed",
        }
    }

    /// Completed and failed rows are final; only webhooks move a row there after submission.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationStatus::Completed | GenerationStatus::Failed)
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(GenerationStatus::Queued),
            "processing" => Ok(GenerationStatus::Processing),
            "completed" => Ok(GenerationStatus::Completed),
            "failed" => Ok(GenerationStatus::Failed),
            other => Err(format!("unknown generation status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Generation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tool_type: String,
    pub tool_name: Option<String>,
    pub generation_name: Option<String>,
    pub status: String,
    pub input_data: Option<Value>,
    pub output_file_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub metadata: Option<Value>,
    pub tokens_used: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_favorite: bool,
    /// Featured on the public showcase; set by admins
    pub showcased: bool,
}

impl Generation {
    pub fn status(&self) -> Option<GenerationStatus> {
        self.status.parse().ok()
    }

    /// String field of `input_data`, if present
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.input_data.as_ref()?.get(key)?.as_str()
    }

    /// Name shown in lists: the generation name, else the tool name
    pub fn display_name(&self) -> &str {
        self.generation_name
            .as_deref()
            .or(self.tool_name.as_deref())
            .unwrap_or("")
    }
}

/// Insert payload for a new generation row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGeneration {
    pub user_id: Uuid,
    pub tool_type: String,
    pub tool_name: String,
    pub generation_name: String,
    pub input_data: Value,
    pub tokens_used: i32,
    pub status: GenerationStatus,
}

/// Partial update; `None` leaves the column unchanged. `metadata` replaces the whole document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationUpdate {
    pub status: Option<GenerationStatus>,
    pub metadata: Option<Value>,
    pub error_message: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl GenerationUpdate {
    pub fn status(status: GenerationStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn metadata(metadata: Value) -> Self {
        Self {
            metadata: Some(metadata),
            ..Default::default()
        }
    }

    pub fn failed(error_message: impl Into<String>, metadata: Option<Value>) -> Self {
        Self {
            status: Some(GenerationStatus::Failed),
            metadata,
            error_message: Some(error_message.into()),
            completed_at: Some(Utc::now()),
        }
    }

    pub fn with_status(mut self, status: GenerationStatus) -> Self {
        self.status = Some(status);
        self
    }
}
