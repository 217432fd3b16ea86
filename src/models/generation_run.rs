use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Idle,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Idle => "idle",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct GenerationRun {
    pub project_id: Uuid,
    pub status: String,
    pub prompt_count: i32,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl GenerationRun {
    /// What a project that has never been generated reports.
    pub fn idle(project_id: Uuid) -> Self {
        Self {
            project_id,
            status: RunStatus::Idle.as_str().to_string(),
            prompt_count: 0,
            error: None,
            started_at: None,
            finished_at: None,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_match_stored_values() {
        for status in [
            RunStatus::Idle,
            RunStatus::Running,
            RunStatus::Completed,
            RunStatus::Failed,
        ] {
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                serde_json::json!(status.as_str())
            );
        }
    }

    #[test]
    fn idle_run_has_no_timestamps() {
        let run = GenerationRun::idle(Uuid::now_v7());
        assert_eq!(run.status, "idle");
        assert!(run.started_at.is_none());
        assert!(run.finished_at.is_none());
    }
}
