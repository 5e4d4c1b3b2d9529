use anyhow::{Context, Result};
use async_nats::Client;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Records that a lesson took place. Invoked once per lesson, on entry to
/// `Finished`; failures are logged by the caller and never retried.
#[async_trait::async_trait]
pub trait CompletionNotifier: Send + Sync {
    async fn record_session(&self, companion_id: &str, lesson_id: Uuid) -> Result<()>;
}

/// Session history record published on completion
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub companion_id: String,
    #[serde(rename = "session_id")]
    pub lesson_id: Uuid,
    pub recorded_at: String, // RFC3339 timestamp
}

/// Publishes [`HistoryRecord`]s to the history service over NATS
#[derive(Clone)]
pub struct NatsHistoryRecorder {
    client: Client,
    subject: String,
}

impl NatsHistoryRecorder {
    pub fn new(client: Client, subject: impl Into<String>) -> Self {
        Self {
            client,
            subject: subject.into(),
        }
    }
}

#[async_trait::async_trait]
impl CompletionNotifier for NatsHistoryRecorder {
    async fn record_session(&self, companion_id: &str, lesson_id: Uuid) -> Result<()> {
        let record = HistoryRecord {
            companion_id: companion_id.to_string(),
            lesson_id,
            recorded_at: chrono::Utc::now().to_rfc3339(),
        };

        let payload = serde_json::to_vec(&record)?;

        self.client
            .publish(self.subject.clone(), payload.into())
            .await
            .context("Failed to publish session history")?;

        info!(
            "Recorded session history for companion {} (lesson={})",
            companion_id, lesson_id
        );

        Ok(())
    }
}
