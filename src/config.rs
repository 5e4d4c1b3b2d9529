use crate::assistant::{AssistantConfigBuilder, VoiceTable};
use crate::session::SessionOptions;
use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub nats: NatsConfig,
    pub session: SessionSettings,
    pub voices: VoiceTable,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "tutor-voice".to_string(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NatsConfig {
    pub url: String,
    /// Subject session history records are published to
    pub history_subject: String,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: "nats://localhost:4222".to_string(),
            history_subject: "lessons.history".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Client-side message types requested from the voice provider
    pub client_messages: Vec<String>,
    /// Seconds to wait for call-end after a channel error (unset = forever)
    pub error_watchdog_secs: Option<u64>,
    /// Seconds a finished lesson stays queryable over HTTP before eviction
    pub finished_retention_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            client_messages: vec!["transcript".to_string()],
            error_watchdog_secs: None,
            finished_retention_secs: 300,
        }
    }
}

impl Config {
    /// Load from a config file (any format the `config` crate knows, extension
    /// optional), overlaid with `TUTOR_VOICE__SECTION__KEY` environment
    /// variables
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("TUTOR_VOICE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Controller options for new lessons
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            assistant: AssistantConfigBuilder::new(self.voices.clone()),
            client_messages: self.session.client_messages.clone(),
            error_watchdog: self.session.error_watchdog_secs.map(Duration::from_secs),
        }
    }

    /// How long the HTTP layer keeps a finished lesson before releasing it
    pub fn finished_retention(&self) -> Duration {
        Duration::from_secs(self.session.finished_retention_secs)
    }
}
