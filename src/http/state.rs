use crate::channel::ChannelFactory;
use crate::session::{CompletionNotifier, SessionOptions, SessionSnapshot, TutorSession};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// How long a finished lesson stays queryable before it is released
pub const DEFAULT_FINISHED_RETENTION: Duration = Duration::from_secs(300);

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Live lessons (lesson_id → session)
    pub sessions: Arc<RwLock<HashMap<Uuid, Arc<TutorSession>>>>,

    /// Opens a voice channel for each new lesson
    pub channels: Arc<dyn ChannelFactory>,

    /// Records finished lessons
    pub notifier: Arc<dyn CompletionNotifier>,

    /// Options applied to every new lesson
    pub options: SessionOptions,

    /// Grace period between a lesson finishing and its eviction
    pub finished_retention: Duration,
}

impl AppState {
    pub fn new(
        channels: Arc<dyn ChannelFactory>,
        notifier: Arc<dyn CompletionNotifier>,
        options: SessionOptions,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            channels,
            notifier,
            options,
            finished_retention: DEFAULT_FINISHED_RETENTION,
        }
    }

    pub fn with_finished_retention(mut self, retention: Duration) -> Self {
        self.finished_retention = retention;
        self
    }

    pub async fn get(&self, lesson_id: &Uuid) -> Option<Arc<TutorSession>> {
        self.sessions.read().await.get(lesson_id).cloned()
    }

    /// Register a started lesson. It is released `finished_retention` after
    /// it finishes, however it finished.
    pub async fn insert(&self, session: Arc<TutorSession>) {
        let lesson_id = session.lesson_id();
        let updates = session.watch();

        {
            let mut sessions = self.sessions.write().await;
            sessions.insert(lesson_id, session);
        }

        tokio::spawn(self.clone().evict_when_finished(lesson_id, updates));
    }

    async fn evict_when_finished(
        self,
        lesson_id: Uuid,
        mut updates: watch::Receiver<SessionSnapshot>,
    ) {
        // Err means the session was already dropped (closed over DELETE)
        let finished = updates.wait_for(|s| s.status.is_terminal()).await.is_ok();
        if !finished {
            return;
        }

        tokio::time::sleep(self.finished_retention).await;

        let session = {
            let mut sessions = self.sessions.write().await;
            sessions.remove(&lesson_id)
        };

        match session {
            Some(session) => {
                session.dispose().await;
                info!("Evicted finished lesson {}", lesson_id);
            }
            None => debug!("Lesson {} was closed before eviction", lesson_id),
        }
    }
}
