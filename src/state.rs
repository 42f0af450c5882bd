//! Application state: problem catalog, optional tutoring engine, and the
//! in-memory session store.
//!
//! Each session is its own `Arc<Mutex<ConversationState>>`. The map lock is
//! only held to look a session up, so a slow generation call in one session
//! never blocks another. Sessions idle for longer than the TTL are swept on
//! insert and treated as missing on lookup.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::catalog::ProblemCatalog;
use crate::config::{load_agent_config_from_env, Settings, DEFAULT_SESSION_TTL_SECS};
use crate::conversation::ConversationState;
use crate::error::TutorError;
use crate::openai::OpenAI;
use crate::seeds::seed_problems;
use crate::tutor::TutorEngine;

pub type SessionHandle = Arc<Mutex<ConversationState>>;

struct SessionEntry {
    handle: SessionHandle,
    last_touched: Instant,
}

impl SessionEntry {
    fn expired(&self, ttl: Duration, now: Instant) -> bool {
        now.duration_since(self.last_touched) >= ttl
    }
}

pub struct AppState {
    pub catalog: ProblemCatalog,
    pub engine: Option<TutorEngine>,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    session_ttl: Duration,
}

impl AppState {
    /// Build state from env: load config, load catalog + seeds, init the generation client.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Self {
        let cfg = load_agent_config_from_env().unwrap_or_default();
        let settings = Settings::from_env(&cfg);

        let mut catalog = ProblemCatalog::load_dir(&settings.problems_dir);
        catalog.extend_missing(seed_problems());
        info!(target: "tutor", dir = %settings.problems_dir, problems = catalog.count(), topics = catalog.list_topics().len(), "Startup problem inventory");

        // Without a backend the tutoring capability stays off for the whole process.
        let engine = match OpenAI::from_settings(&settings) {
            Some(oa) => {
                info!(target: "tutor_backend", base_url = %oa.base_url, model = %oa.model, timeout_secs = settings.timeout_secs, "Generation backend enabled.");
                Some(TutorEngine::new(Arc::new(oa), cfg.prompts))
            }
            None => {
                warn!(target: "tutor_backend", "AI tutor disabled (no OPENAI_API_KEY). Catalog endpoints only.");
                None
            }
        };

        Self::new(catalog, engine).with_session_ttl(Duration::from_secs(settings.session_ttl_secs))
    }

    pub fn new(catalog: ProblemCatalog, engine: Option<TutorEngine>) -> Self {
        Self {
            catalog,
            engine,
            sessions: RwLock::new(HashMap::new()),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn engine(&self) -> Result<&TutorEngine, TutorError> {
        self.engine
            .as_ref()
            .ok_or_else(|| TutorError::Unavailable("no generation backend configured".into()))
    }

    #[instrument(level = "debug", skip(self, state))]
    pub async fn insert_session(&self, state: ConversationState) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, e| !e.expired(self.session_ttl, now));
        if sessions.len() < before {
            info!(target: "tutor", evicted = before - sessions.len(), "Expired sessions evicted");
        }
        sessions.insert(id, SessionEntry { handle: Arc::new(Mutex::new(state)), last_touched: now });
        id
    }

    /// Look a session up and refresh its idle timer.
    #[instrument(level = "debug", skip(self))]
    pub async fn session(&self, id: &str) -> Result<SessionHandle, TutorError> {
        let key = Uuid::parse_str(id).map_err(|_| TutorError::SessionNotFound(id.to_string()))?;
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let expired = match sessions.get_mut(&key) {
            Some(e) if !e.expired(self.session_ttl, now) => {
                e.last_touched = now;
                return Ok(e.handle.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            sessions.remove(&key);
            info!(target: "tutor", session = %key, "Session expired");
        }
        Err(TutorError::SessionNotFound(id.to_string()))
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn remove_session(&self, id: &str) -> Result<(), TutorError> {
        let key = Uuid::parse_str(id).map_err(|_| TutorError::SessionNotFound(id.to_string()))?;
        match self.sessions.write().await.remove(&key) {
            Some(_) => Ok(()),
            None => Err(TutorError::SessionNotFound(id.to_string())),
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
