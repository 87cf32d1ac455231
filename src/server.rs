//! Axum HTTP server: the session API consumed by a presentation layer.
//!
//! Each session is owned by its entry in the store; a request locks the
//! store, touches exactly one session and releases the lock.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/sessions` | Create a session (optional config + seed) |
//! | GET | `/sessions/{id}` | Counters and the current trial's display codes |
//! | DELETE | `/sessions/{id}` | Drop a session |
//! | POST | `/sessions/{id}/answer` | Submit `{ "selected_index": i }` |
//! | POST | `/sessions/{id}/reset` | Regenerate trials and zero counters |
//!
//! Trial views carry card codes only; the correct index and rule stay server-side.
//!
//! The store holds at most `max_sessions` sessions. Creating a session in a
//! full store first evicts finished sessions; if none are finished the request
//! gets 503.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::constants::DEFAULT_MAX_SESSIONS;
use crate::error::SessionError;
use crate::session::{AnswerOutcome, Session, SessionCounters};
use crate::types::{ExperimentConfig, Stage};

/// Live sessions plus the defaults used when a request omits its config.
pub struct SessionStore {
    sessions: Mutex<HashMap<u64, Session>>,
    next_id: AtomicU64,
    defaults: ExperimentConfig,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(defaults: ExperimentConfig) -> Self {
        Self::with_max_sessions(defaults, DEFAULT_MAX_SESSIONS)
    }

    pub fn with_max_sessions(defaults: ExperimentConfig, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            defaults,
            max_sessions,
        }
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    /// Number of live sessions, `None` if the store is poisoned.
    pub fn len(&self) -> Option<usize> {
        self.sessions.lock().ok().map(|s| s.len())
    }

    pub fn is_empty(&self) -> Option<bool> {
        self.len().map(|n| n == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<u64, Session>>, ApiError> {
        self.sessions.lock().map_err(|_| {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "session store poisoned")
        })
    }
}

pub type AppState = Arc<SessionStore>;

type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn create_router(store: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health_check))
        .route("/sessions", post(handle_create_session))
        .route(
            "/sessions/{id}",
            get(handle_get_session).delete(handle_delete_session),
        )
        .route("/sessions/{id}/answer", post(handle_answer))
        .route("/sessions/{id}/reset", post(handle_reset))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(store)
}

// ── Request/Response types ──────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
struct CreateSessionRequest {
    config: Option<ExperimentConfig>,
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct AnswerRequest {
    selected_index: usize,
}

#[derive(Serialize)]
struct TrialView {
    /// 1-based position in the trial buffer.
    number: usize,
    stage: Stage,
    main_code: String,
    option_codes: Vec<String>,
}

#[derive(Serialize)]
struct SessionView {
    session_id: u64,
    finished: bool,
    counters: SessionCounters,
    trial: Option<TrialView>,
    last_outcome: Option<AnswerOutcome>,
}

fn session_view(id: u64, session: &Session) -> SessionView {
    SessionView {
        session_id: id,
        finished: session.is_finished(),
        counters: *session.counters(),
        trial: session.current_trial().map(|t| TrialView {
            number: session.cursor() + 1,
            stage: t.stage,
            main_code: t.main_code(),
            option_codes: t.option_codes(),
        }),
        last_outcome: session.last_outcome().copied(),
    }
}

fn error_response(status: StatusCode, msg: &str) -> ApiError {
    (status, Json(serde_json::json!({ "error": msg })))
}

fn session_error(err: SessionError) -> ApiError {
    let status = match &err {
        SessionError::SelectionOutOfRange { .. } | SessionError::Config(_) => {
            StatusCode::BAD_REQUEST
        }
        SessionError::Finished => StatusCode::CONFLICT,
        SessionError::Generation(_) => {
            warn!(error = %err, "trial generation failed for session");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(status, &err.to_string())
}

fn not_found(id: u64) -> ApiError {
    error_response(StatusCode::NOT_FOUND, &format!("no session with id {}", id))
}

// ── Handlers ────────────────────────────────────────────────────────

async fn handle_health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn handle_create_session(
    State(store): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let config = req.config.unwrap_or_else(|| store.defaults.clone());
    let session = Session::new(config, req.seed).map_err(session_error)?;
    let mut sessions = store.lock()?;
    if sessions.len() >= store.max_sessions {
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_finished());
        debug!(evicted = before - sessions.len(), "evicted finished sessions");
    }
    if sessions.len() >= store.max_sessions {
        warn!(max_sessions = store.max_sessions, "session store full");
        return Err(error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            &format!("session limit of {} reached", store.max_sessions),
        ));
    }
    let id = store.next_id.fetch_add(1, Ordering::Relaxed);
    let view = session_view(id, &session);
    sessions.insert(id, session);
    Ok((StatusCode::CREATED, Json(view)))
}

async fn handle_get_session(
    State(store): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<SessionView>, ApiError> {
    let sessions = store.lock()?;
    let session = sessions.get(&id).ok_or_else(|| not_found(id))?;
    Ok(Json(session_view(id, session)))
}

async fn handle_delete_session(
    State(store): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    match store.lock()?.remove(&id) {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(not_found(id)),
    }
}

async fn handle_answer(
    State(store): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let mut sessions = store.lock()?;
    let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
    session.submit(req.selected_index).map_err(session_error)?;
    Ok(Json(session_view(id, session)))
}

async fn handle_reset(
    State(store): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<SessionView>, ApiError> {
    let mut sessions = store.lock()?;
    let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
    session.reset().map_err(session_error)?;
    Ok(Json(session_view(id, session)))
}
