use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use codify_protocol::{
    AuthorizedView, DocsResponse, GenerateRequest, GenerateResponse, HistoryEntry,
    HistoryResponse, LoginRequest, NavigateRequest, Page, ViewModel,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::inference::InferenceClient;
use crate::session::{SessionCommit, SessionError, SessionRegistry, SessionState, SessionView};
use crate::storage::{HistoryRecord, HistoryStore, StorageError};

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "codify_session";

/// Shared state accessible by handlers.
#[derive(Clone)]
pub(crate) struct AppState {
    pub config: Arc<ServerConfig>,
    pub sessions: SessionRegistry,
    pub store: Arc<dyn HistoryStore>,
    pub inference: Arc<dyn InferenceClient>,
}

/// Build the axum router for the HTTP API.
///
/// Callers bind it with `axum::serve`. The schema is ensured once on
/// startup; a failure there is logged and surfaces again on first use.
pub fn build_router(
    config: ServerConfig,
    store: Arc<dyn HistoryStore>,
    inference: Arc<dyn InferenceClient>,
) -> Router {
    build_router_with_sessions(config, store, inference, SessionRegistry::new())
}

/// Like [`build_router`], serving sessions from a caller-owned registry.
pub fn build_router_with_sessions(
    config: ServerConfig,
    store: Arc<dyn HistoryStore>,
    inference: Arc<dyn InferenceClient>,
    sessions: SessionRegistry,
) -> Router {
    if let Err(e) = store.ensure_schema() {
        tracing::warn!("failed to ensure history schema on startup: {e}");
    }

    let mut config = config;
    config.history_limit = config.history_limit.max(1);

    let state = AppState {
        config: Arc::new(config),
        sessions,
        store,
        inference,
    };

    Router::new()
        .route("/health", get(health))
        .route("/api/view", get(view))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/navigate", post(navigate))
        .route("/api/generate", post(generate))
        .route("/api/history", get(history))
        .route("/api/download", get(download))
        .route("/api/docs", get(docs))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

// ── Session context ──────────────────────────────────────────────────

/// The session a request names through its cookie.
///
/// Reads go through [`SessionCtx::snapshot`] and are never written back.
/// Changes go through [`SessionCtx::commit`], which runs against the
/// stored value under the registry lock.
struct SessionCtx {
    requested: Option<Uuid>,
}

impl SessionCtx {
    fn open(headers: &HeaderMap) -> Self {
        Self {
            requested: session_id_from_headers(headers),
        }
    }

    fn snapshot(&self, app: &AppState) -> SessionState {
        app.sessions.snapshot(self.requested)
    }

    fn commit<T>(
        &self,
        app: &AppState,
        f: impl FnOnce(&mut SessionState) -> Result<T, ApiError>,
    ) -> Result<SessionCommit<T>, ApiError> {
        app.sessions.update(self.requested, f)
    }

    /// Render a committed change, setting the cookie for a newly stored
    /// session and expiring it for a dropped one.
    fn reply<T: IntoResponse>(&self, result: Result<SessionCommit<T>, ApiError>) -> Response {
        let commit = match result {
            Ok(commit) => commit,
            Err(err) => return err.into_response(),
        };
        let cookie = match commit.id {
            Some(id) if commit.created => {
                Some(format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax"))
            }
            None if self.requested.is_some() => Some(format!(
                "{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
            )),
            _ => None,
        };
        let mut response = commit.value.into_response();
        if let Some(value) = cookie.and_then(|c| HeaderValue::from_str(&c).ok()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        response
    }
}

fn respond<T: IntoResponse>(result: Result<T, ApiError>) -> Response {
    match result {
        Ok(body) => body.into_response(),
        Err(err) => err.into_response(),
    }
}

fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

// ── Store access ─────────────────────────────────────────────────────

/// Run a blocking store operation off the async worker threads.
async fn with_store<T, F>(app: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn HistoryStore) -> Result<T, StorageError> + Send + 'static,
{
    let store = app.store.clone();
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| ApiError::Internal(format!("store task failed: {e}")))?
        .map_err(ApiError::from)
}

async fn sidebar_history(app: &AppState) -> Result<Vec<HistoryEntry>, ApiError> {
    let limit = app.config.history_limit;
    let records = with_store(app, move |store| store.recent_records(limit)).await?;
    Ok(records.into_iter().map(HistoryEntry::from).collect())
}

fn build_view(app: &AppState, state: &SessionState, history: Vec<HistoryEntry>) -> ViewModel {
    let page = match state.view() {
        SessionView::LoggedOut => return ViewModel::Login,
        SessionView::LoggedIn { page } => page,
    };
    let view = AuthorizedView {
        languages: app.config.languages.options(),
        history,
        last_result: state.last_result().map(str::to_string),
        selected_language: state.selected_language().map(str::to_string),
    };
    match page {
        Page::Generator => ViewModel::Generator(view),
        Page::Docs => ViewModel::Docs(view),
    }
}

async fn render_view(app: &AppState, state: &SessionState) -> Result<ViewModel, ApiError> {
    let history = match state.view() {
        SessionView::LoggedOut => Vec::new(),
        SessionView::LoggedIn { .. } => sidebar_history(app).await?,
    };
    Ok(build_view(app, state, history))
}

/// Apply `transition` and render the resulting view.
///
/// The transition is tried on a snapshot first and the sidebar is fetched
/// for that outcome; only then is it applied to the stored session. A
/// rejected transition or a failed fetch leaves the session untouched.
async fn transition_view<F>(
    app: &AppState,
    ctx: &SessionCtx,
    transition: F,
) -> Result<SessionCommit<Json<ViewModel>>, ApiError>
where
    F: Fn(&mut SessionState) -> Result<(), SessionError>,
{
    let mut preview = ctx.snapshot(app);
    transition(&mut preview)?;
    let history = match preview.view() {
        SessionView::LoggedOut => Vec::new(),
        SessionView::LoggedIn { .. } => sidebar_history(app).await?,
    };
    ctx.commit(app, move |state| {
        transition(state)?;
        Ok(Json(build_view(app, state, history)))
    })
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn view(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let state = SessionCtx::open(&headers).snapshot(&app);
    respond(render_view(&app, &state).await.map(Json))
}

async fn login(
    State(app): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Response {
    let ctx = SessionCtx::open(&headers);
    let policy = &app.config.login;
    let result = transition_view(&app, &ctx, |state| {
        state.login(policy, &req.identity, &req.secret)
    })
    .await;
    match &result {
        Ok(commit) => {
            tracing::info!(session = ?commit.id, policy = policy.label(), "login accepted");
        }
        Err(ApiError::Session(SessionError::Auth(_))) => {
            tracing::warn!(session = ?ctx.requested, "login rejected");
        }
        Err(_) => {}
    }
    ctx.reply(result)
}

async fn logout(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = SessionCtx::open(&headers);
    let result = transition_view(&app, &ctx, |state| {
        state.logout();
        Ok(())
    })
    .await;
    tracing::info!(session = ?ctx.requested, "logout");
    ctx.reply(result)
}

async fn navigate(
    State(app): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<NavigateRequest>,
) -> Response {
    let ctx = SessionCtx::open(&headers);
    let result = transition_view(&app, &ctx, |state| state.navigate(&req.page)).await;
    ctx.reply(result)
}

async fn generate(
    State(app): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<GenerateRequest>,
) -> Response {
    let ctx = SessionCtx::open(&headers);
    let result = run_generate(&app, &ctx, req).await;
    ctx.reply(result)
}

async fn run_generate(
    app: &AppState,
    ctx: &SessionCtx,
    req: GenerateRequest,
) -> Result<SessionCommit<Json<GenerateResponse>>, ApiError> {
    ctx.snapshot(app).require_authorized()?;
    if req.task.trim().is_empty() {
        return Err(ApiError::InvalidArgument(
            "task description required".to_string(),
        ));
    }
    let language = app
        .config
        .languages
        .get(&req.language)
        .cloned()
        .ok_or_else(|| ApiError::InvalidArgument(format!("unknown language: {}", req.language)))?;

    tracing::info!(session = ?ctx.requested, language = %language.label, "generation requested");
    let code = app
        .inference
        .generate(&language.label, &req.task)
        .await
        .map_err(|e| {
            tracing::warn!(session = ?ctx.requested, error = %e, "generation failed");
            ApiError::from(e)
        })?;

    let record = HistoryRecord::new(req.task, code, language.label.clone());
    let appended = record.clone();
    with_store(app, move |store| {
        store.append(&appended.query, &appended.code, &appended.language)
    })
    .await?;

    // Applied to whatever the session holds now, not the copy taken above.
    ctx.commit(app, |state| {
        state.record_result(record.code.clone());
        state.select_language(language.label.clone());
        Ok(Json(GenerateResponse {
            file_name: app.config.languages.download_file_name(&language.label),
            language: language.label,
            syntax: language.syntax,
            code: record.code,
        }))
    })
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    limit: Option<usize>,
}

async fn history(
    State(app): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HistoryParams>,
) -> Response {
    let state = SessionCtx::open(&headers).snapshot(&app);
    let result = match state.require_authorized() {
        Ok(()) => {
            let limit = params.limit.unwrap_or(app.config.history_limit);
            with_store(&app, move |store| store.recent_records(limit))
                .await
                .map(|records| {
                    Json(HistoryResponse {
                        records: records.into_iter().map(HistoryEntry::from).collect(),
                    })
                })
        }
        Err(e) => Err(ApiError::from(e)),
    };
    respond(result)
}

async fn download(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let state = SessionCtx::open(&headers).snapshot(&app);
    let result = state
        .require_authorized()
        .map_err(ApiError::from)
        .and_then(|()| {
            let code = state
                .last_result()
                .ok_or_else(|| ApiError::NotFound("no generated code yet".to_string()))?;
            let file_name = app
                .config
                .languages
                .download_file_name(state.selected_language().unwrap_or_default());
            Ok((
                [
                    (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{file_name}\""),
                    ),
                ],
                code.to_string(),
            ))
        });
    respond(result)
}

async fn docs(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let state = SessionCtx::open(&headers).snapshot(&app);
    let result = match state.require_authorized() {
        Ok(()) => with_store(&app, |store| store.count()).await.map(|count| {
            Json(DocsResponse {
                engine: app.config.engine.clone(),
                model: app.inference.model().to_string(),
                languages: app.config.languages.options(),
                history_records: count,
            })
        }),
        Err(e) => Err(ApiError::from(e)),
    };
    respond(result)
}
