//! HTTP endpoint handlers. These are thin wrappers that forward to the catalog
//! and the tutoring engine. Each handler is instrumented and logs parameters
//! and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::catalog::ProblemFilter;
use crate::error::TutorError;
use crate::logic::{last_tutor_message, resolve_problem};
use crate::protocol::*;
use crate::state::AppState;
use crate::tutor::HintOutcome;

impl IntoResponse for TutorError {
  fn into_response(self) -> Response {
    let status = match &self {
      TutorError::HintExhausted => StatusCode::CONFLICT,
      TutorError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      TutorError::SessionNotFound(_) | TutorError::ProblemNotFound(_) => StatusCode::NOT_FOUND,
      TutorError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
    };
    warn!(target: "tutor_backend", %status, error = %self, "Request rejected");
    (status, Json(ErrorOut { detail: self.to_string() })).into_response()
  }
}

type ApiResult<T> = Result<Json<T>, TutorError>;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut {
    status: "healthy",
    ai_tutor: state.engine.is_some(),
    problem_count: state.catalog.count(),
    active_sessions: state.session_count().await,
  })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_topics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(TopicsOut { topics: state.catalog.list_topics() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_chapters(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(ChaptersOut { chapters: state.catalog.list_chapters() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_problems(
  State(state): State<Arc<AppState>>,
  Query(filter): Query<ProblemFilter>,
) -> impl IntoResponse {
  let problems: Vec<_> = state.catalog.filter(&filter).into_iter().cloned().collect();
  info!(target: "tutor", count = problems.len(), "HTTP problems listed");
  Json(ProblemsOut { count: problems.len(), problems })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_problem(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<crate::domain::Problem> {
  state
    .catalog
    .get_by_id(&id)
    .cloned()
    .map(Json)
    .ok_or(TutorError::ProblemNotFound(id))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_sample_problem(
  State(state): State<Arc<AppState>>,
  Query(filter): Query<ProblemFilter>,
) -> ApiResult<crate::domain::Problem> {
  state
    .catalog
    .sample(&filter)
    .cloned()
    .map(Json)
    .ok_or_else(|| TutorError::ProblemNotFound("no problem matches the filter".into()))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_session(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StartSession>,
) -> ApiResult<SessionStartedOut> {
  let engine = state.engine()?;
  let problem = resolve_problem(&state, body)?;
  let convo = engine.begin(problem).await;
  let initial_message = last_tutor_message(&convo);
  let problem = convo.problem().clone();
  let id = state.insert_session(convo).await;
  info!(target: "tutor", session = %id, problem_id = %problem.id, "HTTP session started");
  Ok(Json(SessionStartedOut { session_id: id.to_string(), problem, initial_message }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<SessionOut> {
  let session = state.session(&id).await?;
  let convo = session.lock().await;
  Ok(Json(SessionOut::new(id, &convo)))
}

#[instrument(level = "info", skip(state, body), fields(msg_len = body.message.len()))]
pub async fn http_post_chat(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<ChatIn>,
) -> ApiResult<ChatOut> {
  let engine = state.engine()?;
  if body.message.trim().is_empty() {
    return Err(TutorError::InvalidRequest("message is empty".into()));
  }
  let session = state.session(&id).await?;
  let mut convo = session.lock().await;
  let response = engine.respond(&mut convo, &body.message).await;
  Ok(Json(ChatOut { response }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_hint(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<HintOutcome> {
  let engine = state.engine()?;
  let session = state.session(&id).await?;
  let mut convo = session.lock().await;
  let hint = engine.hint(&mut convo).await?;
  info!(target: "tutor", session = %id, level = hint.level, "HTTP hint served");
  Ok(Json(hint))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_solution(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<SolutionOut> {
  let engine = state.engine()?;
  let session = state.session(&id).await?;
  let mut convo = session.lock().await;
  let solution = engine.reveal_solution(&mut convo).await;
  info!(target: "tutor", session = %id, "HTTP solution served");
  Ok(Json(SolutionOut::new(solution, convo.problem())))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_reset(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<SessionOut> {
  let engine = state.engine()?;
  let session = state.session(&id).await?;
  let mut convo = session.lock().await;
  engine.restart(&mut convo).await;
  Ok(Json(SessionOut::new(id, &convo)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<StatusCode, TutorError> {
  state.remove_session(&id).await?;
  info!(target: "tutor", session = %id, "HTTP session ended");
  Ok(StatusCode::NO_CONTENT)
}
