//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Resolving a session start request to a `Problem` (catalog pick or student submission)
//!   - Rendering the latest tutor message of a session

use tracing::{info, instrument};
use uuid::Uuid;

use crate::conversation::ConversationState;
use crate::domain::{Problem, Role};
use crate::error::TutorError;
use crate::protocol::StartSession;
use crate::state::AppState;

/// Turn a start request into the problem the session will be about.
#[instrument(level = "info", skip(state, start))]
pub fn resolve_problem(state: &AppState, start: StartSession) -> Result<Problem, TutorError> {
  match start {
    StartSession::Catalog { problem_id } => {
      let p = state
        .catalog
        .get_by_id(&problem_id)
        .cloned()
        .ok_or(TutorError::ProblemNotFound(problem_id))?;
      info!(target: "tutor", id = %p.id, topic = %p.topic, "Catalog problem selected");
      Ok(p)
    }
    StartSession::Submitted { text, kind, topic, difficulty, options } => {
      let text = text.trim();
      if text.is_empty() {
        return Err(TutorError::InvalidRequest("question text is empty".into()));
      }
      let p = Problem::submitted(Uuid::new_v4().to_string(), text.to_string(), kind, topic, difficulty, options);
      info!(target: "tutor", id = %p.id, topic = %p.topic, text_len = p.text.len(), "Question submitted");
      Ok(p)
    }
  }
}

/// The newest tutor message; after `begin`/`restart` this is the greeting.
pub fn last_tutor_message(state: &ConversationState) -> String {
  state
    .messages()
    .iter()
    .rev()
    .find(|m| m.role == Role::Tutor)
    .map(|m| m.content.clone())
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::ProblemCatalog;
  use crate::domain::{Message, ProblemType};
  use crate::seeds::seed_problems;

  fn app() -> AppState {
    AppState::new(ProblemCatalog::from_problems(seed_problems()), None)
  }

  #[test]
  fn resolves_catalog_and_submitted_problems() {
    let app = app();
    let p = resolve_problem(&app, StartSession::Catalog { problem_id: "seed-pm-1".into() }).unwrap();
    assert!(!p.user_submitted);

    let p = resolve_problem(&app, StartSession::Submitted {
      text: "  Find the range.  ".into(),
      kind: ProblemType::Numerical,
      topic: None,
      difficulty: None,
      options: None,
    })
    .unwrap();
    assert!(p.user_submitted);
    assert_eq!(p.text, "Find the range.");
    assert!(!p.id.is_empty());
  }

  #[test]
  fn rejects_unknown_id_and_blank_text() {
    let app = app();
    assert_eq!(
      resolve_problem(&app, StartSession::Catalog { problem_id: "zzz".into() }),
      Err(TutorError::ProblemNotFound("zzz".into()))
    );
    assert!(matches!(
      resolve_problem(&app, StartSession::Submitted {
        text: "   ".into(), kind: ProblemType::Mcq, topic: None, difficulty: None, options: None,
      }),
      Err(TutorError::InvalidRequest(_))
    ));
  }

  #[test]
  fn last_tutor_message_skips_student_entries() {
    let mut s = ConversationState::new(seed_problems().remove(0));
    assert_eq!(last_tutor_message(&s), "");
    s.append(Message::tutor("first"));
    s.append(Message::student("reply"));
    assert_eq!(last_tutor_message(&s), "first");
  }
}
