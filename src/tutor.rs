//! Tutoring engine: drives one `ConversationState` through greeting, chat,
//! hints and solution disclosure.
//!
//! Generation failures never reach the caller. Each trigger substitutes its
//! own fixed text and the conversation carries on. The only rejected request
//! is a hint beyond level 3.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::config::Policies;
use crate::conversation::ConversationState;
use crate::domain::{Message, OfficialSolution, Problem};
use crate::error::TutorError;
use crate::generation::Generator;
use crate::prompts::{compose, HintLevel, Intent};
use crate::util::trunc_for_log;

pub const FALLBACK_OPENING: &str = "Hello! I'm your physics tutor. Let's work through this problem together. To start, can you tell me: What is this problem asking you to find?";

pub const FALLBACK_CHAT: &str = "I'm having trouble connecting right now. Let me try to help: Could you explain your thinking so far?";

/// Canned hints by level (index 0 is level 1).
pub const FALLBACK_HINTS: [&str; 3] = [
  "Think about what physical principles or laws apply to this situation.",
  "Consider what quantities are conserved or what equations relate the given variables.",
  "Look at the given information - which formula connects these quantities?",
];

pub const FALLBACK_SOLUTION: &str = "I'm having trouble generating the solution right now. Please try again or ask your teacher for help.";

/// Appended after the third hint.
pub const SOLUTION_OFFER: &str = "You've used all 3 hints! Would you like to see the complete solution?";

/// Visible marker prefixed to every hint.
pub fn hint_prefix(level: u8) -> String {
  format!("💡 **Hint {level}:** ")
}

/// Result of a successful `hint()` call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HintOutcome {
  pub level: u8,
  pub text: String,
  pub hints_remaining: u8,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub solution_offer: Option<String>,
}

/// What `reveal_solution()` hands back.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "solution", rename_all = "snake_case")]
pub enum Solution {
  /// The curated solution, exactly as stored.
  Official(OfficialSolution),
  #[serde(rename = "ai_generated")]
  Generated(String),
}

#[derive(Clone)]
pub struct TutorEngine {
  generator: Arc<dyn Generator>,
  policies: Policies,
}

impl TutorEngine {
  pub fn new(generator: Arc<dyn Generator>, policies: Policies) -> Self {
    Self { generator, policies }
  }

  /// Start a session for `problem` with a tutor greeting as its first message.
  #[instrument(level = "info", skip(self, problem), fields(problem_id = %problem.id, user_submitted = problem.user_submitted))]
  pub async fn begin(&self, problem: Problem) -> ConversationState {
    let mut state = ConversationState::new(problem.normalized());
    self.greet(&mut state).await;
    state
  }

  /// Clear the session and greet again for the same problem.
  #[instrument(level = "info", skip(self, state), fields(problem_id = %state.problem().id))]
  pub async fn restart(&self, state: &mut ConversationState) {
    state.reset();
    self.greet(state).await;
  }

  async fn greet(&self, state: &mut ConversationState) {
    let prompt = compose(&self.policies, state.problem(), &[], Intent::Greeting);
    let text = self.generate_or(&prompt, "begin", FALLBACK_OPENING).await;
    state.append(Message::tutor(text));
  }

  /// Record the student's message and append the tutor's reply, which is also returned.
  #[instrument(level = "info", skip(self, state, student_message), fields(problem_id = %state.problem().id, msg_len = student_message.len()))]
  pub async fn respond(&self, state: &mut ConversationState, student_message: &str) -> String {
    state.append(Message::student(student_message));
    let prompt = compose(
      &self.policies,
      state.problem(),
      state.recent(),
      Intent::Chat { student_message },
    );
    let reply = self.generate_or(&prompt, "respond", FALLBACK_CHAT).await;
    state.append(Message::tutor(reply.clone()));
    reply
  }

  /// Escalate to the next hint level. Fails without calling the backend once
  /// all three hints are used.
  #[instrument(level = "info", skip(self, state), fields(problem_id = %state.problem().id, current_level = state.hint_level()))]
  pub async fn hint(&self, state: &mut ConversationState) -> Result<HintOutcome, TutorError> {
    let level = state.request_hint().map_err(|e| {
      warn!(target: "tutor", "Hint requested after all hints were used");
      e
    })?;
    let hint_level = HintLevel::new(level).ok_or(TutorError::HintExhausted)?;

    let prompt = compose(&self.policies, state.problem(), state.recent(), Intent::Hint(hint_level));
    let body = match self.generator.generate(&prompt).await {
      Ok(t) => t,
      Err(e) => {
        error!(target: "tutor", backend = %self.generator.name(), level, error = %e, "Hint generation failed; using canned hint.");
        FALLBACK_HINTS[usize::from(level - 1)].to_string()
      }
    };
    let text = format!("{}{}", hint_prefix(level), body);
    state.append(Message::tutor(text.clone()));

    let solution_offer = if state.hints_remaining() == 0 {
      state.append(Message::tutor(SOLUTION_OFFER));
      Some(SOLUTION_OFFER.to_string())
    } else {
      None
    };

    info!(target: "tutor", level, hints_remaining = state.hints_remaining(), "Hint served");
    Ok(HintOutcome { level, text, hints_remaining: state.hints_remaining(), solution_offer })
  }

  /// Official solution verbatim when the problem has one, otherwise a generated one.
  #[instrument(level = "info", skip(self, state), fields(problem_id = %state.problem().id))]
  pub async fn reveal_solution(&self, state: &mut ConversationState) -> Solution {
    state.mark_solution_revealed();
    if let Some(official) = state.problem().official_solution() {
      info!(target: "tutor", steps = official.steps.len(), "Returning official solution");
      return Solution::Official(official.clone());
    }

    let prompt = compose(&self.policies, state.problem(), &[], Intent::Solution);
    match self.generator.generate(&prompt).await {
      Ok(text) => {
        info!(target: "tutor", solution_len = text.len(), "AI solution generated");
        Solution::Generated(text)
      }
      Err(e) => {
        error!(target: "tutor", backend = %self.generator.name(), error = %e, "Solution generation failed; using fallback.");
        Solution::Generated(FALLBACK_SOLUTION.to_string())
      }
    }
  }

  async fn generate_or(&self, prompt: &str, trigger: &'static str, fallback: &str) -> String {
    match self.generator.generate(prompt).await {
      Ok(text) => {
        info!(target: "tutor", trigger, preview = %trunc_for_log(&text, 80), "Tutor message generated");
        text
      }
      Err(e) => {
        error!(target: "tutor", trigger, backend = %self.generator.name(), error = %e, "Generation failed; using fallback text.");
        fallback.to_string()
      }
    }
  }
}
