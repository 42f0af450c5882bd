//! Per-session conversation state: the message log, hint counter and the
//! solution-revealed flag for exactly one problem.
//!
//! The log is unbounded; only the last `HISTORY_WINDOW` entries are ever fed
//! to the model.

use serde::Serialize;

use crate::domain::{Message, Problem};
use crate::error::TutorError;

/// How many recent messages are included when composing prompts.
pub const HISTORY_WINDOW: usize = 10;

/// Highest hint level a session may reach.
pub const MAX_HINT_LEVEL: u8 = 3;

#[derive(Clone, Debug, Serialize)]
pub struct ConversationState {
  problem: Problem,
  messages: Vec<Message>,
  hint_level: u8,
  solution_revealed: bool,
}

impl ConversationState {
  pub fn new(problem: Problem) -> Self {
    Self { problem, messages: Vec::new(), hint_level: 0, solution_revealed: false }
  }

  pub fn problem(&self) -> &Problem { &self.problem }
  pub fn messages(&self) -> &[Message] { &self.messages }
  pub fn hint_level(&self) -> u8 { self.hint_level }
  pub fn solution_revealed(&self) -> bool { self.solution_revealed }

  pub fn hints_remaining(&self) -> u8 {
    MAX_HINT_LEVEL - self.hint_level
  }

  pub fn append(&mut self, message: Message) {
    self.messages.push(message);
  }

  /// The last `HISTORY_WINDOW` messages, oldest first.
  pub fn recent(&self) -> &[Message] {
    let start = self.messages.len().saturating_sub(HISTORY_WINDOW);
    &self.messages[start..]
  }

  /// Advance to the next hint level and return it.
  pub fn request_hint(&mut self) -> Result<u8, TutorError> {
    if self.hint_level >= MAX_HINT_LEVEL {
      return Err(TutorError::HintExhausted);
    }
    self.hint_level += 1;
    Ok(self.hint_level)
  }

  pub fn mark_solution_revealed(&mut self) {
    self.solution_revealed = true;
  }

  /// Clear messages, hints and the revealed flag. The problem stays.
  pub fn reset(&mut self) {
    self.messages.clear();
    self.hint_level = 0;
    self.solution_revealed = false;
  }
}
