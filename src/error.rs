//! Error types shared by the engine and the request surface.

use thiserror::Error;

/// Failure of a single generation call. Callers never branch on the variant;
/// it only exists so logs say what went wrong.
#[derive(Debug, Error)]
pub enum GenerationError {
  #[error("transport error: {0}")]
  Transport(String),
  #[error("backend HTTP {status}: {message}")]
  Http { status: u16, message: String },
  #[error("malformed backend response: {0}")]
  Decode(String),
  #[error("backend returned an empty completion")]
  Empty,
}

impl From<reqwest::Error> for GenerationError {
  fn from(err: reqwest::Error) -> Self {
    GenerationError::Transport(err.to_string())
  }
}

/// Errors a caller of the tutoring surface can see.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TutorError {
  /// All three hints have been used in this session.
  #[error("all 3 hints have already been used for this problem")]
  HintExhausted,
  #[error("AI tutor not available: {0}")]
  Unavailable(String),
  #[error("unknown session: {0}")]
  SessionNotFound(String),
  #[error("unknown problem: {0}")]
  ProblemNotFound(String),
  #[error("invalid request: {0}")]
  InvalidRequest(String),
}
