//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::conversation::ConversationState;
use crate::domain::{CommonMistake, Difficulty, Message, Problem, ProblemOption, ProblemType};
use crate::tutor::{HintOutcome, Solution};

/// How a session is started: pick a catalog problem, or submit one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StartSession {
    Catalog {
        problem_id: String,
    },
    Submitted {
        text: String,
        #[serde(rename = "type", default)]
        kind: ProblemType,
        #[serde(default)]
        topic: Option<String>,
        #[serde(default)]
        difficulty: Option<Difficulty>,
        #[serde(default)]
        options: Option<Vec<ProblemOption>>,
    },
}

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartSession {
        start: StartSession,
    },
    Chat {
        message: String,
    },
    Hint,
    Solution,
    Reset,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    SessionStarted {
        problem: Problem,
        initial_message: String,
    },
    TutorReply {
        text: String,
    },
    Hint {
        #[serde(flatten)]
        hint: HintOutcome,
    },
    Solution {
        solution: SolutionOut,
    },
    Error {
        message: String,
    },
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub status: &'static str,
    pub ai_tutor: bool,
    pub problem_count: usize,
    pub active_sessions: usize,
}

#[derive(Serialize)]
pub struct TopicsOut {
    pub topics: Vec<String>,
}

#[derive(Serialize)]
pub struct ChaptersOut {
    pub chapters: Vec<String>,
}

#[derive(Serialize)]
pub struct ProblemsOut {
    pub count: usize,
    pub problems: Vec<Problem>,
}

#[derive(Serialize)]
pub struct SessionStartedOut {
    pub session_id: String,
    pub problem: Problem,
    pub initial_message: String,
}

#[derive(Serialize)]
pub struct SessionOut {
    pub session_id: String,
    pub problem: Problem,
    pub messages: Vec<Message>,
    pub hint_level: u8,
    pub hints_remaining: u8,
    pub solution_revealed: bool,
}

impl SessionOut {
    pub fn new(session_id: String, s: &ConversationState) -> Self {
        Self {
            session_id,
            problem: s.problem().clone(),
            messages: s.messages().to_vec(),
            hint_level: s.hint_level(),
            hints_remaining: s.hints_remaining(),
            solution_revealed: s.solution_revealed(),
        }
    }
}

#[derive(Deserialize)]
pub struct ChatIn {
    pub message: String,
}
#[derive(Serialize)]
pub struct ChatOut {
    pub response: String,
}

/// Solution plus the problem's common mistakes (official path only).
#[derive(Debug, Serialize)]
pub struct SolutionOut {
    #[serde(flatten)]
    pub solution: Solution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_mistakes: Option<Vec<CommonMistake>>,
}

impl SolutionOut {
    pub fn new(solution: Solution, problem: &Problem) -> Self {
        let common_mistakes = match solution {
            Solution::Official(_) => problem.common_mistakes.clone(),
            Solution::Generated(_) => None,
        };
        Self { solution, common_mistakes }
    }
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub detail: String,
}
