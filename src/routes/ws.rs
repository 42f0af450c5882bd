//! WebSocket upgrade + message loop. Each connection owns exactly one
//! conversation, held locally by the loop; nothing is shared with other
//! connections or with the HTTP session store.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::conversation::ConversationState;
use crate::error::TutorError;
use crate::logic::{last_tutor_message, resolve_problem};
use crate::protocol::{ClientWsMessage, ServerWsMessage, SolutionOut};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "tutor_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "tutor_backend", "WebSocket connected");
  let mut session: Option<ConversationState> = None;

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "tutor_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, &mut session)
              .await
              .unwrap_or_else(|e| ServerWsMessage::Error { message: e.to_string() })
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "tutor_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "tutor_backend", "WebSocket disconnected");
}

fn active(session: &mut Option<ConversationState>) -> Result<&mut ConversationState, TutorError> {
  session
    .as_mut()
    .ok_or_else(|| TutorError::InvalidRequest("no active session; send start_session first".into()))
}

#[instrument(level = "info", skip(state, session))]
async fn handle_client_ws(
  msg: ClientWsMessage,
  state: &AppState,
  session: &mut Option<ConversationState>,
) -> Result<ServerWsMessage, TutorError> {
  match msg {
    // Answered even when tutoring is unavailable.
    ClientWsMessage::Ping => Ok(ServerWsMessage::Pong),

    ClientWsMessage::StartSession { start } => {
      let engine = state.engine()?;
      let problem = resolve_problem(state, start)?;
      let convo = engine.begin(problem).await;
      let reply = ServerWsMessage::SessionStarted {
        problem: convo.problem().clone(),
        initial_message: last_tutor_message(&convo),
      };
      // A new question replaces whatever this connection was working on.
      *session = Some(convo);
      info!(target: "tutor", "WS session started");
      Ok(reply)
    }

    ClientWsMessage::Chat { message } => {
      let engine = state.engine()?;
      if message.trim().is_empty() {
        return Err(TutorError::InvalidRequest("message is empty".into()));
      }
      let convo = active(session)?;
      let text = engine.respond(convo, &message).await;
      Ok(ServerWsMessage::TutorReply { text })
    }

    ClientWsMessage::Hint => {
      let engine = state.engine()?;
      let convo = active(session)?;
      let hint = engine.hint(convo).await?;
      info!(target: "tutor", level = hint.level, "WS hint served");
      Ok(ServerWsMessage::Hint { hint })
    }

    ClientWsMessage::Solution => {
      let engine = state.engine()?;
      let convo = active(session)?;
      let solution = engine.reveal_solution(convo).await;
      Ok(ServerWsMessage::Solution { solution: SolutionOut::new(solution, convo.problem()) })
    }

    ClientWsMessage::Reset => {
      let engine = state.engine()?;
      let convo = active(session)?;
      engine.restart(convo).await;
      Ok(ServerWsMessage::TutorReply { text: last_tutor_message(convo) })
    }
  }
}
