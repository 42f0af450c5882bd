//! Loading tutor configuration (policy texts + catalog location) from TOML.
//!
//! See `AgentConfig` and `Policies` for the expected schema:
//!
//! ```toml
//! [prompts]
//! socratic_policy = "..."
//! solution_policy = "..."
//!
//! [catalog]
//! dir = "./problems"
//! ```

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Policies,
  #[serde(default)]
  pub catalog: CatalogCfg,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct CatalogCfg {
  #[serde(default)] pub dir: Option<String>,
}

/// The two pedagogical policies. Loaded once at startup and never changed.
/// The Socratic one governs greeting/chat/hints, the solution one governs
/// full worked solutions and intentionally lacks the "don't solve" rule.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Policies {
  pub socratic_policy: String,
  pub solution_policy: String,
}

impl Default for Policies {
  fn default() -> Self {
    Self {
      socratic_policy: DEFAULT_SOCRATIC_POLICY.trim().into(),
      solution_policy: DEFAULT_SOLUTION_POLICY.trim().into(),
    }
  }
}

const DEFAULT_SOCRATIC_POLICY: &str = r#"
You are an expert JEE Physics tutor who uses the Socratic method to guide students.

YOUR TEACHING PHILOSOPHY:
- NEVER give direct answers or full solutions in chat
- Ask guiding questions to make students THINK
- Help students discover the solution themselves through dialogue
- Be patient, encouraging, and supportive
- Break down complex problems into smaller steps

YOUR APPROACH:
1. First, ask what the problem is asking them to find
2. Ask about given information and what they know
3. Guide them to identify relevant concepts and formulas
4. Ask questions that lead them toward the solution
5. Validate their thinking when correct
6. Gently redirect when they're off track
7. Provide hints only when truly stuck
8. The student can request the full solution separately - don't provide it in chat

IMPORTANT RULES:
- Use simple, clear language
- Ask ONE question at a time
- Keep responses concise (2-4 sentences max)
- Use LaTeX for equations when needed: $equation$
- NEVER show full step-by-step solutions in your messages
- Guide with questions, not solutions
"#;

const DEFAULT_SOLUTION_POLICY: &str = r#"
You are an expert JEE Physics teacher providing a complete, correct, step-by-step solution.
Show every step clearly, state the physics behind each step, and finish with the final answer and units.
"#;

pub const DEFAULT_SESSION_TTL_SECS: u64 = 2 * 60 * 60;

/// Environment-derived settings for the generation client, catalog and session store.
#[derive(Clone, Debug)]
pub struct Settings {
  pub api_key: Option<String>,
  pub base_url: String,
  pub model: String,
  pub timeout_secs: u64,
  pub problems_dir: String,
  /// Idle sessions older than this are evicted.
  pub session_ttl_secs: u64,
}

impl Settings {
  pub fn from_env(cfg: &AgentConfig) -> Self {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty());
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
      .ok()
      .and_then(|s| s.parse::<u64>().ok())
      .filter(|s| *s > 0)
      .unwrap_or(20);
    let problems_dir = std::env::var("PROBLEMS_DIR")
      .ok()
      .or_else(|| cfg.catalog.dir.clone())
      .unwrap_or_else(|| "./problems".into());
    let session_ttl_secs = std::env::var("SESSION_TTL_SECS")
      .ok()
      .and_then(|s| s.parse::<u64>().ok())
      .filter(|s| *s > 0)
      .unwrap_or(DEFAULT_SESSION_TTL_SECS);

    Self { api_key, base_url, model, timeout_secs, problems_dir, session_ttl_secs }
  }
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_agent_config(&s) {
      Ok(cfg) => {
        info!(target: "tutor_backend", %path, "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "tutor_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "tutor_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_agent_config(s: &str) -> Result<AgentConfig, toml::de::Error> {
  toml::from_str::<AgentConfig>(s)
}
