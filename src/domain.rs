//! Domain models used by the backend: problems (with optional official solutions),
//! conversation messages and roles.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// What kind of answer does the problem expect?
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemType {
  /// Multiple choice; `options` carries the choices.
  #[serde(alias = "objective_single_correct")]
  Mcq,
  #[default]
  Numerical,
  Descriptive,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  #[default]
  Medium,
  Hard,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProblemOption {
  pub id: String,
  pub text: String,
}

/// One step of a curated solution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolutionStep {
  pub step_number: u32,
  pub description: String,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub formula: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub calculation: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub explanation: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub result: Option<String>,
  #[serde(flatten)]
  pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Pre-authored solution attached to catalog problems. Unknown keys in the
/// source file are kept in `extra` so the structure is handed back unmodified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OfficialSolution {
  #[serde(default)]
  pub steps: Vec<SolutionStep>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub answer_justification: Option<String>,
  #[serde(flatten)]
  pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommonMistake {
  pub mistake: String,
  pub correct_approach: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NcertMapping {
  #[serde(default, rename = "class")] pub class_level: Option<serde_json::Value>,
  #[serde(default)] pub chapter: Option<String>,
  #[serde(default)] pub relevant_sections: Vec<String>,
}

fn default_topic() -> String {
  "General Physics".into()
}

/// A physics problem, either from the catalog or submitted by a student.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Problem {
  #[serde(default)]
  pub id: String,
  pub text: String,
  #[serde(rename = "type", default)]
  pub kind: ProblemType,
  #[serde(default = "default_topic")]
  pub topic: String,
  #[serde(default)]
  pub difficulty: Difficulty,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub options: Option<Vec<ProblemOption>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub official_solution: Option<OfficialSolution>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub common_mistakes: Option<Vec<CommonMistake>>,
  #[serde(default)]
  pub user_submitted: bool,

  // Catalog metadata, display only.
  #[serde(default, skip_serializing_if = "Option::is_none")] pub chapter: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub exam: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub year: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub marks: Option<f32>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")] pub concepts_required: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")] pub formulas_used: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub ncert_mapping: Option<NcertMapping>,
}

impl Problem {
  /// Build a problem from student input. Such problems never carry an official solution.
  pub fn submitted(
    id: String,
    text: String,
    kind: ProblemType,
    topic: Option<String>,
    difficulty: Option<Difficulty>,
    options: Option<Vec<ProblemOption>>,
  ) -> Self {
    Self {
      id,
      text,
      kind,
      topic: topic.filter(|t| !t.trim().is_empty()).unwrap_or_else(default_topic),
      difficulty: difficulty.unwrap_or_default(),
      options: options.filter(|o| !o.is_empty()),
      official_solution: None,
      common_mistakes: None,
      user_submitted: true,
      chapter: None,
      exam: None,
      year: None,
      marks: None,
      concepts_required: Vec::new(),
      formulas_used: Vec::new(),
      ncert_mapping: None,
    }
  }

  /// Drop an official solution attached to a user-submitted problem.
  pub fn normalized(mut self) -> Self {
    if self.user_submitted && self.official_solution.is_some() {
      warn!(target: "tutor", id = %self.id, "Ignoring official_solution on user-submitted problem");
      self.official_solution = None;
    }
    self
  }

  /// The curated solution, if this problem is eligible to show one.
  pub fn official_solution(&self) -> Option<&OfficialSolution> {
    if self.user_submitted { None } else { self.official_solution.as_ref() }
  }

  /// Options, only when there is at least one.
  pub fn options(&self) -> Option<&[ProblemOption]> {
    self.options.as_deref().filter(|o| !o.is_empty())
  }
}

/// Who authored a conversation entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  #[serde(alias = "user")]
  Student,
  #[serde(alias = "assistant")]
  Tutor,
}

impl Role {
  pub fn label(&self) -> &'static str {
    match self {
      Role::Student => "Student",
      Role::Tutor => "Tutor",
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
  pub role: Role,
  pub content: String,
}

impl Message {
  pub fn student(content: impl Into<String>) -> Self {
    Self { role: Role::Student, content: content.into() }
  }

  pub fn tutor(content: impl Into<String>) -> Self {
    Self { role: Role::Tutor, content: content.into() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn legacy_type_and_role_spellings_deserialize() {
    let p: Problem = serde_json::from_str(
      r#"{"id":"x","text":"t","type":"objective_single_correct","options":[{"id":"a","text":"1 m"}]}"#,
    ).unwrap();
    assert_eq!(p.kind, ProblemType::Mcq);
    assert_eq!(p.topic, "General Physics");
    assert_eq!(p.difficulty, Difficulty::Medium);
    assert!(!p.user_submitted);

    let m: Message = serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).unwrap();
    assert_eq!(m.role, Role::Tutor);
    let m: Message = serde_json::from_str(r#"{"role":"user","content":"hi"}"#).unwrap();
    assert_eq!(m.role, Role::Student);
  }

  #[test]
  fn user_submitted_problem_hides_official_solution() {
    let raw = r#"{"id":"u1","text":"t","user_submitted":true,
                  "official_solution":{"steps":[{"step_number":1,"description":"d"}]}}"#;
    let p: Problem = serde_json::from_str(raw).unwrap();
    assert!(p.official_solution.is_some());
    assert!(p.official_solution().is_none());

    let p = p.normalized();
    assert!(p.official_solution.is_none());
  }

  #[test]
  fn official_solution_keeps_unknown_keys() {
    let raw = r#"{"steps":[],"answer_justification":"(B)","final_answer":"20 m"}"#;
    let s: OfficialSolution = serde_json::from_str(raw).unwrap();
    assert_eq!(s.extra.get("final_answer").and_then(|v| v.as_str()), Some("20 m"));
    let back = serde_json::to_value(&s).unwrap();
    assert_eq!(back, serde_json::from_str::<serde_json::Value>(raw).unwrap());
  }

  #[test]
  fn step_level_unknown_keys_survive() {
    let raw = r#"{"steps":[{"step_number":1,"description":"d","formula":"v = u + at",
                            "units":"m/s","diagram":"fig1.png"}],
                  "answer_justification":"(B)"}"#;
    let s: OfficialSolution = serde_json::from_str(raw).unwrap();
    assert_eq!(s.steps[0].formula.as_deref(), Some("v = u + at"));
    assert_eq!(s.steps[0].extra.get("units").and_then(|v| v.as_str()), Some("m/s"));
    let back = serde_json::to_value(&s).unwrap();
    assert_eq!(back, serde_json::from_str::<serde_json::Value>(raw).unwrap());
  }

  #[test]
  fn submitted_problem_defaults() {
    let p = Problem::submitted("u".into(), "q".into(), ProblemType::Mcq, Some("  ".into()), None, Some(vec![]));
    assert!(p.user_submitted);
    assert_eq!(p.topic, "General Physics");
    assert!(p.options().is_none());
  }
}
