//! Prompt composition: policy + problem + bounded history + intent → one text prompt.
//!
//! Everything here is pure and deterministic; the same inputs always produce
//! the same prompt. The templates are fixed; only the two policy texts come
//! from configuration.

use crate::config::Policies;
use crate::conversation::HISTORY_WINDOW;
use crate::domain::{Message, Problem, ProblemOption};
use crate::util::fill_template;

/// Placeholder rendered instead of an empty history.
pub const NO_CONVERSATION_YET: &str = "No conversation yet - this is the first interaction.";

/// Section headers every generated solution is asked to carry, in order.
pub const SOLUTION_SECTIONS: [&str; 6] = [
  "## What We Need to Find",
  "## Given Information",
  "## Physics Concepts",
  "## Solution Steps",
  "## Final Answer",
  "## Key Insights",
];

/// A hint level in 1..=3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct HintLevel(u8);

impl HintLevel {
  pub fn new(level: u8) -> Option<Self> {
    (1..=3).contains(&level).then_some(Self(level))
  }

  pub fn get(self) -> u8 { self.0 }

  /// Level-specific instruction. Each level reveals strictly more than the one before.
  pub fn instruction(self) -> &'static str {
    match self.0 {
      1 => "Give a GENTLE hint (Level 1) - just a subtle nudge about the general approach. Don't reveal specifics.",
      2 => "Give a MODERATE hint (Level 2) - name the specific physics concept or principle needed, without giving any equation.",
      _ => "Give a DIRECT hint (Level 3) - state the exact formula or equation to use, but don't substitute values or solve.",
    }
  }
}

/// What the next generation call is for.
#[derive(Clone, Copy, Debug)]
pub enum Intent<'a> {
  Greeting,
  Chat { student_message: &'a str },
  Hint(HintLevel),
  Solution,
}

const GREETING_TEMPLATE: &str = "{policy}

A student has brought this {topic} problem:

\"{problem_text}\"

This is your first interaction. Greet them warmly and ask your FIRST Socratic question to get them thinking.
Do NOT solve the problem. Just ask what they understand about what's being asked.";

const CHAT_TEMPLATE: &str = "{policy}

PROBLEM ({topic}):
{problem_text}
{options}
CONVERSATION SO FAR:
{history}

STUDENT'S LATEST MESSAGE:
{student_message}

YOUR RESPONSE (remember: ask questions, guide thinking, don't solve directly):";

const HINT_TEMPLATE: &str = "{policy}

PROBLEM ({topic}):
{problem_text}
{options}
CONVERSATION SO FAR:
{history}

The student has requested a hint (Level {level}).
{instruction}

Provide the hint in a supportive way that encourages them to keep trying.";

const SOLUTION_TEMPLATE: &str = "{policy}

PROBLEM ({topic}):
{problem_text}
{options}
Provide a COMPLETE, STEP-BY-STEP solution using this EXACT markdown structure:

## What We Need to Find
[1-2 sentences stating the question clearly]

## Given Information
- **[Quantity (symbol)]:** [value with units]
[List all given values as bullet points with units]

## Physics Concepts
- **[Concept name]:** Brief explanation
- **Formula:** `equation in code format`

## Solution Steps

### Step 1: [Clear step title]
- **Formula:** `v = u + at`
- **Substituting values:** 10 = 0 + a(5)
- **Calculation:** a = 10/5 = 2 m/s²
- **Result:** ✅ Acceleration = 2 m/s²

### Step 2: [Next step title]
[Continue with the same format for every step]

## Final Answer
**The [quantity] is [value with units].**
[1 sentence explaining the significance]

## Key Insights
- ✅ [Important concept to remember]
- ⚠️ [Common mistake to avoid]
- 💡 [Pro tip]

FORMATTING RULES:
- Use ## for the sections above, exactly as named and in this order
- Use ### for step titles
- Use ` ` for formulas and equations
- Keep paragraphs short (2-3 sentences max)";

/// Build the prompt for `intent`. `recent` may be longer than the history
/// window; only its tail is rendered.
pub fn compose(policies: &Policies, problem: &Problem, recent: &[Message], intent: Intent<'_>) -> String {
  let options = format_options(problem.options());
  match intent {
    Intent::Greeting => fill_template(
      GREETING_TEMPLATE,
      &[
        ("policy", &policies.socratic_policy),
        ("topic", &problem.topic),
        ("problem_text", &problem.text),
      ],
    ),
    Intent::Chat { student_message } => fill_template(
      CHAT_TEMPLATE,
      &[
        ("policy", &policies.socratic_policy),
        ("topic", &problem.topic),
        ("problem_text", &problem.text),
        ("options", &options),
        ("history", &format_history(recent)),
        ("student_message", student_message),
      ],
    ),
    Intent::Hint(level) => fill_template(
      HINT_TEMPLATE,
      &[
        ("policy", &policies.socratic_policy),
        ("topic", &problem.topic),
        ("problem_text", &problem.text),
        ("options", &options),
        ("history", &format_history(recent)),
        ("level", &level.get().to_string()),
        ("instruction", level.instruction()),
      ],
    ),
    Intent::Solution => fill_template(
      SOLUTION_TEMPLATE,
      &[
        ("policy", &policies.solution_policy),
        ("topic", &problem.topic),
        ("problem_text", &problem.text),
        ("options", &options),
      ],
    ),
  }
}

/// Render the last `HISTORY_WINDOW` messages as "Role: content" blocks.
pub fn format_history(messages: &[Message]) -> String {
  let start = messages.len().saturating_sub(HISTORY_WINDOW);
  let window = &messages[start..];
  if window.is_empty() {
    return NO_CONVERSATION_YET.to_string();
  }
  window
    .iter()
    .map(|m| format!("{}: {}", m.role.label(), m.content))
    .collect::<Vec<_>>()
    .join("\n\n")
}

/// "OPTIONS:" block for MCQ problems, empty otherwise.
pub fn format_options(options: Option<&[ProblemOption]>) -> String {
  match options {
    Some(opts) => {
      let mut out = String::from("OPTIONS:\n");
      for opt in opts {
        out.push_str(&format!("({}) {}\n", opt.id.to_uppercase(), opt.text));
      }
      out
    }
    None => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ProblemType;

  fn mcq() -> Problem {
    Problem::submitted(
      "u1".into(),
      "A stone is dropped from 20 m. How long does it take to land?".into(),
      ProblemType::Mcq,
      Some("Kinematics".into()),
      None,
      Some(vec![
        ProblemOption { id: "a".into(), text: "1 s".into() },
        ProblemOption { id: "b".into(), text: "2 s".into() },
      ]),
    )
  }

  #[test]
  fn empty_history_renders_marker() {
    assert_eq!(format_history(&[]), NO_CONVERSATION_YET);
  }

  #[test]
  fn history_uses_role_labels_and_blank_lines() {
    let h = format_history(&[Message::tutor("What is asked?"), Message::student("The time.")]);
    assert_eq!(h, "Tutor: What is asked?\n\nStudent: The time.");
  }

  #[test]
  fn history_keeps_message_content_as_written() {
    let h = format_history(&[Message::student("  v = u + at\n"), Message::tutor("Good.")]);
    assert_eq!(h, "Student:   v = u + at\n\n\nTutor: Good.");
  }

  #[test]
  fn consecutive_same_role_messages_are_kept() {
    let h = format_history(&[Message::student("one"), Message::student("two")]);
    assert_eq!(h, "Student: one\n\nStudent: two");
  }

  #[test]
  fn only_last_ten_messages_reach_the_prompt() {
    let msgs: Vec<Message> = (0..12).map(|i| Message::student(format!("msg-{i:02}"))).collect();
    let p = compose(&Policies::default(), &mcq(), &msgs, Intent::Chat { student_message: "msg-11" });
    assert!(!p.contains("msg-00"));
    assert!(!p.contains("msg-01"));
    for i in 2..12 {
      assert!(p.contains(&format!("msg-{i:02}")), "missing msg-{i:02}");
    }
  }

  #[test]
  fn chat_prompt_carries_policy_options_and_latest_message() {
    let policies = Policies::default();
    let p = compose(&policies, &mcq(), &[], Intent::Chat { student_message: "Is it 2 s?" });
    assert!(p.starts_with(&policies.socratic_policy));
    assert!(p.contains("PROBLEM (Kinematics):"));
    assert!(p.contains("OPTIONS:\n(A) 1 s\n(B) 2 s\n"));
    assert!(p.contains(NO_CONVERSATION_YET));
    assert!(p.contains("STUDENT'S LATEST MESSAGE:\nIs it 2 s?"));
    assert!(p.contains("don't solve directly"));
  }

  #[test]
  fn greeting_forbids_solving() {
    let p = compose(&Policies::default(), &mcq(), &[], Intent::Greeting);
    assert!(p.contains("Kinematics problem"));
    assert!(p.contains("A stone is dropped from 20 m."));
    assert!(p.contains("Do NOT solve the problem."));
  }

  #[test]
  fn hint_instructions_escalate() {
    let l1 = HintLevel::new(1).unwrap().instruction();
    let l2 = HintLevel::new(2).unwrap().instruction();
    let l3 = HintLevel::new(3).unwrap().instruction();
    assert!(!l1.contains("concept") && !l1.contains("formula"));
    assert!(l2.contains("concept") && !l2.contains("exact formula"));
    assert!(l3.contains("exact formula"));
    assert!(HintLevel::new(0).is_none());
    assert!(HintLevel::new(4).is_none());
  }

  #[test]
  fn hint_prompt_names_level() {
    let level = HintLevel::new(2).unwrap();
    let p = compose(&Policies::default(), &mcq(), &[Message::tutor("Hi")], Intent::Hint(level));
    assert!(p.contains("requested a hint (Level 2)"));
    assert!(p.contains(level.instruction()));
    assert!(p.contains("Tutor: Hi"));
  }

  #[test]
  fn solution_prompt_uses_solution_policy_and_ordered_sections() {
    let policies = Policies::default();
    let p = compose(&policies, &mcq(), &[], Intent::Solution);
    assert!(p.starts_with(&policies.solution_policy));
    assert!(!p.contains(&policies.socratic_policy));
    let mut last = 0;
    for section in SOLUTION_SECTIONS {
      let at = p.find(section).unwrap_or_else(|| panic!("missing {section}"));
      assert!(at >= last, "{section} out of order");
      last = at;
    }
  }

  #[test]
  fn problem_text_with_braces_is_not_expanded() {
    let mut problem = mcq();
    problem.text = "Find {history} in v = {u} + at".into();
    let p = compose(&Policies::default(), &problem, &[], Intent::Chat { student_message: "?" });
    assert!(p.contains("Find {history} in v = {u} + at"));
  }
}
