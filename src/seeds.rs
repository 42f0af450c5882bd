//! Built-in sample problems so the catalog is never empty, even without a
//! problems directory.

use crate::domain::{
  CommonMistake, Difficulty, OfficialSolution, Problem, ProblemOption, ProblemType, SolutionStep,
};

fn step(n: u32, description: &str, formula: &str, calculation: &str, result: &str) -> SolutionStep {
  SolutionStep {
    step_number: n,
    description: description.into(),
    formula: Some(formula.into()),
    calculation: Some(calculation.into()),
    explanation: None,
    result: Some(result.into()),
    extra: Default::default(),
  }
}

fn curated(id: &str, text: &str, kind: ProblemType, topic: &str, chapter: &str, difficulty: Difficulty) -> Problem {
  let mut p = Problem::submitted(id.into(), text.into(), kind, Some(topic.into()), Some(difficulty), None);
  p.user_submitted = false;
  p.chapter = Some(chapter.into());
  p
}

pub fn seed_problems() -> Vec<Problem> {
  let mut cliff = curated(
    "seed-pm-1",
    "A ball is thrown horizontally at 20 m/s from the top of a 45 m high cliff. Find the horizontal range. (g = 10 m/s²)",
    ProblemType::Numerical,
    "Projectile Motion",
    "Kinematics",
    Difficulty::Medium,
  );
  cliff.concepts_required = vec!["Independence of horizontal and vertical motion".into()];
  cliff.formulas_used = vec!["h = ½gt²".into(), "R = ut".into()];
  cliff.official_solution = Some(OfficialSolution {
    steps: vec![
      step(1, "Time of flight from vertical motion", "h = ½gt²", "45 = ½ × 10 × t²", "t = 3 s"),
      step(2, "Horizontal distance covered", "R = ut", "R = 20 × 3", "R = 60 m"),
    ],
    answer_justification: Some("The ball lands 60 m from the foot of the cliff.".into()),
    extra: Default::default(),
  });
  cliff.common_mistakes = Some(vec![CommonMistake {
    mistake: "Using the 20 m/s speed in the vertical equation".into(),
    correct_approach: "Initial vertical velocity is zero for a horizontal throw".into(),
  }]);

  let mut blocks = curated(
    "seed-lm-1",
    "Two blocks of mass 2 kg and 3 kg on a frictionless surface are connected by a light string. A 10 N force pulls the 3 kg block. Find the tension in the string.",
    ProblemType::Mcq,
    "Laws of Motion",
    "Dynamics",
    Difficulty::Easy,
  );
  blocks.options = Some(vec![
    ProblemOption { id: "a".into(), text: "2 N".into() },
    ProblemOption { id: "b".into(), text: "4 N".into() },
    ProblemOption { id: "c".into(), text: "6 N".into() },
    ProblemOption { id: "d".into(), text: "10 N".into() },
  ]);
  blocks.official_solution = Some(OfficialSolution {
    steps: vec![
      step(1, "Acceleration of the system", "a = F / (m₁ + m₂)", "a = 10 / 5", "a = 2 m/s²"),
      step(2, "Tension accelerates the 2 kg block", "T = m₁a", "T = 2 × 2", "T = 4 N"),
    ],
    answer_justification: Some("(B) 4 N".into()),
    extra: Default::default(),
  });

  let wheel = curated(
    "seed-rot-1",
    "A wheel of radius 0.5 m rotates at 120 rpm. Find its angular velocity and the linear speed of a point on the rim.",
    ProblemType::Descriptive,
    "Rotation",
    "Rotational Motion",
    Difficulty::Easy,
  );

  vec![cliff, blocks, wheel]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn seeds_are_curated_and_unique() {
    let seeds = seed_problems();
    let mut ids: Vec<_> = seeds.iter().map(|p| p.id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), seeds.len());
    assert!(seeds.iter().all(|p| !p.user_submitted));
    assert!(seeds.iter().filter(|p| p.official_solution().is_some()).count() >= 2);
  }
}
