//! Problem catalog: curated problems loaded from JSON files, plus built-in seeds.
//!
//! Each `*.json` file in the catalog directory holds either one problem object
//! or an array of them. Unreadable files and malformed records are logged and
//! skipped; a bad record never takes the rest of its file down with it.
//! The catalog is read-only after loading.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::domain::{Difficulty, Problem};

/// Optional filters; `None` matches everything.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProblemFilter {
  #[serde(default)] pub topic: Option<String>,
  #[serde(default)] pub chapter: Option<String>,
  #[serde(default)] pub difficulty: Option<Difficulty>,
}

impl ProblemFilter {
  fn matches(&self, p: &Problem) -> bool {
    self.topic.as_ref().map_or(true, |t| &p.topic == t)
      && self.chapter.as_ref().map_or(true, |c| p.chapter.as_ref() == Some(c))
      && self.difficulty.map_or(true, |d| p.difficulty == d)
  }
}

#[derive(Clone, Debug, Default)]
pub struct ProblemCatalog {
  problems: Vec<Problem>,
  by_id: HashMap<String, usize>,
}

impl ProblemCatalog {
  /// Build a catalog from already-parsed problems. Later duplicates of an id are dropped.
  pub fn from_problems(problems: impl IntoIterator<Item = Problem>) -> Self {
    let mut catalog = Self::default();
    for p in problems {
      catalog.insert(p);
    }
    catalog
  }

  fn insert(&mut self, problem: Problem) {
    let problem = problem.normalized();
    if problem.id.is_empty() {
      warn!(target: "tutor", "Skipping catalog problem without an id");
      return;
    }
    if self.by_id.contains_key(&problem.id) {
      warn!(target: "tutor", id = %problem.id, "Duplicate problem id; keeping the first one");
      return;
    }
    self.by_id.insert(problem.id.clone(), self.problems.len());
    self.problems.push(problem);
  }

  /// Load every `*.json` file under `dir` (non-recursive), in file-name order.
  #[instrument(level = "info", skip_all, fields(dir = %dir.as_ref().display()))]
  pub fn load_dir(dir: impl AsRef<Path>) -> Self {
    let dir = dir.as_ref();
    let entries = match std::fs::read_dir(dir) {
      Ok(e) => e,
      Err(e) => {
        warn!(target: "tutor", dir = %dir.display(), error = %e, "Problem directory not readable; catalog starts empty");
        return Self::default();
      }
    };

    let mut files: Vec<_> = entries
      .filter_map(|e| e.ok().map(|e| e.path()))
      .filter(|p| p.extension().and_then(|x| x.to_str()) == Some("json"))
      .collect();
    files.sort();

    let mut problems = Vec::new();
    for path in files {
      let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str::<Value>(&s).map_err(|e| e.to_string()));
      let records = match parsed {
        Ok(Value::Array(list)) => list,
        Ok(obj @ Value::Object(_)) => vec![obj],
        Ok(_) => {
          error!(target: "tutor", file = %path.display(), "Problem file is neither an object nor an array");
          continue;
        }
        Err(e) => {
          error!(target: "tutor", file = %path.display(), error = %e, "Failed to load problem file");
          continue;
        }
      };

      let total = records.len();
      let mut loaded = 0usize;
      for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Problem>(record) {
          Ok(p) => {
            problems.push(p);
            loaded += 1;
          }
          Err(e) => warn!(target: "tutor", file = %path.display(), index, error = %e, "Skipping malformed problem record"),
        }
      }
      info!(target: "tutor", file = %path.display(), loaded, skipped = total - loaded, "Loaded problem file");
    }
    Self::from_problems(problems)
  }

  /// Add problems whose ids are not yet present.
  pub fn extend_missing(&mut self, problems: impl IntoIterator<Item = Problem>) {
    for p in problems {
      if !self.by_id.contains_key(&p.id) {
        self.insert(p);
      }
    }
  }

  /// Sorted, de-duplicated topics.
  pub fn list_topics(&self) -> Vec<String> {
    self.problems.iter().map(|p| p.topic.clone()).collect::<BTreeSet<_>>().into_iter().collect()
  }

  /// Sorted, de-duplicated chapters (problems without a chapter are skipped).
  pub fn list_chapters(&self) -> Vec<String> {
    self.problems.iter().filter_map(|p| p.chapter.clone()).collect::<BTreeSet<_>>().into_iter().collect()
  }

  pub fn filter(&self, filter: &ProblemFilter) -> Vec<&Problem> {
    self.problems.iter().filter(|p| filter.matches(p)).collect()
  }

  pub fn get_by_id(&self, id: &str) -> Option<&Problem> {
    self.by_id.get(id).map(|&i| &self.problems[i])
  }

  pub fn count(&self) -> usize {
    self.problems.len()
  }

  /// A random problem matching `filter`.
  pub fn sample(&self, filter: &ProblemFilter) -> Option<&Problem> {
    self.filter(filter).choose(&mut rand::thread_rng()).copied()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;

  const ARRAY_FILE: &str = r#"[
    {"id":"lm-1","text":"A 2 kg block...","type":"numerical","topic":"Laws of Motion","chapter":"Dynamics","difficulty":"easy"},
    {"id":"pm-1","text":"A projectile...","type":"objective_single_correct","topic":"Projectile Motion","chapter":"Kinematics","difficulty":"hard",
     "options":[{"id":"a","text":"10 m"},{"id":"b","text":"20 m"}],
     "official_solution":{"steps":[{"step_number":1,"description":"Resolve velocity"}],"answer_justification":"(B)"}}
  ]"#;

  const SINGLE_FILE: &str = r#"{"id":"we-1","text":"Work done by...","topic":"Work & Energy","difficulty":"medium"}"#;

  fn catalog() -> (tempfile::TempDir, ProblemCatalog) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.json"), ARRAY_FILE).unwrap();
    fs::write(dir.path().join("b.json"), SINGLE_FILE).unwrap();
    fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    let c = ProblemCatalog::load_dir(dir.path());
    (dir, c)
  }

  #[test]
  fn loads_arrays_and_single_objects_skipping_bad_files() {
    let (_dir, c) = catalog();
    assert_eq!(c.count(), 3);
    assert!(c.get_by_id("pm-1").unwrap().official_solution().is_some());
    assert!(c.get_by_id("missing").is_none());
  }

  #[test]
  fn topics_and_chapters_are_sorted_unique() {
    let (_dir, c) = catalog();
    assert_eq!(c.list_topics(), vec!["Laws of Motion", "Projectile Motion", "Work & Energy"]);
    assert_eq!(c.list_chapters(), vec!["Dynamics", "Kinematics"]);
  }

  #[test]
  fn filters_combine() {
    let (_dir, c) = catalog();
    let all = c.filter(&ProblemFilter::default());
    assert_eq!(all.len(), 3);

    let hard = c.filter(&ProblemFilter { difficulty: Some(Difficulty::Hard), ..Default::default() });
    assert_eq!(hard.len(), 1);
    assert_eq!(hard[0].id, "pm-1");

    let none = c.filter(&ProblemFilter {
      topic: Some("Laws of Motion".into()),
      chapter: Some("Kinematics".into()),
      difficulty: None,
    });
    assert!(none.is_empty());
  }

  #[test]
  fn sample_respects_filter() {
    let (_dir, c) = catalog();
    let f = ProblemFilter { topic: Some("Work & Energy".into()), ..Default::default() };
    assert_eq!(c.sample(&f).map(|p| p.id.as_str()), Some("we-1"));
    let f = ProblemFilter { topic: Some("Optics".into()), ..Default::default() };
    assert!(c.sample(&f).is_none());
  }

  #[test]
  fn bad_record_is_skipped_without_dropping_its_neighbours() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
      dir.path().join("mixed.json"),
      r#"[
        {"id":"ok-1","text":"First","topic":"Optics"},
        {"id":"bad-1","text":"Second","year":"2019 (Shift 1)"},
        {"id":"bad-2","topic":"No text"},
        {"id":"ok-2","text":"Third","topic":"Optics","year":2019}
      ]"#,
    ).unwrap();
    fs::write(dir.path().join("scalar.json"), "42").unwrap();
    let c = ProblemCatalog::load_dir(dir.path());
    assert_eq!(c.count(), 2);
    assert!(c.get_by_id("ok-1").is_some());
    assert_eq!(c.get_by_id("ok-2").and_then(|p| p.year), Some(2019));
    assert!(c.get_by_id("bad-1").is_none());
  }

  #[test]
  fn missing_directory_gives_empty_catalog() {
    let c = ProblemCatalog::load_dir("/definitely/not/here");
    assert_eq!(c.count(), 0);
    assert!(c.list_topics().is_empty());
  }

  #[test]
  fn duplicates_and_missing_ids_are_dropped() {
    let p: Problem = serde_json::from_str(SINGLE_FILE).unwrap();
    let mut no_id = p.clone();
    no_id.id.clear();
    let mut c = ProblemCatalog::from_problems([p.clone(), p.clone(), no_id]);
    assert_eq!(c.count(), 1);
    c.extend_missing([p]);
    assert_eq!(c.count(), 1);
  }
}
