use std::path::Path;

use xword::Direction::{Across, Down};
use xword::{
  Command, Crossword, Editor, FillOptions, FillOutcome, Grid, MatchScore, SqliteCorpus,
  StallReason,
};

const WORDS: &[(&str, i64)] = &[
  ("CAB", 60),
  ("CAT", 90),
  ("COD", 40),
  ("TOE", 70),
  ("TEA", 65),
  ("BEE", 30),
  ("EEL", 80),
  ("ACE", 50),
  ("ARE", 20),
];

fn word_list(dir: &Path) -> SqliteCorpus {
  let path = dir.join("words.db");
  let written = SqliteCorpus::create(&path)
    .unwrap()
    .insert_words(WORDS.iter().copied())
    .unwrap();
  assert_eq!(written, WORDS.len());
  SqliteCorpus::open(&path).unwrap()
}

#[test]
fn suggestions_from_sqlite() {
  let dir = tempfile::tempdir().unwrap();
  let corpus = word_list(dir.path());

  let mut editor = Editor::from_grid(Grid::parse("---\n-.-\n---").unwrap());
  editor.apply(Command::Letter('c')).unwrap();
  editor.apply(Command::Select((0, 0))).unwrap();
  assert_eq!(editor.active_slot().map(|s| s.direction), Some(Across));

  let suggestions = editor.suggestions(&corpus, 10).unwrap();
  let summary = suggestions
    .iter()
    .map(|s| (s.candidate.word.as_str(), s.match_score))
    .collect::<Vec<_>>();
  // The left column is C** whatever is chosen: CAB, CAT, COD. The right column
  // would start with the last letter.
  assert_eq!(
    summary,
    vec![
      ("CAT", MatchScore::Open(5)),
      ("CAB", MatchScore::Open(4)),
      ("COD", MatchScore::Vetoed),
    ]
  );

  editor.place_word(&suggestions[0].candidate.word).unwrap();
  assert_eq!(editor.grid().to_rows()[0], "CAT");
}

#[test]
fn autofill_from_sqlite() {
  let dir = tempfile::tempdir().unwrap();
  let corpus = word_list(dir.path());

  let mut editor = Editor::from_grid(Grid::parse("---\n-.-\n---").unwrap());
  let report = editor.autofill(&corpus, FillOptions::default(), None);

  // Whatever happens, the placed words are all in the word list and every complete
  // slot spells a word.
  for placement in &report.placements {
    assert!(WORDS.iter().any(|(w, _)| *w == placement.word));
    assert!(!placement.match_score.is_vetoed());
  }
  for slot in editor.slots() {
    if let Some(word) = xword::Pattern::extract(editor.grid(), slot).as_word() {
      assert!(WORDS.iter().any(|(w, _)| *w == word), "{word}");
    }
  }
  match report.outcome {
    FillOutcome::Completed => assert!(editor.grid().is_filled()),
    FillOutcome::Stalled { slot, reason } => {
      assert!(editor.slots().get(slot).is_some());
      assert!(!matches!(reason, StallReason::CorpusUnavailable(_)));
    }
    FillOutcome::Cancelled => panic!("nothing cancelled the run"),
  }
}

#[test]
fn missing_word_list_is_unavailable() {
  let dir = tempfile::tempdir().unwrap();
  assert!(matches!(
    SqliteCorpus::open(dir.path().join("missing.db")),
    Err(xword::Error::CorpusUnavailable(_))
  ));
}

#[test]
fn saved_crossword_reopens() {
  let dir = tempfile::tempdir().unwrap();
  let corpus = word_list(dir.path());

  let mut editor = Editor::new(3);
  editor.apply(Command::ToggleBlockMode).unwrap();
  for pos in [(1, 0), (1, 1), (1, 2)] {
    editor.apply(Command::ToggleBlock(pos)).unwrap();
  }
  editor.apply(Command::ToggleBlockMode).unwrap();
  editor.set_clue("Slippery fish").unwrap();
  let report = editor.autofill(&corpus, FillOptions::default(), None);
  assert_eq!(report.outcome, FillOutcome::Completed);

  let json = serde_json::to_string(&Crossword::new("Rows", &editor)).unwrap();
  let crossword: Crossword = serde_json::from_str(&json).unwrap();
  let reopened = crossword.to_editor().unwrap();
  assert_eq!(reopened.grid(), editor.grid());
  assert_eq!(reopened.current_clue(), Some("Slippery fish"));
  assert_eq!(reopened.slots().in_direction(Down).count(), 0);
}
