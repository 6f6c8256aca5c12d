//! Greedy autofill: repeatedly fills the most constrained slot with the word that
//! leaves its crossings the most room.
//!
//! There is no backtracking. Once a word is placed it stays, so a poor early choice
//! can leave the grid stuck; that is reported as [FillOutcome::Stalled] rather
//! than as success.

use crate::scorer::{MatchScore, score};
use crate::{Corpus, Error, Grid, Pattern, SUGGESTION_LIMIT, Slot, SlotId, Slots, Square};
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillOptions {
  /// How many of the best-scoring words from the word list are considered for each slot.
  pub candidate_limit: usize,
  /// Whether a word may be placed when it already appears elsewhere in the grid.
  pub allow_duplicates: bool,
}

impl Default for FillOptions {
  fn default() -> Self {
    Self {
      candidate_limit: SUGGESTION_LIMIT,
      allow_duplicates: false,
    }
  }
}

/// Why an autofill run stopped before the grid was full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StallReason {
  /// No word in the word list fits the slot.
  NoCandidates,
  /// Every word that fits the slot would leave some crossing slot with no words.
  /// Nothing is written to the slot, rather than committing a word that scores 0.
  AllVetoed,
  /// The word list failed while being queried.
  CorpusUnavailable(String),
}

impl Display for StallReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::NoCandidates => write!(f, "no word fits"),
      Self::AllVetoed => write!(f, "every word that fits leaves a crossing slot with no words"),
      Self::CorpusUnavailable(e) => write!(f, "{e}"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
  /// Every slot is filled.
  Completed,
  /// The run got stuck on `slot`. Words placed before that are kept.
  Stalled { slot: SlotId, reason: StallReason },
  /// The cancel flag was raised between steps.
  Cancelled,
}

impl FillOutcome {
  pub fn is_completed(&self) -> bool {
    *self == Self::Completed
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillState {
  Running,
  Done(FillOutcome),
}

/// A word placed by autofill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
  pub slot: SlotId,
  pub word: String,
  pub match_score: MatchScore,
}

/// What an autofill run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillReport {
  pub outcome: FillOutcome,
  pub placements: Vec<Placement>,
}

/// A single autofill run over a grid.
///
/// The slot layout is derived once when the run starts; placing letters never
/// changes it.
pub struct Autofill<'a, C: Corpus + ?Sized> {
  grid: &'a mut Grid,
  slots: Slots,
  corpus: &'a C,
  options: FillOptions,
  cancel: Option<&'a AtomicBool>,
  state: FillState,
  placements: Vec<Placement>,
}

impl<'a, C: Corpus + ?Sized> Autofill<'a, C> {
  pub fn new(grid: &'a mut Grid, corpus: &'a C) -> Self {
    let slots = Slots::derive(grid);
    Self {
      grid,
      slots,
      corpus,
      options: FillOptions::default(),
      cancel: None,
      state: FillState::Running,
      placements: vec![],
    }
  }

  pub fn with_options(mut self, options: FillOptions) -> Self {
    self.options = options;
    self
  }

  /// Checks `cancel` before every step, and stops with [FillOutcome::Cancelled] once
  /// it is set.
  pub fn with_cancel_flag(mut self, cancel: &'a AtomicBool) -> Self {
    self.cancel = Some(cancel);
    self
  }

  pub fn state(&self) -> &FillState {
    &self.state
  }

  pub fn placements(&self) -> &[Placement] {
    &self.placements
  }

  /// Runs steps until the run is done.
  pub fn run(mut self) -> FillReport {
    while self.state == FillState::Running {
      self.step();
    }
    let FillState::Done(outcome) = self.state else {
      unreachable!();
    };
    log::info!(
      "autofill finished after placing {} words: {:?}",
      self.placements.len(),
      outcome
    );
    FillReport {
      outcome,
      placements: self.placements,
    }
  }

  /// Fills one slot, or finishes the run.
  pub fn step(&mut self) -> &FillState {
    if self.state != FillState::Running {
      return &self.state;
    }
    if self.cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
      self.state = FillState::Done(FillOutcome::Cancelled);
      return &self.state;
    }

    let outcome = match self.fill_most_constrained() {
      Ok(None) => None,
      Ok(Some(outcome)) => Some(outcome),
      Err((slot, e)) => {
        log::warn!("word list failed while filling {slot:?}: {e}");
        Some(FillOutcome::Stalled {
          slot,
          reason: StallReason::CorpusUnavailable(e.to_string()),
        })
      }
    };
    if let Some(outcome) = outcome {
      self.state = FillState::Done(outcome);
    }
    &self.state
  }

  /// Places one word. Returns the outcome if the run is over.
  fn fill_most_constrained(&mut self) -> Result<Option<FillOutcome>, (SlotId, Error)> {
    let Some((slot, count)) = self.most_constrained()? else {
      return Ok(Some(FillOutcome::Completed));
    };
    let id = slot.id();
    let stalled = |reason| Ok(Some(FillOutcome::Stalled { slot: id, reason }));

    let pattern = Pattern::extract(self.grid, &slot);
    log::debug!("filling {slot} ({pattern}) with {count} candidates");
    if count == 0 {
      return stalled(StallReason::NoCandidates);
    }

    let candidates = self
      .corpus
      .query(&pattern, self.options.candidate_limit)
      .map_err(|e| (id, e))?;
    let used = if self.options.allow_duplicates {
      HashSet::new()
    } else {
      self.words_in_grid()
    };

    let mut best: Option<(String, MatchScore)> = None;
    for candidate in candidates {
      if used.contains(&candidate.word) || !pattern.matches(&candidate.word) {
        continue;
      }
      let match_score = score(&candidate.word, &slot, self.grid, &self.slots, self.corpus)
        .map_err(|e| (id, e))?;
      // Strictly greater, so ties go to the word the word list ranked first.
      if best.as_ref().is_none_or(|(_, s)| match_score > *s) {
        best = Some((candidate.word, match_score));
      }
    }

    match best {
      None => stalled(StallReason::NoCandidates),
      Some((_, MatchScore::Vetoed)) => stalled(StallReason::AllVetoed),
      Some((word, match_score)) => {
        for (pos, letter) in slot.cells().zip(word.chars()) {
          self.grid.set(pos, Square::Letter(letter.to_ascii_uppercase()));
        }
        log::debug!("placed {word} in {slot} ({match_score:?})");
        self.placements.push(Placement {
          slot: id,
          word,
          match_score,
        });
        Ok(None)
      }
    }
  }

  /// The unfilled slot with the fewest matching words, and that number. Ties go to
  /// the slot with the lowest clue number.
  fn most_constrained(&self) -> Result<Option<(Slot, usize)>, (SlotId, Error)> {
    let mut best: Option<(&Slot, usize)> = None;
    for slot in &self.slots {
      let pattern = Pattern::extract(self.grid, slot);
      if pattern.is_complete() {
        continue;
      }
      let count = self.corpus.count(&pattern).map_err(|e| (slot.id(), e))?;
      if best.is_none_or(|(_, c)| count < c) {
        best = Some((slot, count));
      }
      if count == 0 {
        break;
      }
    }
    Ok(best.map(|(slot, count)| (slot.clone(), count)))
  }

  /// The words of all completely filled slots.
  fn words_in_grid(&self) -> HashSet<String> {
    self
      .slots
      .iter()
      .filter_map(|slot| Pattern::extract(self.grid, slot).as_word())
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Candidate, Direction::Across, Direction::Down, MemoryCorpus};
  use std::cell::Cell;

  /// Wraps a corpus and counts the calls made to it.
  struct Counting<C> {
    inner: C,
    queries: Cell<usize>,
    counts: Cell<usize>,
  }

  impl<C> Counting<C> {
    fn new(inner: C) -> Self {
      Self {
        inner,
        queries: Cell::new(0),
        counts: Cell::new(0),
      }
    }
  }

  impl<C: Corpus> Corpus for Counting<C> {
    fn query(&self, pattern: &Pattern, limit: usize) -> Result<Vec<Candidate>, Error> {
      self.queries.set(self.queries.get() + 1);
      self.inner.query(pattern, limit)
    }

    fn count(&self, pattern: &Pattern) -> Result<usize, Error> {
      self.counts.set(self.counts.get() + 1);
      self.inner.count(pattern)
    }
  }

  struct Broken;

  impl Corpus for Broken {
    fn query(&self, _: &Pattern, _: usize) -> Result<Vec<Candidate>, Error> {
      Err(Error::CorpusUnavailable("disk on fire".to_string()))
    }

    fn count(&self, _: &Pattern) -> Result<usize, Error> {
      Err(Error::CorpusUnavailable("disk on fire".to_string()))
    }
  }

  fn id(pos: (usize, usize), direction: crate::Direction) -> SlotId {
    SlotId::new(pos, direction)
  }

  #[test]
  fn full_grid_completes_without_queries() {
    let mut grid = Grid::parse("AB\nCD").unwrap();
    let corpus = Counting::new(MemoryCorpus::new());
    let report = Autofill::new(&mut grid, &corpus).run();
    assert_eq!(report.outcome, FillOutcome::Completed);
    assert!(report.placements.is_empty());
    assert_eq!(corpus.queries.get(), 0);
    assert_eq!(corpus.counts.get(), 0);
  }

  #[test]
  fn single_slot_without_words_stalls() {
    let mut grid = Grid::parse("--\n..").unwrap();
    let corpus = MemoryCorpus::from_iter([("ABC", 10)]);
    let report = Autofill::new(&mut grid, &corpus).run();
    assert_eq!(
      report.outcome,
      FillOutcome::Stalled {
        slot: id((0, 0), Across),
        reason: StallReason::NoCandidates
      }
    );
    assert_eq!(grid.to_text(), "--\n..\n");
  }

  #[test]
  fn single_slot_takes_best_word() {
    let mut grid = Grid::parse("---\n...\n...").unwrap();
    let corpus = MemoryCorpus::from_iter([("COT", 70), ("CAT", 90), ("CUT", 85)]);
    let report = Autofill::new(&mut grid, &corpus).run();
    assert!(report.outcome.is_completed());
    // With no crossings every word scores the same, so the word list order decides.
    assert_eq!(report.placements[0].word, "CAT");
    assert_eq!(grid.to_rows()[0], "CAT");
  }

  #[test]
  fn fills_word_square() {
    let mut grid = Grid::new(2);
    let corpus = MemoryCorpus::from_iter([("AT", 90), ("TO", 80), ("AN", 70), ("NO", 60)]);
    let report = Autofill::new(&mut grid, &corpus).run();
    assert!(report.outcome.is_completed(), "{report:?}\n{grid}");
    assert_eq!(grid.to_text(), "AT\nNO\n");

    // AN is completed by its crossings without being placed itself.
    let placed = report
      .placements
      .iter()
      .map(|p| p.word.as_str())
      .collect::<Vec<_>>();
    assert_eq!(placed, vec!["AT", "TO", "NO"]);
  }

  #[test]
  fn most_constrained_slot_goes_first() {
    // The down slot, *Z*, has one option; the across slot has five.
    let mut grid = Grid::parse("---\nZ..\n-..").unwrap();
    let corpus = MemoryCorpus::from_iter([
      ("ART", 90),
      ("ARE", 80),
      ("TAT", 50),
      ("ACE", 40),
      ("AZO", 20),
    ]);
    let mut fill = Autofill::new(&mut grid, &corpus);
    assert_eq!(fill.step(), &FillState::Running);
    assert_eq!(fill.placements()[0].slot, id((0, 0), Down));
    assert_eq!(fill.placements()[0].match_score, MatchScore::Open(4));
    let report = fill.run();
    assert!(report.outcome.is_completed());
    assert_eq!(report.placements.len(), 2);
    assert_eq!(report.placements[1].slot, id((0, 0), Across));
    assert_eq!(grid.to_text(), "ART\nZ..\nO..\n");
  }

  #[test]
  fn stalls_when_every_candidate_is_vetoed() {
    let mut grid = Grid::parse("---\n-.-\n---").unwrap();
    // Nothing fits any crossing once the top row is placed.
    let corpus = MemoryCorpus::from_iter([("ABC", 10), ("DEF", 10), ("GHI", 10), ("JKL", 10)]);
    let report = Autofill::new(&mut grid, &corpus).run();
    assert!(matches!(
      report.outcome,
      FillOutcome::Stalled {
        reason: StallReason::AllVetoed,
        ..
      }
    ));
    assert!(report.placements.is_empty());
    assert_eq!(grid.to_text(), "---\n-.-\n---\n");
  }

  #[test]
  fn no_duplicate_words_by_default() {
    let mut grid = Grid::parse("---\n...\n---").unwrap();
    let corpus = MemoryCorpus::from_iter([("EEL", 10)]);
    let report = Autofill::new(&mut grid, &corpus).run();
    assert_eq!(report.placements.len(), 1);
    assert_eq!(
      report.outcome,
      FillOutcome::Stalled {
        slot: id((2, 0), Across),
        reason: StallReason::NoCandidates
      }
    );

    let mut grid = Grid::parse("---\n...\n---").unwrap();
    let options = FillOptions {
      allow_duplicates: true,
      ..FillOptions::default()
    };
    let report = Autofill::new(&mut grid, &corpus).with_options(options).run();
    assert!(report.outcome.is_completed());
    assert_eq!(grid.to_text(), "EEL\n...\nEEL\n");
  }

  #[test]
  fn corpus_failure_stalls() {
    let mut grid = Grid::new(3);
    let report = Autofill::new(&mut grid, &Broken).run();
    assert_eq!(
      report.outcome,
      FillOutcome::Stalled {
        slot: id((0, 0), Across),
        reason: StallReason::CorpusUnavailable("word list unavailable: disk on fire".to_string())
      }
    );
  }

  #[test]
  fn cancel_flag_stops_before_next_step() {
    let mut grid = Grid::parse("---\n...\n---").unwrap();
    let corpus = MemoryCorpus::from_iter([("EEL", 10), ("EMU", 5)]);
    let cancel = AtomicBool::new(false);
    let mut fill = Autofill::new(&mut grid, &corpus).with_cancel_flag(&cancel);
    fill.step();
    cancel.store(true, Ordering::Relaxed);
    assert_eq!(fill.step(), &FillState::Done(FillOutcome::Cancelled));
    let report = fill.run();
    assert_eq!(report.outcome, FillOutcome::Cancelled);
    assert_eq!(report.placements.len(), 1);
    assert_eq!(grid.to_rows()[0], "EEL");
  }
}
