//! Scores a word for a slot by how much room it leaves the slots crossing it.

use crate::{Candidate, Corpus, Error, Grid, Pattern, Slot, Slots};

/// How much freedom placing a word leaves the crossing slots.
///
/// This is a forward-checking measure, not a measure of word quality: a higher
/// score means the crossing slots still have more words to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchScore {
  /// Some crossing slot would have no words left. Sorts below every `Open` score.
  Vetoed,
  /// The total number of words left across all crossing slots.
  Open(u64),
}

impl MatchScore {
  /// The score as a number, with a veto counting as zero.
  pub fn value(self) -> u64 {
    match self {
      Self::Vetoed => 0,
      Self::Open(n) => n,
    }
  }

  pub fn is_vetoed(self) -> bool {
    self == Self::Vetoed
  }
}

/// A word list entry together with how well it fits its slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredCandidate {
  pub candidate: Candidate,
  pub match_score: MatchScore,
}

/// Scores `word` as the fill for `slot`: for each crossing slot, counts the words
/// that would still fit it once `word`'s letter is in the shared square.
///
/// A slot with no crossings scores `Open(0)`.
pub fn score<C: Corpus + ?Sized>(
  word: &str,
  slot: &Slot,
  grid: &Grid,
  slots: &Slots,
  corpus: &C,
) -> Result<MatchScore, Error> {
  let letters = word.chars().collect::<Vec<_>>();
  if letters.len() != slot.length {
    return Ok(MatchScore::Vetoed);
  }

  let mut total = 0;
  for crossing in slots.crossings(slot) {
    let pattern =
      Pattern::extract(grid, crossing.slot).with_letter(crossing.other_at, letters[crossing.at]);
    let count = corpus.count(&pattern)?;
    if count == 0 {
      log::trace!("{word} vetoed at {}: nothing fits {pattern}", crossing.slot);
      return Ok(MatchScore::Vetoed);
    }
    total += count as u64;
  }
  Ok(MatchScore::Open(total))
}

/// Scores every candidate for `slot`, keeping their order.
pub fn rank<C: Corpus + ?Sized>(
  candidates: Vec<Candidate>,
  slot: &Slot,
  grid: &Grid,
  slots: &Slots,
  corpus: &C,
) -> Result<Vec<ScoredCandidate>, Error> {
  candidates
    .into_iter()
    .map(|candidate| {
      let match_score = score(&candidate.word, slot, grid, slots, corpus)?;
      Ok(ScoredCandidate {
        candidate,
        match_score,
      })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Direction::{Across, Down};
  use crate::MemoryCorpus;

  // A 3x3 grid with a black center: four slots around the edge.
  fn ring() -> (Grid, Slots) {
    let grid = Grid::parse("---\n-.-\n---").unwrap();
    let slots = Slots::derive(&grid);
    (grid, slots)
  }

  #[test]
  fn sums_crossing_counts() {
    let (grid, slots) = ring();
    let corpus = MemoryCorpus::from_iter([("CAT", 1), ("COT", 1), ("TOE", 1), ("TEA", 1), ("CUB", 1)]);
    let top = slots.containing((0, 0), Across).unwrap();

    // Left column would be C**: CAT, COT, CUB. Right column would be T**: TOE, TEA.
    assert_eq!(score("CAT", top, &grid, &slots, &corpus).unwrap(), MatchScore::Open(5));
    // Right column would be B**: nothing.
    assert_eq!(score("CUB", top, &grid, &slots, &corpus).unwrap(), MatchScore::Vetoed);
  }

  #[test]
  fn existing_letters_constrain_crossings() {
    let (mut grid, slots) = ring();
    grid.set((2, 0), crate::Square::Letter('B'));
    let corpus = MemoryCorpus::from_iter([("CAB", 1), ("CUB", 1), ("COT", 1), ("TOE", 1)]);
    let top = slots.containing((0, 0), Across).unwrap();

    // Left column would be C*B: CAB, CUB. Right column T**: TOE.
    assert_eq!(score("COT", top, &grid, &slots, &corpus).unwrap(), MatchScore::Open(3));
  }

  #[test]
  fn no_crossings_is_open() {
    let grid = Grid::parse("---\n...\n...").unwrap();
    let slots = Slots::derive(&grid);
    let slot = slots.containing((0, 1), Across).unwrap();
    let corpus = MemoryCorpus::from_iter([("ABC", 1)]);
    assert_eq!(score("ABC", slot, &grid, &slots, &corpus).unwrap(), MatchScore::Open(0));
    assert_eq!(score("ABCD", slot, &grid, &slots, &corpus).unwrap(), MatchScore::Vetoed);
  }

  #[test]
  fn veto_sorts_lowest() {
    assert!(MatchScore::Vetoed < MatchScore::Open(0));
    assert!(MatchScore::Open(2) < MatchScore::Open(3));
    assert_eq!(MatchScore::Vetoed.value(), 0);
  }

  #[test]
  fn rank_keeps_order() {
    let (grid, slots) = ring();
    let corpus = MemoryCorpus::from_iter([("CAT", 9), ("TOE", 5), ("CUB", 7)]);
    let left = slots.containing((1, 0), Down).unwrap();
    let candidates = corpus.query(&Pattern::blank(3), 10).unwrap();
    let ranked = rank(candidates, left, &grid, &slots, &corpus).unwrap();
    let summary = ranked
      .iter()
      .map(|s| (s.candidate.word.as_str(), s.match_score))
      .collect::<Vec<_>>();
    // Top row would start with the first letter, bottom row with the last.
    assert_eq!(
      summary,
      vec![
        ("CAT", MatchScore::Open(3)),
        ("CUB", MatchScore::Vetoed),
        ("TOE", MatchScore::Vetoed)
      ]
    );
  }
}
