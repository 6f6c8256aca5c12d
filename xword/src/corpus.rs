//! Word lists that can be searched with a [Pattern].

use crate::{Error, Pattern};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// How many suggestions are shown for a slot, and how many candidates autofill
/// considers for each slot it fills.
pub const SUGGESTION_LIMIT: usize = 10;

/// The score given to word list entries that don't specify one.
const DEFAULT_SCORE: i64 = 50;

/// A word from a word list, with the list's score for it (higher is better).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
  pub word: String,
  pub score: i64,
}

impl Candidate {
  pub fn new(word: impl Into<String>, score: i64) -> Self {
    Self {
      word: word.into(),
      score,
    }
  }
}

/// A searchable word list.
///
/// A word matches a pattern if it has exactly as many letters as the pattern has
/// squares, and agrees with every fixed letter of the pattern. Implementations
/// must use the same notion of matching for [query](Corpus::query) and
/// [count](Corpus::count).
pub trait Corpus {
  /// The best matches for `pattern`: at most `limit` words, by descending score.
  /// Words with equal scores come in alphabetical order.
  fn query(&self, pattern: &Pattern, limit: usize) -> Result<Vec<Candidate>, Error>;

  /// The exact number of words matching `pattern`, regardless of any limit.
  fn count(&self, pattern: &Pattern) -> Result<usize, Error>;
}

impl<C: Corpus + ?Sized> Corpus for &C {
  fn query(&self, pattern: &Pattern, limit: usize) -> Result<Vec<Candidate>, Error> {
    (**self).query(pattern, limit)
  }

  fn count(&self, pattern: &Pattern) -> Result<usize, Error> {
    (**self).count(pattern)
  }
}

impl<C: Corpus + ?Sized> Corpus for Box<C> {
  fn query(&self, pattern: &Pattern, limit: usize) -> Result<Vec<Candidate>, Error> {
    (**self).query(pattern, limit)
  }

  fn count(&self, pattern: &Pattern) -> Result<usize, Error> {
    (**self).count(pattern)
  }
}

impl<C: Corpus + ?Sized> Corpus for Arc<C> {
  fn query(&self, pattern: &Pattern, limit: usize) -> Result<Vec<Candidate>, Error> {
    (**self).query(pattern, limit)
  }

  fn count(&self, pattern: &Pattern) -> Result<usize, Error> {
    (**self).count(pattern)
  }
}

/// Normalizes a word list entry: upper-case ASCII letters only. Returns `None` for
/// entries with anything else in them.
pub(crate) fn normalize_word(word: &str) -> Option<String> {
  let word = word.trim();
  if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphabetic()) {
    return None;
  }
  Some(word.to_ascii_uppercase())
}

/// A word list held in memory, grouped by length.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
  /// Each list is kept sorted by descending score, then alphabetically.
  by_length: HashMap<usize, Vec<Candidate>>,
}

impl MemoryCorpus {
  pub fn new() -> Self {
    Self::default()
  }

  /// Parses a word list with one `word;score` entry per line. The score is optional.
  /// Blank lines and lines starting with `#` are skipped, as are entries containing
  /// anything other than letters.
  pub fn parse(text: &str) -> Result<Self, Error> {
    let mut entries = vec![];
    for (i, line) in text.lines().enumerate() {
      let line = line.trim();
      if line.is_empty() || line.starts_with('#') {
        continue;
      }
      let (word, score) = match line.split_once(';') {
        Some((word, score)) => {
          let score = score.trim().parse::<i64>().map_err(|e| {
            Error::Parse(format!("line {}: bad score {score:?}: {e}", i + 1))
          })?;
          (word, score)
        }
        None => (line, DEFAULT_SCORE),
      };
      match normalize_word(word) {
        Some(word) => entries.push((word, score)),
        None => log::debug!("skipping word list entry {word:?} on line {}", i + 1),
      }
    }
    let corpus = Self::build(entries);
    log::info!("loaded {} words", corpus.len());
    Ok(corpus)
  }

  /// Builds the per-length lists in one pass from normalized words. A later entry for
  /// the same word replaces the score of an earlier one.
  fn build(entries: impl IntoIterator<Item = (String, i64)>) -> Self {
    let mut scores: HashMap<usize, HashMap<String, i64>> = HashMap::new();
    for (word, score) in entries {
      scores.entry(word.len()).or_default().insert(word, score);
    }
    let by_length = scores
      .into_iter()
      .map(|(length, words)| {
        let mut list = words
          .into_iter()
          .map(|(word, score)| Candidate::new(word, score))
          .collect::<Vec<_>>();
        list.sort_unstable_by(Self::order);
        (length, list)
      })
      .collect();
    Self { by_length }
  }

  /// Descending score, then alphabetical.
  fn order(a: &Candidate, b: &Candidate) -> Ordering {
    b.score.cmp(&a.score).then_with(|| a.word.cmp(&b.word))
  }

  /// Adds a single word, replacing the score of an existing entry. Returns `false` if
  /// the word was rejected because it contains something other than letters. Use
  /// [MemoryCorpus::parse] or `collect()` to load whole lists.
  pub fn insert(&mut self, word: &str, score: i64) -> bool {
    let Some(word) = normalize_word(word) else {
      return false;
    };
    let list = self.by_length.entry(word.len()).or_default();
    list.retain(|c| c.word != word);
    let candidate = Candidate::new(word, score);
    let index = list
      .binary_search_by(|c| Self::order(c, &candidate))
      .unwrap_or_else(|i| i);
    list.insert(index, candidate);
    true
  }

  /// The total number of words.
  pub fn len(&self) -> usize {
    self.by_length.values().map(Vec::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn matching<'a>(&'a self, pattern: &'a Pattern) -> impl Iterator<Item = &'a Candidate> + 'a {
    self
      .by_length
      .get(&pattern.len())
      .into_iter()
      .flatten()
      .filter(|c| pattern.matches(&c.word))
  }
}

impl<S: AsRef<str>> FromIterator<(S, i64)> for MemoryCorpus {
  fn from_iter<T: IntoIterator<Item = (S, i64)>>(iter: T) -> Self {
    Self::build(
      iter
        .into_iter()
        .filter_map(|(word, score)| Some((normalize_word(word.as_ref())?, score))),
    )
  }
}

impl Corpus for MemoryCorpus {
  fn query(&self, pattern: &Pattern, limit: usize) -> Result<Vec<Candidate>, Error> {
    Ok(self.matching(pattern).take(limit).cloned().collect())
  }

  fn count(&self, pattern: &Pattern) -> Result<usize, Error> {
    Ok(self.matching(pattern).count())
  }
}
