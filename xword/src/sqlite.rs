//! SQLite-backed word list.
//!
//! The database has one table per word length, named `word{N}`:
//!
//! ```sql
//! CREATE TABLE word3 (word TEXT, score INTEGER, char1 TEXT, char2 TEXT, char3 TEXT);
//! ```
//!
//! The `charK` columns hold the individual letters so that a pattern becomes a
//! plain equality filter on the fixed positions.

use crate::corpus::normalize_word;
use crate::{Candidate, Corpus, Error, Pattern};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params_from_iter};
use std::path::Path;

/// A word list stored in SQLite.
///
/// The connection is held for as long as this value lives and closed when it is
/// dropped, so open one for the duration of a fill run rather than per query.
pub struct SqliteCorpus {
  conn: Connection,
}

impl SqliteCorpus {
  /// Opens an existing word list database, read-only.
  pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
    let path = path.as_ref();
    let conn = Connection::open_with_flags(
      path,
      OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| Error::CorpusUnavailable(format!("{}: {e}", path.display())))?;
    log::info!("opened word list database {}", path.display());
    Ok(Self { conn })
  }

  /// Opens (or creates) a word list database for writing, e.g. to import words.
  pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
    let conn = Connection::open(path)?;
    Ok(Self { conn })
  }

  /// Create an in-memory database (for testing).
  pub fn in_memory() -> Result<Self, Error> {
    let conn = Connection::open_in_memory()?;
    Ok(Self { conn })
  }

  fn table_name(length: usize) -> String {
    format!("word{length}")
  }

  fn has_table(&self, length: usize) -> Result<bool, Error> {
    let found = self
      .conn
      .query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [Self::table_name(length)],
        |_| Ok(()),
      )
      .optional()?;
    Ok(found.is_some())
  }

  fn create_table(&self, length: usize) -> Result<(), Error> {
    let chars = (1..=length)
      .map(|i| format!(", char{i} TEXT"))
      .collect::<String>();
    self.conn.execute_batch(&format!(
      "CREATE TABLE IF NOT EXISTS {table} (word TEXT PRIMARY KEY, score INTEGER NOT NULL{chars});
       CREATE INDEX IF NOT EXISTS idx_{table}_score ON {table}(score DESC, word);",
      table = Self::table_name(length)
    ))?;
    Ok(())
  }

  /// Adds words to the database, creating tables as needed and replacing the scores
  /// of words that are already present. Entries that aren't purely letters are
  /// skipped. Returns how many words were written.
  pub fn insert_words<S: AsRef<str>>(
    &mut self,
    words: impl IntoIterator<Item = (S, i64)>,
  ) -> Result<usize, Error> {
    let mut by_length: Vec<Vec<(String, i64)>> = vec![];
    for (word, score) in words {
      let Some(word) = normalize_word(word.as_ref()) else {
        log::debug!("skipping word list entry {:?}", word.as_ref());
        continue;
      };
      if by_length.len() <= word.len() {
        by_length.resize_with(word.len() + 1, Vec::new);
      }
      by_length[word.len()].push((word, score));
    }

    let mut written = 0;
    for (length, words) in by_length.iter().enumerate() {
      if words.is_empty() {
        continue;
      }
      self.create_table(length)?;
      let placeholders = (1..=length + 2)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
      let sql = format!(
        "INSERT OR REPLACE INTO {} VALUES ({placeholders})",
        Self::table_name(length)
      );

      let tx = self.conn.transaction()?;
      {
        let mut stmt = tx.prepare(&sql)?;
        for (word, score) in words {
          let mut values: Vec<rusqlite::types::Value> = vec![word.clone().into(), (*score).into()];
          values.extend(word.chars().map(|c| c.to_string().into()));
          stmt.execute(params_from_iter(values))?;
          written += 1;
        }
      }
      tx.commit()?;
    }

    log::info!("wrote {written} words to the word list database");
    Ok(written)
  }

  /// The `WHERE` clause for a pattern and the letters to bind to it.
  fn filter(pattern: &Pattern) -> (String, Vec<String>) {
    let (conditions, letters): (Vec<_>, Vec<_>) = pattern
      .fixed()
      .enumerate()
      .map(|(param, (index, letter))| {
        (
          format!("char{} = ?{}", index + 1, param + 1),
          letter.to_string(),
        )
      })
      .unzip();
    if conditions.is_empty() {
      ("1=1".to_string(), letters)
    } else {
      (conditions.join(" AND "), letters)
    }
  }
}

impl Corpus for SqliteCorpus {
  fn query(&self, pattern: &Pattern, limit: usize) -> Result<Vec<Candidate>, Error> {
    if pattern.is_empty() || limit == 0 || !self.has_table(pattern.len())? {
      return Ok(vec![]);
    }

    let (filter, letters) = Self::filter(pattern);
    let sql = format!(
      "SELECT word, score FROM {} WHERE {filter} ORDER BY score DESC, word ASC LIMIT {limit}",
      Self::table_name(pattern.len())
    );
    let mut stmt = self.conn.prepare_cached(&sql)?;
    let candidates = stmt
      .query_map(params_from_iter(letters), |row| {
        Ok(Candidate {
          word: row.get(0)?,
          score: row.get(1)?,
        })
      })?
      .collect::<Result<Vec<_>, _>>()?;

    log::debug!("query {pattern}: {} candidates", candidates.len());
    Ok(candidates)
  }

  fn count(&self, pattern: &Pattern) -> Result<usize, Error> {
    if pattern.is_empty() || !self.has_table(pattern.len())? {
      return Ok(0);
    }

    let (filter, letters) = Self::filter(pattern);
    let sql = format!(
      "SELECT COUNT(*) FROM {} WHERE {filter}",
      Self::table_name(pattern.len())
    );
    let mut stmt = self.conn.prepare_cached(&sql)?;
    let count: i64 = stmt.query_row(params_from_iter(letters), |row| row.get(0))?;
    Ok(count as usize)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn corpus() -> SqliteCorpus {
    let mut corpus = SqliteCorpus::in_memory().unwrap();
    let written = corpus
      .insert_words([
        ("CAT", 90),
        ("COT", 70),
        ("cut", 85),
        ("DOG", 60),
        ("ACT", 85),
        ("CART", 40),
        ("A-1", 10),
      ])
      .unwrap();
    assert_eq!(written, 6);
    corpus
  }

  fn pattern(s: &str) -> Pattern {
    s.parse().unwrap()
  }

  #[test]
  fn query_orders_by_score() {
    let corpus = corpus();
    assert_eq!(
      corpus.query(&pattern("C*T"), 10).unwrap(),
      vec![
        Candidate::new("CAT", 90),
        Candidate::new("CUT", 85),
        Candidate::new("COT", 70)
      ]
    );
  }

  #[test]
  fn blank_pattern_and_ties() {
    let corpus = corpus();
    let words = corpus
      .query(&Pattern::blank(3), 10)
      .unwrap()
      .into_iter()
      .map(|c| c.word)
      .collect::<Vec<_>>();
    assert_eq!(words, vec!["CAT", "ACT", "CUT", "COT", "DOG"]);
    assert_eq!(corpus.query(&Pattern::blank(3), 2).unwrap().len(), 2);
    assert_eq!(corpus.count(&Pattern::blank(3)).unwrap(), 5);
  }

  #[test]
  fn count_matches_query() {
    let corpus = corpus();
    for p in ["C*T", "***", "*O*", "X**", "CA*T", "CART"] {
      let p = pattern(p);
      let count = corpus.count(&p).unwrap();
      let found = corpus.query(&p, 100).unwrap();
      assert_eq!(count, found.len(), "{p}");
      assert!(found.iter().all(|c| p.matches(&c.word)));
    }
  }

  #[test]
  fn missing_length_is_empty() {
    let corpus = corpus();
    assert_eq!(corpus.count(&Pattern::blank(7)).unwrap(), 0);
    assert!(corpus.query(&Pattern::blank(7), 10).unwrap().is_empty());
  }

  #[test]
  fn reinserting_replaces_score() {
    let mut corpus = corpus();
    corpus.insert_words([("DOG", 95)]).unwrap();
    assert_eq!(corpus.query(&pattern("D**"), 10).unwrap(), vec![Candidate::new("DOG", 95)]);
    assert_eq!(corpus.count(&pattern("D**")).unwrap(), 1);
  }

  #[test]
  fn open_missing_file_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let result = SqliteCorpus::open(dir.path().join("nope.db"));
    assert!(matches!(result, Err(Error::CorpusUnavailable(_))));
  }

  #[test]
  fn open_read_only_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("words.db");
    SqliteCorpus::create(&path)
      .unwrap()
      .insert_words([("EMU", 30), ("ELK", 40)])
      .unwrap();

    let corpus = SqliteCorpus::open(&path).unwrap();
    assert_eq!(corpus.count(&pattern("E**")).unwrap(), 2);
    assert_eq!(corpus.query(&pattern("E**"), 1).unwrap()[0].word, "ELK");
  }
}
