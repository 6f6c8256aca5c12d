use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use xword::{Corpus, MemoryCorpus, SqliteCorpus};

/// Where words come from. A SQLite word list is opened separately by each user of
/// it (the suggestion list and each autofill run), while a text word list is read
/// into memory once and shared.
#[derive(Debug, Clone)]
pub enum WordSource {
  Sqlite(PathBuf),
  Memory(Arc<MemoryCorpus>),
}

impl WordSource {
  /// Files ending in `.db` or `.sqlite` are SQLite word lists; anything else is read
  /// as a text list of `word;score` lines.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let is_sqlite = path
      .extension()
      .and_then(|e| e.to_str())
      .is_some_and(|e| e.eq_ignore_ascii_case("db") || e.eq_ignore_ascii_case("sqlite"));
    if is_sqlite {
      return Ok(Self::Sqlite(path.to_path_buf()));
    }

    let text = std::fs::read_to_string(path)
      .with_context(|| format!("couldn't read word list {}", path.display()))?;
    let corpus = MemoryCorpus::parse(&text)
      .with_context(|| format!("couldn't parse word list {}", path.display()))?;
    Ok(Self::Memory(Arc::new(corpus)))
  }

  /// Opens the word list for querying.
  pub fn open(&self) -> Result<Box<dyn Corpus + Send>, xword::Error> {
    match self {
      Self::Sqlite(path) => Ok(Box::new(SqliteCorpus::open(path)?)),
      Self::Memory(corpus) => Ok(Box::new(Arc::clone(corpus))),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use xword::Pattern;

  #[test]
  fn text_word_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("words.txt");
    std::fs::write(&path, "cat;90\ncot;20\n").unwrap();

    let source = WordSource::load(&path).unwrap();
    assert!(matches!(source, WordSource::Memory(_)));
    let corpus = source.open().unwrap();
    assert_eq!(corpus.count(&"C*T".parse::<Pattern>().unwrap()).unwrap(), 2);
  }

  #[test]
  fn sqlite_word_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("words.db");
    let source = WordSource::load(&path).unwrap();
    assert!(matches!(source, WordSource::Sqlite(_)));
    // Nothing is opened until it is needed.
    assert!(matches!(
      source.open(),
      Err(xword::Error::CorpusUnavailable(_))
    ));

    SqliteCorpus::create(&path)
      .unwrap()
      .insert_words([("EMU", 10)])
      .unwrap();
    let corpus = source.open().unwrap();
    assert_eq!(corpus.query(&Pattern::blank(3), 10).unwrap()[0].word, "EMU");
  }

  #[test]
  fn missing_text_word_list() {
    assert!(WordSource::load(Path::new("/nonexistent/words.txt")).is_err());
  }
}
