use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use xword::Crossword;

/// Saved crosswords, kept as a JSON list in a single file.
#[derive(Debug, Clone)]
pub struct CrosswordStore {
  path: PathBuf,
}

impl CrosswordStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// All saved crosswords. A store file that doesn't exist yet is empty.
  pub fn list(&self) -> anyhow::Result<Vec<Crossword>> {
    let text = match std::fs::read_to_string(&self.path) {
      Ok(text) => text,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
      Err(e) => {
        return Err(e).with_context(|| format!("couldn't read {}", self.path.display()));
      }
    };
    serde_json::from_str(&text).with_context(|| format!("couldn't parse {}", self.path.display()))
  }

  /// Saves a crossword, replacing the saved crossword with the same id if there is one.
  pub fn save(&self, crossword: &Crossword) -> anyhow::Result<()> {
    let mut crosswords = self.list()?;
    match crosswords.iter_mut().find(|c| c.id == crossword.id) {
      Some(existing) => *existing = crossword.clone(),
      None => crosswords.push(crossword.clone()),
    }
    self.write(&crosswords)?;
    log::info!("saved {:?} to {}", crossword.title, self.path.display());
    Ok(())
  }

  pub fn find_by_title(&self, title: &str) -> anyhow::Result<Option<Crossword>> {
    Ok(self.list()?.into_iter().find(|c| c.title == title))
  }

  /// Deletes every crossword with the given title. Returns how many were deleted.
  pub fn delete(&self, title: &str) -> anyhow::Result<usize> {
    let mut crosswords = self.list()?;
    let before = crosswords.len();
    crosswords.retain(|c| c.title != title);
    let deleted = before - crosswords.len();
    if deleted > 0 {
      self.write(&crosswords)?;
      log::info!("deleted {deleted} crosswords titled {title:?}");
    }
    Ok(deleted)
  }

  fn write(&self, crosswords: &[Crossword]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(crosswords)?;
    std::fs::write(&self.path, json)
      .with_context(|| format!("couldn't write {}", self.path.display()))
  }
}
