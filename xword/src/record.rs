use crate::{ClueMap, Editor, Error, Grid};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved crossword: what gets written to disk, and read back to keep editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crossword {
  pub id: Uuid,
  pub title: String,
  pub grid_size: usize,
  /// One string per row, in the text format of [Grid::parse].
  pub grid: Vec<String>,
  #[serde(default)]
  pub clues: ClueMap,
}

impl Crossword {
  /// A new record, with a fresh id, holding the editor's current grid and clues.
  pub fn new(title: impl Into<String>, editor: &Editor) -> Self {
    let mut crossword = Self {
      id: Uuid::new_v4(),
      title: title.into(),
      grid_size: 0,
      grid: vec![],
      clues: ClueMap::new(),
    };
    crossword.update_from(editor);
    crossword
  }

  /// Replaces the grid and clues with the editor's, keeping the id and title.
  pub fn update_from(&mut self, editor: &Editor) {
    self.grid_size = editor.grid().size();
    self.grid = editor.grid().to_rows();
    self.clues = editor.clues().clone();
  }

  /// An editor for this crossword.
  pub fn to_editor(&self) -> Result<Editor, Error> {
    let grid = Grid::from_rows(&self.grid)?;
    if grid.size() != self.grid_size {
      return Err(Error::Parse(format!(
        "crossword {:?} should be {}x{} but its grid is {}x{}",
        self.title,
        self.grid_size,
        self.grid_size,
        grid.size(),
        grid.size()
      )));
    }
    Ok(Editor::with_clues(grid, self.clues.clone()))
  }
}
