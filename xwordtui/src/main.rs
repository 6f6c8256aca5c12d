use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail, ensure};
use clap::{Parser, Subcommand};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use xword::{
  Autofill, Corpus, Editor, FillOptions, FillReport, Grid, Pattern,
  SUGGESTION_LIMIT, Slots,
};

mod app;
mod log;
mod store;
mod words;

use app::{App, describe_fill};
use crate::log::{LogTarget, init_logger};
use store::CrosswordStore;
use words::WordSource;

/// Construct crossword puzzles in your terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
  /// Word list: a SQLite database (.db or .sqlite) or a text file of `word;score` lines
  #[arg(long, global = true, default_value = "words.db")]
  words: PathBuf,

  /// Where saved crosswords are kept
  #[arg(long, global = true, default_value = "crosswords.json")]
  store: PathBuf,

  /// Write log output to this file (the editor logs nothing otherwise)
  #[arg(long, global = true)]
  log_file: Option<PathBuf>,

  /// Log debug output
  #[arg(long, global = true)]
  debug: bool,

  #[command(subcommand)]
  command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
  /// Edit a crossword in the terminal (the default)
  Edit {
    /// Number of rows and columns of a new grid
    #[arg(long, default_value_t = 15)]
    size: usize,
    /// Open the saved crossword with this title
    #[arg(long)]
    open: Option<String>,
  },
  /// Autofill a grid read from a text file and print the result
  Fill {
    /// One row per line: `.` or `#` for black squares, `-` for empty ones, letters
    grid: PathBuf,
    /// How many words to consider for each slot
    #[arg(long, default_value_t = SUGGESTION_LIMIT)]
    limit: usize,
    /// Allow the same word to be used more than once
    #[arg(long)]
    allow_duplicates: bool,
  },
  /// List the words matching a pattern such as `C*T`
  Suggest {
    pattern: String,
    #[arg(long, default_value_t = SUGGESTION_LIMIT)]
    limit: usize,
  },
  /// List saved crosswords
  List,
  /// Delete a saved crossword
  Delete { title: String },
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  match try_main(cli) {
    Ok(code) => code,
    Err(e) => {
      eprintln!("Error: {e:#}");
      ExitCode::FAILURE
    }
  }
}

fn try_main(cli: Cli) -> anyhow::Result<ExitCode> {
  let command = cli.command.unwrap_or(Cmd::Edit {
    size: 15,
    open: None,
  });

  let target = match (&cli.log_file, &command) {
    (Some(path), _) => LogTarget::File(path),
    (None, Cmd::Edit { .. }) => LogTarget::Off,
    (None, _) => LogTarget::Stderr,
  };
  init_logger(cli.debug, target)?;

  let store = CrosswordStore::new(&cli.store);
  match command {
    Cmd::Edit { size, open } => edit(&cli.words, store, size, open)?,
    Cmd::Fill {
      grid,
      limit,
      allow_duplicates,
    } => {
      let options = FillOptions {
        candidate_limit: limit,
        allow_duplicates,
      };
      let report = fill(&cli.words, &grid, options)?;
      if !report.outcome.is_completed() {
        return Ok(ExitCode::from(2));
      }
    }
    Cmd::Suggest { pattern, limit } => suggest(&cli.words, &pattern, limit)?,
    Cmd::List => {
      for crossword in store.list()? {
        println!(
          "{}  ({}x{})",
          crossword.title, crossword.grid_size, crossword.grid_size
        );
      }
    }
    Cmd::Delete { title } => {
      if store.delete(&title)? == 0 {
        bail!("no crossword titled {title:?} in {}", store.path().display());
      }
    }
  }
  Ok(ExitCode::SUCCESS)
}

fn edit(words: &Path, store: CrosswordStore, size: usize, open: Option<String>) -> anyhow::Result<()> {
  let (editor, record) = match open {
    Some(title) => {
      let record = store
        .find_by_title(&title)?
        .with_context(|| format!("no crossword titled {title:?} in {}", store.path().display()))?;
      (record.to_editor()?, Some(record))
    }
    None => {
      ensure!(size >= 1, "a grid needs at least one square");
      (Editor::new(size), None)
    }
  };

  // The editor still works without a word list, just without suggestions or autofill.
  let words = WordSource::load(words)
    .inspect_err(|e| ::log::warn!("{e:#}"))
    .ok();
  let app = App::new(editor, record, store, words);

  let terminal = ratatui::init();
  execute!(io::stdout(), EnableMouseCapture)?;
  let result = app.run(terminal);
  execute!(io::stdout(), DisableMouseCapture)?;
  ratatui::restore();
  Ok(result?)
}

fn open_words(path: &Path) -> anyhow::Result<Box<dyn Corpus + Send>> {
  let source = WordSource::load(path)?;
  Ok(source.open()?)
}

/// Fills the grid in `grid_path` and prints it along with the words placed.
fn fill(words: &Path, grid_path: &Path, options: FillOptions) -> anyhow::Result<FillReport> {
  let text = std::fs::read_to_string(grid_path)
    .with_context(|| format!("couldn't read {}", grid_path.display()))?;
  let mut grid = Grid::parse(&text)?;
  let corpus = open_words(words)?;

  let report = Autofill::new(&mut grid, &corpus).with_options(options).run();
  let slots = Slots::derive(&grid);
  print!("{}", grid.to_text());
  for placement in &report.placements {
    let name = slots
      .get(placement.slot)
      .map_or_else(|| format!("{:?}", placement.slot), |s| s.to_string());
    println!("{name}: {} ({:?})", placement.word, placement.match_score);
  }
  eprintln!("{}", describe_fill(&report, &slots));
  Ok(report)
}

fn suggest(words: &Path, pattern: &str, limit: usize) -> anyhow::Result<()> {
  let pattern: Pattern = pattern.parse()?;
  let corpus = open_words(words)?;
  let total = corpus.count(&pattern)?;
  for candidate in corpus.query(&pattern, limit)? {
    println!("{:<20} {:>5}", candidate.word, candidate.score);
  }
  eprintln!("{total} words match {pattern}");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use xword::{Crossword, FillOutcome};

  #[test]
  fn cli_parses() {
    Cli::try_parse_from(["xwordtui", "fill", "grid.txt", "--limit", "3", "--words", "w.txt"])
      .unwrap();
    let cli = Cli::try_parse_from(["xwordtui", "--debug"]).unwrap();
    assert!(cli.debug);
    assert!(cli.command.is_none());
    assert!(Cli::try_parse_from(["xwordtui", "suggest"]).is_err());
  }

  #[test]
  fn headless_fill() {
    let dir = tempfile::tempdir().unwrap();
    let words = dir.path().join("words.txt");
    std::fs::write(&words, "at;90\nto;80\nan;70\nno;60\n").unwrap();
    let grid = dir.path().join("grid.txt");
    std::fs::write(&grid, "--\n--\n").unwrap();

    let report = fill(&words, &grid, FillOptions::default()).unwrap();
    assert_eq!(report.outcome, FillOutcome::Completed);
    assert_eq!(report.placements.len(), 3);

    // There are no three-letter words.
    std::fs::write(&grid, "---\n---\n---\n").unwrap();
    let report = fill(&words, &grid, FillOptions::default()).unwrap();
    assert!(matches!(report.outcome, FillOutcome::Stalled { .. }));

    assert!(fill(&dir.path().join("missing.db"), &grid, FillOptions::default()).is_err());
  }

  #[test]
  fn saved_crossword_opens_by_title() {
    let dir = tempfile::tempdir().unwrap();
    let store = CrosswordStore::new(dir.path().join("crosswords.json"));
    store.save(&Crossword::new("Saved", &Editor::new(4))).unwrap();
    let found = store.find_by_title("Saved").unwrap().unwrap();
    assert_eq!(found.to_editor().unwrap().grid().size(), 4);
  }
}
