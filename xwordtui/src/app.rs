use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use crossterm::event::{
  self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
  MouseEventKind,
};
use ratatui::{
  DefaultTerminal, Frame,
  buffer::Buffer,
  layout::{Constraint, Flex, Layout, Rect},
  style::{Color, Modifier, Style, Stylize},
  text::Line,
  widgets::{Block, Padding, Paragraph, Widget, Wrap},
};
use ratatui_macros::{horizontal, line, vertical};
use xword::Direction::{Across, Down};
use xword::{
  Command, Corpus, Crossword, Editor, FillOptions, FillOutcome, FillReport, Pos,
  SUGGESTION_LIMIT, ScoredCandidate, Slots, Square, SquareStyle,
};

use crate::store::CrosswordStore;
use crate::words::WordSource;

const SQUARE_WIDTH: u16 = 4;
const SQUARE_HEIGHT: u16 = 2;
const SIDE_WIDTH: u16 = 46;

fn style_for(style: SquareStyle) -> Style {
  let base_style = match style {
    SquareStyle::Black => return Style::new().bg(Color::Black),
    SquareStyle::Standard => Style::new().bg(Color::White),
    SquareStyle::Cursor => Style::new().bg(Color::LightRed),
    SquareStyle::Word => Style::new().bg(Color::LightYellow),
  };
  base_style.fg(Color::Black).add_modifier(Modifier::BOLD)
}

/// Sums up how an autofill run went.
pub fn describe_fill(report: &FillReport, slots: &Slots) -> String {
  let placed = report.placements.len();
  match &report.outcome {
    FillOutcome::Completed => format!("autofill placed {placed} words and completed the grid"),
    FillOutcome::Stalled { slot, reason } => {
      let name = slots
        .get(*slot)
        .map_or_else(|| format!("{slot:?}"), |s| s.to_string());
      format!("autofill placed {placed} words, then got stuck at {name}: {reason}")
    }
    FillOutcome::Cancelled => format!("autofill cancelled after placing {placed} words"),
  }
}

/// What keystrokes currently go to.
#[derive(Debug, PartialEq, Eq)]
enum Mode {
  Grid,
  /// Typing the clue for the active slot.
  Clue(String),
  /// Typing a title before the first save.
  Title(String),
}

/// An autofill run on a background thread, working on a copy of the editor.
struct FillJob {
  cancel: Arc<AtomicBool>,
  results: Receiver<Result<(Editor, FillReport), xword::Error>>,
}

pub struct App {
  editor: Editor,
  record: Option<Crossword>,
  store: CrosswordStore,
  words: Option<WordSource>,
  corpus: Option<Box<dyn Corpus + Send>>,
  suggestions: Vec<ScoredCandidate>,
  mode: Mode,
  fill: Option<FillJob>,
  status: String,
  /// The screen area as of the last draw, for mapping mouse clicks to squares.
  area: Rect,
  running: bool,
}

impl App {
  pub fn new(
    editor: Editor,
    record: Option<Crossword>,
    store: CrosswordStore,
    words: Option<WordSource>,
  ) -> Self {
    let mut status = String::new();
    let corpus = match words.as_ref().map(WordSource::open) {
      Some(Ok(corpus)) => Some(corpus),
      Some(Err(e)) => {
        log::warn!("{e}");
        status = format!("suggestions unavailable: {e}");
        None
      }
      None => {
        status = "no word list loaded".to_string();
        None
      }
    };

    let mut app = Self {
      editor,
      record,
      store,
      words,
      corpus,
      suggestions: vec![],
      mode: Mode::Grid,
      fill: None,
      status,
      area: Rect::default(),
      running: true,
    };
    app.refresh_suggestions();
    app
  }

  pub fn run(mut self, mut terminal: DefaultTerminal) -> io::Result<()> {
    self.running = true;
    while self.running {
      terminal.draw(|frame| self.draw(frame))?;
      if event::poll(Duration::from_millis(100))? {
        self.handle_crossterm_events()?;
      }
      self.check_fill();
    }
    Ok(())
  }

  fn draw(&mut self, frame: &mut Frame) {
    self.area = frame.area();
    frame.render_widget(&*self, frame.area());
  }

  /// Reads the crossterm events and updates the state of [`App`].
  fn handle_crossterm_events(&mut self) -> io::Result<()> {
    match event::read()? {
      // it's important to check KeyEventKind::Press to avoid handling key release events
      Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
      Event::Mouse(mouse) => self.on_mouse_event(mouse),
      _ => {}
    }
    Ok(())
  }

  /// Handles the key events and updates the state of [`App`].
  fn on_key_event(&mut self, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL)
      && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
      self.quit();
      return;
    }
    match self.mode {
      Mode::Grid => self.on_grid_key(key),
      Mode::Clue(_) | Mode::Title(_) => self.on_text_key(key),
    }
  }

  fn on_grid_key(&mut self, key: KeyEvent) {
    if let Some(job) = &self.fill {
      // The grid is locked while autofill runs.
      if key.code == KeyCode::Esc {
        job.cancel.store(true, Ordering::Relaxed);
        self.status = "cancelling autofill".to_string();
      }
      return;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let command = match key.code {
      KeyCode::Char('b') if ctrl => Some(Command::ToggleBlockMode),
      KeyCode::Char('f') if ctrl => {
        self.start_fill();
        None
      }
      KeyCode::Char('s') if ctrl => {
        self.save();
        None
      }
      KeyCode::Char('l') if ctrl => {
        self.edit_clue();
        None
      }
      KeyCode::Char('k') if ctrl => {
        self.editor.clear_letters();
        self.status = "cleared all letters".to_string();
        self.refresh_suggestions();
        None
      }
      KeyCode::Char(c) if c.is_ascii_digit() => {
        self.place_suggestion(c);
        None
      }
      KeyCode::Char(' ') | KeyCode::Enter => Some(Command::ToggleDirection),
      KeyCode::Char(c) if !ctrl => Some(Command::Letter(c)),
      KeyCode::Backspace => Some(Command::Backspace),
      KeyCode::Tab => Some(Command::NextSlot),
      KeyCode::BackTab => Some(Command::PreviousSlot),
      KeyCode::Left => Some(Command::Nudge {
        direction: Across,
        forward: false,
      }),
      KeyCode::Right => Some(Command::Nudge {
        direction: Across,
        forward: true,
      }),
      KeyCode::Up => Some(Command::Nudge {
        direction: Down,
        forward: false,
      }),
      KeyCode::Down => Some(Command::Nudge {
        direction: Down,
        forward: true,
      }),
      KeyCode::Esc => {
        self.quit();
        None
      }
      _ => None,
    };

    if let Some(command) = command {
      self.apply(command);
    }
  }

  fn on_text_key(&mut self, key: KeyEvent) {
    let (Mode::Clue(text) | Mode::Title(text)) = &mut self.mode else {
      return;
    };
    match key.code {
      KeyCode::Char(c) => text.push(c),
      KeyCode::Backspace => {
        text.pop();
      }
      KeyCode::Esc => self.mode = Mode::Grid,
      KeyCode::Enter => {
        let mode = std::mem::replace(&mut self.mode, Mode::Grid);
        self.finish_text(mode);
      }
      _ => {}
    }
  }

  fn finish_text(&mut self, mode: Mode) {
    match mode {
      Mode::Clue(text) => {
        if let Err(e) = self.editor.set_clue(&text) {
          self.status = e.to_string();
        }
      }
      Mode::Title(title) => {
        let title = title.trim();
        if title.is_empty() {
          self.status = "a crossword needs a title to be saved".to_string();
          return;
        }
        let record = Crossword::new(title, &self.editor);
        let result = self.store.save(&record);
        self.record = Some(record);
        self.report_save(result);
      }
      Mode::Grid => {}
    }
  }

  fn on_mouse_event(&mut self, mouse: MouseEvent) {
    if self.mode != Mode::Grid || self.fill.is_some() {
      return;
    }
    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
      let Some(pos) = self.square_at(mouse.column, mouse.row) else {
        return;
      };
      let command = if self.editor.cursor().is_block_mode() {
        Command::ToggleBlock(pos)
      } else {
        Command::Select(pos)
      };
      self.apply(command);
    }
  }

  fn apply(&mut self, command: Command) {
    match self.editor.apply(command) {
      Ok(_) => self.refresh_suggestions(),
      Err(e) => {
        log::warn!("{command:?} failed: {e}");
        self.status = e.to_string();
      }
    }
  }

  fn refresh_suggestions(&mut self) {
    let Some(corpus) = &self.corpus else {
      self.suggestions.clear();
      return;
    };
    match self.editor.suggestions(corpus, SUGGESTION_LIMIT) {
      Ok(suggestions) => self.suggestions = suggestions,
      Err(e) => {
        log::warn!("couldn't get suggestions: {e}");
        self.suggestions.clear();
        self.status = format!("suggestions unavailable: {e}");
      }
    }
  }

  /// Places the suggestion shown next to `digit`: `1` for the first, `0` for the tenth.
  fn place_suggestion(&mut self, digit: char) {
    let Some(index) = digit.to_digit(10).map(|d| (d as usize + 9) % 10) else {
      return;
    };
    let Some(word) = self.suggestions.get(index).map(|s| s.candidate.word.clone()) else {
      return;
    };
    match self.editor.place_word(&word) {
      Ok(true) => {
        self.status = format!("placed {word}");
        self.refresh_suggestions();
      }
      Ok(false) => self.status = format!("{word} doesn't fit"),
      Err(e) => self.status = e.to_string(),
    }
  }

  fn start_fill(&mut self) {
    let Some(words) = self.words.clone() else {
      self.status = "no word list loaded".to_string();
      return;
    };
    let mut editor = self.editor.clone();
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    let (sender, results) = mpsc::channel();

    thread::spawn(move || {
      // Each run opens the word list for itself and closes it when done.
      let result = words.open().map(|corpus| {
        let report = editor.autofill(&corpus, FillOptions::default(), Some(&*flag));
        (editor, report)
      });
      // Nobody is listening if the app quit in the meantime.
      let _ = sender.send(result);
    });

    self.fill = Some(FillJob { cancel, results });
    self.status = "autofill running (Esc to cancel)".to_string();
  }

  /// Picks up the result of a finished autofill run, if there is one.
  fn check_fill(&mut self) {
    let Some(job) = &self.fill else {
      return;
    };
    let result = match job.results.try_recv() {
      Ok(result) => result,
      Err(TryRecvError::Empty) => return,
      Err(TryRecvError::Disconnected) => {
        self.fill = None;
        self.status = "autofill stopped unexpectedly".to_string();
        return;
      }
    };

    self.fill = None;
    match result {
      Ok((editor, report)) => {
        self.status = describe_fill(&report, editor.slots());
        self.editor = editor;
      }
      Err(e) => {
        log::warn!("autofill couldn't start: {e}");
        self.status = format!("autofill unavailable: {e}");
      }
    }
    self.refresh_suggestions();
  }

  fn save(&mut self) {
    match &mut self.record {
      Some(record) => {
        record.update_from(&self.editor);
        let result = self.store.save(record);
        self.report_save(result);
      }
      None => self.mode = Mode::Title(String::new()),
    }
  }

  fn report_save(&mut self, result: anyhow::Result<()>) {
    self.status = match result {
      Ok(()) => format!("saved {:?}", self.title()),
      Err(e) => {
        log::warn!("{e:#}");
        format!("couldn't save: {e:#}")
      }
    };
  }

  fn edit_clue(&mut self) {
    if self.editor.active_slot().is_none() {
      self.status = "select a slot to edit its clue".to_string();
      return;
    }
    let text = self.editor.current_clue().unwrap_or_default().to_string();
    self.mode = Mode::Clue(text);
  }

  /// Set running to false to quit the application.
  fn quit(&mut self) {
    if let Some(job) = &self.fill {
      job.cancel.store(true, Ordering::Relaxed);
    }
    self.running = false;
  }

  fn title(&self) -> &str {
    self.record.as_ref().map_or("Untitled", |r| r.title.as_str())
  }

  /// Splits the screen into the title, the grid and the side panel.
  fn layout(&self, area: Rect) -> (Rect, Rect, Rect) {
    let [title_area, main_area] = vertical![==2, *=1].areas(area);
    let [grid_area, side_area] = horizontal![*=1, ==SIDE_WIDTH].areas(main_area);

    let size = u16::try_from(self.editor.grid().size()).unwrap_or(u16::MAX);
    let grid_area = center(
      grid_area,
      Constraint::Length(size.saturating_mul(SQUARE_WIDTH + 1)),
      Constraint::Length(size.saturating_mul(SQUARE_HEIGHT)),
    );
    (title_area, grid_area, side_area)
  }

  fn square_area(grid_area: Rect, (row, col): Pos) -> Rect {
    Rect {
      x: grid_area.x.saturating_add(col as u16 * (SQUARE_WIDTH + 1)),
      y: grid_area.y.saturating_add(row as u16 * SQUARE_HEIGHT),
      width: SQUARE_WIDTH,
      height: SQUARE_HEIGHT,
    }
  }

  /// The square drawn at the given screen position, if any.
  fn square_at(&self, x: u16, y: u16) -> Option<Pos> {
    let (_, grid_area, _) = self.layout(self.area);
    let dx = x.checked_sub(grid_area.x)?;
    let dy = y.checked_sub(grid_area.y)?;
    if dx % (SQUARE_WIDTH + 1) == SQUARE_WIDTH {
      // The gap between two squares.
      return None;
    }
    let pos = (
      usize::from(dy / SQUARE_HEIGHT),
      usize::from(dx / (SQUARE_WIDTH + 1)),
    );
    self.editor.grid().contains(pos).then_some(pos)
  }

  fn render_square(&self, pos: Pos, square_area: Rect, buf: &mut Buffer) {
    let style = style_for(self.editor.square_style(pos));
    let number = self
      .editor
      .slots()
      .number_at(pos)
      .map(|n| n.to_string())
      .unwrap_or_default();
    let letter = match self.editor.grid().get(pos) {
      Square::Letter(c) => c.to_string(),
      Square::Black | Square::Empty => String::new(),
    };
    Paragraph::new(vec![
      Line::from(number).style(Style::new().remove_modifier(Modifier::BOLD)),
      Line::from(letter).centered(),
    ])
    .style(style)
    .render(square_area, buf);
  }

  fn slot_lines(&self) -> Vec<Line<'_>> {
    if self.editor.cursor().is_block_mode() {
      return vec![line!["Block editing: click squares to toggle them"]];
    }
    match (self.editor.active_slot(), self.editor.active_pattern()) {
      (Some(slot), Some(pattern)) => vec![line![
        slot.to_string().bold(),
        "  ",
        pattern.to_string()
      ]],
      _ => vec![line!["No slot selected"]],
    }
  }

  fn clue_lines(&self) -> Vec<Line<'_>> {
    match &self.mode {
      Mode::Clue(text) => vec![line!["> ", text.clone(), "_".slow_blink()]],
      Mode::Title(text) => vec![
        line!["Title for this crossword:".italic()],
        line!["> ", text.clone(), "_".slow_blink()],
      ],
      Mode::Grid => vec![Line::from(self.editor.current_clue().unwrap_or("(no clue)"))],
    }
  }

  fn suggestion_lines(&self) -> Vec<Line<'_>> {
    if self.suggestions.is_empty() {
      return vec![line!["(none)".italic()]];
    }
    self
      .suggestions
      .iter()
      .enumerate()
      .map(|(i, s)| {
        let key = (i + 1) % 10;
        let fit = if s.match_score.is_vetoed() {
          "blocks a crossing".red()
        } else {
          format!("{} crossing words", s.match_score.value()).green()
        };
        line![
          format!("{key} ").bold(),
          format!("{:<16}", s.candidate.word),
          format!("{:>4}  ", s.candidate.score),
          fit
        ]
      })
      .collect()
  }
}

impl Widget for &App {
  fn render(self, area: Rect, buf: &mut Buffer) {
    let (title_area, grid_area, side_area) = self.layout(area);

    line![
      "Crossword Constructor".bold().blue(),
      ": ".bold(),
      self.title().bold()
    ]
    .centered()
    .render(title_area, buf);

    for pos in self.editor.grid().positions() {
      let square_area = App::square_area(grid_area, pos).intersection(buf.area);
      if !square_area.is_empty() {
        self.render_square(pos, square_area, buf);
      }
    }

    let [slot_area, clue_area, suggestion_area, status_area] =
      vertical![==3, ==5, *=1, ==9].areas(side_area);

    Paragraph::new(self.slot_lines())
      .block(Block::bordered().title(Line::from("Slot").centered()))
      .render(slot_area, buf);

    Paragraph::new(self.clue_lines())
      .wrap(Wrap { trim: true })
      .block(Block::bordered().title(Line::from("Current clue").centered()))
      .render(clue_area, buf);

    Paragraph::new(self.suggestion_lines())
      .block(
        Block::bordered()
          .title(Line::from("Suggestions").centered())
          .padding(Padding::horizontal(1)),
      )
      .render(suggestion_area, buf);

    Paragraph::new(vec![
      Line::from(self.status.as_str()).yellow(),
      Line::default(),
      line!["type".bold(), " letters  ", "space".bold(), " direction  ", "tab".bold(), " next slot"],
      line!["0-9".bold(), " place suggestion  ", "^L".bold(), " edit clue"],
      line!["^B".bold(), " block mode  ", "^F".bold(), " autofill  ", "^K".bold(), " clear"],
      line!["^S".bold(), " save  ", "esc".bold(), " quit"],
    ])
    .wrap(Wrap { trim: true })
    .block(Block::bordered().padding(Padding::horizontal(1)))
    .render(status_area, buf);
  }
}

/// https://ratatui.rs/recipes/layout/center-a-widget/
fn center(area: Rect, horizontal: Constraint, vertical: Constraint) -> Rect {
  let [area] = Layout::horizontal([horizontal])
    .flex(Flex::Center)
    .areas(area);
  let [area] = Layout::vertical([vertical]).flex(Flex::Center).areas(area);
  area
}
