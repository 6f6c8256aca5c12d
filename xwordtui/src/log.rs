use std::fs::File;
use std::path::Path;

use anyhow::Context;
use log::LevelFilter;

/// Where log output goes.
pub enum LogTarget<'a> {
  Stderr,
  File(&'a Path),
  /// Logging is disabled, e.g. while the terminal UI owns the screen.
  Off,
}

/// Initializes logging at `Debug` level if `debug` is set and `Info` otherwise.
/// `RUST_LOG` overrides the level when it is set.
pub fn init_logger(debug: bool, target: LogTarget) -> anyhow::Result<()> {
  let level = if debug {
    LevelFilter::Debug
  } else {
    LevelFilter::Info
  };

  let mut builder = env_logger::Builder::new();
  builder
    .filter(None, level)
    .format_timestamp(None)
    .format_module_path(false)
    .format_target(false);

  if let Ok(spec) = std::env::var("RUST_LOG") {
    builder.parse_filters(&spec);
  }

  match target {
    LogTarget::Off => return Ok(()),
    LogTarget::Stderr => {
      builder.target(env_logger::Target::Stderr);
    }
    LogTarget::File(path) => {
      let file = File::create(path)
        .with_context(|| format!("couldn't create log file {}", path.display()))?;
      builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
  }

  builder.try_init()?;
  log::debug!("logger initialized at {level:?} level");
  Ok(())
}
