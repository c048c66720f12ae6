// ============================================================================
// reelfix-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger backend for the `log` facade
//
// Console output goes to stderr with colored level tags. When a log directory
// is given, every line is also appended to a timestamped file with the ANSI
// escapes stripped.
//
// USAGE:
// - default: info
// - --verbose: debug
// - RUST_LOG, when set, overrides both

use log::{LevelFilter, debug};
use owo_colors::OwoColorize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{CliErrorContext, CliResult};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// ```
/// let name = format!("reelfix_{}.log", reelfix_cli::logging::get_timestamp());
/// assert_eq!(name.len(), "reelfix_20240601_123045.log".len());
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Level used when RUST_LOG is not set.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Writes to stderr unchanged and to a file without ANSI escapes.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(&strip_ansi_escapes::strip(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Creates `<log_dir>/reelfix_<timestamp>.log`.
fn create_log_file(log_dir: &Path) -> CliResult<(File, PathBuf)> {
    fs::create_dir_all(log_dir)
        .cli_with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let path = log_dir.join(format!("reelfix_{}.log", get_timestamp()));
    let file = File::create(&path)
        .cli_with_context(|| format!("Failed to create log file {}", path.display()))?;
    Ok((file, path))
}

/// Installs the global logger. Returns the log file path when one was created.
pub fn init(verbose: bool, log_dir: Option<&Path>) -> CliResult<Option<PathBuf>> {
    let level = level_for(verbose);
    let use_color = std::env::var("NO_COLOR").is_err();

    let mut builder = env_logger::Builder::new();
    builder
        .format(move |buf, record| {
            let level_str = match record.level() {
                log::Level::Error => "ERROR",
                log::Level::Warn => "WARN ",
                log::Level::Info => "INFO ",
                log::Level::Debug => "DEBUG",
                log::Level::Trace => "TRACE",
            };
            if !use_color {
                return writeln!(buf, "{} {}", level_str, record.args());
            }
            let level_colored = match record.level() {
                log::Level::Error => level_str.bright_red().to_string(),
                log::Level::Warn => level_str.yellow().to_string(),
                log::Level::Info => level_str.green().to_string(),
                log::Level::Debug => level_str.blue().to_string(),
                log::Level::Trace => level_str.magenta().to_string(),
            };
            writeln!(buf, "{} {}", level_colored, record.args())
        })
        .filter_level(level)
        .parse_default_env();

    let log_path = match log_dir {
        Some(dir) => {
            let (file, path) = create_log_file(dir)?;
            builder.target(env_logger::Target::Pipe(Box::new(TeeWriter { file })));
            Some(path)
        }
        None => None,
    };

    builder
        .try_init()
        .map_err(|e| crate::cli_error!("Failed to initialize logger: {}", e))?;

    debug!("Logger initialized with level: {}", level);
    Ok(log_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_timestamp_shape() {
        let ts = get_timestamp();
        assert_eq!(ts.len(), 15);
        assert_eq!(ts.as_bytes()[8], b'_');
        assert!(ts.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(true), LevelFilter::Debug);
        assert_eq!(level_for(false), LevelFilter::Info);
    }

    #[test]
    fn test_tee_writer_strips_ansi_in_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let (file, path) = create_log_file(dir.path())?;
        let mut tee = TeeWriter { file };
        tee.write_all(b"\x1b[32mINFO \x1b[0m fetched clip\n")?;
        tee.flush()?;

        let written = fs::read_to_string(path)?;
        assert_eq!(written, "INFO  fetched clip\n");
        Ok(())
    }
}
