use std::{
    fs::File,
    io::{self, IsTerminal},
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{
        FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

// --- Formatter ---

struct LocalFmt;

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();

        if ansi {
            write!(writer, "\x1b[2m")?
        }
        write!(
            writer,
            "{} ",
            Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )?;
        if ansi {
            write!(writer, "\x1b[0m")?
        }

        let (pre, post) = if ansi {
            match *meta.level() {
                Level::ERROR => ("\x1b[1;31m", "\x1b[0m"),
                Level::WARN => ("\x1b[1;33m", "\x1b[0m"),
                Level::INFO => ("\x1b[1;32m", "\x1b[0m"),
                Level::DEBUG => ("\x1b[1;34m", "\x1b[0m"),
                Level::TRACE => ("\x1b[1;35m", "\x1b[0m"),
            }
        } else {
            ("", "")
        };
        write!(writer, "{}{:>5}{} ", pre, meta.level(), post)?;

        if let (Some(file), Some(line)) = (meta.file().map(short_path), meta.line()) {
            if ansi {
                write!(writer, "\x1b[36m{file}:{line}\x1b[0m ")?;
            } else {
                write!(writer, "{file}:{line} ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Drops the leading `src/` so records read `app.rs:42` rather than
/// `src/app.rs:42`. Paths from other crates keep their crate prefix.
fn short_path(file: &str) -> &str {
    file.strip_prefix("src/")
        .or_else(|| file.strip_prefix("src\\"))
        .unwrap_or(file)
}

static APP_NAME: OnceLock<String> = OnceLock::new();

/// Returns the process name derived from the executable path.
/// Falls back to "trip-budget" if the path cannot be determined.
pub fn app_name() -> &'static str {
    APP_NAME.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "trip-budget".to_string())
    })
}

/// `RUST_LOG` when set, otherwise `level`.
fn make_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| anyhow::anyhow!("invalid log level '{level}': {e}")),
    }
}

/// A directory gets `<app name>.log` inside it; any other path is used as is.
fn resolve_log_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(format!("{}.log", app_name()))
    } else {
        path.to_path_buf()
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))
}

/// Logging options taken from the command line.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Bare level ("error" .. "trace") or any EnvFilter directive.
    pub level: String,
    /// Appends records to this file in addition to stderr. A directory
    /// gets `<app name>.log` inside it.
    pub file: Option<PathBuf>,
}

/// Initializes logging. Call once at startup.
///
/// - Stderr: coloured when attached to a terminal, plain when piped, so
///   stdout stays clean for reports.
/// - File: plain text, appended, only when `options.file` is set.
/// - Level: `RUST_LOG` wins over `options.level`.
pub fn init_logging(options: &LogOptions) -> Result<()> {
    let filter = make_filter(&options.level)?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    let file_layer = options
        .file
        .as_deref()
        .map(resolve_log_path)
        .map(|path| open_log_file(&path))
        .transpose()?
        .map(|file| {
            tracing_subscriber::fmt::layer()
                .event_format(LocalFmt)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .boxed()
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("logging already initialized")?;

    tracing::debug!(app = app_name(), level = %options.level, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn short_path_strips_src_prefix() {
        assert_eq!(short_path("src/app.rs"), "app.rs");
        assert_eq!(short_path("src\\app.rs"), "app.rs");
        assert_eq!(short_path("trip-core/src/lib.rs"), "trip-core/src/lib.rs");
    }

    #[test]
    fn invalid_level_is_rejected() {
        // SAFETY: no other test in this crate reads or writes RUST_LOG.
        unsafe { std::env::remove_var("RUST_LOG") };

        assert!(make_filter("warn").is_ok());
        assert!(make_filter("debug,trip_core=trace").is_ok());
        assert!(make_filter("trip_core=loud").is_err());
    }

    #[test]
    fn open_log_file_reports_path() {
        let err = open_log_file(Path::new("/this/path/does/not/exist/trip.log")).unwrap_err();

        assert!(err.to_string().contains("/this/path/does/not/exist/trip.log"));
    }

    #[test]
    fn log_directory_gets_app_named_file() {
        let dir = std::env::temp_dir().join(format!("trip-cli-logs-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let path = resolve_log_path(&dir);

        assert_eq!(path, dir.join(format!("{}.log", app_name())));
        assert!(open_log_file(&path).is_ok());
        assert!(path.is_file());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn log_file_path_is_kept() {
        let path = Path::new("/tmp/trip-budget-test/run.log");

        assert_eq!(resolve_log_path(path), path.to_path_buf());
    }

    #[test]
    fn app_name_is_stable() {
        assert_eq!(app_name(), app_name());
        assert!(!app_name().is_empty());
    }
}
