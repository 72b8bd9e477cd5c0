//! Global tracing subscriber: a console layer in the installer's house style
//! and a plain-text file layer under the user's cache directory.
use std::fs;
use std::io::Write as _;
use std::sync::Mutex;

use tracing_subscriber::Layer as _;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

use super::utils::{log_file_path, strip_ansi, utc_clock, utc_stamp};

/// Pull the rendered `message` field out of a tracing event.
fn event_message(event: &tracing::Event<'_>) -> String {
    struct Text(String);
    impl tracing::field::Visit for Text {
        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            if field.name() == "message" {
                self.0 = value.to_string();
            }
        }
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }
    let mut text = Text(String::new());
    event.record(&mut text);
    text.0
}

/// Tag prefixed to a log-file line, derived from the event level and target.
fn file_line_tag(meta: &tracing::Metadata<'_>) -> &'static str {
    match (*meta.level(), meta.target()) {
        (tracing::Level::INFO, "mms::stage") => "==> ",
        (tracing::Level::INFO, "mms::dry_run") => "[dry run] ",
        (tracing::Level::ERROR, _) => "[error] ",
        (tracing::Level::WARN, _) => "[warn] ",
        (tracing::Level::DEBUG, _) => "[debug] ",
        _ => "",
    }
}

/// Appends every event at `DEBUG` and above to the per-command install log,
/// one timestamped plain-text line each, regardless of console verbosity.
struct InstallLog {
    sink: Mutex<fs::File>,
}

impl InstallLog {
    /// Create the cache directory and the log file, truncating any previous
    /// run's log and writing a run header. `None` when the location is not
    /// writable; the run then simply has no file log.
    fn open(command: &str) -> Option<Self> {
        let path = log_file_path(command);
        fs::create_dir_all(path.parent()?).ok()?;
        let mut sink = fs::File::create(&path).ok()?;
        let version =
            option_env!("MMS_SETUP_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        writeln!(sink, "# mms-setup {version} {} UTC", utc_stamp()).ok()?;
        Some(Self {
            sink: Mutex::new(sink),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for InstallLog {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let msg = strip_ansi(&event_message(event));
        let tag = file_line_tag(event.metadata());
        if let Ok(mut sink) = self.sink.lock() {
            writeln!(sink, "{} {tag}{msg}", utc_clock()).ok();
        }
    }
}

/// Console rendering: stage headers get an arrow, dry-run lines a marker,
/// warnings and errors a colored level tag, everything else an indent.
struct Console;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for Console
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let msg = event_message(event);
        let meta = event.metadata();
        match (*meta.level(), meta.target()) {
            (tracing::Level::ERROR, _) => writeln!(writer, "\x1b[31merror:\x1b[0m {msg}"),
            (tracing::Level::WARN, _) => writeln!(writer, "\x1b[33mwarning:\x1b[0m {msg}"),
            (tracing::Level::INFO, "mms::stage") => {
                writeln!(writer, "\x1b[1;32m==>\x1b[0m \x1b[1m{msg}\x1b[0m")
            }
            (tracing::Level::INFO, "mms::dry_run") => {
                writeln!(writer, "    \x1b[36m[dry run]\x1b[0m {msg}")
            }
            (tracing::Level::DEBUG, _) => writeln!(writer, "    \x1b[2m{msg}\x1b[0m"),
            _ => writeln!(writer, "    {msg}"),
        }
    }
}

/// Install the global subscriber: the console layer honours the verbose
/// flag, the file layer captures everything down to `DEBUG` when the cache
/// directory is writable. Call once at startup, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console = tracing_subscriber::fmt::layer()
        .event_format(Console)
        .with_filter(console_level);

    tracing_subscriber::registry()
        .with(console)
        .with(InstallLog::open(command).map(|l| l.with_filter(LevelFilter::DEBUG)))
        .init();
}
