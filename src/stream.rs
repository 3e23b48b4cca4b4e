use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::ops::{BitOr, BitOrAssign};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::clock;
use crate::color::{reset_color, set_color};
use crate::error::StreamError;
use crate::level::Level;
use crate::render::{render_message, Message};
use crate::template::Template;

/// Format every new stream starts with.
pub const DEFAULT_FORMAT: &str = "[%l] %c: %L";

/// Options fixed when a stream is created.
///
/// ```
/// # use patternlog::StreamFlags;
/// let flags = StreamFlags::COLOR | StreamFlags::REWRITE;
/// assert!(flags.contains(StreamFlags::REWRITE));
/// assert!(!flags.contains(StreamFlags::NO_STDOUT));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamFlags(u32);

impl StreamFlags {
    pub const NONE: StreamFlags = StreamFlags(0);
    /// Do not echo file-bound lines to the console.
    pub const NO_STDOUT: StreamFlags = StreamFlags(1);
    /// Color console output by level.
    pub const COLOR: StreamFlags = StreamFlags(1 << 1);
    /// Truncate the log file instead of appending to it.
    pub const REWRITE: StreamFlags = StreamFlags(1 << 2);

    pub const fn contains(self, other: StreamFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for StreamFlags {
    type Output = StreamFlags;

    fn bitor(self, rhs: StreamFlags) -> StreamFlags {
        StreamFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for StreamFlags {
    fn bitor_assign(&mut self, rhs: StreamFlags) {
        self.0 |= rhs.0;
    }
}

type Sink = Mutex<Box<dyn Write + Send>>;

/// A log destination with its own format, suppression mask and console
/// settings.
///
/// Lines go to the destination writer, if any, and are echoed to the console
/// when the stream has no destination or console echo is on. All methods take
/// `&self`; the active template is swapped as a whole, so a render running
/// on one thread keeps the template it started with while another thread
/// replaces it.
///
/// # Examples
///
/// ```
/// # use patternlog::{LogStream, Level, StreamFlags, log_fmt};
/// # fn main() -> Result<(), patternlog::StreamError> {
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("app.log");
/// let stream = LogStream::create(Some(&path), StreamFlags::NO_STDOUT | StreamFlags::REWRITE)?;
/// stream.set_format("[%l] %L")?;
///
/// log_fmt!(stream, Level::MESSAGE, "My message to {}", "The World")?;
/// stream.puts(&Level::ERROR, "Some nasty error")?;
///
/// // Debug is suppressed by default
/// stream.puts(&Level::DEBUG, "hidden")?;
///
/// let contents = std::fs::read_to_string(&path)?;
/// assert_eq!(contents, "[Message] My message to The World\n[Error] Some nasty error\n");
/// # Ok(())
/// # }
/// ```
pub struct LogStream {
    path: Option<PathBuf>,
    destination: Option<Sink>,
    console: Sink,
    template: RwLock<Arc<Template>>,
    to_stdout: AtomicBool,
    colorized: AtomicBool,
    suppress: AtomicU32,
}

impl LogStream {
    /// Creates a stream writing to `path`, or to the console only when
    /// `path` is `None`.
    ///
    /// The stream starts with [`DEFAULT_FORMAT`] and suppresses
    /// [`Level::DEBUG`].
    pub fn create(path: Option<&Path>, flags: StreamFlags) -> Result<Self, StreamError> {
        let destination = match path {
            Some(path) => {
                let file = open_file(path, flags.contains(StreamFlags::REWRITE))?;
                Some(Box::new(file) as Box<dyn Write + Send>)
            }
            None => None,
        };

        Ok(Self {
            path: path.map(Path::to_path_buf),
            ..Self::with_destination(destination, flags)
        })
    }

    /// Wraps an already open writer. Console echo stays on, as for a stream
    /// created with [`StreamFlags::NONE`].
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self::with_destination(Some(Box::new(writer) as Box<dyn Write + Send>), StreamFlags::NONE)
    }

    fn with_destination(destination: Option<Box<dyn Write + Send>>, flags: StreamFlags) -> Self {
        clock::mark_start();
        Self {
            path: None,
            destination: destination.map(Mutex::new),
            console: Mutex::new(Box::new(io::stdout())),
            template: RwLock::new(Arc::new(default_template())),
            to_stdout: AtomicBool::new(!flags.contains(StreamFlags::NO_STDOUT)),
            colorized: AtomicBool::new(flags.contains(StreamFlags::COLOR)),
            suppress: AtomicU32::new(Level::DEBUG.id()),
        }
    }

    /// Sends console output to `console` instead of standard output.
    pub fn with_console(mut self, console: impl Write + Send + 'static) -> Self {
        self.console = Mutex::new(Box::new(console));
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Compiles `format` and makes it the active template.
    ///
    /// On error the previous template stays active.
    pub fn set_format(&self, format: &str) -> Result<(), StreamError> {
        let template = Template::compile(format).map_err(|err| {
            log::warn!("rejected log format {format:?}: {err}");
            err
        })?;
        *self.template.write() = Arc::new(template);
        Ok(())
    }

    /// The active template.
    pub fn format(&self) -> Arc<Template> {
        Arc::clone(&self.template.read())
    }

    pub fn set_output_to_stdout(&self, enabled: bool) {
        self.to_stdout.store(enabled, Ordering::Relaxed);
    }

    pub fn set_colorized(&self, enabled: bool) {
        self.colorized.store(enabled, Ordering::Relaxed);
    }

    /// Replaces the suppression mask. Levels whose bit is set are dropped
    /// unless they are unsuppressible.
    pub fn suppress(&self, mask: u32) {
        self.suppress.store(mask, Ordering::Relaxed);
    }

    pub fn suppressed(&self) -> u32 {
        self.suppress.load(Ordering::Relaxed)
    }

    pub fn is_enabled(&self, level: &Level) -> bool {
        !level.is_suppressed_by(self.suppressed())
    }

    /// Logs a formatted message. Usually reached through [`log_fmt!`].
    ///
    /// Failures are reported through the `log` facade and returned; the
    /// stream never aborts the process, not even for [`Level::FATAL`].
    pub fn printf(&self, level: &Level, args: fmt::Arguments<'_>) -> Result<(), StreamError> {
        self.emit(level, Message::Args(args))
    }

    /// Logs a message verbatim.
    pub fn puts(&self, level: &Level, message: &str) -> Result<(), StreamError> {
        self.emit(level, Message::Text(message))
    }

    fn emit(&self, level: &Level, message: Message<'_>) -> Result<(), StreamError> {
        if !self.is_enabled(level) {
            return Ok(());
        }

        let template = self.format();
        let line = render_message(level, &template, message).map_err(|err| {
            log::error!("failed to get a formatted string: {err}");
            err
        })?;

        self.write_line(level, &line).map_err(|err| {
            match &self.path {
                Some(path) => log::error!("failed to write log entry to {}: {err}", path.display()),
                None => log::error!("failed to write log entry: {err}"),
            }
            StreamError::Write(err)
        })
    }

    /// The destination is written even when the console echo fails; the
    /// destination's error wins when both fail.
    fn write_line(&self, level: &Level, line: &str) -> io::Result<()> {
        let Some(destination) = &self.destination else {
            return self.echo(level, line);
        };

        let echoed = if self.to_stdout.load(Ordering::Relaxed) {
            self.echo(level, line)
        } else {
            Ok(())
        };
        if let Err(err) = &echoed {
            log::warn!("failed to echo log entry to the console: {err}");
        }

        let written = write_entry(&mut **destination.lock(), line);
        written.and(echoed)
    }

    fn echo(&self, level: &Level, line: &str) -> io::Result<()> {
        let mut console = self.console.lock();
        if !self.colorized.load(Ordering::Relaxed) {
            return write_entry(&mut **console, line);
        }

        set_color(&mut *console, level.color())?;
        let written = console
            .write_all(line.as_bytes())
            .and_then(|()| console.write_all(b"\n"));
        // reset even after a failed write
        let reset = reset_color(&mut *console).and_then(|()| console.flush());
        written.and(reset)
    }
}

impl fmt::Debug for LogStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogStream")
            .field("path", &self.path)
            .field("format", &self.template.read().source())
            .field("to_stdout", &self.to_stdout.load(Ordering::Relaxed))
            .field("colorized", &self.colorized.load(Ordering::Relaxed))
            .field("suppress", &self.suppressed())
            .finish()
    }
}

fn write_entry(out: &mut dyn Write, line: &str) -> io::Result<()> {
    out.write_all(line.as_bytes())?;
    out.write_all(b"\n")?;
    out.flush()
}

fn open_file(path: &Path, rewrite: bool) -> Result<File, StreamError> {
    let mut options = OpenOptions::new();
    if rewrite {
        options.write(true).create(true).truncate(true);
    } else {
        options.append(true).create(true);
    }
    options.open(path).map_err(|source| {
        log::error!("failed to open file {} for writing: {source}", path.display());
        StreamError::Open {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn default_template() -> Template {
    // DEFAULT_FORMAT only uses directives from the table.
    Template::compile(DEFAULT_FORMAT).unwrap_or_else(|_| unreachable!())
}

/// Logs a formatted message to a [`LogStream`].
///
/// # Examples
///
/// ```
/// # use patternlog::{LogStream, Level, log_fmt};
/// let stream = LogStream::from_writer(Vec::new());
/// stream.set_output_to_stdout(false);
/// log_fmt!(stream, Level::WARNING, "disk at {}%", 93).unwrap();
/// ```
#[macro_export]
macro_rules! log_fmt {
    ($stream:expr, $level:expr, $($arg:tt)+) => {
        $stream.printf(&$level, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_message {
    ($stream:expr, $($arg:tt)+) => {
        $crate::log_fmt!($stream, $crate::Level::MESSAGE, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_warning {
    ($stream:expr, $($arg:tt)+) => {
        $crate::log_fmt!($stream, $crate::Level::WARNING, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_error {
    ($stream:expr, $($arg:tt)+) => {
        $crate::log_fmt!($stream, $crate::Level::ERROR, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($stream:expr, $($arg:tt)+) => {
        $crate::log_fmt!($stream, $crate::Level::DEBUG, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_fatal {
    ($stream:expr, $($arg:tt)+) => {
        $crate::log_fmt!($stream, $crate::Level::FATAL, $($arg)+)
    };
}
