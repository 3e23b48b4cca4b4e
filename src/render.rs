//! Evaluates a compiled [`Template`] into one log line.
//!
//! The walk visits every token once, appending its text to a single
//! growable buffer. Time fields come from one [`Snapshot`] per call. The
//! message is formatted at most once per call no matter how many `%L`
//! directives the template holds; later occurrences copy the bytes written
//! by the first.
//!
//! Formatted messages use a measure-then-write protocol: the arguments are
//! first run through a counting sink to learn their length, the buffer is
//! grown to fit, then the same arguments are written for real. The
//! arguments are therefore read twice per call, and `Display`
//! implementations inside them must be side-effect free or tolerate that.

use std::fmt::{self, Write as _};
use std::ops::Range;

use crate::clock::Snapshot;
use crate::error::RenderError;
use crate::level::Level;
use crate::padded::Padded;
use crate::template::{Part, Template, Token};

/// Initial capacity of the output buffer, and the unit it grows by.
pub const BLOCK_SIZE: usize = 512;

/// The user-supplied part of a log line.
#[derive(Clone, Copy, Debug)]
pub enum Message<'a> {
    /// Pre-formatted text, used as-is.
    Text(&'a str),
    /// A format string with its arguments, as built by `format_args!`.
    Args(fmt::Arguments<'a>),
}

impl<'a> From<&'a str> for Message<'a> {
    fn from(text: &'a str) -> Self {
        Message::Text(text)
    }
}

impl<'a> From<fmt::Arguments<'a>> for Message<'a> {
    fn from(args: fmt::Arguments<'a>) -> Self {
        Message::Args(args)
    }
}

/// Renders a line whose message is plain text.
///
/// # Examples
///
/// ```
/// # use patternlog::{render, Level, Template};
/// let template = Template::compile("%l: %L").unwrap();
/// let line = render(&Level::ERROR, &template, "boom").unwrap();
/// assert_eq!(line, "Error: boom");
/// ```
pub fn render(level: &Level, template: &Template, message: &str) -> Result<String, RenderError> {
    render_message(level, template, Message::Text(message))
}

/// Renders a line whose message is a format string plus arguments.
///
/// ```
/// # use patternlog::{render_fmt, Level, Template};
/// let template = Template::compile("[%l] %L").unwrap();
/// let line = render_fmt(&Level::WARNING, &template, format_args!("{} retries left", 3)).unwrap();
/// assert_eq!(line, "[Warning] 3 retries left");
/// ```
pub fn render_fmt(
    level: &Level,
    template: &Template,
    args: fmt::Arguments<'_>,
) -> Result<String, RenderError> {
    render_message(level, template, Message::Args(args))
}

/// Renders against the current time.
pub fn render_message(
    level: &Level,
    template: &Template,
    message: Message<'_>,
) -> Result<String, RenderError> {
    let mut clock = None;
    Renderer::new(level, message)?.run(template, || *clock.get_or_insert_with(Snapshot::now))
}

/// Renders against an explicit time reading.
pub fn render_at(
    level: &Level,
    template: &Template,
    message: Message<'_>,
    snapshot: &Snapshot,
) -> Result<String, RenderError> {
    Renderer::new(level, message)?.run(template, || *snapshot)
}

struct Renderer<'a> {
    level: &'a Level,
    message: Message<'a>,
    formatted: Option<Range<usize>>,
    out: OutputBuffer,
}

impl<'a> Renderer<'a> {
    fn new(level: &'a Level, message: Message<'a>) -> Result<Self, RenderError> {
        Ok(Self {
            level,
            message,
            formatted: None,
            out: OutputBuffer::with_block()?,
        })
    }

    fn run(
        mut self,
        template: &Template,
        mut snapshot: impl FnMut() -> Snapshot,
    ) -> Result<String, RenderError> {
        for part in template.parts() {
            match part {
                Part::Literal(text) => self.out.push_str(text)?,
                Part::Token(Token::Literal) => {}
                Part::Token(Token::LevelPrefix) => self.out.push_str(self.level.prefix())?,
                Part::Token(Token::Message) => self.message()?,
                Part::Token(Token::Space) => self.out.push_str(" ")?,
                Part::Token(token) => self.time_field(token, &snapshot())?,
            }
        }
        Ok(self.out.into_string())
    }

    fn message(&mut self) -> Result<(), RenderError> {
        if let Some(range) = self.formatted.clone() {
            return self.out.repeat(range);
        }

        let start = self.out.len();
        match self.message {
            Message::Text(text) => self.out.push_str(text)?,
            Message::Args(args) => match args.as_str() {
                Some(text) => self.out.push_str(text)?,
                None => {
                    let len = measure(args)?;
                    self.out.reserve(len)?;
                    self.out.write_args(args)?;
                }
            },
        }
        self.formatted = Some(start..self.out.len());
        Ok(())
    }

    fn time_field(&mut self, token: Token, now: &Snapshot) -> Result<(), RenderError> {
        let digits = match token {
            Token::Hour12 => Padded::new(now.hour12().into(), 0),
            Token::Hour24 => Padded::new(now.hour24().into(), 2),
            Token::Minute => Padded::new(now.minute().into(), 2),
            Token::Second => Padded::new(now.second().into(), 2),
            Token::Day => Padded::new(now.day().into(), 2),
            Token::Month => Padded::new(now.month().into(), 2),
            Token::Year2 => Padded::new(now.year2().into(), 2),
            Token::Year4 => Padded::signed(now.year().into(), 0),
            Token::WallClockSeconds => Padded::signed(now.epoch_secs(), 0),
            Token::MonotonicSeconds => Padded::new(now.uptime_secs(), 0),
            Token::CTimeString => return self.out.write_args(format_args!("{}", now.ctime())),
            Token::Literal | Token::LevelPrefix | Token::Message | Token::Space => return Ok(()),
        };
        self.out.push_str(digits.as_str())
    }
}

/// Length-only formatting pass.
fn measure(args: fmt::Arguments<'_>) -> Result<usize, RenderError> {
    struct Counter(usize);

    impl fmt::Write for Counter {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.0 += s.len();
            Ok(())
        }
    }

    let mut counter = Counter(0);
    counter.write_fmt(args)?;
    Ok(counter.0)
}

/// Output line under construction.
struct OutputBuffer {
    text: String,
}

impl OutputBuffer {
    fn with_block() -> Result<Self, RenderError> {
        let mut out = Self { text: String::new() };
        out.reserve(BLOCK_SIZE)?;
        Ok(out)
    }

    fn len(&self) -> usize {
        self.text.len()
    }

    /// Ensures room for `additional` more bytes, growing by whole blocks and
    /// at least doubling.
    fn reserve(&mut self, additional: usize) -> Result<(), RenderError> {
        let needed = self.text.len().saturating_add(additional);
        let capacity = self.text.capacity();
        if needed <= capacity {
            return Ok(());
        }

        let target = needed.max(capacity.saturating_mul(2));
        let target = target.div_ceil(BLOCK_SIZE).saturating_mul(BLOCK_SIZE);
        self.text
            .try_reserve_exact(target - self.text.len())
            .map_err(|source| RenderError::Allocation {
                requested: target,
                source,
            })
    }

    fn push_str(&mut self, s: &str) -> Result<(), RenderError> {
        self.reserve(s.len())?;
        self.text.push_str(s);
        Ok(())
    }

    /// Appends a copy of text already in the buffer. `range` must lie on
    /// char boundaries, as the ranges recorded around whole fragments do.
    fn repeat(&mut self, range: Range<usize>) -> Result<(), RenderError> {
        let mut copy = String::new();
        copy.try_reserve_exact(range.len())
            .map_err(|source| RenderError::Allocation {
                requested: range.len(),
                source,
            })?;
        copy.push_str(&self.text[range]);
        self.push_str(&copy)
    }

    fn write_args(&mut self, args: fmt::Arguments<'_>) -> Result<(), RenderError> {
        let mut sink = Sink {
            out: self,
            failure: None,
        };
        match sink.write_fmt(args) {
            Ok(()) => Ok(()),
            Err(err) => Err(sink.failure.take().unwrap_or(RenderError::Format(err))),
        }
    }

    fn into_string(self) -> String {
        self.text
    }
}

/// Adapts [`OutputBuffer`] to `fmt::Write`, keeping the real cause when an
/// allocation fails mid-format.
struct Sink<'b> {
    out: &'b mut OutputBuffer,
    failure: Option<RenderError>,
}

impl fmt::Write for Sink<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.push_str(s).map_err(|err| {
            self.failure = Some(err);
            fmt::Error
        })
    }
}
