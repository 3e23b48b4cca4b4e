//! # patternlog
//!
//! A small logging library built around a compiled line format.
//!
//! A format string such as `"[%l] %H:%m:%s, %d/%M/%y (%P) <%c>: %L"` is
//! compiled once into a [`Template`], then rendered for every log call
//! against a [`Level`], the current time and the caller's message.
//!
//! ## Key Features
//!
//! * `%`-directives for level, message, clock, calendar and epoch fields
//! * Formatted messages are sized before they are written, so nothing is
//!   ever truncated, and they are formatted once per line however many
//!   times `%L` appears
//! * Bit-mask suppression of levels, with unsuppressible levels such as
//!   [`Level::FATAL`]
//! * Custom levels minted from a [`LevelRegistry`]
//!
//! ## Main Components
//!
//! * `template`: compiles format strings into token programs
//! * `render`: turns a template, a level and a message into a line
//! * `stream`: `LogStream`, a destination with its own format and mask
//! * `level`: level descriptors and their registry
//!
//! ## Quick Start
//!
//! ```
//! use patternlog::{log_fmt, render, Level, LogStream, StreamFlags, Template};
//!
//! // Rendering directly
//! let template = Template::compile("%l: %L").unwrap();
//! assert_eq!(render(&Level::ERROR, &template, "boom").unwrap(), "Error: boom");
//!
//! // Through a console stream
//! let stream = LogStream::create(None, StreamFlags::COLOR).unwrap();
//! stream.set_format("[%l] %H:%m:%s: %L").unwrap();
//! log_fmt!(stream, Level::MESSAGE, "My message to {}", "The World").unwrap();
//! ```

pub mod clock;
pub mod color;
pub mod error;
pub mod level;
pub mod padded;
pub mod render;
pub mod stream;
pub mod template;

pub use color::Color;
pub use error::{CompileError, LevelError, RenderError, StreamError};
pub use level::{register_level, Level, LevelRegistry, SUPPRESS_NOTHING};
pub use render::{render, render_fmt, render_message, Message};
pub use stream::{LogStream, StreamFlags, DEFAULT_FORMAT};
pub use template::Template;
