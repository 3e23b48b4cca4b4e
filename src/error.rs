use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

/// Errors produced while compiling a format string into a [`Template`](crate::Template).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A `%` was followed by a character outside the directive table.
    #[error("invalid format directive '%{directive}' at byte {position}")]
    InvalidDirective { directive: char, position: usize },

    /// A run of literal text grew past [`MAX_LITERAL_LEN`](crate::template::MAX_LITERAL_LEN).
    #[error("literal fragment starting at byte {position} exceeds {max} bytes")]
    LiteralTooLarge { position: usize, max: usize },
}

/// Errors produced while rendering a single log line.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("could not allocate {requested} bytes for the output line")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    /// A `Display` implementation inside the message arguments reported failure.
    #[error("message arguments failed to format")]
    Format(#[from] std::fmt::Error),
}

/// Errors produced when minting new log levels.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("no unused level bits left in the registry")]
    Exhausted,
}

/// Errors surfaced by [`LogStream`](crate::LogStream).
#[derive(thiserror::Error, Debug)]
pub enum StreamError {
    #[error("could not open log file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write log entry: {0}")]
    Write(#[from] io::Error),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
