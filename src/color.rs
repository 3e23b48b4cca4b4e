use std::io::{self, Write};

/// Console colors a level can be displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Yellow,
    White,
    Black,
    Reset,
}

impl Color {
    /// The ANSI escape sequence selecting this color.
    pub const fn escape(self) -> &'static str {
        match self {
            Color::Red => "\x1b[31m",
            Color::Yellow => "\x1b[33m",
            Color::White => "\x1b[37m",
            Color::Black => "\x1b[30m",
            Color::Reset => "\x1b[0m",
        }
    }
}

/// Switches the terminal behind `out` to `color`.
pub fn set_color<W: Write + ?Sized>(out: &mut W, color: Color) -> io::Result<()> {
    out.write_all(color.escape().as_bytes())
}

pub fn reset_color<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    set_color(out, Color::Reset)
}
