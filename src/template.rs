//! Compiler for the `%`-directive format language.
//!
//! A format string such as `"[%l] %H:%m:%s: %L"` is scanned once, left to
//! right, into a [`Template`]: an ordered token stream plus a table of the
//! literal text between directives. The template is immutable afterwards and
//! can be rendered any number of times.
//!
//! | directive | token                     | directive | token                  |
//! |-----------|---------------------------|-----------|------------------------|
//! | `%%`      | literal `%`               | `%l`      | [`Token::LevelPrefix`] |
//! | `%c`      | [`Token::CTimeString`]    | `%L`      | [`Token::Message`]     |
//! | `%h`      | [`Token::Hour12`]         | `%H`      | [`Token::Hour24`]      |
//! | `%m`      | [`Token::Minute`]         | `%s`      | [`Token::Second`]      |
//! | `%d`      | [`Token::Day`]            | `%M`      | [`Token::Month`]       |
//! | `%y`      | [`Token::Year2`]          | `%Y`      | [`Token::Year4`]       |
//! | `%p`      | [`Token::MonotonicSeconds`] | `%P`    | [`Token::WallClockSeconds`] |
//! | `% `      | [`Token::Space`]          |           |                        |

use std::fmt;
use std::str::FromStr;

use crate::error::CompileError;

/// Longest run of literal text, in bytes, a single fragment may hold.
pub const MAX_LITERAL_LEN: usize = 512;

/// One compiled unit of a format program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// The next entry of the literal table.
    Literal,
    LevelPrefix,
    Message,
    Hour24,
    Hour12,
    Minute,
    Second,
    Day,
    Month,
    Year2,
    Year4,
    /// A single separator space, never merged with literal text.
    Space,
    /// Seconds since the Unix epoch.
    WallClockSeconds,
    /// Seconds since the process started.
    MonotonicSeconds,
    /// `Www Mmm dd hh:mm:ss yyyy`.
    CTimeString,
}

impl Token {
    /// Maps the character following a `%` to its token.
    ///
    /// `%%` and `% ` are not covered here: the former is literal text and the
    /// latter depends on whether a literal is pending.
    fn from_directive(c: char) -> Option<Self> {
        let token = match c {
            'l' => Token::LevelPrefix,
            'L' => Token::Message,
            'c' => Token::CTimeString,
            'h' => Token::Hour12,
            'H' => Token::Hour24,
            'm' => Token::Minute,
            's' => Token::Second,
            'd' => Token::Day,
            'M' => Token::Month,
            'y' => Token::Year2,
            'Y' => Token::Year4,
            'p' => Token::MonotonicSeconds,
            'P' => Token::WallClockSeconds,
            _ => return None,
        };
        Some(token)
    }
}

/// A token paired with its literal text, as yielded by [`Template::parts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part<'a> {
    Literal(&'a str),
    Token(Token),
}

/// A compiled format program.
///
/// Owns its token sequence and literal table jointly. Every
/// [`Token::Literal`] corresponds to exactly one literal table entry, in
/// order, so the two are consumed in lock-step.
#[derive(Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    tokens: Vec<Token>,
    literals: Vec<String>,
}

impl Template {
    /// Compiles a format string.
    ///
    /// On error nothing is returned but the error; partially built state is
    /// dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// # use patternlog::template::{Template, Token};
    /// let template = Template::compile("[%l] %L").unwrap();
    /// assert_eq!(
    ///     template.tokens(),
    ///     &[Token::Literal, Token::LevelPrefix, Token::Literal, Token::Message]
    /// );
    /// assert_eq!(template.literals(), &["[", "] "]);
    ///
    /// assert!(Template::compile("%q").is_err());
    /// ```
    pub fn compile(format: &str) -> Result<Self, CompileError> {
        let mut builder = Builder::default();
        let mut chars = format.char_indices();

        while let Some((pos, c)) = chars.next() {
            if c != '%' {
                builder.push_text(pos, c)?;
                continue;
            }

            // A lone trailing '%' ends the input.
            let Some((_, directive)) = chars.next() else {
                break;
            };

            let token = match directive {
                '%' => {
                    builder.push_text(pos, '%')?;
                    continue;
                }
                ' ' if builder.in_literal() => {
                    builder.push_text(pos, ' ')?;
                    continue;
                }
                ' ' => Token::Space,
                other => Token::from_directive(other).ok_or(CompileError::InvalidDirective {
                    directive: other,
                    position: pos,
                })?,
            };
            builder.push_token(token);
        }

        Ok(builder.finish(format))
    }

    /// The format string this template was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns true if the template contains a `%L` directive.
    pub fn has_message(&self) -> bool {
        self.tokens.contains(&Token::Message)
    }

    /// Walks the program, resolving each literal token against the literal
    /// table.
    pub fn parts(&self) -> Parts<'_> {
        Parts {
            tokens: self.tokens.iter(),
            literals: self.literals.iter(),
        }
    }
}

impl FromStr for Template {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::compile(s)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("source", &self.source)
            .field("tokens", &self.tokens.len())
            .field("literals", &self.literals.len())
            .finish()
    }
}

/// Iterator returned by [`Template::parts`].
pub struct Parts<'a> {
    tokens: std::slice::Iter<'a, Token>,
    literals: std::slice::Iter<'a, String>,
}

impl<'a> Iterator for Parts<'a> {
    type Item = Part<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = *self.tokens.next()?;
        if token == Token::Literal {
            let text = self.literals.next()?;
            return Some(Part::Literal(text));
        }
        Some(Part::Token(token))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.tokens.size_hint()
    }
}

#[derive(Default)]
struct Builder {
    tokens: Vec<Token>,
    literals: Vec<String>,
    pending: String,
    pending_start: usize,
}

impl Builder {
    fn in_literal(&self) -> bool {
        !self.pending.is_empty()
    }

    fn push_text(&mut self, pos: usize, c: char) -> Result<(), CompileError> {
        if self.pending.is_empty() {
            self.pending_start = pos;
        }
        if self.pending.len() + c.len_utf8() > MAX_LITERAL_LEN {
            return Err(CompileError::LiteralTooLarge {
                position: self.pending_start,
                max: MAX_LITERAL_LEN,
            });
        }
        self.pending.push(c);
        Ok(())
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        self.literals.push(std::mem::take(&mut self.pending));
        self.tokens.push(Token::Literal);
    }

    fn push_token(&mut self, token: Token) {
        self.flush();
        self.tokens.push(token);
    }

    fn finish(mut self, source: &str) -> Template {
        self.flush();
        Template {
            source: source.to_owned(),
            tokens: self.tokens,
            literals: self.literals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_template() {
        let template = Template::compile("").unwrap();
        assert!(template.is_empty());
        assert!(template.literals().is_empty());
    }

    #[test]
    fn test_plain_text_is_one_literal() {
        let template = Template::compile("just text, no directives").unwrap();
        assert_eq!(template.tokens(), &[Token::Literal]);
        assert_eq!(template.literals(), &["just text, no directives"]);
    }

    #[test]
    fn test_percent_escape() {
        let template = Template::compile("100%% done").unwrap();
        assert_eq!(template.tokens(), &[Token::Literal]);
        assert_eq!(template.literals(), &["100% done"]);

        let template = Template::compile("%%").unwrap();
        assert_eq!(template.literals(), &["%"]);
    }

    #[test]
    fn test_full_directive_table() {
        let template = Template::compile("%l%L%c%h%H%m%s%d%M%y%Y%p%P").unwrap();
        assert_eq!(
            template.tokens(),
            &[
                Token::LevelPrefix,
                Token::Message,
                Token::CTimeString,
                Token::Hour12,
                Token::Hour24,
                Token::Minute,
                Token::Second,
                Token::Day,
                Token::Month,
                Token::Year2,
                Token::Year4,
                Token::MonotonicSeconds,
                Token::WallClockSeconds,
            ]
        );
        assert!(template.literals().is_empty());
    }

    #[test]
    fn test_invalid_directive() {
        let err = Template::compile("ok %q").unwrap_err();
        assert_eq!(
            err,
            CompileError::InvalidDirective {
                directive: 'q',
                position: 3
            }
        );
    }

    #[test]
    fn test_trailing_percent_is_dropped() {
        let template = Template::compile("abc%").unwrap();
        assert_eq!(template.tokens(), &[Token::Literal]);
        assert_eq!(template.literals(), &["abc"]);
    }

    #[test]
    fn test_space_directive() {
        // no pending literal: a separator token
        let template = Template::compile("%l% %L").unwrap();
        assert_eq!(
            template.tokens(),
            &[Token::LevelPrefix, Token::Space, Token::Message]
        );

        // mid-literal: plain text
        let template = Template::compile("a% b").unwrap();
        assert_eq!(template.tokens(), &[Token::Literal]);
        assert_eq!(template.literals(), &["a b"]);
    }

    #[test]
    fn test_literal_flushed_before_directive() {
        let template = Template::compile("[%l] %L!").unwrap();
        assert_eq!(
            template.tokens(),
            &[
                Token::Literal,
                Token::LevelPrefix,
                Token::Literal,
                Token::Message,
                Token::Literal
            ]
        );
        assert_eq!(template.literals(), &["[", "] ", "!"]);
    }

    #[test]
    fn test_literal_limit() {
        let at_limit = "x".repeat(MAX_LITERAL_LEN);
        assert!(Template::compile(&at_limit).is_ok());

        let over = format!("%l{}", "x".repeat(MAX_LITERAL_LEN + 1));
        assert_eq!(
            Template::compile(&over).unwrap_err(),
            CompileError::LiteralTooLarge {
                position: 2,
                max: MAX_LITERAL_LEN
            }
        );

        // the limit applies per fragment
        let split = format!("{}%L{}", "x".repeat(400), "y".repeat(400));
        assert!(Template::compile(&split).is_ok());
    }

    #[test]
    fn test_parts_pair_literals_in_order() {
        let template = Template::compile("a%lb%Lc").unwrap();
        let parts: Vec<_> = template.parts().collect();
        assert_eq!(
            parts,
            vec![
                Part::Literal("a"),
                Part::Token(Token::LevelPrefix),
                Part::Literal("b"),
                Part::Token(Token::Message),
                Part::Literal("c"),
            ]
        );
    }

    #[test]
    fn test_from_str_and_source() {
        let template: Template = "%H:%m".parse().unwrap();
        assert_eq!(template.source(), "%H:%m");
        assert!(!template.has_message());
    }
}
