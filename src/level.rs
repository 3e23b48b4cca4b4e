//! Log level descriptors and the registry that mints new ones.
//!
//! Every level owns a single bit. A stream's suppression mask is checked
//! against that bit, so levels can be switched off in groups by or-ing their
//! ids together.

use std::borrow::Cow;

use lazy_static::lazy_static;
use parking_lot::Mutex;

use crate::color::Color;
use crate::error::LevelError;

/// Mask value that lets every level through.
pub const SUPPRESS_NOTHING: u32 = 0;

/// First bit handed out by a fresh [`LevelRegistry`], one above the
/// built-in levels.
const FIRST_CUSTOM_BIT: u32 = 1 << 5;

/// An immutable severity class: display prefix, color, unique bit and
/// whether masks may silence it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Level {
    prefix: Cow<'static, str>,
    color: Color,
    id: u32,
    unsuppressible: bool,
}

impl Level {
    pub const MESSAGE: Level = Level::builtin("Message", Color::White, 1, false);
    pub const WARNING: Level = Level::builtin("Warning", Color::Yellow, 1 << 1, false);
    pub const ERROR: Level = Level::builtin("Error", Color::Red, 1 << 2, false);
    pub const DEBUG: Level = Level::builtin("Debug", Color::White, 1 << 3, false);
    pub const FATAL: Level = Level::builtin("Fatal", Color::Red, 1 << 4, true);

    const fn builtin(prefix: &'static str, color: Color, id: u32, unsuppressible: bool) -> Self {
        Self {
            prefix: Cow::Borrowed(prefix),
            color,
            id,
            unsuppressible,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// The single bit identifying this level.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn is_unsuppressible(&self) -> bool {
        self.unsuppressible
    }

    /// Returns true if `mask` silences this level.
    ///
    /// ```
    /// # use patternlog::Level;
    /// assert!(Level::DEBUG.is_suppressed_by(Level::DEBUG.id()));
    /// assert!(!Level::ERROR.is_suppressed_by(Level::DEBUG.id()));
    /// assert!(!Level::FATAL.is_suppressed_by(u32::MAX));
    /// ```
    pub fn is_suppressed_by(&self, mask: u32) -> bool {
        mask & self.id != 0 && !self.unsuppressible
    }
}

/// Hands out level bits above the built-in ones.
///
/// Minting takes `&mut self`, so a registry shared between threads has to
/// sit behind a lock; [`register_level`] does exactly that for the
/// process-wide one.
#[derive(Debug)]
pub struct LevelRegistry {
    next_bit: u32,
}

impl LevelRegistry {
    pub const fn new() -> Self {
        Self {
            next_bit: FIRST_CUSTOM_BIT,
        }
    }

    /// Mints a new level with the next unused bit.
    ///
    /// # Errors
    ///
    /// [`LevelError::Exhausted`] once all 32 bits are taken.
    ///
    /// # Examples
    ///
    /// ```
    /// # use patternlog::{Color, LevelRegistry};
    /// let mut registry = LevelRegistry::new();
    /// let audit = registry.new_level("Audit", Color::Yellow, true).unwrap();
    /// let trace = registry.new_level("Trace", Color::White, false).unwrap();
    ///
    /// assert_eq!(audit.id() << 1, trace.id());
    /// assert!(audit.is_unsuppressible());
    /// ```
    pub fn new_level(
        &mut self,
        prefix: impl Into<Cow<'static, str>>,
        color: Color,
        unsuppressible: bool,
    ) -> Result<Level, LevelError> {
        if self.next_bit == 0 {
            return Err(LevelError::Exhausted);
        }
        let id = self.next_bit;
        self.next_bit = id.checked_shl(1).filter(|bit| *bit != 0).unwrap_or(0);

        Ok(Level {
            prefix: prefix.into(),
            color,
            id,
            unsuppressible,
        })
    }

    /// Number of bits still available.
    pub fn remaining(&self) -> u32 {
        if self.next_bit == 0 {
            0
        } else {
            u32::BITS - self.next_bit.trailing_zeros()
        }
    }
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    static ref GLOBAL_REGISTRY: Mutex<LevelRegistry> = Mutex::new(LevelRegistry::new());
}

/// Mints a level from the process-wide registry.
///
/// Ids handed out here never collide with each other, but a private
/// [`LevelRegistry`] starts from the same first bit and can collide with
/// them. Stick to one or the other within a stream.
pub fn register_level(
    prefix: impl Into<Cow<'static, str>>,
    color: Color,
    unsuppressible: bool,
) -> Result<Level, LevelError> {
    GLOBAL_REGISTRY.lock().new_level(prefix, color, unsuppressible)
}
