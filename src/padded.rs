//! Zero-padded decimal formatting without heap allocation.
//!
//! Digits are produced least-significant first into a fixed on-stack buffer,
//! padded with `'0'` up to the requested width, then reversed in place.

/// Widest value a `u64` can need (20 digits) plus a sign.
const CAP: usize = 21;

/// A formatted integer living on the stack.
#[derive(Clone, Copy)]
pub struct Padded {
    buf: [u8; CAP],
    len: usize,
}

impl Padded {
    /// Formats `n` with at least `width` digits.
    ///
    /// A width of 0 means natural length. Widths beyond the buffer are
    /// clamped.
    ///
    /// ```
    /// # use patternlog::padded::Padded;
    /// assert_eq!(Padded::new(0, 2).as_str(), "00");
    /// assert_eq!(Padded::new(5, 0).as_str(), "5");
    /// assert_eq!(Padded::new(2024, 2).as_str(), "2024");
    /// ```
    pub fn new(mut n: u64, width: usize) -> Self {
        let width = width.min(CAP - 1);
        let mut buf = [0u8; CAP];
        let mut len = 0;

        if n == 0 {
            buf[0] = b'0';
            len = 1;
        }
        while n > 0 {
            buf[len] = b'0' + (n % 10) as u8;
            n /= 10;
            len += 1;
        }
        while len < width {
            buf[len] = b'0';
            len += 1;
        }
        buf[..len].reverse();

        Self { buf, len }
    }

    /// Formats a signed value; negative numbers get a leading `-` ahead of
    /// the padded magnitude.
    pub fn signed(n: i64, width: usize) -> Self {
        if n >= 0 {
            return Self::new(n as u64, width);
        }
        let magnitude = Self::new(n.unsigned_abs(), width.min(CAP - 2));
        let mut buf = [0u8; CAP];
        buf[0] = b'-';
        buf[1..=magnitude.len].copy_from_slice(magnitude.as_bytes());
        Self {
            buf,
            len: magnitude.len + 1,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII digits and '-' are ever written.
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }
}

impl std::fmt::Debug for Padded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Padded").field(&self.as_str()).finish()
    }
}
