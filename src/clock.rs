//! Time sources for the date and time directives.
//!
//! Rendering takes one [`Snapshot`] per line so that every time-based field
//! in that line agrees with every other one.

use std::fmt;
use std::time::Instant;

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use lazy_static::lazy_static;

/// Resolution of [`get_ticks`].
pub const TICKS_PER_SECOND: u64 = 1_000_000_000;

lazy_static! {
    /// Reference point for `%p`. Fixed the first time anything asks for it,
    /// which [`mark_start`] lets a stream do at creation.
    static ref PROCESS_START: Instant = Instant::now();
}

/// Pins the monotonic reference point if nothing has done so yet.
pub fn mark_start() {
    lazy_static::initialize(&PROCESS_START);
}

/// Monotonic ticks elapsed since the reference point.
#[inline]
pub fn get_ticks() -> u64 {
    PROCESS_START.elapsed().as_nanos() as u64
}

/// Whole seconds elapsed since the reference point.
#[inline]
pub fn uptime_secs() -> u64 {
    get_ticks() / TICKS_PER_SECOND
}

/// One reading of the wall clock, the local calendar and the monotonic
/// clock.
///
/// # Examples
///
/// ```
/// # use patternlog::clock::Snapshot;
/// use chrono::NaiveDate;
///
/// let local = NaiveDate::from_ymd_opt(2021, 3, 7)
///     .unwrap()
///     .and_hms_opt(0, 5, 9)
///     .unwrap();
/// let snapshot = Snapshot::new(local, 1_615_075_509, 42);
///
/// assert_eq!(snapshot.hour12(), 12);
/// assert_eq!(snapshot.year2(), 21);
/// assert_eq!(snapshot.ctime().to_string(), "Sun Mar  7 00:05:09 2021");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    local: NaiveDateTime,
    epoch_secs: i64,
    uptime_secs: u64,
}

impl Snapshot {
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            local: now.naive_local(),
            epoch_secs: now.timestamp(),
            uptime_secs: uptime_secs(),
        }
    }

    /// Builds a snapshot from explicit readings.
    pub fn new(local: NaiveDateTime, epoch_secs: i64, uptime_secs: u64) -> Self {
        Self {
            local,
            epoch_secs,
            uptime_secs,
        }
    }

    pub fn hour24(&self) -> u32 {
        self.local.hour()
    }

    /// 12-hour clock hour, where midnight and noon are both 12.
    pub fn hour12(&self) -> u32 {
        match self.local.hour() % 12 {
            0 => 12,
            h => h,
        }
    }

    pub fn minute(&self) -> u32 {
        self.local.minute()
    }

    pub fn second(&self) -> u32 {
        self.local.second()
    }

    pub fn day(&self) -> u32 {
        self.local.day()
    }

    /// 1-based month.
    pub fn month(&self) -> u32 {
        self.local.month()
    }

    pub fn year(&self) -> i32 {
        self.local.year()
    }

    pub fn year2(&self) -> u32 {
        self.local.year().rem_euclid(100) as u32
    }

    pub fn epoch_secs(&self) -> i64 {
        self.epoch_secs
    }

    pub fn uptime_secs(&self) -> u64 {
        self.uptime_secs
    }

    /// `Www Mmm dd hh:mm:ss yyyy` with a space-padded day and no trailing
    /// newline.
    pub fn ctime(&self) -> impl fmt::Display + '_ {
        self.local.format("%a %b %e %H:%M:%S %Y")
    }
}
