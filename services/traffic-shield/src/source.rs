//! Injectable randomness, clock and id generation
//!
//! The simulator never calls the system clock or a global RNG directly.
//! Production code uses [`StdRandomSource`] and [`SystemClock`]; tests
//! substitute scripted values.

use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Source of uniform draws in `[0, 1)`
pub trait RandomSource: Send {
    /// Next uniform draw in `[0, 1)`
    fn next_f64(&mut self) -> f64;

    /// Uniform integer in `[low, low + span)`
    fn uniform_int(&mut self, low: u32, span: u32) -> u32 {
        let offset = (self.next_f64() * f64::from(span)).floor() as u32;
        low + offset.min(span.saturating_sub(1))
    }

    /// `len` random lowercase hex digits
    fn hex_string(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| HEX_DIGITS[self.uniform_int(0, 16) as usize] as char)
            .collect()
    }
}

/// Random source backed by `rand`'s standard RNG
#[derive(Debug)]
pub struct StdRandomSource {
    rng: StdRng,
}

impl StdRandomSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic source for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for StdRandomSource {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Wall-clock time
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Clock reading the system time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Local time-of-day rendering used for record timestamps
pub fn format_time_of_day(now: &DateTime<Local>) -> String {
    now.format("%H:%M:%S").to_string()
}

/// Timestamp-derived ids that never repeat
///
/// Ids follow epoch milliseconds, bumped past the previous id when two
/// records are created within the same millisecond.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, now: &DateTime<Local>) -> u64 {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        self.last = millis.max(self.last + 1);
        self.last
    }

    pub fn last_id(&self) -> u64 {
        self.last
    }
}
