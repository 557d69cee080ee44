//! Ticks, timeouts and their conversion to milliseconds.

/// Scheduler tick counter. Wraps around; measure spans with [`ticks_elapsed`].
pub type Tick = u32;

/// Millisecond value meaning "do not block".
pub const NO_WAIT: u32 = 0;

/// Millisecond value meaning "block until the operation can complete".
pub const WAIT_FOREVER: u32 = u32::MAX;

/// Bound on a blocking PAL call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Timeout {
    NoWait,
    Millis(u32),
    Forever,
}

impl Timeout {
    /// Maps the millisecond sentinels: [`NO_WAIT`] ⇒ `NoWait`,
    /// [`WAIT_FOREVER`] ⇒ `Forever`.
    #[must_use]
    pub const fn from_ms(ms: u32) -> Self {
        match ms {
            NO_WAIT => Self::NoWait,
            WAIT_FOREVER => Self::Forever,
            ms => Self::Millis(ms),
        }
    }

    /// Length of the wait in ticks, `None` for `Forever`.
    ///
    /// A non-zero wait always lasts at least one tick.
    #[must_use]
    pub const fn to_ticks(self, rate_hz: u32) -> Option<Tick> {
        match self {
            Self::NoWait | Self::Millis(0) => Some(0),
            Self::Millis(ms) => {
                let t = ms_to_ticks(ms, rate_hz);
                Some(if t == 0 { 1 } else { t })
            }
            Self::Forever => None,
        }
    }

    #[must_use]
    pub const fn is_forever(self) -> bool {
        matches!(self, Self::Forever)
    }
}

impl From<u32> for Timeout {
    fn from(ms: u32) -> Self {
        Self::from_ms(ms)
    }
}

/// Truncating conversion, saturating at `Tick::MAX`.
#[must_use]
pub const fn ms_to_ticks(ms: u32, rate_hz: u32) -> Tick {
    let t = ms as u64 * rate_hz as u64 / 1000;
    if t > Tick::MAX as u64 { Tick::MAX } else { t as Tick }
}

/// Truncating conversion, saturating at `u32::MAX`.
#[must_use]
pub const fn ticks_to_ms(ticks: Tick, rate_hz: u32) -> u32 {
    if rate_hz == 0 {
        return 0;
    }
    let ms = ticks as u64 * 1000 / rate_hz as u64;
    if ms > u32::MAX as u64 { u32::MAX } else { ms as u32 }
}

/// Whether at least `span` ticks have passed between `since` and `now`.
///
/// Holds for any span up to `Tick::MAX` as long as `now` is sampled
/// before the counter laps `since`.
#[inline]
#[must_use]
pub const fn ticks_elapsed(now: Tick, since: Tick, span: Tick) -> bool {
    now.wrapping_sub(since) >= span
}
