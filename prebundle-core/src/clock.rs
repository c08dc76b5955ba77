//! Monotonic Run Clock
//!
//! All stage timestamps are `f64` milliseconds relative to the clock's
//! anchor, read from `std::time::Instant`. Wall-clock time is never used:
//! readings must stay monotonic even across system clock adjustments so
//! that every stage duration is non-negative.

use std::time::Instant;

/// Monotonic millisecond clock anchored at construction.
///
/// One clock lives for the duration of a prebundling run; every file
/// pipeline reads timestamps from the same anchor so traces from
/// concurrently processed files are directly comparable.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    anchor: Instant,
}

impl Clock {
    /// Anchor a new clock at the current instant.
    pub fn start() -> Self {
        Self {
            anchor: Instant::now(),
        }
    }

    /// Milliseconds elapsed since the anchor.
    ///
    /// Non-suspending and cheap; safe to call immediately around await
    /// points without perturbing the interval being measured.
    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.anchor.elapsed().as_secs_f64() * 1_000.0
    }
}
