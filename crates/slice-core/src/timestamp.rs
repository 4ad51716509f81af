//! Monotonic modification times.
//!
//! Every cached artifact of the pipeline (resliced layers, glyphs, the
//! composite, scene nodes) records the [`TimeStamp`] of its last effective
//! change. Stamps come from one process-wide counter, so comparing two
//! stamps tells which artifact was produced later regardless of which
//! object produced it.
//!
//! ```rust
//! use slice_core::TimeStamp;
//!
//! let a = TimeStamp::now();
//! let b = TimeStamp::now();
//! assert!(b > a);
//! assert!(TimeStamp::NEVER < a);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

static GLOBAL_TIME: AtomicU64 = AtomicU64::new(0);

/// A point on the global modification clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeStamp(u64);

impl TimeStamp {
    /// Older than every stamp handed out by [`TimeStamp::now`].
    pub const NEVER: Self = Self(0);

    /// Advances the global clock and returns the new time.
    #[inline]
    pub fn now() -> Self {
        Self(GLOBAL_TIME.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Sets this stamp to a fresh time.
    #[inline]
    pub fn modified(&mut self) {
        *self = Self::now();
    }

    /// Raw counter value.
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_monotonic() {
        let mut t = TimeStamp::NEVER;
        let before = TimeStamp::now();
        t.modified();
        assert!(t > before);
        assert!(t.value() > 0);
    }
}
