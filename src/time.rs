//! Verification-time reconstruction.
//!
//! Certificate matching has no trustworthy "current time": the image may
//! have been signed years ago with a certificate that has since expired. The
//! engine instead reconstructs a plausible instant by intersecting the
//! validity periods of the certificates embedded in the signature blob,
//! collapsing toward an asserted signing time when one is present, and
//! verifying at the midpoint of whatever window remains.

use std::time::{SystemTime, UNIX_EPOCH};
use x509_cert::time::Time;

/// Source of the ambient current time, reified so tests can fix it.
pub trait Clock {
    /// Seconds since the Unix epoch.
    fn now_unix(&self) -> i64;
}

/// [`Clock`] backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => -(e.duration().as_secs() as i64),
        }
    }
}

/// A mutable validity window, narrowed monotonically while reconciling
/// certificate validity periods with a signing-time claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    /// Latest not-before seen so far (seconds since the Unix epoch).
    pub not_before: i64,
    /// Earliest not-after seen so far.
    pub not_after: i64,
}

impl ValidityWindow {
    /// The widest representable window, the seed before any intersection.
    pub const WIDEST: Self = Self {
        not_before: 0,
        not_after: i64::MAX,
    };

    /// Intersect with one certificate's validity period.
    pub fn intersect(&mut self, not_before: i64, not_after: i64) {
        if self.not_before < not_before {
            self.not_before = not_before;
        }
        if self.not_after > not_after {
            self.not_after = not_after;
        }
    }

    /// Collapse the window toward an asserted signing time: the low bound is
    /// raised to at least `signing_time` and the high bound lowered to at
    /// most `signing_time`. A signing time inside the window collapses it to
    /// a single point; one outside it inverts the window.
    pub fn collapse_to(&mut self, signing_time: i64) {
        if self.not_before < signing_time {
            self.not_before = signing_time;
        }
        if self.not_after > signing_time {
            self.not_after = signing_time;
        }
    }

    /// True when the bounds have crossed.
    pub fn is_inverted(&self) -> bool {
        self.not_after < self.not_before
    }

    /// Midpoint of the window, computed as a sum of halves so the widest
    /// window cannot overflow. Inverted windows still produce a best-effort
    /// instant.
    pub fn midpoint(&self) -> i64 {
        self.not_before / 2 + self.not_after / 2
    }
}

/// Convert an X.509 `Time` (UTCTime or GeneralizedTime) to seconds since the
/// Unix epoch.
pub fn x509_time_to_unix(time: &Time) -> i64 {
    let dt = match time {
        Time::UtcTime(t) => t.to_date_time(),
        Time::GeneralTime(t) => t.to_date_time(),
    };
    dt.unix_duration().as_secs() as i64
}
