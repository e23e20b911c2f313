//! Transcript input types and interim-result throttling.

use serde::{Deserialize, Serialize};

/// One recognized-speech fragment from the recognition collaborator.
///
/// Interim fragments arrive rapidly and are revised in place by the recognizer; final
/// fragments are stable. Both feed matching — interim results are what make the follower
/// feel live — but callers typically throttle interim delivery through
/// [`InterimThrottle`] to bound matching frequency.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TranscriptEvent {
    pub text: String,
    pub is_final: bool,
}

impl TranscriptEvent {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn final_result(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// Rate-limits interim fragments so matching runs at a bounded frequency.
///
/// Final fragments are always admitted. Time comes from the same host-driven `advance`
/// deltas that drive the follower, so the throttle needs no wall clock.
#[derive(Debug, Clone)]
pub struct InterimThrottle {
    min_interval_seconds: f64,
    clock: f64,
    last_admitted: Option<f64>,
}

impl InterimThrottle {
    /// Default minimum spacing between admitted interim fragments.
    pub const DEFAULT_INTERVAL_SECONDS: f64 = 0.15;

    pub fn new(min_interval_seconds: f64) -> Self {
        Self {
            min_interval_seconds: min_interval_seconds.max(0.0),
            clock: 0.0,
            last_admitted: None,
        }
    }

    /// Advance the throttle clock by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.clock += dt;
        }
    }

    /// Whether `event` should be forwarded to matching right now.
    pub fn admit(&mut self, event: &TranscriptEvent) -> bool {
        if event.is_final {
            // Finals reset the window too: an interim right after a final adds nothing.
            self.last_admitted = Some(self.clock);
            return true;
        }
        match self.last_admitted {
            Some(last) if self.clock - last < self.min_interval_seconds => false,
            _ => {
                self.last_admitted = Some(self.clock);
                true
            }
        }
    }
}

impl Default for InterimThrottle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interims_are_spaced_and_finals_always_pass() {
        let mut throttle = InterimThrottle::default();
        let interim = TranscriptEvent::interim("seven years");
        let final_event = TranscriptEvent::final_result("seven years ago");

        assert!(throttle.admit(&interim));
        throttle.advance(0.05);
        assert!(!throttle.admit(&interim));
        assert!(throttle.admit(&final_event));

        throttle.advance(0.2);
        assert!(throttle.admit(&interim));
    }

    #[test]
    fn zero_interval_admits_everything() {
        let mut throttle = InterimThrottle::new(0.0);
        let interim = TranscriptEvent::interim("a");
        assert!(throttle.admit(&interim));
        assert!(throttle.admit(&interim));
    }
}
