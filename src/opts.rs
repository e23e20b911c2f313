//! Engine configuration.
//!
//! These structs represent *library-level configuration*, not CLI flags directly. The CLI
//! (or a host application's settings layer) is responsible for mapping user input into
//! these types so that:
//! - the library remains reusable outside of any particular frontend
//! - other frontends (APIs, tests, batch jobs) can construct options programmatically
//!
//! All fields are plain public data with `Default` impls carrying the calibrated defaults.
//! Everything derives `Deserialize` so hosts can load overrides from settings files.

use serde::Deserialize;

/// Default filler words stripped from spoken fragments before matching.
///
/// Recognizers transcribe these, but they carry no script-position information and dilute
/// the match window.
pub const DEFAULT_FILLERS: &[&str] = &["um", "uh", "uhm", "er", "ah", "like", "hmm"];

/// Options controlling candidate search and scoring in [`crate::matcher::Matcher`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatcherOpts {
    /// How many words on each side of the position hint to search.
    ///
    /// Matching cost is O(radius) regardless of script length; the full script is never
    /// scanned.
    pub radius: usize,

    /// Minimum run of consecutively matching words required to form a candidate.
    pub min_consecutive: usize,

    /// How many trailing fragment tokens to match against the script.
    ///
    /// Recognizers revise the start of an interim fragment more often than its end, so
    /// only the tail is trusted.
    pub window_size: usize,

    /// Weight of the distance penalty in the combined score.
    ///
    /// `combined = quality * (1 - distance_weight * min(1, distance / radius))`.
    pub distance_weight: f32,

    /// Minimum per-word similarity for a word to count as matching, and the minimum
    /// quality for a candidate to be reported at all.
    ///
    /// Similarity is normalized Levenshtein: `1 - lev(a, b) / max(len(a), len(b))`, with
    /// exact equality short-circuiting to 1.0.
    pub threshold: f32,

    /// Spoken tokens ignored during matching.
    pub fillers: Vec<String>,
}

impl Default for MatcherOpts {
    fn default() -> Self {
        Self {
            radius: 100,
            min_consecutive: 1,
            window_size: 3,
            distance_weight: 0.3,
            threshold: 0.3,
            fillers: DEFAULT_FILLERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Options controlling the confirmation protocol in [`crate::tracker::PositionTracker`].
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TrackerOpts {
    /// Candidates below this quality are ignored entirely.
    pub min_quality: f32,

    /// Distance (in words) within which a candidate counts as ordinary forward reading
    /// and advances the confirmed position immediately. Anything farther is a skip and
    /// must be corroborated. Also the corroboration band around an exploring position.
    pub nearby_threshold: usize,

    /// Consecutive corroborating candidates required to confirm a forward skip.
    pub forward_confirm_streak: u32,

    /// Consecutive corroborating candidates required to confirm a backward skip.
    ///
    /// Higher than forward: genuine rereads are rarer than spurious fuzzy matches behind
    /// the reader, so backward jumps demand more evidence.
    pub backward_confirm_streak: u32,
}

impl Default for TrackerOpts {
    fn default() -> Self {
        Self {
            min_quality: 0.3,
            nearby_threshold: 10,
            forward_confirm_streak: 4,
            backward_confirm_streak: 6,
        }
    }
}

/// Options controlling scroll animation in [`crate::follower::ScrollFollower`].
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct FollowerOpts {
    /// Vertical position of the caret line, as a fraction of viewport height from the top.
    pub caret_percent: f32,

    /// Seconds without an advance before the follower stops chasing and holds.
    pub hold_timeout_seconds: f64,

    /// Baseline smoothing speed at `pace_baseline` words/sec, in 1/seconds.
    pub base_speed: f32,

    /// Smoothing speed used while a confirmed skip converges.
    pub jump_speed: f32,

    /// Once a boosted jump is within this many pixels of its target, revert to
    /// pace-derived speed.
    pub jump_epsilon: f32,

    /// Advance distance (in words) beyond which the jump boost engages. Matches the
    /// tracker's `nearby_threshold` by default.
    pub nearby_threshold: usize,

    /// Lower clamp for the smoothed pace, words/sec.
    pub min_pace: f32,

    /// Upper clamp for the smoothed pace, words/sec.
    pub max_pace: f32,

    /// Pace (words/sec) at which the animation runs at exactly `base_speed`.
    pub pace_baseline: f32,

    /// Advances separated by more than this many seconds are pauses, not pace samples.
    pub pace_gap_seconds: f64,

    /// Viewport height in pixels, used with `caret_percent` to place the caret line.
    ///
    /// Hosts with a measured viewport should override this; the default only has to be
    /// sane, not accurate, because an unmeasured viewport degrades to slightly-off caret
    /// placement rather than failure.
    pub viewport_height: f32,
}

impl Default for FollowerOpts {
    fn default() -> Self {
        Self {
            caret_percent: 0.33,
            hold_timeout_seconds: 5.0,
            base_speed: 3.0,
            jump_speed: 12.0,
            jump_epsilon: 2.0,
            nearby_threshold: 10,
            min_pace: 0.5,
            max_pace: 10.0,
            pace_baseline: 2.5,
            pace_gap_seconds: 3.0,
            viewport_height: 800.0,
        }
    }
}

/// Top-level configuration for a [`crate::session::Session`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineOpts {
    pub matcher: MatcherOpts,
    pub tracker: TrackerOpts,
    pub follower: FollowerOpts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_calibration() {
        let opts = EngineOpts::default();
        assert_eq!(opts.matcher.radius, 100);
        assert_eq!(opts.matcher.window_size, 3);
        assert!((opts.matcher.distance_weight - 0.3).abs() < f32::EPSILON);
        assert_eq!(opts.tracker.nearby_threshold, 10);
        assert_eq!(opts.tracker.forward_confirm_streak, 4);
        assert_eq!(opts.tracker.backward_confirm_streak, 6);
        assert!((opts.follower.hold_timeout_seconds - 5.0).abs() < 1e-9);
        assert!((opts.follower.caret_percent - 0.33).abs() < f32::EPSILON);
    }

    #[test]
    fn backward_streak_exceeds_forward() {
        let opts = TrackerOpts::default();
        assert!(opts.backward_confirm_streak > opts.forward_confirm_streak);
    }

    #[test]
    fn partial_overrides_deserialize_over_defaults() {
        let json = r#"{ "matcher": { "radius": 40 }, "follower": { "caret_percent": 0.5 } }"#;
        let opts: EngineOpts = serde_json::from_str(json).expect("valid opts json");
        assert_eq!(opts.matcher.radius, 40);
        // Untouched fields keep their defaults.
        assert_eq!(opts.matcher.window_size, 3);
        assert!((opts.follower.caret_percent - 0.5).abs() < f32::EPSILON);
        assert_eq!(opts.tracker.forward_confirm_streak, 4);
    }
}
