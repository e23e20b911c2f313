//! Smooth, speed-adaptive scroll following of the confirmed position.
//!
//! The follower is purely reactive: it never decides where the speaker is, it only
//! consumes `on_advance` notifications and a host-driven `tick(dt)`. Time is derived
//! entirely from accumulated tick deltas, so the animation is independent of the driving
//! mechanism (timer, vsync, game loop) and deterministic under test.

use serde::Serialize;
use tracing::debug;

use crate::opts::FollowerOpts;

/// EWMA weight kept by the previous pace estimate; the new sample gets the rest.
const PACE_RETENTION: f32 = 0.7;

/// Maps script positions to scroll geometry.
///
/// The engine does not render anything; the host supplies measured geometry through this
/// seam. [`LinearLayout`] is a simple built-in implementation for headless use and tests.
pub trait Layout {
    /// Document offset (pixels from the top) of the given word.
    fn word_offset(&self, index: usize) -> f32;

    /// Height of the visible viewport in pixels.
    fn viewport_height(&self) -> f32;
}

/// Uniform-grid layout: a fixed number of words per line, a fixed line height.
///
/// Real hosts with proportional fonts should implement [`Layout`] against their measured
/// line boxes instead.
#[derive(Debug, Clone, Copy)]
pub struct LinearLayout {
    pub words_per_line: usize,
    pub line_height: f32,
    pub viewport_height: f32,
}

impl Default for LinearLayout {
    fn default() -> Self {
        Self {
            words_per_line: 8,
            line_height: 48.0,
            viewport_height: 800.0,
        }
    }
}

impl Layout for LinearLayout {
    fn word_offset(&self, index: usize) -> f32 {
        let line = index / self.words_per_line.max(1);
        line as f32 * self.line_height
    }

    fn viewport_height(&self) -> f32 {
        self.viewport_height
    }
}

/// Whether the follower is actively chasing the speaker or paused on silence.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FollowMode {
    Tracking,
    Holding,
}

/// One frame of scroll output, emitted per tick for the rendering collaborator.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct ScrollFrame {
    pub offset: f32,
    pub mode: FollowMode,
}

/// Converts confirmed-position advances into a continuously animated scroll offset.
#[derive(Debug)]
pub struct ScrollFollower<L: Layout = LinearLayout> {
    opts: FollowerOpts,
    layout: L,

    target_offset: f32,
    current_offset: f32,

    /// Smoothed speaking pace, words/sec, clamped to `[min_pace, max_pace]`.
    pace: f32,
    mode: FollowMode,
    jump_boost: bool,

    /// Session clock, accumulated from tick deltas.
    clock: f64,
    /// Clock reading at the most recent advance (session start counts as one).
    last_advance_clock: f64,
}

impl ScrollFollower<LinearLayout> {
    pub fn new(opts: FollowerOpts) -> Self {
        let layout = LinearLayout {
            viewport_height: opts.viewport_height,
            ..LinearLayout::default()
        };
        Self::with_layout(opts, layout)
    }
}

impl<L: Layout> ScrollFollower<L> {
    pub fn with_layout(opts: FollowerOpts, layout: L) -> Self {
        let pace = opts.pace_baseline.clamp(opts.min_pace, opts.max_pace);
        Self {
            opts,
            layout,
            target_offset: 0.0,
            current_offset: 0.0,
            pace,
            mode: FollowMode::Tracking,
            jump_boost: false,
            clock: 0.0,
            last_advance_clock: 0.0,
        }
    }

    pub fn mode(&self) -> FollowMode {
        self.mode
    }

    /// Current smoothed pace in words/sec.
    pub fn pace(&self) -> f32 {
        self.pace
    }

    pub fn current_offset(&self) -> f32 {
        self.current_offset
    }

    pub fn target_offset(&self) -> f32 {
        self.target_offset
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// Forget all animation state and return to the top of the document.
    pub fn reset(&mut self) {
        self.target_offset = 0.0;
        self.current_offset = 0.0;
        self.pace = self.opts.pace_baseline.clamp(self.opts.min_pace, self.opts.max_pace);
        self.mode = FollowMode::Tracking;
        self.jump_boost = false;
        self.clock = 0.0;
        self.last_advance_clock = 0.0;
    }

    /// React to a confirmed-position advance.
    ///
    /// Retargets the scroll so `new_position` sits on the caret line, folds the implied
    /// speaking pace into the EWMA, engages the jump boost for skip-sized advances, and
    /// resumes tracking if the follower was holding.
    pub fn on_advance(&mut self, new_position: usize, prev_position: usize) {
        self.target_offset = self.offset_for(new_position);

        // Pace sample. Pauses (long gaps) and non-forward deltas carry no pace signal.
        let elapsed = self.clock - self.last_advance_clock;
        if new_position > prev_position && elapsed > 0.0 && elapsed <= self.opts.pace_gap_seconds
        {
            let instant = (new_position - prev_position) as f32 / elapsed as f32;
            self.pace = (self.pace * PACE_RETENTION + instant * (1.0 - PACE_RETENTION))
                .clamp(self.opts.min_pace, self.opts.max_pace);
        }
        self.last_advance_clock = self.clock;

        if new_position.abs_diff(prev_position) > self.opts.nearby_threshold {
            // A confirmed skip: converge fast but visibly, not as a teleport.
            self.jump_boost = true;
        }

        if self.mode == FollowMode::Holding {
            debug!(position = new_position, "resuming tracking");
            self.mode = FollowMode::Tracking;
        }
    }

    /// Advance the animation by `dt` seconds and produce the frame to display.
    ///
    /// Exponential smoothing with a frame-rate-independent blend: applying two ticks of
    /// `dt/2` lands exactly where one tick of `dt` would.
    pub fn tick(&mut self, dt: f64) -> ScrollFrame {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.clock += dt;

        if self.mode == FollowMode::Tracking
            && self.clock - self.last_advance_clock >= self.opts.hold_timeout_seconds
        {
            debug!(
                idle_seconds = self.clock - self.last_advance_clock,
                "no advances, holding"
            );
            self.mode = FollowMode::Holding;
        }

        if self.mode == FollowMode::Tracking && dt > 0.0 {
            let blend = 1.0 - (-(self.speed() as f64) * dt).exp();
            self.current_offset += (self.target_offset - self.current_offset) * blend as f32;

            if self.jump_boost
                && (self.target_offset - self.current_offset).abs() <= self.opts.jump_epsilon
            {
                self.jump_boost = false;
            }
        }

        self.current_offset = sanitize_offset(self.current_offset);

        ScrollFrame {
            offset: self.current_offset,
            mode: self.mode,
        }
    }

    /// Smoothing speed for the current frame, in 1/seconds.
    fn speed(&self) -> f32 {
        if self.jump_boost {
            return self.opts.jump_speed;
        }
        let baseline = self.opts.pace_baseline.max(f32::EPSILON);
        self.opts.base_speed * (self.pace / baseline)
    }

    /// Scroll offset that places `index` on the caret line.
    fn offset_for(&self, index: usize) -> f32 {
        let caret = self.opts.caret_percent * self.layout.viewport_height();
        sanitize_offset(self.layout.word_offset(index) - caret)
    }
}

/// Unmeasured or broken geometry degrades to a pinned offset, never NaN or negative.
fn sanitize_offset(offset: f32) -> f32 {
    if offset.is_finite() { offset.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn follower() -> ScrollFollower<LinearLayout> {
        ScrollFollower::new(FollowerOpts::default())
    }

    /// A layout where every word is 10px apart, for easy arithmetic.
    #[derive(Debug, Clone, Copy)]
    struct FlatLayout;

    impl Layout for FlatLayout {
        fn word_offset(&self, index: usize) -> f32 {
            index as f32 * 10.0
        }

        fn viewport_height(&self) -> f32 {
            100.0
        }
    }

    fn flat_follower(opts: FollowerOpts) -> ScrollFollower<FlatLayout> {
        ScrollFollower::with_layout(opts, FlatLayout)
    }

    #[test]
    fn linear_layout_maps_lines() {
        let layout = LinearLayout::default();
        assert_eq!(layout.word_offset(0), 0.0);
        assert_eq!(layout.word_offset(7), 0.0);
        assert_eq!(layout.word_offset(8), 48.0);
        assert_eq!(layout.word_offset(80), 480.0);
    }

    #[test]
    fn ticks_converge_toward_target_without_overshoot() {
        let mut f = flat_follower(FollowerOpts::default());
        f.on_advance(10, 9);
        let target = f.target_offset();
        assert!(target > 0.0);

        let mut last = f.current_offset();
        for _ in 0..600 {
            let frame = f.tick(1.0 / 60.0);
            assert!(frame.offset >= last);
            assert!(frame.offset <= target);
            last = frame.offset;
        }
        assert!((last - target).abs() < 0.5);
    }

    #[test]
    fn smoothing_is_frame_rate_independent() {
        let opts = FollowerOpts::default();
        let mut coarse = flat_follower(opts);
        let mut fine = flat_follower(opts);
        coarse.on_advance(10, 9);
        fine.on_advance(10, 9);

        coarse.tick(0.1);
        for _ in 0..10 {
            fine.tick(0.01);
        }
        assert!((coarse.current_offset() - fine.current_offset()).abs() < 1e-3);
    }

    #[test]
    fn pace_never_exceeds_the_clamp() {
        let mut f = flat_follower(FollowerOpts::default());

        // 5 words every 0.1s = 50 words/sec instantaneous.
        let mut pos = 0usize;
        for _ in 0..100 {
            f.tick(0.1);
            f.on_advance(pos + 5, pos);
            pos += 5;
            assert!(f.pace() <= f.opts.max_pace + f32::EPSILON);
        }
        // The EWMA actually saturated at the clamp rather than hovering low.
        assert!((f.pace() - f.opts.max_pace).abs() < 1e-3);
    }

    #[test]
    fn pauses_and_backward_moves_are_not_pace_samples() {
        let mut f = flat_follower(FollowerOpts::default());
        let before = f.pace();

        // Long gap: elapsed exceeds pace_gap_seconds, so no sample.
        for _ in 0..50 {
            f.tick(0.1);
        }
        f.on_advance(40, 0);
        assert!((f.pace() - before).abs() < f32::EPSILON);

        // Backward delta: no sample.
        f.tick(0.1);
        f.on_advance(30, 40);
        assert!((f.pace() - before).abs() < f32::EPSILON);
    }

    #[test]
    fn holds_after_timeout_and_resumes_on_advance() {
        let mut f = flat_follower(FollowerOpts::default());
        f.on_advance(2, 1);

        // Stay under the timeout: still tracking.
        for _ in 0..49 {
            assert_eq!(f.tick(0.1).mode, FollowMode::Tracking);
        }
        // Cross 5s of silence: holding.
        let frame = f.tick(0.2);
        assert_eq!(frame.mode, FollowMode::Holding);

        let held = f.current_offset();
        let frame = f.tick(0.1);
        assert_eq!(frame.mode, FollowMode::Holding);
        assert!((frame.offset - held).abs() < f32::EPSILON);

        // The very next advance resumes tracking.
        f.on_advance(3, 2);
        assert_eq!(f.mode(), FollowMode::Tracking);
        assert_eq!(f.tick(0.1).mode, FollowMode::Tracking);
    }

    #[test]
    fn jump_boost_engages_and_reverts_after_convergence() {
        let opts = FollowerOpts::default();
        let mut boosted = flat_follower(opts);
        let mut plain = flat_follower(opts);

        // Same target distance; one arrives as a skip, one as a retarget of a nearby
        // advance. The skip must converge strictly faster.
        boosted.on_advance(80, 0);
        plain.on_advance(80, 75);
        assert!(boosted.jump_boost);
        assert!(!plain.jump_boost);

        boosted.tick(0.1);
        plain.tick(0.1);
        assert!(boosted.current_offset() > plain.current_offset());

        // Run the boosted follower until it converges; the boost must disengage.
        for _ in 0..100 {
            boosted.tick(0.1);
        }
        assert!(!boosted.jump_boost);
        assert!(
            (boosted.current_offset() - boosted.target_offset()).abs() <= opts.jump_epsilon
        );
    }

    #[test]
    fn degenerate_input_never_produces_nan_or_negative_offsets() {
        let zero_viewport = FollowerOpts {
            viewport_height: 0.0,
            ..FollowerOpts::default()
        };
        let mut f = ScrollFollower::with_layout(zero_viewport, FlatLayout);

        f.on_advance(0, 0);
        let frame = f.tick(f64::NAN);
        assert!(frame.offset.is_finite());
        assert!(frame.offset >= 0.0);

        let frame = f.tick(-1.0);
        assert!(frame.offset.is_finite());
        assert!(frame.offset >= 0.0);

        // Early words sit above the caret line; the target clamps to the document top.
        let mut f = follower();
        f.on_advance(1, 0);
        assert!(f.target_offset() >= 0.0);
    }

    #[test]
    fn reset_returns_to_the_top() {
        let mut f = flat_follower(FollowerOpts::default());
        f.on_advance(50, 0);
        for _ in 0..20 {
            f.tick(0.1);
        }
        assert!(f.current_offset() > 0.0);

        f.reset();
        assert_eq!(f.current_offset(), 0.0);
        assert_eq!(f.mode(), FollowMode::Tracking);
        assert_eq!(f.tick(0.1).offset, 0.0);
    }
}
