//! High-level API for running a script-following session.
//!
//! We expose a single, ergonomic entry point (`Session`) that wraps the lower-level
//! matching, tracking, and scroll-following logic.
//!
//! The intent is:
//! - We tokenize and index the script once (per load).
//! - We reuse the matcher, tracker, and follower across the whole session.
//! - Hosts feed `TranscriptEvent`s as they arrive and call `tick` from their own frame
//!   driver; everything else is wiring.
//!
//! All state mutation happens on the caller's thread: the session is the single writer of
//! the confirmed position, and observers run synchronously inside the call that produced
//! their event. Hosts on multithreaded runtimes serialize calls onto one event loop.

use tracing::info;

use crate::error::Result;
use crate::follower::{FollowMode, Layout, LinearLayout, ScrollFollower, ScrollFrame};
use crate::matcher::Matcher;
use crate::opts::EngineOpts;
use crate::script::Script;
use crate::tracker::{PositionEvent, PositionTracker, TrackAction};
use crate::transcript::{InterimThrottle, TranscriptEvent};

/// Handle returned by the `on_*` subscription methods; pass it back to
/// [`Session::unsubscribe`] to remove the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

enum Observer {
    Position(Box<dyn FnMut(&PositionEvent)>),
    Frame(Box<dyn FnMut(&ScrollFrame)>),
    ModeChange(Box<dyn FnMut(FollowMode)>),
}

/// A complete voice-following session over one script.
///
/// `Session` owns the long-lived parts:
/// - the tokenized `Script` and the `Matcher` over it
/// - the `PositionTracker` (single writer of the confirmed position)
/// - the `ScrollFollower` and its animation state
///
/// Typical usage:
/// - Construct once per script.
/// - Call `on_transcript` from the recognizer callback.
/// - Call `tick` from the host's animation driver and render the returned frame.
pub struct Session<L: Layout = LinearLayout> {
    script: Script,
    matcher: Matcher,
    tracker: PositionTracker,
    follower: ScrollFollower<L>,
    throttle: InterimThrottle,
    observers: Vec<(u64, Observer)>,
    next_observer_id: u64,
}

impl Session<LinearLayout> {
    /// Create a session with the built-in [`LinearLayout`] geometry.
    pub fn new(script_text: &str, opts: EngineOpts) -> Result<Self> {
        let follower = ScrollFollower::new(opts.follower);
        Self::build(script_text, opts, follower)
    }
}

impl<L: Layout> Session<L> {
    /// Create a session with host-measured geometry.
    pub fn with_layout(script_text: &str, opts: EngineOpts, layout: L) -> Result<Self> {
        let follower = ScrollFollower::with_layout(opts.follower, layout);
        Self::build(script_text, opts, follower)
    }

    fn build(script_text: &str, opts: EngineOpts, follower: ScrollFollower<L>) -> Result<Self> {
        let script = Script::build(script_text)?;
        info!(words = script.len(), "session started");
        Ok(Self {
            matcher: Matcher::new(opts.matcher),
            tracker: PositionTracker::new(script.len(), opts.tracker),
            follower,
            throttle: InterimThrottle::default(),
            script,
            observers: Vec::new(),
            next_observer_id: 0,
        })
    }

    /// Replace the script. Rebuilds the word index and resets all tracking and animation
    /// state to the top.
    pub fn load_script(&mut self, script_text: &str) -> Result<()> {
        let script = Script::build(script_text)?;
        info!(words = script.len(), "script reloaded");
        self.tracker.reset(script.len());
        self.follower.reset();
        self.throttle = InterimThrottle::default();
        self.script = script;
        Ok(())
    }

    /// Feed one recognized fragment through matching and tracking.
    ///
    /// Returns `None` when the fragment was throttled (interim results arriving faster
    /// than the matching interval), otherwise the position event that was also delivered
    /// to subscribers. Degenerate fragments are never errors; they surface as
    /// `TrackAction::None`.
    pub fn on_transcript(&mut self, event: &TranscriptEvent) -> Option<PositionEvent> {
        if !self.throttle.admit(event) {
            return None;
        }

        let hint = self.tracker.confirmed_position() as isize;
        let matches = self.matcher.find(&self.script, &event.text, hint);
        let position_event = self.tracker.process(matches.best());

        if position_event.action == TrackAction::Advanced {
            let mode_before = self.follower.mode();
            self.follower
                .on_advance(position_event.confirmed, position_event.prev);
            if self.follower.mode() != mode_before {
                self.notify_mode_change(self.follower.mode());
            }
        }

        for (_, observer) in &mut self.observers {
            if let Observer::Position(callback) = observer {
                callback(&position_event);
            }
        }
        Some(position_event)
    }

    /// Advance the animation by `dt` seconds and produce the frame to display.
    ///
    /// Also drives the interim throttle and the hold timeout, so hosts only need one
    /// clock.
    pub fn tick(&mut self, dt: f64) -> ScrollFrame {
        self.throttle.advance(dt);

        let mode_before = self.follower.mode();
        let frame = self.follower.tick(dt);
        if frame.mode != mode_before {
            self.notify_mode_change(frame.mode);
        }

        for (_, observer) in &mut self.observers {
            if let Observer::Frame(callback) = observer {
                callback(&frame);
            }
        }
        frame
    }

    /// Subscribe to position events (one per admitted fragment).
    pub fn on_position(&mut self, callback: impl FnMut(&PositionEvent) + 'static) -> Subscription {
        self.subscribe(Observer::Position(Box::new(callback)))
    }

    /// Subscribe to scroll frames (one per tick).
    pub fn on_frame(&mut self, callback: impl FnMut(&ScrollFrame) + 'static) -> Subscription {
        self.subscribe(Observer::Frame(Box::new(callback)))
    }

    /// Subscribe to tracking/holding flips (badge and indicator UI).
    pub fn on_mode_change(&mut self, callback: impl FnMut(FollowMode) + 'static) -> Subscription {
        self.subscribe(Observer::ModeChange(Box::new(callback)))
    }

    /// Remove a previously registered observer. Unknown handles are ignored.
    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.observers.retain(|(id, _)| *id != subscription.0);
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn confirmed_position(&self) -> usize {
        self.tracker.confirmed_position()
    }

    pub fn mode(&self) -> FollowMode {
        self.follower.mode()
    }

    /// Current smoothed speaking pace, words/sec.
    pub fn pace(&self) -> f32 {
        self.follower.pace()
    }

    /// Byte range of the confirmed word in the script text, for highlighting.
    pub fn highlight_range(&self) -> (usize, usize) {
        let position = self.tracker.confirmed_position();
        self.script.char_range(position, position)
    }

    fn subscribe(&mut self, observer: Observer) -> Subscription {
        let id = self.next_observer_id;
        self.next_observer_id += 1;
        self.observers.push((id, observer));
        Subscription(id)
    }

    fn notify_mode_change(&mut self, mode: FollowMode) {
        for (_, observer) in &mut self.observers {
            if let Observer::ModeChange(callback) = observer {
                callback(mode);
            }
        }
    }
}
