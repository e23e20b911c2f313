//! Confirmed-position arbitration over noisy match candidates.
//!
//! The tracker is the single writer of the confirmed reading position. Nearby candidates
//! advance it immediately; distant candidates (skips) are held in an exploring sub-state
//! until a streak of corroborating candidates accumulates. A single spurious fuzzy match
//! can therefore never move the visible position, while a genuine reread or jump promotes
//! once enough evidence arrives.

use serde::Serialize;
use tracing::debug;

use crate::matcher::MatchCandidate;
use crate::opts::TrackerOpts;

/// What one processed candidate did to the confirmed position.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrackAction {
    /// The confirmed position moved (ordinary reading, or a promoted skip).
    Advanced,
    /// A skip candidate is being corroborated; the confirmed position is unchanged.
    Exploring,
    /// Nothing usable: absent candidate, below quality, or no effect.
    None,
}

/// The outcome of processing one candidate, for highlighting/UI collaborators.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct PositionEvent {
    pub action: TrackAction,
    pub confirmed: usize,
    pub prev: usize,
}

/// Which way an exploration is pointing relative to the confirmed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// A provisional skip being corroborated.
#[derive(Debug, Clone, Copy)]
struct Exploration {
    /// The prospective position. Re-anchored to the latest corroborating candidate so a
    /// promotion lands on current evidence, not the first sighting.
    position: usize,
    direction: Direction,
    streak: u32,
}

/// Stateful arbiter converting a stream of match candidates into a confirmed reading
/// position. Lives for the whole session; there is no terminal state.
#[derive(Debug)]
pub struct PositionTracker {
    opts: TrackerOpts,
    script_len: usize,
    confirmed: usize,
    exploration: Option<Exploration>,
}

impl PositionTracker {
    pub fn new(script_len: usize, opts: TrackerOpts) -> Self {
        Self {
            opts,
            script_len: script_len.max(1),
            confirmed: 0,
            exploration: None,
        }
    }

    /// The script word-index accepted as currently being spoken.
    pub fn confirmed_position(&self) -> usize {
        self.confirmed
    }

    /// Whether a skip is currently being corroborated.
    pub fn is_exploring(&self) -> bool {
        self.exploration.is_some()
    }

    /// Reset to the start of a (possibly different) script.
    pub fn reset(&mut self, script_len: usize) {
        self.script_len = script_len.max(1);
        self.confirmed = 0;
        self.exploration = None;
    }

    /// Process the best candidate from one matching call.
    ///
    /// This is the only way the confirmed position changes. The returned event reports
    /// the position before and after, so consumers never have to track it themselves.
    pub fn process(&mut self, candidate: Option<&MatchCandidate>) -> PositionEvent {
        let prev = self.confirmed;

        let Some(candidate) = candidate else {
            return self.event(TrackAction::None, prev);
        };
        if candidate.match_quality < self.opts.min_quality {
            return self.event(TrackAction::None, prev);
        }

        let position = candidate.position().min(self.script_len - 1);

        if position.abs_diff(self.confirmed) <= self.opts.nearby_threshold {
            // Ordinary reading or small drift. Any in-progress exploration was a false
            // alarm: the speaker is still where we thought.
            self.exploration = None;
            self.confirmed = position;
            return self.event(TrackAction::Advanced, prev);
        }

        // A skip. Corroborate before moving.
        let exploration = match self.exploration {
            Some(e) if position.abs_diff(e.position) <= self.opts.nearby_threshold => Exploration {
                position,
                direction: e.direction,
                streak: e.streak + 1,
            },
            _ => Exploration {
                position,
                direction: if position > self.confirmed {
                    Direction::Forward
                } else {
                    Direction::Backward
                },
                streak: 1,
            },
        };

        let required = match exploration.direction {
            Direction::Forward => self.opts.forward_confirm_streak,
            Direction::Backward => self.opts.backward_confirm_streak,
        };

        if exploration.streak >= required {
            debug!(
                from = prev,
                to = exploration.position,
                streak = exploration.streak,
                "skip confirmed"
            );
            self.exploration = None;
            self.confirmed = exploration.position;
            return self.event(TrackAction::Advanced, prev);
        }

        debug!(
            at = exploration.position,
            streak = exploration.streak,
            required,
            "exploring skip"
        );
        self.exploration = Some(exploration);
        self.event(TrackAction::Exploring, prev)
    }

    fn event(&self, action: TrackAction, prev: usize) -> PositionEvent {
        PositionEvent {
            action,
            confirmed: self.confirmed,
            prev,
        }
    }
}
