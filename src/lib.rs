//! `prompter` — a voice-to-script alignment and following engine.
//!
//! This crate turns a noisy, partial stream of recognized speech fragments into a single
//! trustworthy "what word is the speaker on now" position inside a fixed script, then
//! drives a smoothly animated, speed-adaptive scroll so the display tracks the speaker.
//!
//! It provides:
//! - Script tokenization with per-word highlight offsets
//! - Window-bounded fuzzy matching of spoken fragments
//! - A confirmation-streak protocol that resists false jumps
//! - Pace-adaptive scroll animation with a tracking/holding state machine
//!
//! The crate performs no speech recognition and no rendering: recognizers feed
//! `TranscriptEvent`s in, hosts drive `tick` from their own frame loop and render the
//! returned `ScrollFrame`s. The worst observable failure is a paused scroll, which
//! self-heals once corroborating matches resume.

// High-level API (most consumers should start here).
pub mod opts;
pub mod session;

// Script tokenization and the immutable word index.
pub mod script;

// Alignment core: candidate matching and position arbitration.
pub mod matcher;
pub mod tracker;

// Scroll animation and pace following.
pub mod follower;

// Transcript input types and throttling.
pub mod transcript;

// Crate-wide error type.
pub mod error;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;
