//! Window-bounded fuzzy alignment of spoken fragments against the script.
//!
//! `Matcher::find` is pure and deterministic: for a fixed script, fragment, position hint,
//! and options it always produces the same ranked candidate list. It holds no state of its
//! own — all per-session state lives in the tracker and follower.

use tracing::trace;

use crate::opts::MatcherOpts;
use crate::script::{Script, tokenize_fragment};

/// Words whose lengths differ by more than this never match; skipping the edit-distance
/// computation for them keeps the window scan cheap.
const MAX_LEN_DIFF: usize = 5;

/// A scored candidate alignment of the spoken fragment inside the script.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    /// Index of the first script word covered by the match.
    pub start_index: usize,

    /// Index of the last script word covered by the match.
    pub end_index: usize,

    /// Coverage-weighted mean similarity of the matched run, in `[0, 1]`.
    pub match_quality: f32,

    /// Distance in words between `start_index` and the position hint.
    pub distance: usize,

    /// `match_quality` discounted by distance from the hint; the ranking key.
    pub combined_score: f32,
}

impl MatchCandidate {
    /// The script position this candidate implies the speaker is on: the last matched
    /// word, since the fragment tail is the most recently spoken audio.
    pub fn position(&self) -> usize {
        self.end_index
    }
}

/// The outcome of one matching call: all candidates that cleared the threshold, ranked
/// best-first.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    pub candidates: Vec<MatchCandidate>,
}

impl MatchResult {
    /// The highest-scoring candidate, if any cleared the threshold.
    pub fn best(&self) -> Option<&MatchCandidate> {
        self.candidates.first()
    }
}

/// Stateless candidate search over a bounded window around the position hint.
#[derive(Debug, Clone)]
pub struct Matcher {
    opts: MatcherOpts,
    fillers: Vec<String>,
}

impl Matcher {
    pub fn new(opts: MatcherOpts) -> Self {
        // Normalize the filler list once so per-fragment filtering is a plain comparison.
        let fillers = opts.fillers.iter().map(|f| f.to_lowercase()).collect();
        Self { opts, fillers }
    }

    pub fn opts(&self) -> &MatcherOpts {
        &self.opts
    }

    /// Find candidate alignments for `fragment` near `current_position`.
    ///
    /// Only `radius` words on each side of the (clamped) hint are searched, so cost is
    /// O(radius) regardless of script length. Empty or filler-only fragments yield an
    /// empty result, never an error.
    pub fn find(&self, script: &Script, fragment: &str, current_position: isize) -> MatchResult {
        let mut spoken = tokenize_fragment(fragment);
        spoken.retain(|t| !self.fillers.iter().any(|f| f == t));
        if spoken.len() > self.opts.window_size {
            // Recognizers revise the head of interim fragments far more than the tail, so
            // only the trailing window is trusted.
            spoken.drain(..spoken.len() - self.opts.window_size);
        }
        if spoken.is_empty() || script.is_empty() {
            return MatchResult::default();
        }

        let hint = script.clamp_index(current_position);
        let lo = hint.saturating_sub(self.opts.radius);
        let hi = (hint + self.opts.radius).min(script.len() - 1);

        let mut candidates = Vec::new();
        for start in lo..=hi {
            if let Some(candidate) = self.score_run(script, &spoken, start, hint) {
                candidates.push(candidate);
            }
        }

        // Rank best-first. Ties break toward the nearer, earlier candidate so the ordering
        // is total and repeated calls are bit-identical.
        candidates.sort_by(|a, b| {
            b.combined_score
                .total_cmp(&a.combined_score)
                .then(a.distance.cmp(&b.distance))
                .then(a.start_index.cmp(&b.start_index))
        });

        trace!(
            fragment_tokens = spoken.len(),
            hint,
            candidates = candidates.len(),
            best_index = candidates.first().map(|c| c.start_index),
            "matched fragment"
        );

        MatchResult { candidates }
    }

    /// Score the consecutive run of spoken tokens aligned at script word `start`.
    ///
    /// The run extends while each token clears the per-word similarity threshold; quality
    /// is the similarity sum over the *full* spoken window, so unmatched trailing tokens
    /// dilute a short run instead of being ignored.
    fn score_run(
        &self,
        script: &Script,
        spoken: &[String],
        start: usize,
        hint: usize,
    ) -> Option<MatchCandidate> {
        let mut matched = 0usize;
        let mut quality_sum = 0.0f32;

        for (k, token) in spoken.iter().enumerate() {
            let Some(word) = script.get(start + k) else {
                break;
            };
            let sim = word_similarity(token, &word.normalized);
            if sim <= self.opts.threshold {
                break;
            }
            matched += 1;
            quality_sum += sim;
        }

        if matched < self.opts.min_consecutive.max(1) {
            return None;
        }

        let match_quality = quality_sum / spoken.len() as f32;
        if match_quality <= self.opts.threshold {
            return None;
        }

        let distance = start.abs_diff(hint);
        let distance_penalty = (distance as f32 / self.opts.radius.max(1) as f32).min(1.0);
        let combined_score = match_quality * (1.0 - self.opts.distance_weight * distance_penalty);

        Some(MatchCandidate {
            start_index: start,
            end_index: start + matched - 1,
            match_quality,
            distance,
            combined_score,
        })
    }
}

/// Normalized similarity of a spoken token and a script word, in `[0, 1]`.
///
/// Exact equality short-circuits to 1.0; otherwise normalized Levenshtein,
/// `1 - lev(a, b) / max(len(a), len(b))`.
fn word_similarity(spoken: &str, script_word: &str) -> f32 {
    if spoken == script_word {
        return 1.0;
    }
    if spoken.is_empty() || script_word.is_empty() {
        return 0.0;
    }
    if spoken.len().abs_diff(script_word.len()) > MAX_LEN_DIFF {
        return 0.0;
    }

    let max_len = spoken.chars().count().max(script_word.chars().count());
    let dist = strsim::levenshtein(spoken, script_word);
    1.0 - dist as f32 / max_len as f32
}
