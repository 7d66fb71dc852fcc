//! Session state and the read-only view handed to front ends.
//!
//! DESIGN
//! ======
//! `SessionState` is owned by the `RoundEngine` and only mutated through its
//! commands. Front ends never see it directly; they receive `GameView`
//! snapshots, which are plain serializable data.

use serde::Serialize;

use crate::catalog::FlagEntry;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identity of one round. Every `begin_round` allocates a fresh id, so timers
/// armed for an earlier round can be recognized as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RoundId(pub u64);

/// What the deferred post-guess transition should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResolutionKind {
    /// Correct guess: move on to the next round.
    Advance,
    /// Wrong guess: end the session.
    End,
}

/// Token for the delayed transition scheduled after a guess. Only the token
/// matching the engine's pending resolution is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub round: RoundId,
    pub kind: ResolutionKind,
}

// =============================================================================
// PHASE / OUTCOMES
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    InRound,
    /// A guess was accepted; waiting out the feedback delay.
    RoundResolved,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Wrong,
    TimedOut,
    Exhausted,
    EmptyCatalog,
    Abandoned,
}

/// Which option was picked and which was right, for highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuessFeedback {
    pub chosen: String,
    pub correct: String,
    pub was_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryLinks {
    pub wikipedia: String,
    pub maps: String,
}

impl From<&FlagEntry> for EntryLinks {
    fn from(entry: &FlagEntry) -> Self {
        Self { wikipedia: entry.wikipedia_url(), maps: entry.maps_url() }
    }
}

/// End-of-session report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub final_score: u32,
    pub reason: EndReason,
    /// The target that was on screen when the session ended, if any.
    pub missed: Option<FlagEntry>,
    /// Learn-more links for `missed`.
    pub links: Option<EntryLinks>,
    pub correct: Vec<FlagEntry>,
}

// =============================================================================
// SESSION STATE
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub phase: Phase,
    /// Rounds begun this session, starting at 1.
    pub round: u32,
    pub current_target: Option<FlagEntry>,
    /// Option labels for the current round, already shuffled.
    pub options: Vec<String>,
    pub streak: u32,
    pub best_streak: u32,
    pub remaining_seconds: u32,
    pub feedback: Option<GuessFeedback>,
    pub summary: Option<Summary>,
}

impl SessionState {
    #[must_use]
    pub fn new(best_streak: u32, round_secs: u32) -> Self {
        Self { best_streak, remaining_seconds: round_secs, ..Self::default() }
    }
}

// =============================================================================
// VIEW
// =============================================================================

/// Everything a front end needs to draw the current screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GameView {
    pub revision: u64,
    pub phase: Phase,
    pub round: u32,
    pub image_reference: Option<String>,
    pub options: Vec<String>,
    pub remaining_seconds: u32,
    pub streak: u32,
    pub best_streak: u32,
    /// False while the catalog is empty; front ends must not offer `start`.
    pub catalog_ready: bool,
    pub feedback: Option<GuessFeedback>,
    pub summary: Option<Summary>,
}
