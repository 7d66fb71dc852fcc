//! Round engine: the quiz state machine.
//!
//! DESIGN
//! ======
//! `Idle -> InRound -> RoundResolved -> (InRound | Ended)`, with `InRound ->
//! Ended` on timeout. The engine is synchronous and owns no timers. It only
//! records which round the countdown is armed for and which delayed
//! resolution is pending; the driver (`services::session`) turns those into
//! real timers and feeds them back through `tick_round` and `resolve`.
//!
//! Every begun round gets a fresh `RoundId`. Ticks and resolutions carry the
//! id they were scheduled for, and anything that does not match the live
//! round is dropped. A stale tick therefore cannot touch a later round, and a
//! restart during the feedback delay cannot bring the old round back.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, error, info, warn};

use crate::catalog::{FlagCatalog, FlagEntry};
use crate::config::GameConfig;
use crate::state::{
    EndReason, EntryLinks, GameView, GuessFeedback, Phase, Resolution, ResolutionKind, RoundId, SessionState, Summary,
};
use crate::store::{BEST_STREAK_KEY, ScoreStore};

pub struct RoundEngine {
    config: GameConfig,
    catalog: FlagCatalog,
    store: Box<dyn ScoreStore>,
    rng: StdRng,
    session: SessionState,
    next_round_id: u64,
    /// Round the countdown is currently armed for.
    countdown: Option<RoundId>,
    pending: Option<Resolution>,
    revision: u64,
}

impl RoundEngine {
    /// Build an engine seeded from the OS. The best streak is read from
    /// `store`; a read failure is logged and counts as zero.
    #[must_use]
    pub fn new(config: GameConfig, catalog: FlagCatalog, store: Box<dyn ScoreStore>) -> Self {
        Self::with_rng(config, catalog, store, StdRng::from_os_rng())
    }

    #[must_use]
    pub fn with_rng(config: GameConfig, catalog: FlagCatalog, store: Box<dyn ScoreStore>, rng: StdRng) -> Self {
        let best_streak = match store.load(BEST_STREAK_KEY) {
            Ok(value) => value.unwrap_or(0),
            Err(e) => {
                warn!(error = %e, "could not read best streak; starting from zero");
                0
            }
        };
        let session = SessionState::new(best_streak, config.round_secs);
        Self { config, catalog, store, rng, session, next_round_id: 0, countdown: None, pending: None, revision: 0 }
    }

    // =========================================================================
    // COMMANDS
    // =========================================================================

    /// Leave `Idle` and begin the first round. With an empty catalog the
    /// session ends immediately with a score of zero.
    pub fn start(&mut self) -> bool {
        if self.session.phase != Phase::Idle {
            debug!(phase = ?self.session.phase, "start ignored");
            return false;
        }
        if self.catalog.is_empty() {
            warn!("start with empty catalog");
            return self.finish(EndReason::EmptyCatalog);
        }
        info!(catalog = self.catalog.len(), round_secs = self.config.round_secs, "session started");
        self.begin_round();
        true
    }

    /// Count down the live round by one second.
    pub fn tick(&mut self) -> bool {
        match self.countdown {
            Some(round) => self.tick_round(round),
            None => false,
        }
    }

    /// Count down `round` by one second, if it is still the armed round.
    /// Reaching zero ends the session as a timeout.
    pub fn tick_round(&mut self, round: RoundId) -> bool {
        if self.session.phase != Phase::InRound || self.countdown != Some(round) {
            debug!(?round, armed = ?self.countdown, "stale tick dropped");
            return false;
        }
        self.session.remaining_seconds = self.session.remaining_seconds.saturating_sub(1);
        if self.session.remaining_seconds == 0 {
            self.countdown = None;
            return self.finish(EndReason::TimedOut);
        }
        self.touch();
        true
    }

    /// Accept the one guess allowed per round. Labels that are not among the
    /// current options are ignored like any other invalid guess.
    pub fn submit_guess(&mut self, choice: &str) -> bool {
        if self.session.phase != Phase::InRound {
            debug!(phase = ?self.session.phase, "guess ignored");
            return false;
        }
        if !self.session.options.iter().any(|o| o == choice) {
            debug!(choice, "guess ignored: not an option");
            return false;
        }
        let (Some(target), Some(round)) = (self.session.current_target.clone(), self.countdown) else {
            return false;
        };

        let was_correct = choice == target.country_name();
        self.countdown = None;
        self.session.phase = Phase::RoundResolved;
        self.session.feedback = Some(GuessFeedback {
            chosen: choice.to_string(),
            correct: target.country_name().to_string(),
            was_correct,
        });

        let kind = if was_correct {
            self.session.streak += 1;
            if self.session.streak > self.session.best_streak {
                self.session.best_streak = self.session.streak;
                self.persist_best();
            }
            self.catalog.mark_correct(target.country_name());
            ResolutionKind::Advance
        } else {
            ResolutionKind::End
        };
        info!(round = self.session.round, was_correct, streak = self.session.streak, "guess resolved");

        self.pending = Some(Resolution { round, kind });
        self.touch();
        true
    }

    /// Run the delayed transition scheduled by `submit_guess`. Tokens that
    /// are no longer pending are dropped.
    pub fn resolve(&mut self, token: Resolution) -> bool {
        if self.pending != Some(token) {
            debug!(?token, pending = ?self.pending, "stale resolution dropped");
            return false;
        }
        self.pending = None;
        match token.kind {
            ResolutionKind::Advance => {
                self.begin_round();
                true
            }
            ResolutionKind::End => self.finish(EndReason::Wrong),
        }
    }

    /// Stop the session early. Idempotent.
    pub fn end(&mut self) -> bool {
        self.finish(EndReason::Abandoned)
    }

    /// Return to `Idle` with every entry back in play. Only valid once ended.
    pub fn restart(&mut self) -> bool {
        if self.session.phase != Phase::Ended {
            debug!(phase = ?self.session.phase, "restart ignored");
            return false;
        }
        self.catalog.recycle_all();
        self.countdown = None;
        self.pending = None;
        self.session = SessionState::new(self.session.best_streak, self.config.round_secs);
        info!(catalog = self.catalog.available_len(), "session reset");
        self.touch();
        true
    }

    /// End whatever is in progress and reset to `Idle` in one step.
    pub fn abandon(&mut self) -> bool {
        if self.session.phase == Phase::Idle {
            return false;
        }
        self.end();
        self.restart()
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub fn catalog(&self) -> &FlagCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    #[must_use]
    pub fn current_target(&self) -> Option<&FlagEntry> {
        self.session.current_target.as_ref()
    }

    /// Round the countdown is armed for, if it is running.
    #[must_use]
    pub fn armed_countdown(&self) -> Option<RoundId> {
        self.countdown
    }

    #[must_use]
    pub fn pending_resolution(&self) -> Option<Resolution> {
        self.pending
    }

    /// Bumped on every state change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn snapshot(&self) -> GameView {
        let s = &self.session;
        GameView {
            revision: self.revision,
            phase: s.phase,
            round: s.round,
            image_reference: s.current_target.as_ref().map(|t| t.image_reference().to_string()),
            options: s.options.clone(),
            remaining_seconds: s.remaining_seconds,
            streak: s.streak,
            best_streak: s.best_streak,
            catalog_ready: !self.catalog.is_empty(),
            feedback: s.feedback.clone(),
            summary: s.summary.clone(),
        }
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    fn begin_round(&mut self) {
        self.countdown = None;
        self.pending = None;

        let Some(target) = self.catalog.draw_target(&mut self.rng) else {
            self.finish(EndReason::Exhausted);
            return;
        };

        let mut options = vec![target.country_name().to_string()];
        options.extend(
            self.catalog
                .sample_distractors(self.config.distractors(), &mut self.rng)
                .iter()
                .map(|e| e.country_name().to_string()),
        );
        options.shuffle(&mut self.rng);

        let round = RoundId(self.next_round_id);
        self.next_round_id += 1;

        let s = &mut self.session;
        s.round += 1;
        s.current_target = Some(target);
        s.options = options;
        s.remaining_seconds = self.config.round_secs;
        s.feedback = None;
        s.phase = Phase::InRound;
        self.countdown = Some(round);

        debug!(round = s.round, options = s.options.len(), "round begun");
        self.touch();
    }

    fn finish(&mut self, reason: EndReason) -> bool {
        if self.session.phase == Phase::Ended {
            return false;
        }
        self.countdown = None;
        self.pending = None;

        // An abandoned round only counts as missed if it was not already answered correctly.
        let answered = self.session.feedback.as_ref().is_some_and(|f| f.was_correct);
        let missed = match reason {
            EndReason::Wrong | EndReason::TimedOut => self.session.current_target.clone(),
            EndReason::Abandoned if !answered => self.session.current_target.clone(),
            EndReason::Abandoned | EndReason::Exhausted | EndReason::EmptyCatalog => None,
        };
        let summary = Summary {
            final_score: self.session.streak,
            reason,
            links: missed.as_ref().map(EntryLinks::from),
            missed,
            correct: self.catalog.correct().to_vec(),
        };
        info!(?reason, final_score = summary.final_score, best = self.session.best_streak, "session ended");

        self.session.summary = Some(summary);
        self.session.phase = Phase::Ended;
        self.touch();
        true
    }

    fn persist_best(&mut self) {
        if let Err(e) = self.store.save(BEST_STREAK_KEY, self.session.best_streak) {
            error!(error = %e, best = self.session.best_streak, "failed to persist best streak");
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
