//! Session driver: owns a `RoundEngine` and turns its timer requests into
//! real tokio timers.
//!
//! DESIGN
//! ======
//! One task, one `select!` loop, three inputs:
//! - commands from the front end (`mpsc`)
//! - the per-round countdown (`Interval`, one tick per second)
//! - the post-guess feedback delay (`Sleep`)
//!
//! After every input the loop reconciles its timers with the engine: if the
//! engine's armed round or pending resolution changed, the old timer is
//! dropped and a new one created. Dropping is the cancellation. Each timer
//! also carries the `RoundId`/`Resolution` it was armed for, and the engine
//! rejects mismatches, so a tick that races a transition is harmless.
//!
//! Snapshots go out on a `watch` channel whenever the engine revision moves.

use std::pin::Pin;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, Sleep};
use tracing::{debug, error, info};

use crate::engine::RoundEngine;
use crate::state::{GameView, Resolution, RoundId};

const TICK: Duration = Duration::from_secs(1);
const COMMAND_QUEUE: usize = 32;

// =============================================================================
// COMMANDS / HANDLE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Guess(String),
    Restart,
    Abandon,
    /// Stop the session task. Later sends report `SessionError::Closed`.
    Shutdown,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("game session has shut down")]
    Closed,
    #[error("game session task failed: {0}")]
    Crashed(#[from] tokio::task::JoinError),
}

/// Front-end side of a running session. The task stops on
/// [`Command::Shutdown`] or when every handle is dropped.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    views: watch::Receiver<GameView>,
}

impl SessionHandle {
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session task has exited.
    pub async fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands.send(command).await.map_err(|_| SessionError::Closed)
    }

    /// # Errors
    ///
    /// See [`SessionHandle::send`].
    pub async fn start(&self) -> Result<(), SessionError> {
        self.send(Command::Start).await
    }

    /// # Errors
    ///
    /// See [`SessionHandle::send`].
    pub async fn guess(&self, label: impl Into<String>) -> Result<(), SessionError> {
        self.send(Command::Guess(label.into())).await
    }

    /// # Errors
    ///
    /// See [`SessionHandle::send`].
    pub async fn restart(&self) -> Result<(), SessionError> {
        self.send(Command::Restart).await
    }

    /// # Errors
    ///
    /// See [`SessionHandle::send`].
    pub async fn abandon(&self) -> Result<(), SessionError> {
        self.send(Command::Abandon).await
    }

    /// # Errors
    ///
    /// See [`SessionHandle::send`].
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(Command::Shutdown).await
    }

    /// Latest published view.
    #[must_use]
    pub fn view(&self) -> GameView {
        self.views.borrow().clone()
    }

    /// A fresh receiver for view changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GameView> {
        self.views.clone()
    }
}

// =============================================================================
// TASK
// =============================================================================

/// Wait for the session task to exit.
///
/// # Errors
///
/// Returns `SessionError::Crashed` if the task panicked or was aborted.
pub async fn join_session(task: JoinHandle<()>) -> Result<(), SessionError> {
    task.await.map_err(|e| {
        error!(error = %e, "session task failed");
        SessionError::from(e)
    })
}

type Countdown = Option<(RoundId, Interval)>;
type PendingDelay = Option<(Resolution, Pin<Box<Sleep>>)>;

/// Spawn the session task. Returns the handle and the task's join handle.
#[must_use]
pub fn spawn_session(engine: RoundEngine) -> (SessionHandle, JoinHandle<()>) {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
    let (view_tx, view_rx) = watch::channel(engine.snapshot());
    let task = tokio::spawn(run_session(engine, command_rx, view_tx));
    (SessionHandle { commands: command_tx, views: view_rx }, task)
}

async fn run_session(mut engine: RoundEngine, mut commands: mpsc::Receiver<Command>, views: watch::Sender<GameView>) {
    let feedback_delay = engine.config().feedback_delay;
    let mut countdown: Countdown = None;
    let mut delay: PendingDelay = None;
    let mut published = engine.revision();

    info!(catalog = engine.catalog().len(), "session task running");

    loop {
        tokio::select! {
            maybe_command = commands.recv() => {
                match maybe_command {
                    None | Some(Command::Shutdown) => break,
                    Some(command) => apply(&mut engine, command),
                }
            }
            round = next_tick(&mut countdown) => {
                engine.tick_round(round);
            }
            token = next_resolution(&mut delay) => {
                delay = None;
                engine.resolve(token);
            }
        }

        sync_timers(&engine, &mut countdown, &mut delay, feedback_delay);

        if engine.revision() != published {
            published = engine.revision();
            views.send_replace(engine.snapshot());
        }
    }

    info!("session task stopped");
}

fn apply(engine: &mut RoundEngine, command: Command) {
    let accepted = match &command {
        Command::Start => engine.start(),
        Command::Guess(label) => engine.submit_guess(label),
        Command::Restart => engine.restart(),
        Command::Abandon => engine.abandon(),
        Command::Shutdown => false,
    };
    if !accepted {
        debug!(?command, phase = ?engine.phase(), "command had no effect");
    }
}

/// Re-arm or drop timers so they mirror what the engine expects.
fn sync_timers(engine: &RoundEngine, countdown: &mut Countdown, delay: &mut PendingDelay, feedback_delay: Duration) {
    let armed = engine.armed_countdown();
    if countdown.as_ref().map(|(round, _)| *round) != armed {
        *countdown = armed.map(|round| {
            let mut interval = tokio::time::interval_at(Instant::now() + TICK, TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            (round, interval)
        });
    }

    let wanted = engine.pending_resolution();
    if delay.as_ref().map(|(token, _)| *token) != wanted {
        *delay = wanted.map(|token| (token, Box::pin(tokio::time::sleep(feedback_delay))));
    }
}

async fn next_tick(countdown: &mut Countdown) -> RoundId {
    match countdown {
        Some((round, interval)) => {
            interval.tick().await;
            *round
        }
        None => std::future::pending().await,
    }
}

async fn next_resolution(delay: &mut PendingDelay) -> Resolution {
    match delay {
        Some((token, sleep)) => {
            sleep.as_mut().await;
            *token
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
