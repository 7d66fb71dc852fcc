//! Plain-text front end: input parsing and view rendering for the terminal
//! binary. Nothing here mutates game state; it only maps lines to commands
//! and views to text.

use std::fmt::Write;

use crate::catalog::FlagEntry;
use crate::state::{EndReason, GameView, Phase};

pub const UNAVAILABLE_MESSAGE: &str = "Could not load flag data. Check your connection and run the game again.";

/// Command summary for a game showing `choices` options per round.
#[must_use]
pub fn help(choices: usize) -> String {
    format!("commands: s = start, 1-{choices} = pick an option, r = restart, q = quit")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start,
    Guess(String),
    Restart,
    Quit,
    Help,
}

/// Interpret one input line against the current view. Option numbers are
/// 1-based and resolve to the label shown for that slot.
#[must_use]
pub fn parse_input(line: &str, view: &GameView) -> Input {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "s" | "start" => return Input::Start,
        "r" | "restart" => return Input::Restart,
        "q" | "quit" | "exit" => return Input::Quit,
        _ => {}
    }
    line.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|idx| view.options.get(idx))
        .map_or(Input::Help, |label| Input::Guess(label.clone()))
}

/// Text to print for the transition from `previous` to `view`, or `None`
/// when nothing visible changed.
#[must_use]
pub fn render_change(previous: Option<&GameView>, view: &GameView) -> Option<String> {
    if let Some(prev) = previous {
        if prev.phase == view.phase && prev.round == view.round {
            if view.phase == Phase::InRound && prev.remaining_seconds != view.remaining_seconds {
                return Some(format!("  {}s left", view.remaining_seconds));
            }
            if view.phase != Phase::Idle || prev.catalog_ready == view.catalog_ready {
                return None;
            }
        }
    }
    Some(render(view))
}

/// Full rendering of a view.
#[must_use]
pub fn render(view: &GameView) -> String {
    match view.phase {
        Phase::Idle => render_idle(view),
        Phase::InRound => render_round(view),
        Phase::RoundResolved => render_feedback(view),
        Phase::Ended => render_summary(view),
    }
}

fn render_idle(view: &GameView) -> String {
    if view.catalog_ready {
        format!("Best streak: {}. Type `s` to start.", view.best_streak)
    } else {
        UNAVAILABLE_MESSAGE.to_string()
    }
}

fn render_round(view: &GameView) -> String {
    let mut out = format!(
        "\nRound {} | streak {} | best {} | {}s\nFlag: {}\n",
        view.round,
        view.streak,
        view.best_streak,
        view.remaining_seconds,
        view.image_reference.as_deref().unwrap_or("-"),
    );
    for (i, label) in view.options.iter().enumerate() {
        let _ = writeln!(out, "  {}) {label}", i + 1);
    }
    out
}

fn render_feedback(view: &GameView) -> String {
    match &view.feedback {
        Some(f) if f.was_correct => format!("Correct! {} it is. Streak {}.", f.correct, view.streak),
        Some(f) => format!("Wrong: you picked {}, it was {}.", f.chosen, f.correct),
        None => String::new(),
    }
}

fn render_summary(view: &GameView) -> String {
    let Some(summary) = &view.summary else {
        return "Game over.".to_string();
    };
    let why = match summary.reason {
        EndReason::Wrong => "wrong answer",
        EndReason::TimedOut => "out of time",
        EndReason::Exhausted => "every flag answered",
        EndReason::EmptyCatalog => "no flags to play",
        EndReason::Abandoned => "stopped",
    };
    let mut out = format!(
        "\nGame over ({why}). Final score: {}. Best streak: {}.\n",
        summary.final_score, view.best_streak
    );
    if let Some(missed) = &summary.missed {
        let _ = writeln!(out, "The flag was {} ({})", missed.country_name(), missed.image_reference());
    }
    if let Some(links) = &summary.links {
        let _ = writeln!(out, "Learn more: {}", links.wikipedia);
        let _ = writeln!(out, "On the map: {}", links.maps);
    }
    if !summary.correct.is_empty() {
        let names: Vec<&str> = summary.correct.iter().map(FlagEntry::country_name).collect();
        let _ = writeln!(out, "Correct answers: {}", names.join(", "));
    }
    out.push_str("Type `r` to play again or `q` to quit.");
    out
}

#[cfg(test)]
#[path = "terminal_test.rs"]
mod tests;
