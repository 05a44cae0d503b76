//! Match score rendering.
//!
//! A slot carries the games its player won in each set of the match played in
//! that slot's round. Pairing the winner's sets with the loser's sets gives
//! the familiar score line, e.g. `7-6 (7), 5-7, 6-7 (10), 6-3, 6-0`.

use crate::{SET_COUNT, SetScore};
use log::debug;
use std::fmt;

pub const WALKOVER: &str = "Walkover";
const RETIRED_SUFFIX: &str = " (Ret.)";

/// One played set, seen from the match winner's side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetLine {
    pub winner_games: u8,
    pub loser_games: u8,
    /// Tie-break points of the player who lost the set. Only present for
    /// 7-6 and 6-7 sets.
    pub tiebreak: Option<u8>,
}

impl SetLine {
    fn from_pair(index: usize, winner: &SetScore, loser: &SetScore) -> Option<Self> {
        match (winner.games, loser.games) {
            (Some(winner_games), Some(loser_games)) => {
                let tiebreak = match (winner_games, loser_games) {
                    (7, 6) => loser.tiebreak,
                    (6, 7) => winner.tiebreak,
                    _ => None,
                };
                Some(Self {
                    winner_games,
                    loser_games,
                    tiebreak,
                })
            }
            (None, None) => None,
            (w, l) => {
                debug!("ignoring malformed set {}: winner {w:?}, loser {l:?}", index + 1);
                None
            }
        }
    }

    /// A set is over at 7-6 either way, or once the match winner reaches six
    /// games with a two game margin. A final set the match winner was losing
    /// means the opponent stopped early.
    pub fn is_complete(&self) -> bool {
        matches!((self.winner_games, self.loser_games), (7, 6) | (6, 7))
            || (self.winner_games >= 6 && self.winner_games.saturating_sub(self.loser_games) >= 2)
    }

    fn is_unplayed(&self) -> bool {
        self.winner_games == 0 && self.loser_games == 0
    }

    fn render(&self, show_tiebreak: bool) -> String {
        match self.tiebreak {
            Some(points) if show_tiebreak => {
                format!("{}-{} ({points})", self.winner_games, self.loser_games)
            }
            _ => format!("{}-{}", self.winner_games, self.loser_games),
        }
    }
}

/// The interpreted result of a match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreLine {
    sets: Vec<SetLine>,
    retired: bool,
}

impl ScoreLine {
    pub fn new(winner: &[SetScore], loser: &[SetScore]) -> Self {
        let mut sets: Vec<SetLine> = winner
            .iter()
            .zip(loser)
            .take(SET_COUNT)
            .enumerate()
            .filter_map(|(i, (w, l))| SetLine::from_pair(i, w, l))
            .collect();

        let last = sets.last().copied().unwrap_or_default();
        let retired = !last.is_complete();

        // A trailing 0-0 marks a set that never started.
        if sets.last().is_some_and(SetLine::is_unplayed) {
            sets.pop();
        }

        Self { sets, retired }
    }

    pub fn sets(&self) -> &[SetLine] {
        &self.sets
    }

    pub fn is_walkover(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn is_retired(&self) -> bool {
        !self.is_walkover() && self.retired
    }

    pub fn display(&self, show_tiebreak: bool) -> String {
        if self.is_walkover() {
            return WALKOVER.to_owned();
        }
        let mut result = self
            .sets
            .iter()
            .map(|s| s.render(show_tiebreak))
            .collect::<Vec<_>>()
            .join(", ");
        if self.retired {
            result.push_str(RETIRED_SUFFIX);
        }
        result
    }
}

impl fmt::Display for ScoreLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display(f.alternate()))
    }
}

/// Render a match result from the winner's and the loser's per-set records.
pub fn format(winner: &[SetScore], loser: &[SetScore], show_tiebreak: bool) -> String {
    ScoreLine::new(winner, loser).display(show_tiebreak)
}
