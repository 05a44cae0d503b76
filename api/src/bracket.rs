use crate::round::{self, RoundStatus};
use crate::score::ScoreLine;
use crate::Slot;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("bracket: draw size {0} is not a power of two")]
    SizeNotPowerOfTwo(u32),
    #[error("bracket: draw size {0} is larger than {max}", max = MAX_DRAW_SIZE)]
    SizeTooLarge(u32),
    #[error("bracket: no slot at round {round}, position {position}")]
    MissingSlot { round: u32, position: u32 },
    #[error("bracket: more than one slot at round {round}, position {position}")]
    DuplicateSlot { round: u32, position: u32 },
    #[error("bracket: round {round}, position {position} is outside the draw")]
    OutOfRange { round: u32, position: u32 },
}

/// Grand slam singles draws have 128 entrants.
pub const MAX_DRAW_SIZE: u32 = 128;

/// Number of rounds in a draw of `size` entrants, counting the champion's
/// slot as the last round.
pub fn total_rounds(size: u32) -> Result<u32, StructureError> {
    if !size.is_power_of_two() {
        return Err(StructureError::SizeNotPowerOfTwo(size));
    }
    if size > MAX_DRAW_SIZE {
        return Err(StructureError::SizeTooLarge(size));
    }
    Ok(size.trailing_zeros() + 1)
}

/// Number of slots in `round` (1-based) of a draw of `size` entrants.
pub fn slots_in_round(size: u32, round: u32) -> u32 {
    round
        .checked_sub(1)
        .and_then(|shift| size.checked_shr(shift))
        .unwrap_or(0)
}

/// A validated single-elimination bracket.
///
/// `rounds[r - 1][p - 1]` holds the slot at round `r`, position `p`. Round 1
/// has one slot per entrant and every later round has half as many, down to
/// the single champion slot.
#[derive(Debug, Clone, Default)]
pub struct Bracket {
    size: u32,
    rounds: Vec<Vec<Slot>>,
}

impl Bracket {
    /// Index a flat slot list. Every (round, position) of the layout must be
    /// present exactly once.
    pub fn new(size: u32, slots: impl IntoIterator<Item = Slot>) -> Result<Self, StructureError> {
        let total = total_rounds(size)?;
        let mut grid: Vec<Vec<Option<Slot>>> = (1..=total)
            .map(|r| vec![None; slots_in_round(size, r) as usize])
            .collect();

        for slot in slots {
            let (round, position) = (slot.round, slot.position);
            let cell = round
                .checked_sub(1)
                .and_then(|r| grid.get_mut(r as usize))
                .and_then(|row| position.checked_sub(1).and_then(|p| row.get_mut(p as usize)))
                .ok_or(StructureError::OutOfRange { round, position })?;
            if cell.is_some() {
                return Err(StructureError::DuplicateSlot { round, position });
            }
            *cell = Some(slot);
        }

        let rounds = grid
            .into_iter()
            .zip(1..)
            .map(|(row, round)| {
                row.into_iter()
                    .zip(1..)
                    .map(|(cell, position)| {
                        cell.ok_or(StructureError::MissingSlot { round, position })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { size, rounds })
    }

    /// An all-TBD bracket for a draw whose slots have not been created yet.
    pub fn placeholder(size: u32) -> Result<Self, StructureError> {
        let total = total_rounds(size)?;
        let slots = (1..=total).flat_map(|round| {
            (1..=slots_in_round(size, round)).map(move |position| Slot {
                round,
                position,
                ..Default::default()
            })
        });
        Self::new(size, slots)
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn rounds(&self) -> u32 {
        self.rounds.len() as u32
    }

    /// Slots of one round ordered by position; empty when out of range.
    pub fn round(&self, round: u32) -> &[Slot] {
        round
            .checked_sub(1)
            .and_then(|r| self.rounds.get(r as usize))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn slot(&self, round: u32, position: u32) -> Option<&Slot> {
        self.round(round).get(position.checked_sub(1)? as usize)
    }

    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.rounds.iter().flatten()
    }

    /// Coordinate the winner of this slot's match advances to.
    pub fn parent(&self, round: u32, position: u32) -> Option<(u32, u32)> {
        self.slot(round, position)?;
        let next = (round + 1, position.div_ceil(2));
        self.slot(next.0, next.1).map(|_| next)
    }

    /// The two coordinates whose match decides this slot.
    pub fn children(&self, round: u32, position: u32) -> Option<((u32, u32), (u32, u32))> {
        self.slot(round, position)?;
        let prev = round.checked_sub(1).filter(|&r| r >= 1)?;
        Some(((prev, 2 * position - 1), (prev, 2 * position)))
    }

    /// The `index`-th match (1-based) played in `round`.
    pub fn matchup(&self, round: u32, index: u32) -> Option<Matchup<'_>> {
        let top = self.slot(round, index.checked_mul(2)?.checked_sub(1)?)?;
        let bottom = self.slot(round, index * 2)?;
        let advanced = self.slot(round + 1, index)?;
        let winner = if !advanced.is_decided() {
            None
        } else if top.name == advanced.name {
            Some(Side::Top)
        } else if bottom.name == advanced.name {
            Some(Side::Bottom)
        } else {
            None
        };
        Some(Matchup {
            round,
            index,
            top,
            bottom,
            winner,
        })
    }

    pub fn matchups(&self, round: u32) -> Vec<Matchup<'_>> {
        (1..=slots_in_round(self.size, round) / 2)
            .filter_map(|i| self.matchup(round, i))
            .collect()
    }

    pub fn status(&self) -> RoundStatus {
        round::resolve(self.slots(), self.rounds())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
}

/// Two slots that meet in a round, and which of them went through.
#[derive(Debug, Clone, Copy)]
pub struct Matchup<'a> {
    pub round: u32,
    pub index: u32,
    pub top: &'a Slot,
    pub bottom: &'a Slot,
    pub winner: Option<Side>,
}

impl<'a> Matchup<'a> {
    /// (winner, loser) once the next round's slot names one of the two.
    pub fn result(&self) -> Option<(&'a Slot, &'a Slot)> {
        match self.winner? {
            Side::Top => Some((self.top, self.bottom)),
            Side::Bottom => Some((self.bottom, self.top)),
        }
    }

    pub fn score_line(&self) -> Option<ScoreLine> {
        let (winner, loser) = self.result()?;
        Some(ScoreLine::new(&winner.sets, &loser.sets))
    }

    pub fn score(&self, show_tiebreak: bool) -> Option<String> {
        self.score_line().map(|line| line.display(show_tiebreak))
    }
}
