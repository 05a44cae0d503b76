use crate::Slot;
use log::warn;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Display name of a round. Named rounds are counted back from the end of
/// the draw so the same table serves every draw size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoundName {
    /// Round 1 is not fully known yet.
    Qualifying,
    /// An early round, e.g. `2nd Round (R64)`.
    Numbered { round: u32, entrants: u64 },
    RoundOf16,
    Quarterfinals,
    Semifinals,
    Final,
    /// The single slot holding the winner.
    Champion,
    Completed,
}

impl RoundName {
    pub fn of(round: u32, total_rounds: u32) -> Self {
        match total_rounds.checked_sub(round) {
            Some(0) => RoundName::Champion,
            Some(1) => RoundName::Final,
            Some(2) => RoundName::Semifinals,
            Some(3) => RoundName::Quarterfinals,
            Some(4) => RoundName::RoundOf16,
            Some(distance) => RoundName::Numbered {
                round,
                entrants: 1u64.checked_shl(distance).unwrap_or(u64::MAX),
            },
            None => RoundName::Completed,
        }
    }

    pub fn label(&self) -> String {
        match self {
            RoundName::Qualifying => "Qualifying Rounds".into(),
            RoundName::Numbered { round, entrants } => {
                format!("{} Round (R{entrants})", ordinal(*round))
            }
            RoundName::RoundOf16 => "Round of 16".into(),
            RoundName::Quarterfinals => "Quarterfinals".into(),
            RoundName::Semifinals => "Semifinals".into(),
            RoundName::Final => "Final".into(),
            RoundName::Champion => "Champion".into(),
            RoundName::Completed => "Tournament Completed".into(),
        }
    }
}

impl fmt::Display for RoundName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// The live round of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundStatus {
    pub round: RoundName,
    /// Highest round such that it and every earlier round are fully decided.
    pub filled_through: u32,
    pub complete: bool,
}

impl RoundStatus {
    pub fn label(&self) -> String {
        self.round.label()
    }
}

/// Work out the active round from the current slot names.
///
/// A round with no slots at all never counts as filled, so an empty draw
/// reports `Qualifying Rounds` rather than a finished tournament.
pub fn resolve<'a, I>(slots: I, total_rounds: u32) -> RoundStatus
where
    I: IntoIterator<Item = &'a Slot>,
{
    // (slot count, decided count) per round that has slots.
    let mut counts: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
    for slot in slots {
        if !(1..=total_rounds).contains(&slot.round) {
            warn!(
                "slot {} has round {} outside a {total_rounds} round draw",
                slot.id, slot.round
            );
            continue;
        }
        let entry = counts.entry(slot.round).or_default();
        entry.0 += 1;
        if slot.is_decided() {
            entry.1 += 1;
        }
    }

    let filled_through = (1..=total_rounds)
        .take_while(|r| counts.get(r).is_some_and(|(total, decided)| total == decided))
        .count() as u32;

    let round = match filled_through {
        0 => RoundName::Qualifying,
        r if r == total_rounds => RoundName::Completed,
        r => RoundName::of(r, total_rounds),
    };

    RoundStatus {
        round,
        filled_through,
        complete: total_rounds > 0 && filled_through == total_rounds,
    }
}
