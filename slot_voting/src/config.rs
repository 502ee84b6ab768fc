// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// Points added to a slot's score for each first-choice selection.
pub const PRIMARY_WEIGHT: u64 = 2;
/// Points added to a slot's score for each fallback selection.
pub const SECONDARY_WEIGHT: u64 = 1;

/// One column of the poll grid.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Day {
    /// The full label, as it appears in slot identifiers ("Mo 10.02.").
    pub label: String,
    /// A short label for display purposes ("Mo").
    pub short: String,
}

/// The fixed grid of bookable slots: the Cartesian product of an ordered
/// list of days and an ordered list of times.
///
/// The grid is built once at startup and never mutated afterwards. Slot
/// identifiers are formed by concatenating the day label and the time label.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SlotGrid {
    pub days: Vec<Day>,
    pub times: Vec<String>,
}

impl SlotGrid {
    pub fn new(days: &[Day], times: &[String]) -> SlotGrid {
        SlotGrid {
            days: days.to_vec(),
            times: times.to_vec(),
        }
    }

    /// The identifier of the slot at (day, time).
    pub fn slot_id(day_label: &str, time: &str) -> String {
        format!("{} {}", day_label, time)
    }

    /// All slot identifiers, in grid order (day-major).
    pub fn slot_ids(&self) -> Vec<String> {
        let mut res: Vec<String> = Vec::with_capacity(self.num_slots());
        for day in self.days.iter() {
            for time in self.times.iter() {
                res.push(SlotGrid::slot_id(&day.label, time));
            }
        }
        res
    }

    pub fn num_slots(&self) -> usize {
        self.days.len() * self.times.len()
    }
}

/// A single participant's submission, as consumed by the tally.
///
/// The two selection lists are semantically exclusive per slot but are not
/// required to be disjoint: a slot present in both lists is counted in both.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Vote {
    pub name: String,
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
}

// ******** Output data structures *********

/// Aggregated counts for one slot. Derived on every tally, never persisted.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct SlotStat {
    pub primary: u64,
    pub secondary: u64,
    pub total: u64,
    pub score: u64,
}

/// One entry of the ranked slot list.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankedSlot {
    /// Dense rank: equal scores share a rank and the next distinct score
    /// gets the previous rank plus one.
    pub rank: u32,
    pub slot: String,
    pub stat: SlotStat,
}

/// The outcome of tallying all votes over a grid.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PollTally {
    pub num_voters: u64,
    /// One entry per grid slot, in grid order. Slots nobody chose are
    /// present with zeroed counts.
    pub stats: Vec<(String, SlotStat)>,
    /// Slots with a nonzero score, best first.
    pub ranking: Vec<RankedSlot>,
    pub max_score: u64,
    pub max_total: u64,
}

/// Errors that prevent a submission or a tally from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VotingErrors {
    /// The grid has no slots (no days or no times were configured).
    EmptyGrid,
    /// The participant name is empty after trimming.
    EmptyName,
    /// Neither a primary nor a secondary slot was selected.
    EmptySelection,
}

impl Error for VotingErrors {}

impl Display for VotingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingErrors::EmptyGrid => write!(f, "the poll grid contains no slots"),
            VotingErrors::EmptyName => write!(f, "the participant name is empty"),
            VotingErrors::EmptySelection => write!(f, "no time slot was selected"),
        }
    }
}
