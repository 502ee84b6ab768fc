pub use crate::config::*;
use crate::{run_poll_stats, validate_submission};

/// A builder for collecting submissions before tallying them.
///
/// ```
/// pub use slot_voting::builder::Builder;
/// pub use slot_voting::{Day, SlotGrid};
/// # use slot_voting::VotingErrors;
///
/// let grid = SlotGrid::new(
///     &[Day { label: "Mo 10.02.".to_string(), short: "Mo".to_string() }],
///     &["16:30".to_string(), "17:00".to_string()],
/// );
/// let mut builder = Builder::new(&grid)?;
/// builder.add_vote("Anna", &["Mo 10.02. 16:30".to_string()], &[])?;
///
/// let tally = builder.tally()?;
/// assert_eq!(tally.num_voters, 1);
/// assert_eq!(tally.ranking[0].slot, "Mo 10.02. 16:30");
///
/// # Ok::<(), VotingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _grid: SlotGrid,
    pub(crate) _votes: Vec<Vote>,
}

impl Builder {
    pub fn new(grid: &SlotGrid) -> Result<Builder, VotingErrors> {
        if grid.num_slots() == 0 {
            return Err(VotingErrors::EmptyGrid);
        }
        Ok(Builder {
            _grid: grid.clone(),
            _votes: Vec::new(),
        })
    }

    /// Validates and records one submission.
    ///
    /// The name is trimmed before it is kept. Selections that match no grid
    /// slot are accepted here and skipped by the tally.
    pub fn add_vote(
        &mut self,
        name: &str,
        primary: &[String],
        secondary: &[String],
    ) -> Result<(), VotingErrors> {
        validate_submission(name, primary, secondary)?;
        self.add_vote_2(&Vote {
            name: name.trim().to_string(),
            primary: primary.to_vec(),
            secondary: secondary.to_vec(),
        })
    }

    pub fn add_vote_2(&mut self, vote: &Vote) -> Result<(), VotingErrors> {
        self._votes.push(vote.clone());
        Ok(())
    }

    pub fn tally(&self) -> Result<PollTally, VotingErrors> {
        run_poll_stats(&self._votes, &self._grid)
    }
}
