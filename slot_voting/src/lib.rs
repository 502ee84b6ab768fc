pub mod builder;
mod config;
pub mod manual;
pub mod quick_start;

use log::{debug, info};

use std::cmp::Reverse;
use std::collections::HashMap;

pub use crate::config::*;

/// Checks a submission before it is recorded.
///
/// A submission is rejected when the name is empty after trimming, or when
/// both selection lists are empty. Everything else is accepted, including a
/// slot that appears in both lists.
pub fn validate_submission(
    name: &str,
    primary: &[String],
    secondary: &[String],
) -> Result<(), VotingErrors> {
    if name.trim().is_empty() {
        return Err(VotingErrors::EmptyName);
    }
    if primary.is_empty() && secondary.is_empty() {
        return Err(VotingErrors::EmptySelection);
    }
    Ok(())
}

/// Tallies all the votes over the given grid.
///
/// Every slot of the grid starts at zero, so slots nobody chose appear in
/// the output with empty counts. Each primary selection adds 1 to the slot's
/// primary and total counts and `PRIMARY_WEIGHT` to its score; each
/// secondary selection adds 1 to secondary and total and `SECONDARY_WEIGHT`
/// to the score. A slot present in both lists of the same vote is counted
/// in both. Selections that match no grid slot are skipped.
pub fn run_poll_stats(votes: &[Vote], grid: &SlotGrid) -> Result<PollTally, VotingErrors> {
    info!(
        "run_poll_stats: processing {:?} votes over {:?} slots",
        votes.len(),
        grid.num_slots()
    );
    let slot_ids = grid.slot_ids();
    if slot_ids.is_empty() {
        return Err(VotingErrors::EmptyGrid);
    }

    let slot_index: HashMap<&str, usize> = slot_ids
        .iter()
        .enumerate()
        .map(|(idx, slot)| (slot.as_str(), idx))
        .collect();
    let mut stats: Vec<SlotStat> = vec![SlotStat::default(); slot_ids.len()];

    for v in votes.iter() {
        for s in v.primary.iter() {
            if let Some(&idx) = slot_index.get(s.as_str()) {
                let stat = &mut stats[idx];
                stat.primary += 1;
                stat.total += 1;
                stat.score += PRIMARY_WEIGHT;
            } else {
                debug!(
                    "run_poll_stats: skipping unknown primary slot {:?} from {:?}",
                    s, v.name
                );
            }
        }
        for s in v.secondary.iter() {
            if let Some(&idx) = slot_index.get(s.as_str()) {
                let stat = &mut stats[idx];
                stat.secondary += 1;
                stat.total += 1;
                stat.score += SECONDARY_WEIGHT;
            } else {
                debug!(
                    "run_poll_stats: skipping unknown secondary slot {:?} from {:?}",
                    s, v.name
                );
            }
        }
    }

    let max_score = stats.iter().map(|s| s.score).max().unwrap_or(0);
    let max_total = stats.iter().map(|s| s.total).max().unwrap_or(0);

    let ranking = rank_slots(&slot_ids, &stats);
    debug!("run_poll_stats: ranking: {:?}", ranking);

    Ok(PollTally {
        num_voters: votes.len() as u64,
        stats: slot_ids.into_iter().zip(stats).collect(),
        ranking,
        max_score,
        max_total,
    })
}

/// Orders the slots by descending score and assigns dense ranks.
///
/// The sort is stable, so equal scores keep their relative grid order. This
/// is an artifact of the implementation, not a contract. Slots with a zero
/// score are left out.
fn rank_slots(slot_ids: &[String], stats: &[SlotStat]) -> Vec<RankedSlot> {
    let mut by_score: Vec<usize> = (0..stats.len()).filter(|&idx| stats[idx].score > 0).collect();
    by_score.sort_by_key(|&idx| Reverse(stats[idx].score));

    let mut res: Vec<RankedSlot> = Vec::with_capacity(by_score.len());
    let mut rank: u32 = 0;
    let mut last_score: Option<u64> = None;
    for idx in by_score {
        if last_score != Some(stats[idx].score) {
            rank += 1;
            last_score = Some(stats[idx].score);
        }
        res.push(RankedSlot {
            rank,
            slot: slot_ids[idx].clone(),
            stat: stats[idx],
        });
    }
    res
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn grid(days: &[&str], times: &[&str]) -> SlotGrid {
        let days: Vec<Day> = days
            .iter()
            .map(|d| Day {
                label: d.to_string(),
                short: d.to_string(),
            })
            .collect();
        let times: Vec<String> = times.iter().map(|t| t.to_string()).collect();
        SlotGrid::new(&days, &times)
    }

    fn vote(name: &str, primary: &[&str], secondary: &[&str]) -> Vote {
        Vote {
            name: name.to_string(),
            primary: primary.iter().map(|s| s.to_string()).collect(),
            secondary: secondary.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn stat_of<'a>(tally: &'a PollTally, slot: &str) -> &'a SlotStat {
        &tally
            .stats
            .iter()
            .find(|(s, _)| s == slot)
            .unwrap_or_else(|| panic!("no slot {}", slot))
            .1
    }

    #[test]
    fn slot_ids_are_day_major() {
        let g = grid(&["Mo", "Di"], &["16:30", "17:00"]);
        assert_eq!(
            g.slot_ids(),
            vec!["Mo 16:30", "Mo 17:00", "Di 16:30", "Di 17:00"]
        );
        assert_eq!(g.num_slots(), 4);
    }

    // The worked example from the poll documentation: two slots, one primary
    // vote on A, one secondary vote on both.
    #[test]
    fn two_slot_example() {
        let g = grid(&["Mo"], &["A", "B"]);
        let votes = vec![
            vote("v1", &["Mo A"], &[]),
            vote("v2", &[], &["Mo A", "Mo B"]),
        ];
        let tally = run_poll_stats(&votes, &g).unwrap();
        assert_eq!(
            *stat_of(&tally, "Mo A"),
            SlotStat {
                primary: 1,
                secondary: 1,
                total: 2,
                score: 3
            }
        );
        assert_eq!(
            *stat_of(&tally, "Mo B"),
            SlotStat {
                primary: 0,
                secondary: 1,
                total: 1,
                score: 1
            }
        );
        let ranks: Vec<(u32, &str)> = tally
            .ranking
            .iter()
            .map(|r| (r.rank, r.slot.as_str()))
            .collect();
        assert_eq!(ranks, vec![(1, "Mo A"), (2, "Mo B")]);
        assert_eq!(tally.num_voters, 2);
        assert_eq!(tally.max_score, 3);
        assert_eq!(tally.max_total, 2);
    }

    #[test]
    fn total_and_score_identities() {
        let g = grid(&["Mo", "Di", "Mi"], &["16:30", "17:00"]);
        let votes = vec![
            vote("a", &["Mo 16:30", "Di 17:00"], &["Mi 16:30"]),
            vote("b", &["Mo 16:30"], &["Mo 17:00", "Di 17:00"]),
            vote("c", &[], &["Mo 16:30"]),
        ];
        let tally = run_poll_stats(&votes, &g).unwrap();
        assert_eq!(tally.stats.len(), g.num_slots());
        for (_, stat) in tally.stats.iter() {
            assert_eq!(stat.total, stat.primary + stat.secondary);
            assert_eq!(
                stat.score,
                PRIMARY_WEIGHT * stat.primary + SECONDARY_WEIGHT * stat.secondary
            );
        }
    }

    #[test]
    fn dense_ranking_on_ties() {
        let g = grid(&["Mo"], &["A", "B", "C", "D"]);
        // A and C both get one primary vote (score 2), B one secondary
        // (score 1), D nothing.
        let votes = vec![vote("a", &["Mo A"], &["Mo B"]), vote("b", &["Mo C"], &[])];
        let tally = run_poll_stats(&votes, &g).unwrap();
        let ranks: Vec<(u32, &str)> = tally
            .ranking
            .iter()
            .map(|r| (r.rank, r.slot.as_str()))
            .collect();
        // Ties share a rank; the next distinct score gets rank + 1, not + 2.
        assert_eq!(ranks, vec![(1, "Mo A"), (1, "Mo C"), (2, "Mo B")]);
    }

    #[test]
    fn zero_score_slots_are_not_ranked() {
        let g = grid(&["Mo"], &["A", "B"]);
        let votes = vec![vote("a", &["Mo A"], &[])];
        let tally = run_poll_stats(&votes, &g).unwrap();
        assert_eq!(tally.stats.len(), 2);
        assert_eq!(tally.ranking.len(), 1);
        assert_eq!(stat_of(&tally, "Mo B").score, 0);
    }

    #[test]
    fn slot_in_both_lists_is_counted_in_both() {
        let g = grid(&["Mo"], &["A"]);
        let votes = vec![vote("a", &["Mo A"], &["Mo A"])];
        let tally = run_poll_stats(&votes, &g).unwrap();
        assert_eq!(
            *stat_of(&tally, "Mo A"),
            SlotStat {
                primary: 1,
                secondary: 1,
                total: 2,
                score: 3
            }
        );
    }

    #[test]
    fn unknown_slots_are_skipped() {
        let g = grid(&["Mo"], &["A"]);
        let votes = vec![vote("a", &["Di A"], &["nonsense"])];
        let tally = run_poll_stats(&votes, &g).unwrap();
        assert_eq!(*stat_of(&tally, "Mo A"), SlotStat::default());
        assert_eq!(tally.num_voters, 1);
    }

    #[test]
    fn equal_scores_keep_grid_order() {
        let g = grid(&["Mo", "Di"], &["A"]);
        let votes = vec![vote("a", &["Mo A", "Di A"], &[])];
        let tally = run_poll_stats(&votes, &g).unwrap();
        let slots: Vec<&str> = tally.ranking.iter().map(|r| r.slot.as_str()).collect();
        assert_eq!(slots, vec!["Mo A", "Di A"]);
        assert!(tally.ranking.iter().all(|r| r.rank == 1));
    }

    #[test]
    fn empty_grid_is_an_error() {
        let g = grid(&[], &["16:30"]);
        assert_eq!(run_poll_stats(&[], &g), Err(VotingErrors::EmptyGrid));
    }

    #[test]
    fn validation_rules() {
        let slot = vec!["Mo A".to_string()];
        assert_eq!(
            validate_submission("", &slot, &[]),
            Err(VotingErrors::EmptyName)
        );
        assert_eq!(
            validate_submission("   ", &slot, &[]),
            Err(VotingErrors::EmptyName)
        );
        assert_eq!(
            validate_submission("Anna", &[], &[]),
            Err(VotingErrors::EmptySelection)
        );
        assert_eq!(validate_submission("Anna", &slot, &[]), Ok(()));
        assert_eq!(validate_submission("Anna", &[], &slot), Ok(()));
        // A slot in both lists is accepted; the tally counts it in both.
        assert_eq!(validate_submission("Anna", &slot, &slot), Ok(()));
    }
}
