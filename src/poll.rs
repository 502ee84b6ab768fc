use log::{debug, info, warn};

use slot_voting::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::poll::config_reader::*;
use crate::poll::store::{NewVote, VoteRecord, VoteStore};

pub mod store;

/// Database file used when neither the command line nor the poll
/// description names one.
const DEFAULT_DATABASE: &str = "poll_data.sqlite";

#[derive(Debug, Snafu)]
pub enum PollError {
    #[snafu(display("Error opening config file {path}"))]
    OpeningConfig {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Database error"))]
    Database { source: rusqlite::Error },
    #[snafu(display("Invalid submission: {source}"))]
    InvalidSubmission { source: VotingErrors },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    OpeningReference { source: std::io::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

type PollResult<T> = Result<T, PollError>;

pub mod config_reader {
    use crate::poll::*;

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct DayEntry {
        pub label: String,
        pub short: String,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct PollConfig {
        pub title: String,
        pub description: Option<String>,
        #[serde(rename = "adminSecret")]
        pub admin_secret: Option<String>,
        pub days: Vec<DayEntry>,
        pub times: Vec<String>,
        #[serde(rename = "databasePath")]
        pub database_path: Option<String>,
    }

    impl PollConfig {
        pub fn grid(&self) -> SlotGrid {
            let days: Vec<Day> = self
                .days
                .iter()
                .map(|d| Day {
                    label: d.label.clone(),
                    short: d.short.clone(),
                })
                .collect();
            SlotGrid::new(&days, &self.times)
        }
    }

    /// Header block of the JSON summary.
    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct OutputConfig {
        pub title: String,
        pub description: Option<String>,
        #[serde(rename = "numSlots")]
        pub num_slots: u64,
        #[serde(rename = "numVoters")]
        pub num_voters: u64,
    }

    /// The poll shipped with the original deployment, used when no config
    /// file is given.
    pub fn default_config() -> PollConfig {
        let days = [
            ("Mo 10.02.", "Mo"),
            ("Di 11.02.", "Di"),
            ("Mi 12.02.", "Mi"),
            ("Do 13.02.", "Do"),
            ("Fr 14.02.", "Fr"),
        ];
        PollConfig {
            title: "Meeting Terminabstimmung".to_string(),
            description: Some(
                "Wähle deine bevorzugten Zeitslots: erste Wahl oder mögliche Ausweichtermine."
                    .to_string(),
            ),
            admin_secret: None,
            days: days
                .iter()
                .map(|(label, short)| DayEntry {
                    label: label.to_string(),
                    short: short.to_string(),
                })
                .collect(),
            times: ["16:30", "17:00", "17:30", "18:00", "18:30"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            database_path: None,
        }
    }

    pub fn read_config(path: &str) -> PollResult<PollConfig> {
        let contents = fs::read_to_string(path).context(OpeningConfigSnafu { path })?;
        debug!("read_config: {:?}", contents);
        let config: PollConfig =
            serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
        Ok(config)
    }
}

fn load_config(config_path: &Option<String>) -> PollResult<PollConfig> {
    match config_path {
        Some(path) => read_config(path),
        None => Ok(default_config()),
    }
}

fn database_path(cli: &Option<String>, config: &PollConfig) -> String {
    cli.clone()
        .or_else(|| config.database_path.clone())
        .unwrap_or_else(|| DEFAULT_DATABASE.to_string())
}

// Best-effort description of where a submission came from. The poll records
// it as metadata; it is not an identity mechanism.
fn submission_origin() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
    format!("{}@{}", user, host)
}

fn client_id() -> String {
    format!("termpoll/{}", env!("CARGO_PKG_VERSION"))
}

/// Validates one submission and upserts it into the store.
///
/// A rejected submission changes no state; a failed write leaves no partial
/// state behind.
pub fn submit_vote(
    store: &VoteStore,
    name: &str,
    email: Option<&str>,
    primary: &[String],
    secondary: &[String],
) -> PollResult<()> {
    validate_submission(name, primary, secondary).context(InvalidSubmissionSnafu {})?;
    let vote = NewVote {
        name: name.trim().to_string(),
        email: email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string),
        primary: primary.to_vec(),
        secondary: secondary.to_vec(),
        origin: submission_origin(),
        client: client_id(),
    };
    store.upsert(&vote).context(DatabaseSnafu {})?;
    info!("submit_vote: recorded vote for {:?}", vote.name);
    Ok(())
}

pub fn run_vote(
    config_path: &Option<String>,
    database: &Option<String>,
    name: &str,
    email: Option<&str>,
    primary: &[String],
    secondary: &[String],
) -> PollResult<()> {
    let config = load_config(config_path)?;
    let db = database_path(database, &config);
    info!("run_vote: using vote database {:?}", db);

    let store = VoteStore::open(&db).context(DatabaseSnafu {})?;
    let existing = store.find_by_name(name).context(DatabaseSnafu {})?;
    submit_vote(&store, name, email, primary, secondary)?;

    if existing.is_some() {
        println!("Updated the vote for {}.", name.trim());
    } else {
        println!("Saved the vote for {}.", name.trim());
    }
    let num_voters = store.count().context(DatabaseSnafu {})?;
    println!("{} participant(s) so far.", num_voters);
    Ok(())
}

// The admin view is requested explicitly and gated by the configured
// secret. A missing or empty secret leaves the switch open to anyone who
// asks for it.
fn admin_view(admin: &Option<Option<String>>, config: &PollConfig) -> bool {
    match (admin, config.admin_secret.as_deref()) {
        (None, _) => false,
        (Some(_), None) | (Some(_), Some("")) => true,
        (Some(given), Some(secret)) => given.as_deref() == Some(secret),
    }
}

fn stat_to_json(slot: &str, stat: &SlotStat) -> JSValue {
    json!({
        "slot": slot,
        "primary": stat.primary,
        "secondary": stat.secondary,
        "total": stat.total,
        "score": stat.score,
    })
}

fn voter_to_json(record: &VoteRecord) -> JSValue {
    json!({
        "name": record.name,
        "email": record.email,
        "primary": record.primary_slots,
        "secondary": record.secondary_slots,
        "updatedAt": record.updated_at,
    })
}

fn build_summary_js(
    config: &PollConfig,
    tally: &PollTally,
    records: &[VoteRecord],
    is_admin: bool,
) -> JSValue {
    let c = OutputConfig {
        title: config.title.clone(),
        description: config.description.clone(),
        num_slots: tally.stats.len() as u64,
        num_voters: tally.num_voters,
    };
    let stats: Vec<JSValue> = tally
        .stats
        .iter()
        .map(|(slot, stat)| stat_to_json(slot, stat))
        .collect();

    let mut root = JSMap::new();
    root.insert("config".to_string(), json!(c));
    root.insert("stats".to_string(), JSValue::Array(stats));

    if is_admin {
        let ranking: Vec<JSValue> = tally
            .ranking
            .iter()
            .map(|r| {
                json!({
                    "rank": r.rank,
                    "slot": r.slot,
                    "score": r.stat.score,
                    "primary": r.stat.primary,
                    "secondary": r.stat.secondary,
                })
            })
            .collect();
        let voters: Vec<JSValue> = records.iter().map(voter_to_json).collect();
        root.insert("ranking".to_string(), JSValue::Array(ranking));
        root.insert("voters".to_string(), JSValue::Array(voters));
    }
    JSValue::Object(root)
}

fn check_reference(reference_path: &str, pretty_stats: &str) -> PollResult<()> {
    let contents = fs::read_to_string(reference_path).context(OpeningReferenceSnafu {})?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    let pretty_ref = serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})?;
    if pretty_ref != pretty_stats {
        warn!("Found differences with the reference summary");
        print_diff(pretty_ref.as_str(), pretty_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary");
    }
    Ok(())
}

pub fn run_results(
    config_path: &Option<String>,
    database: &Option<String>,
    admin: &Option<Option<String>>,
    out: &Option<String>,
    reference: &Option<String>,
) -> PollResult<()> {
    let config = load_config(config_path)?;
    let db = database_path(database, &config);
    let store = VoteStore::open(&db).context(DatabaseSnafu {})?;
    let records = store.all_votes().context(DatabaseSnafu {})?;
    info!("run_results: {:?} votes in {:?}", records.len(), db);

    let votes: Vec<Vote> = records
        .iter()
        .map(|r| Vote {
            name: r.name.clone(),
            primary: r.primary_slots.clone(),
            secondary: r.secondary_slots.clone(),
        })
        .collect();

    let tally = match run_poll_stats(&votes, &config.grid()) {
        Result::Ok(x) => x,
        Result::Err(x) => {
            whatever!("Voting error: {:?}", x)
        }
    };

    let is_admin = admin_view(admin, &config);
    if admin.is_some() && !is_admin {
        warn!("run_results: admin view requested with a wrong secret, serving the public view");
    }

    let summary = build_summary_js(&config, &tally, &records, is_admin);
    let pretty = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;

    match out.as_deref() {
        None | Some("") | Some("stdout") => println!("{}", pretty),
        Some(path) => {
            fs::write(path, &pretty).context(WritingSummarySnafu { path })?;
            info!("run_results: summary written to {:?}", path);
        }
    }

    if let Some(reference_path) = reference {
        check_reference(reference_path, &pretty)?;
    }
    Ok(())
}

pub fn run_show(
    config_path: &Option<String>,
    database: &Option<String>,
    name: &str,
) -> PollResult<()> {
    let config = load_config(config_path)?;
    let db = database_path(database, &config);
    let store = VoteStore::open(&db).context(DatabaseSnafu {})?;

    match store.find_by_name(name).context(DatabaseSnafu {})? {
        Some(record) => {
            let js = json!({
                "name": record.name,
                "email": record.email,
                "primary": record.primary_slots,
                "secondary": record.secondary_slots,
                "createdAt": record.created_at,
                "updatedAt": record.updated_at,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})?
            );
        }
        None => {
            println!("No vote recorded for {}.", name.trim());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::store::VoteStore;

    fn slots(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_config_matches_the_original_grid() {
        let config = default_config();
        let grid = config.grid();
        assert_eq!(grid.num_slots(), 25);
        let ids = grid.slot_ids();
        assert_eq!(ids[0], "Mo 10.02. 16:30");
        assert_eq!(ids[24], "Fr 14.02. 18:30");
    }

    #[test]
    fn rejected_submissions_change_no_state() {
        let store = VoteStore::open_in_memory().unwrap();
        assert!(submit_vote(&store, "  ", None, &slots(&["Mo 10.02. 16:30"]), &[]).is_err());
        assert!(submit_vote(&store, "Anna", None, &[], &[]).is_err());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn resubmitting_updates_instead_of_adding() {
        let store = VoteStore::open_in_memory().unwrap();
        submit_vote(&store, "Anna", None, &slots(&["Mo 10.02. 16:30"]), &[]).unwrap();
        submit_vote(&store, "ANNA", None, &[], &slots(&["Di 11.02. 17:00"])).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn store_and_tally_round_trip() {
        let config = default_config();
        let store = VoteStore::open_in_memory().unwrap();
        submit_vote(&store, "v1", None, &slots(&["Mo 10.02. 16:30"]), &[]).unwrap();
        submit_vote(
            &store,
            "v2",
            None,
            &[],
            &slots(&["Mo 10.02. 16:30", "Mo 10.02. 17:00"]),
        )
        .unwrap();

        let records = store.all_votes().unwrap();
        let votes: Vec<Vote> = records
            .iter()
            .map(|r| Vote {
                name: r.name.clone(),
                primary: r.primary_slots.clone(),
                secondary: r.secondary_slots.clone(),
            })
            .collect();
        let tally = run_poll_stats(&votes, &config.grid()).unwrap();

        assert_eq!(tally.num_voters, 2);
        let (slot, stat) = &tally.stats[0];
        assert_eq!(slot, "Mo 10.02. 16:30");
        assert_eq!(
            *stat,
            SlotStat {
                primary: 1,
                secondary: 1,
                total: 2,
                score: 3
            }
        );
        assert_eq!(tally.ranking[0].rank, 1);
        assert_eq!(tally.ranking[0].slot, "Mo 10.02. 16:30");
    }

    #[test]
    fn admin_gate_combinations() {
        let mut config = default_config();

        // No secret configured: the switch is open, but must be requested.
        assert!(!admin_view(&None, &config));
        assert!(admin_view(&Some(None), &config));
        assert!(admin_view(&Some(Some("anything".to_string())), &config));

        // An empty secret counts as not configured.
        config.admin_secret = Some("".to_string());
        assert!(admin_view(&Some(None), &config));

        config.admin_secret = Some("s3cret".to_string());
        assert!(!admin_view(&Some(None), &config));
        assert!(!admin_view(&Some(Some("wrong".to_string())), &config));
        assert!(admin_view(&Some(Some("s3cret".to_string())), &config));
        assert!(!admin_view(&None, &config));
    }

    #[test]
    fn summary_reserves_ranking_and_voters_for_admins() {
        let config = default_config();
        let store = VoteStore::open_in_memory().unwrap();
        submit_vote(&store, "Anna", None, &slots(&["Mo 10.02. 16:30"]), &[]).unwrap();
        let records = store.all_votes().unwrap();
        let votes: Vec<Vote> = records
            .iter()
            .map(|r| Vote {
                name: r.name.clone(),
                primary: r.primary_slots.clone(),
                secondary: r.secondary_slots.clone(),
            })
            .collect();
        let tally = run_poll_stats(&votes, &config.grid()).unwrap();

        let public = build_summary_js(&config, &tally, &records, false);
        assert!(public.get("stats").is_some());
        assert!(public.get("ranking").is_none());
        assert!(public.get("voters").is_none());

        let admin = build_summary_js(&config, &tally, &records, true);
        assert_eq!(admin["ranking"][0]["rank"], 1);
        assert_eq!(admin["ranking"][0]["slot"], "Mo 10.02. 16:30");
        assert_eq!(admin["voters"][0]["name"], "Anna");
        // The shared secret never leaks into the summary.
        assert!(admin.get("adminSecret").is_none());
        assert!(admin["config"].get("adminSecret").is_none());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = default_config();
        let js = serde_json::to_string(&config).unwrap();
        let parsed: PollConfig = serde_json::from_str(&js).unwrap();
        assert_eq!(parsed, config);
    }
}
