// SQLite-backed persistence for the votes. One row per participant name,
// unique ignoring case. The durable store provides the atomic single-row
// upsert; no further locking happens above it.

use chrono::Utc;
use log::{debug, warn};

use rusqlite::{params, Connection, OptionalExtension, Row};

/// One persisted submission.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteRecord {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    /// Derived union of primary and secondary, kept for backward
    /// compatibility with the prior single-list schema. The tally never
    /// reads it.
    pub slots: Vec<String>,
    pub primary_slots: Vec<String>,
    pub secondary_slots: Vec<String>,
    pub origin: Option<String>,
    pub client: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A submission about to be persisted.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NewVote {
    pub name: String,
    pub email: Option<String>,
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
    pub origin: String,
    pub client: String,
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS votes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT,
    slots TEXT NOT NULL DEFAULT '[]',
    primary_slots TEXT NOT NULL DEFAULT '[]',
    secondary_slots TEXT NOT NULL DEFAULT '[]',
    origin TEXT,
    client TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(name COLLATE NOCASE)
)";

const RECORD_COLUMNS: &str =
    "id, name, email, slots, primary_slots, secondary_slots, origin, client, created_at, updated_at";

pub struct VoteStore {
    conn: Connection,
}

impl VoteStore {
    pub fn open(path: &str) -> rusqlite::Result<VoteStore> {
        debug!("open: opening vote database {:?}", path);
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(VoteStore { conn })
    }

    pub fn open_in_memory() -> rusqlite::Result<VoteStore> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(VoteStore { conn })
    }

    /// Looks up a participant by name, ignoring case, as the unique
    /// constraint sees names.
    pub fn find_by_name(&self, name: &str) -> rusqlite::Result<Option<VoteRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM votes WHERE name = ?1 COLLATE NOCASE",
            RECORD_COLUMNS
        ))?;
        stmt.query_row(params![name.trim()], read_record).optional()
    }

    /// Inserts the vote, or overwrites the existing row of the same
    /// (case-insensitive) name in place. The last write wins; the creation
    /// timestamp is preserved on updates.
    pub fn upsert(&self, vote: &NewVote) -> rusqlite::Result<()> {
        let now = now_utc();
        let slots = encode_slots(&combined_slots(&vote.primary, &vote.secondary));
        let primary = encode_slots(&vote.primary);
        let secondary = encode_slots(&vote.secondary);

        match self.find_by_name(&vote.name)? {
            Some(existing) => {
                debug!("upsert: overwriting vote {:?} for {:?}", existing.id, vote.name);
                self.conn.execute(
                    "UPDATE votes SET email = ?1, slots = ?2, primary_slots = ?3, \
                     secondary_slots = ?4, origin = ?5, client = ?6, updated_at = ?7 \
                     WHERE id = ?8",
                    params![
                        vote.email,
                        slots,
                        primary,
                        secondary,
                        vote.origin,
                        vote.client,
                        now,
                        existing.id
                    ],
                )?;
            }
            None => {
                self.conn.execute(
                    "INSERT INTO votes (name, email, slots, primary_slots, secondary_slots, \
                     origin, client, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                    params![
                        vote.name.trim(),
                        vote.email,
                        slots,
                        primary,
                        secondary,
                        vote.origin,
                        vote.client,
                        now
                    ],
                )?;
            }
        }
        Ok(())
    }

    /// All votes, in creation order.
    pub fn all_votes(&self) -> rusqlite::Result<Vec<VoteRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM votes ORDER BY created_at ASC, id ASC",
            RECORD_COLUMNS
        ))?;
        let rows = stmt.query_map([], read_record)?;
        let mut res: Vec<VoteRecord> = Vec::new();
        for r in rows {
            res.push(r?);
        }
        Ok(res)
    }

    pub fn count(&self) -> rusqlite::Result<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM votes", [], |row| row.get(0))
    }
}

fn now_utc() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

// Union of both lists, first occurrence wins. Matches what the single-list
// schema used to store.
fn combined_slots(primary: &[String], secondary: &[String]) -> Vec<String> {
    let mut res: Vec<String> = Vec::new();
    for s in primary.iter().chain(secondary.iter()) {
        if !res.contains(s) {
            res.push(s.clone());
        }
    }
    res
}

fn encode_slots(slots: &[String]) -> String {
    serde_json::to_string(slots).unwrap_or_else(|_| "[]".to_string())
}

/// A stored list that cannot be parsed is treated as empty, never fatal.
fn decode_slots(raw: &str) -> Vec<String> {
    match serde_json::from_str(raw) {
        Ok(slots) => slots,
        Err(e) => {
            warn!("decode_slots: dropping unparseable slot list {:?}: {}", raw, e);
            Vec::new()
        }
    }
}

fn read_record(row: &Row) -> rusqlite::Result<VoteRecord> {
    Ok(VoteRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        slots: decode_slots(&row.get::<_, String>(3)?),
        primary_slots: decode_slots(&row.get::<_, String>(4)?),
        secondary_slots: decode_slots(&row.get::<_, String>(5)?),
        origin: row.get(6)?,
        client: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}
