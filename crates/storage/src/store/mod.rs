#![forbid(unsafe_code)]

mod apply;
mod corpus;
mod drafts;
mod error;
mod events;
mod overlay;
mod requests;
mod revisions;
mod types;

pub use error::StoreError;
pub use requests::*;
pub use types::*;

use deck_core::model::RevisionState;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DB_FILE: &str = "carddeck.db";
const SCHEMA_VERSION: &str = "v1";

const COUNTER_CATEGORY: &str = "category_seq";
const COUNTER_CARD: &str = "card_seq";
const COUNTER_REVISION: &str = "revision_seq";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: PathBuf,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let db_path = storage_dir.join(DB_FILE);
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
            "#,
        )?;

        install_schema(&conn)?;

        Ok(Self { conn, storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }
}

fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS counters (
          name TEXT PRIMARY KEY,
          value INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS categories (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL UNIQUE,
          description TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS cards (
          id INTEGER PRIMARY KEY,
          category_id INTEGER NOT NULL REFERENCES categories(id),
          text TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_cards_category ON cards(category_id, id);

        CREATE TABLE IF NOT EXISTS revisions (
          id INTEGER PRIMARY KEY,
          name TEXT NOT NULL,
          owner_id INTEGER NOT NULL,
          state TEXT NOT NULL DEFAULT 'open',
          created_at_ms INTEGER NOT NULL,
          next_placeholder INTEGER NOT NULL DEFAULT 0,
          CHECK(state IN ('open', 'applied', 'removed'))
        );

        CREATE TABLE IF NOT EXISTS category_edits (
          revision_id INTEGER NOT NULL REFERENCES revisions(id) ON DELETE CASCADE,
          category_id INTEGER NOT NULL,
          name TEXT,
          description TEXT,
          deleted INTEGER NOT NULL DEFAULT 0,
          PRIMARY KEY(revision_id, category_id)
        );

        CREATE INDEX IF NOT EXISTS idx_category_edits_target
          ON category_edits(category_id);

        CREATE TABLE IF NOT EXISTS card_edits (
          revision_id INTEGER NOT NULL REFERENCES revisions(id) ON DELETE CASCADE,
          card_id INTEGER NOT NULL,
          category_id INTEGER NOT NULL,
          text TEXT,
          deleted INTEGER NOT NULL DEFAULT 0,
          PRIMARY KEY(revision_id, card_id)
        );

        CREATE INDEX IF NOT EXISTS idx_card_edits_target
          ON card_edits(card_id);

        CREATE TABLE IF NOT EXISTS events (
          seq INTEGER PRIMARY KEY AUTOINCREMENT,
          ts_ms INTEGER NOT NULL,
          revision_id INTEGER,
          type TEXT NOT NULL,
          payload_json TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_events_revision_seq
          ON events(revision_id, seq);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
        params!["schema_version", SCHEMA_VERSION],
    )?;

    Ok(())
}

fn now_ms() -> i64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    now.as_millis() as i64
}

fn next_counter_tx(tx: &Transaction<'_>, name: &str) -> Result<i64, StoreError> {
    let current: i64 = tx
        .query_row(
            "SELECT value FROM counters WHERE name=?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or(0);
    let next = current + 1;
    tx.execute(
        r#"
        INSERT INTO counters(name, value) VALUES (?1, ?2)
        ON CONFLICT(name) DO UPDATE SET value=excluded.value
        "#,
        params![name, next],
    )?;
    Ok(next)
}

/// Placeholder ids count down from -1 per revision and are never reused,
/// even after the draft row that consumed one is unstaged.
fn next_placeholder_tx(tx: &Transaction<'_>, revision_id: i64) -> Result<i64, StoreError> {
    let cursor: i64 = tx.query_row(
        "SELECT next_placeholder FROM revisions WHERE id=?1",
        params![revision_id],
        |row| row.get(0),
    )?;
    let next = cursor - 1;
    tx.execute(
        "UPDATE revisions SET next_placeholder=?2 WHERE id=?1",
        params![revision_id, next],
    )?;
    Ok(next)
}

fn revision_row_tx(tx: &Transaction<'_>, revision_id: i64) -> Result<Option<RevisionRow>, StoreError> {
    let row = tx
        .query_row(
            "SELECT id, name, owner_id, state, created_at_ms FROM revisions WHERE id=?1",
            params![revision_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            },
        )
        .optional()?;
    let Some((id, name, owner_id, state, created_at_ms)) = row else {
        return Ok(None);
    };
    let state = RevisionState::parse(&state)
        .ok_or(StoreError::InvalidInput("stored revision state is not recognized"))?;
    Ok(Some(RevisionRow {
        id,
        name,
        owner_id,
        state,
        created_at_ms,
    }))
}

fn require_open_revision_tx(
    tx: &Transaction<'_>,
    revision_id: i64,
) -> Result<RevisionRow, StoreError> {
    let Some(row) = revision_row_tx(tx, revision_id)? else {
        return Err(StoreError::UnknownRevision);
    };
    if !row.state.is_open() {
        return Err(StoreError::RevisionClosed { state: row.state });
    }
    Ok(row)
}

fn base_category_tx(tx: &Transaction<'_>, category_id: i64) -> Result<Option<CategoryRow>, StoreError> {
    Ok(tx
        .query_row(
            "SELECT id, name, description FROM categories WHERE id=?1",
            params![category_id],
            |row| {
                Ok(CategoryRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                })
            },
        )
        .optional()?)
}

fn base_category_exists_tx(tx: &Transaction<'_>, category_id: i64) -> Result<bool, StoreError> {
    Ok(tx
        .query_row(
            "SELECT 1 FROM categories WHERE id=?1",
            params![category_id],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

fn base_card_tx(tx: &Transaction<'_>, card_id: i64) -> Result<Option<CardRow>, StoreError> {
    Ok(tx
        .query_row(
            "SELECT id, category_id, text FROM cards WHERE id=?1",
            params![card_id],
            |row| {
                Ok(CardRow {
                    id: row.get(0)?,
                    category_id: row.get(1)?,
                    text: row.get(2)?,
                })
            },
        )
        .optional()?)
}

fn category_name_taken_tx(
    tx: &Transaction<'_>,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<bool, StoreError> {
    Ok(tx
        .query_row(
            "SELECT 1 FROM categories WHERE name=?1 AND id IS NOT ?2 LIMIT 1",
            params![name, exclude_id],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

fn card_text_taken_tx(
    tx: &Transaction<'_>,
    category_id: i64,
    text: &str,
    exclude_id: Option<i64>,
) -> Result<bool, StoreError> {
    Ok(tx
        .query_row(
            "SELECT 1 FROM cards WHERE category_id=?1 AND text=?2 AND id IS NOT ?3 LIMIT 1",
            params![category_id, text, exclude_id],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

fn category_edit_row_tx(
    tx: &Transaction<'_>,
    revision_id: i64,
    category_id: i64,
) -> Result<Option<CategoryEditRow>, StoreError> {
    Ok(tx
        .query_row(
            "SELECT name, description, deleted FROM category_edits \
             WHERE revision_id=?1 AND category_id=?2",
            params![revision_id, category_id],
            |row| {
                Ok(CategoryEditRow {
                    revision_id,
                    category_id,
                    name: row.get(0)?,
                    description: row.get(1)?,
                    deleted: row.get::<_, i64>(2)? != 0,
                })
            },
        )
        .optional()?)
}

fn card_edit_row_tx(
    tx: &Transaction<'_>,
    revision_id: i64,
    card_id: i64,
) -> Result<Option<CardEditRow>, StoreError> {
    Ok(tx
        .query_row(
            "SELECT category_id, text, deleted FROM card_edits \
             WHERE revision_id=?1 AND card_id=?2",
            params![revision_id, card_id],
            |row| {
                Ok(CardEditRow {
                    revision_id,
                    card_id,
                    category_id: row.get(0)?,
                    text: row.get(1)?,
                    deleted: row.get::<_, i64>(2)? != 0,
                })
            },
        )
        .optional()?)
}

/// Exclusivity point check: does any *other* open revision hold a draft row
/// for this category?
fn category_conflict_tx(
    tx: &Transaction<'_>,
    revision_id: i64,
    category_id: i64,
) -> Result<Option<i64>, StoreError> {
    Ok(tx
        .query_row(
            "SELECT ce.revision_id FROM category_edits ce \
             JOIN revisions r ON r.id = ce.revision_id \
             WHERE ce.category_id=?1 AND ce.revision_id<>?2 AND r.state='open' \
             LIMIT 1",
            params![category_id, revision_id],
            |row| row.get(0),
        )
        .optional()?)
}

fn card_conflict_tx(
    tx: &Transaction<'_>,
    revision_id: i64,
    card_id: i64,
) -> Result<Option<i64>, StoreError> {
    Ok(tx
        .query_row(
            "SELECT ce.revision_id FROM card_edits ce \
             JOIN revisions r ON r.id = ce.revision_id \
             WHERE ce.card_id=?1 AND ce.revision_id<>?2 AND r.state='open' \
             LIMIT 1",
            params![card_id, revision_id],
            |row| row.get(0),
        )
        .optional()?)
}

/// A card's owning category resolves when it will exist after this revision
/// applies: a base category this revision does not delete, or a non-deleted
/// sibling placeholder staged in the same revision.
fn category_resolvable_tx(
    tx: &Transaction<'_>,
    revision_id: i64,
    category_id: i64,
) -> Result<bool, StoreError> {
    let edit = category_edit_row_tx(tx, revision_id, category_id)?;
    if category_id > 0 {
        if edit.is_some_and(|row| row.deleted) {
            return Ok(false);
        }
        return base_category_exists_tx(tx, category_id);
    }
    Ok(edit.is_some_and(|row| !row.deleted))
}

fn delete_draft_rows_tx(tx: &Transaction<'_>, revision_id: i64) -> Result<(), StoreError> {
    tx.execute(
        "DELETE FROM category_edits WHERE revision_id=?1",
        params![revision_id],
    )?;
    tx.execute(
        "DELETE FROM card_edits WHERE revision_id=?1",
        params![revision_id],
    )?;
    Ok(())
}

fn insert_event_tx(
    tx: &Transaction<'_>,
    ts_ms: i64,
    revision_id: Option<i64>,
    event_type: &str,
    payload_json: &str,
) -> Result<EventRow, StoreError> {
    tx.execute(
        "INSERT INTO events(ts_ms, revision_id, type, payload_json) VALUES (?1, ?2, ?3, ?4)",
        params![ts_ms, revision_id, event_type, payload_json],
    )?;
    Ok(EventRow {
        seq: tx.last_insert_rowid(),
        ts_ms,
        revision_id,
        event_type: event_type.to_string(),
        payload_json: payload_json.to_string(),
    })
}
