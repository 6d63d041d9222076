use super::*;
use deck_core::ids::RevisionId;
use rusqlite::params;
use serde_json::json;

impl SqliteStore {
    pub fn revision_create(&mut self, request: CreateRevisionRequest) -> Result<RevisionRow, StoreError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidInput("name must not be empty"));
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let id = next_counter_tx(&tx, COUNTER_REVISION)?;
        tx.execute(
            r#"
            INSERT INTO revisions(id, name, owner_id, state, created_at_ms, next_placeholder)
            VALUES (?1, ?2, ?3, ?4, ?5, 0)
            "#,
            params![
                id,
                name,
                request.owner.get(),
                RevisionState::Open.as_str(),
                now_ms
            ],
        )?;
        insert_event_tx(
            &tx,
            now_ms,
            Some(id),
            "revision.create",
            &json!({"name": name, "owner_id": request.owner.get()}).to_string(),
        )?;
        tx.commit()?;

        Ok(RevisionRow {
            id,
            name: name.to_string(),
            owner_id: request.owner.get(),
            state: RevisionState::Open,
            created_at_ms: now_ms,
        })
    }

    pub fn revision_get(&mut self, revision: RevisionId) -> Result<Option<RevisionRow>, StoreError> {
        let tx = self.conn.transaction()?;
        let row = revision_row_tx(&tx, revision.get())?;
        tx.commit()?;
        Ok(row)
    }

    pub fn revision_list(&self, request: ListRevisionsRequest) -> Result<Vec<RevisionRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, owner_id, state, created_at_ms
            FROM revisions
            WHERE ?1 IS NULL OR owner_id = ?1
            ORDER BY id ASC
            LIMIT ?2 OFFSET ?3
            "#,
        )?;
        let rows = stmt.query_map(
            params![
                request.owner.map(|owner| owner.get()),
                request.limit as i64,
                request.offset as i64
            ],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            },
        )?;

        let mut out = Vec::new();
        for row in rows {
            let (id, name, owner_id, state, created_at_ms) = row?;
            let state = RevisionState::parse(&state)
                .ok_or(StoreError::InvalidInput("stored revision state is not recognized"))?;
            out.push(RevisionRow {
                id,
                name,
                owner_id,
                state,
                created_at_ms,
            });
        }
        Ok(out)
    }

    /// Discards the revision and its draft rows without touching the base
    /// corpus. Returns false when the revision is missing or already closed,
    /// so a second removal is a no-op rather than an error.
    pub fn revision_remove(&mut self, revision: RevisionId) -> Result<bool, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let Some(row) = revision_row_tx(&tx, revision.get())? else {
            return Ok(false);
        };
        if !row.state.is_open() {
            return Ok(false);
        }

        delete_draft_rows_tx(&tx, row.id)?;
        tx.execute(
            "UPDATE revisions SET state=?2 WHERE id=?1",
            params![row.id, RevisionState::Removed.as_str()],
        )?;
        insert_event_tx(
            &tx,
            now_ms,
            Some(row.id),
            "revision.remove",
            &json!({"name": row.name}).to_string(),
        )?;
        tx.commit()?;
        Ok(true)
    }
}
