use super::*;
use rusqlite::params;

impl SqliteStore {
    /// Lifecycle audit trail: create/apply/remove events in sequence order,
    /// optionally scoped to one revision.
    pub fn events_list(&self, request: ListEventsRequest) -> Result<Vec<EventRow>, StoreError> {
        let limit = request.limit.clamp(1, 500) as i64;
        let mut stmt = self.conn.prepare(
            r#"
            SELECT seq, ts_ms, revision_id, type, payload_json
            FROM events
            WHERE (?1 IS NULL OR revision_id = ?1) AND seq > ?2
            ORDER BY seq ASC
            LIMIT ?3
            "#,
        )?;
        let rows = stmt.query_map(
            params![
                request.revision.map(|revision| revision.get()),
                request.since_seq,
                limit
            ],
            |row| {
                Ok(EventRow {
                    seq: row.get(0)?,
                    ts_ms: row.get(1)?,
                    revision_id: row.get(2)?,
                    event_type: row.get(3)?,
                    payload_json: row.get(4)?,
                })
            },
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
