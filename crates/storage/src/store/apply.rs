use super::*;
use deck_core::ids::RevisionId;
use rusqlite::params;
use serde_json::json;
use std::collections::BTreeMap;

impl SqliteStore {
    /// Folds every staged edit of an open revision into the base corpus as
    /// one transaction.
    ///
    /// Placeholder resolution runs first: every surviving placeholder
    /// category receives a freshly allocated persistent id before any card is
    /// touched, because card edits may reference categories that exist only
    /// as sibling placeholders. Mutation order is deletions, then in-place
    /// updates, then inserts (categories before cards throughout), so that
    /// duplicate checks see the corpus that will exist after apply rather
    /// than rows the same revision is about to delete or rename.
    ///
    /// Any validation failure propagates before commit; the transaction rolls
    /// back on drop, the revision stays open and keeps its draft rows.
    pub fn revision_apply(&mut self, revision: RevisionId) -> Result<ApplyOutcome, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let revision_row = require_open_revision_tx(&tx, revision.get())?;

        let category_edits = {
            let mut stmt = tx.prepare(
                "SELECT category_id, name, description, deleted FROM category_edits \
                 WHERE revision_id=?1 ORDER BY category_id ASC",
            )?;
            let mut rows = stmt.query(params![revision_row.id])?;
            let mut edits = Vec::new();
            while let Some(row) = rows.next()? {
                edits.push(CategoryEditRow {
                    revision_id: revision_row.id,
                    category_id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    deleted: row.get::<_, i64>(3)? != 0,
                });
            }
            edits
        };
        let card_edits = {
            let mut stmt = tx.prepare(
                "SELECT card_id, category_id, text, deleted FROM card_edits \
                 WHERE revision_id=?1 ORDER BY card_id ASC",
            )?;
            let mut rows = stmt.query(params![revision_row.id])?;
            let mut edits = Vec::new();
            while let Some(row) = rows.next()? {
                edits.push(CardEditRow {
                    revision_id: revision_row.id,
                    card_id: row.get(0)?,
                    category_id: row.get(1)?,
                    text: row.get(2)?,
                    deleted: row.get::<_, i64>(3)? != 0,
                });
            }
            edits
        };

        // Placeholders were allocated counting down, so descending-id order
        // hands out persistent ids in staging order.
        let mut category_ids = BTreeMap::new();
        for edit in category_edits
            .iter()
            .rev()
            .filter(|edit| !edit.deleted && edit.category_id <= 0)
        {
            let id = next_counter_tx(&tx, COUNTER_CATEGORY)?;
            category_ids.insert(edit.category_id, id);
        }

        let mut categories_deleted = 0usize;
        let mut cards_deleted = 0usize;

        // Category deletions cascade over the base cards they own. A deleted
        // placeholder never reached the base corpus, so it is a net no-op.
        for edit in category_edits.iter().filter(|edit| edit.deleted) {
            if edit.category_id <= 0 {
                continue;
            }
            cards_deleted += tx.execute(
                "DELETE FROM cards WHERE category_id=?1",
                params![edit.category_id],
            )?;
            let removed = tx.execute(
                "DELETE FROM categories WHERE id=?1",
                params![edit.category_id],
            )?;
            if removed == 0 {
                return Err(StoreError::UnknownCategory);
            }
            categories_deleted += 1;
        }

        for edit in category_edits.iter().filter(|edit| !edit.deleted && edit.category_id > 0) {
            let Some(current) = base_category_tx(&tx, edit.category_id)? else {
                if edit.name.is_none() && edit.description.is_none() {
                    return Err(StoreError::InvalidEdit(
                        "category edit has no fields and no base row to fall back on",
                    ));
                }
                return Err(StoreError::UnknownCategory);
            };
            let name = edit.name.clone().unwrap_or(current.name);
            let description = edit.description.clone().unwrap_or(current.description);
            if category_name_taken_tx(&tx, &name, Some(edit.category_id))? {
                return Err(StoreError::DuplicateName { name });
            }
            tx.execute(
                "UPDATE categories SET name=?2, description=?3 WHERE id=?1",
                params![edit.category_id, name, description],
            )?;
        }

        for edit in category_edits
            .iter()
            .rev()
            .filter(|edit| !edit.deleted && edit.category_id <= 0)
        {
            let Some(&id) = category_ids.get(&edit.category_id) else {
                return Err(StoreError::InvalidEdit("placeholder category was never resolved"));
            };
            let Some(name) = edit.name.clone() else {
                return Err(StoreError::InvalidEdit("a new category requires a name"));
            };
            if category_name_taken_tx(&tx, &name, None)? {
                return Err(StoreError::DuplicateName { name });
            }
            tx.execute(
                "INSERT INTO categories(id, name, description) VALUES (?1, ?2, ?3)",
                params![id, name, edit.description.clone().unwrap_or_default()],
            )?;
        }

        // Explicit card deletions. A zero count is fine here: the row may
        // already be gone via a category cascade in the same revision.
        for edit in card_edits.iter().filter(|edit| edit.deleted) {
            if edit.card_id <= 0 {
                continue;
            }
            cards_deleted += tx.execute("DELETE FROM cards WHERE id=?1", params![edit.card_id])?;
        }

        for edit in card_edits.iter().filter(|edit| !edit.deleted && edit.card_id > 0) {
            let category_id = resolved_category_tx(&tx, &category_ids, edit.category_id)?;
            let Some(current) = base_card_tx(&tx, edit.card_id)? else {
                return Err(StoreError::InvalidEdit(
                    "card edit targets a card removed by a category deletion in the same revision",
                ));
            };
            let text = edit.text.clone().unwrap_or(current.text);
            if card_text_taken_tx(&tx, category_id, &text, Some(edit.card_id))? {
                return Err(StoreError::DuplicateName { name: text });
            }
            tx.execute(
                "UPDATE cards SET category_id=?2, text=?3 WHERE id=?1",
                params![edit.card_id, category_id, text],
            )?;
        }

        let mut card_ids = BTreeMap::new();
        for edit in card_edits
            .iter()
            .rev()
            .filter(|edit| !edit.deleted && edit.card_id <= 0)
        {
            let category_id = resolved_category_tx(&tx, &category_ids, edit.category_id)?;
            let Some(text) = edit.text.clone() else {
                return Err(StoreError::InvalidEdit("a new card requires text"));
            };
            if card_text_taken_tx(&tx, category_id, &text, None)? {
                return Err(StoreError::DuplicateName { name: text });
            }
            let id = next_counter_tx(&tx, COUNTER_CARD)?;
            tx.execute(
                "INSERT INTO cards(id, category_id, text) VALUES (?1, ?2, ?3)",
                params![id, category_id, text],
            )?;
            card_ids.insert(edit.card_id, id);
        }

        tx.execute(
            "UPDATE revisions SET state=?2 WHERE id=?1",
            params![revision_row.id, RevisionState::Applied.as_str()],
        )?;
        delete_draft_rows_tx(&tx, revision_row.id)?;
        insert_event_tx(
            &tx,
            now_ms,
            Some(revision_row.id),
            "revision.apply",
            &json!({
                "name": revision_row.name,
                "categories_created": category_ids.len(),
                "cards_created": card_ids.len(),
                "categories_deleted": categories_deleted,
                "cards_deleted": cards_deleted,
            })
            .to_string(),
        )?;
        tx.commit()?;

        Ok(ApplyOutcome {
            revision_id: revision_row.id,
            category_ids,
            card_ids,
            categories_deleted,
            cards_deleted,
        })
    }
}

/// Maps a card edit's owning category to its post-apply persistent id and
/// verifies that category survives the apply.
fn resolved_category_tx(
    tx: &Transaction<'_>,
    category_ids: &BTreeMap<i64, i64>,
    category_id: i64,
) -> Result<i64, StoreError> {
    let resolved = if category_id <= 0 {
        match category_ids.get(&category_id) {
            Some(&id) => id,
            None => {
                return Err(StoreError::InvalidEdit(
                    "card references a category that does not survive apply",
                ));
            }
        }
    } else {
        category_id
    };
    if !base_category_exists_tx(tx, resolved)? {
        return Err(StoreError::InvalidEdit(
            "card references a category that does not survive apply",
        ));
    }
    Ok(resolved)
}
