use super::*;
use deck_core::ids::{CardId, CategoryId, RevisionId};
use rusqlite::params;

impl SqliteStore {
    /// Creates or updates the one staged category change for
    /// (revision, target). Absent optional fields retain whatever the draft
    /// row already holds; a staged deletion stays staged until the edit is
    /// removed outright.
    ///
    /// The exclusivity check and the draft-row upsert run in the same write
    /// transaction, so two revisions racing for the same target cannot both
    /// pass the check.
    pub fn stage_category_edit(
        &mut self,
        request: StageCategoryEditRequest,
    ) -> Result<CategoryEditRow, StoreError> {
        let tx = self.conn.transaction()?;
        require_open_revision_tx(&tx, request.revision.get())?;

        let (target_id, existing) = match request.target {
            None => {
                if request.delete {
                    return Err(StoreError::InvalidEdit(
                        "a category that does not exist yet cannot be staged as deleted",
                    ));
                }
                let Some(name) = request.name.as_deref().map(str::trim).filter(|name| !name.is_empty())
                else {
                    return Err(StoreError::InvalidEdit("name is required for a new category"));
                };
                if category_name_taken_tx(&tx, name, None)? {
                    return Err(StoreError::DuplicateName {
                        name: name.to_string(),
                    });
                }
                let placeholder = next_placeholder_tx(&tx, request.revision.get())?;
                (placeholder, None)
            }
            Some(target) if target.is_persistent() => {
                if !base_category_exists_tx(&tx, target.get())? {
                    return Err(StoreError::UnknownCategory);
                }
                if let Some(revision_id) =
                    category_conflict_tx(&tx, request.revision.get(), target.get())?
                {
                    return Err(StoreError::EditConflict { revision_id });
                }
                let existing = category_edit_row_tx(&tx, request.revision.get(), target.get())?;
                (target.get(), existing)
            }
            Some(target) => {
                let Some(existing) =
                    category_edit_row_tx(&tx, request.revision.get(), target.get())?
                else {
                    return Err(StoreError::UnknownCategory);
                };
                (target.get(), Some(existing))
            }
        };

        let row = CategoryEditRow {
            revision_id: request.revision.get(),
            category_id: target_id,
            name: request
                .name
                .or_else(|| existing.as_ref().and_then(|row| row.name.clone())),
            description: request
                .description
                .or_else(|| existing.as_ref().and_then(|row| row.description.clone())),
            deleted: request.delete || existing.as_ref().is_some_and(|row| row.deleted),
        };

        tx.execute(
            r#"
            INSERT INTO category_edits(revision_id, category_id, name, description, deleted)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(revision_id, category_id) DO UPDATE SET
              name=excluded.name,
              description=excluded.description,
              deleted=excluded.deleted
            "#,
            params![
                row.revision_id,
                row.category_id,
                row.name,
                row.description,
                row.deleted as i64
            ],
        )?;
        tx.commit()?;
        Ok(row)
    }

    /// Same contract as [`stage_category_edit`], scoped to cards. The owning
    /// category must resolve within this revision: either a base category the
    /// revision does not delete, or a sibling placeholder staged here.
    ///
    /// [`stage_category_edit`]: SqliteStore::stage_category_edit
    pub fn stage_card_edit(
        &mut self,
        request: StageCardEditRequest,
    ) -> Result<CardEditRow, StoreError> {
        let tx = self.conn.transaction()?;
        require_open_revision_tx(&tx, request.revision.get())?;

        if !category_resolvable_tx(&tx, request.revision.get(), request.category.get())? {
            return Err(StoreError::UnknownCategory);
        }

        let (target_id, existing) = match request.target {
            None => {
                if request.delete {
                    return Err(StoreError::InvalidEdit(
                        "a card that does not exist yet cannot be staged as deleted",
                    ));
                }
                let Some(text) = request.text.as_deref().filter(|text| !text.trim().is_empty())
                else {
                    return Err(StoreError::InvalidEdit("text is required for a new card"));
                };
                if request.category.is_persistent()
                    && card_text_taken_tx(&tx, request.category.get(), text, None)?
                {
                    return Err(StoreError::DuplicateName {
                        name: text.to_string(),
                    });
                }
                let placeholder = next_placeholder_tx(&tx, request.revision.get())?;
                (placeholder, None)
            }
            Some(target) if target.is_persistent() => {
                if base_card_tx(&tx, target.get())?.is_none() {
                    return Err(StoreError::UnknownCard);
                }
                if let Some(revision_id) =
                    card_conflict_tx(&tx, request.revision.get(), target.get())?
                {
                    return Err(StoreError::EditConflict { revision_id });
                }
                let existing = card_edit_row_tx(&tx, request.revision.get(), target.get())?;
                (target.get(), existing)
            }
            Some(target) => {
                let Some(existing) = card_edit_row_tx(&tx, request.revision.get(), target.get())?
                else {
                    return Err(StoreError::UnknownCard);
                };
                (target.get(), Some(existing))
            }
        };

        let row = CardEditRow {
            revision_id: request.revision.get(),
            card_id: target_id,
            category_id: request.category.get(),
            text: request
                .text
                .or_else(|| existing.as_ref().and_then(|row| row.text.clone())),
            deleted: request.delete || existing.as_ref().is_some_and(|row| row.deleted),
        };

        tx.execute(
            r#"
            INSERT INTO card_edits(revision_id, card_id, category_id, text, deleted)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(revision_id, card_id) DO UPDATE SET
              category_id=excluded.category_id,
              text=excluded.text,
              deleted=excluded.deleted
            "#,
            params![
                row.revision_id,
                row.card_id,
                row.category_id,
                row.text,
                row.deleted as i64
            ],
        )?;
        tx.commit()?;
        Ok(row)
    }

    /// Drops a staged category edit. False when no such draft row exists;
    /// card edits that referenced a dropped placeholder are left in place and
    /// rejected at apply time.
    pub fn remove_category_edit(
        &mut self,
        revision: RevisionId,
        target: CategoryId,
    ) -> Result<bool, StoreError> {
        let tx = self.conn.transaction()?;
        require_open_revision_tx(&tx, revision.get())?;
        let removed = tx.execute(
            "DELETE FROM category_edits WHERE revision_id=?1 AND category_id=?2",
            params![revision.get(), target.get()],
        )?;
        tx.commit()?;
        Ok(removed > 0)
    }

    pub fn remove_card_edit(
        &mut self,
        revision: RevisionId,
        target: CardId,
    ) -> Result<bool, StoreError> {
        let tx = self.conn.transaction()?;
        require_open_revision_tx(&tx, revision.get())?;
        let removed = tx.execute(
            "DELETE FROM card_edits WHERE revision_id=?1 AND card_id=?2",
            params![revision.get(), target.get()],
        )?;
        tx.commit()?;
        Ok(removed > 0)
    }
}
