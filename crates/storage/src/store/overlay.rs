use super::*;
use deck_core::ids::RevisionId;
use rusqlite::params;
use std::collections::BTreeMap;

struct OverlayRow {
    category_id: i64,
    name: String,
    description: String,
    card: Option<OverlayCard>,
}

impl SqliteStore {
    /// Reconstructs the corpus as this revision would leave it: base
    /// categories and cards with the revision's staged edits overlaid,
    /// ascending category id (placeholders are negative, so pending new
    /// categories order first). Dangling card edits, whose category does not
    /// survive the revision, are omitted from the view; apply is where they
    /// fail.
    pub fn revision_overlay(&mut self, revision: RevisionId) -> Result<RevisionOverlay, StoreError> {
        let tx = self.conn.transaction()?;
        let Some(revision_row) = revision_row_tx(&tx, revision.get())? else {
            return Err(StoreError::UnknownRevision);
        };

        let category_edits: BTreeMap<i64, CategoryEditRow> = {
            let mut stmt = tx.prepare(
                "SELECT category_id, name, description, deleted FROM category_edits \
                 WHERE revision_id=?1",
            )?;
            let mut rows = stmt.query(params![revision_row.id])?;
            let mut edits = BTreeMap::new();
            while let Some(row) = rows.next()? {
                let category_id: i64 = row.get(0)?;
                edits.insert(
                    category_id,
                    CategoryEditRow {
                        revision_id: revision_row.id,
                        category_id,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        deleted: row.get::<_, i64>(3)? != 0,
                    },
                );
            }
            edits
        };
        let card_edits: BTreeMap<i64, CardEditRow> = {
            let mut stmt = tx.prepare(
                "SELECT card_id, category_id, text, deleted FROM card_edits \
                 WHERE revision_id=?1",
            )?;
            let mut rows = stmt.query(params![revision_row.id])?;
            let mut edits = BTreeMap::new();
            while let Some(row) = rows.next()? {
                let card_id: i64 = row.get(0)?;
                edits.insert(
                    card_id,
                    CardEditRow {
                        revision_id: revision_row.id,
                        card_id,
                        category_id: row.get(1)?,
                        text: row.get(2)?,
                        deleted: row.get::<_, i64>(3)? != 0,
                    },
                );
            }
            edits
        };

        let mut categories: BTreeMap<i64, (String, String)> = BTreeMap::new();
        {
            let mut stmt =
                tx.prepare("SELECT id, name, description FROM categories ORDER BY id ASC")?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let id: i64 = row.get(0)?;
                let name: String = row.get(1)?;
                let description: String = row.get(2)?;
                match category_edits.get(&id) {
                    Some(edit) if edit.deleted => continue,
                    Some(edit) => {
                        categories.insert(
                            id,
                            (
                                edit.name.clone().unwrap_or(name),
                                edit.description.clone().unwrap_or(description),
                            ),
                        );
                    }
                    None => {
                        categories.insert(id, (name, description));
                    }
                }
            }
        }
        for edit in category_edits.values() {
            if edit.category_id > 0 || edit.deleted {
                continue;
            }
            categories.insert(
                edit.category_id,
                (
                    edit.name.clone().unwrap_or_default(),
                    edit.description.clone().unwrap_or_default(),
                ),
            );
        }

        let mut cards_by_category: BTreeMap<i64, Vec<OverlayCard>> = BTreeMap::new();
        {
            let mut stmt = tx.prepare("SELECT id, category_id, text FROM cards ORDER BY id ASC")?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let id: i64 = row.get(0)?;
                let category_id: i64 = row.get(1)?;
                let text: String = row.get(2)?;
                let (category_id, text) = match card_edits.get(&id) {
                    Some(edit) if edit.deleted => continue,
                    Some(edit) => (edit.category_id, edit.text.clone().unwrap_or(text)),
                    None => (category_id, text),
                };
                if !categories.contains_key(&category_id) {
                    continue;
                }
                cards_by_category
                    .entry(category_id)
                    .or_default()
                    .push(OverlayCard { id, text });
            }
        }

        // Placeholder ids were allocated counting down, so descending id
        // order restores staging order.
        let mut placeholder_cards: Vec<&CardEditRow> = card_edits
            .values()
            .filter(|edit| edit.card_id <= 0 && !edit.deleted)
            .collect();
        placeholder_cards.sort_by_key(|edit| std::cmp::Reverse(edit.card_id));
        for edit in placeholder_cards {
            if !categories.contains_key(&edit.category_id) {
                continue;
            }
            cards_by_category
                .entry(edit.category_id)
                .or_default()
                .push(OverlayCard {
                    id: edit.card_id,
                    text: edit.text.clone().unwrap_or_default(),
                });
        }
        tx.commit()?;

        let mut rows = Vec::new();
        for (id, (name, description)) in &categories {
            match cards_by_category.remove(id) {
                None => rows.push(OverlayRow {
                    category_id: *id,
                    name: name.clone(),
                    description: description.clone(),
                    card: None,
                }),
                Some(cards) => {
                    for card in cards {
                        rows.push(OverlayRow {
                            category_id: *id,
                            name: name.clone(),
                            description: description.clone(),
                            card: Some(card),
                        });
                    }
                }
            }
        }

        Ok(RevisionOverlay {
            revision: revision_row,
            categories: group_overlay_rows(rows),
        })
    }
}

/// Run-groups a flattened (category, card) row sequence: a group closes when
/// the category id changes from the previous row, and the final run closes at
/// the last row.
fn group_overlay_rows(rows: Vec<OverlayRow>) -> Vec<OverlayCategory> {
    let mut grouped = Vec::new();
    let mut open: Option<OverlayCategory> = None;
    for row in rows {
        if let Some(group) = open.take() {
            if group.id == row.category_id {
                open = Some(group);
            } else {
                grouped.push(group);
            }
        }
        let group = open.get_or_insert_with(|| OverlayCategory {
            id: row.category_id,
            name: row.name.clone(),
            description: row.description.clone(),
            cards: Vec::new(),
        });
        if let Some(card) = row.card {
            group.cards.push(card);
        }
    }
    if let Some(group) = open {
        grouped.push(group);
    }
    grouped
}
