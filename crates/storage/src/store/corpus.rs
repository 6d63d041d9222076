use super::*;
use deck_core::ids::CategoryId;
use rusqlite::{OptionalExtension, params};

impl SqliteStore {
    pub fn categories_list(&self) -> Result<Vec<CategoryRow>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, description FROM categories ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(CategoryRow {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn category_with_cards(
        &self,
        category: CategoryId,
    ) -> Result<Option<CategoryWithCards>, StoreError> {
        if category.is_placeholder() {
            return Err(StoreError::InvalidInput("category id must be positive"));
        }

        let Some(row) = self
            .conn
            .query_row(
                "SELECT id, name, description FROM categories WHERE id=?1",
                params![category.get()],
                |row| {
                    Ok(CategoryRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                    })
                },
            )
            .optional()?
        else {
            return Ok(None);
        };

        let mut stmt = self
            .conn
            .prepare("SELECT id, category_id, text FROM cards WHERE category_id=?1 ORDER BY id ASC")?;
        let cards = stmt.query_map(params![category.get()], |row| {
            Ok(CardRow {
                id: row.get(0)?,
                category_id: row.get(1)?,
                text: row.get(2)?,
            })
        })?;

        Ok(Some(CategoryWithCards {
            id: row.id,
            name: row.name,
            description: row.description,
            cards: cards.collect::<Result<Vec<_>, _>>()?,
        }))
    }
}
