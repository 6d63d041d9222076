#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize)]
pub struct CreateRevisionArgs {
    pub name: String,
}

/// `category_id: None` stages a brand-new category; a non-positive value
/// addresses a placeholder already staged in the same revision.
#[derive(Clone, Debug, Deserialize)]
pub struct CategoryEditArgs {
    pub revision_id: i64,
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub delete: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CardEditArgs {
    pub revision_id: i64,
    pub card_id: Option<i64>,
    pub category_id: i64,
    pub text: Option<String>,
    #[serde(default)]
    pub delete: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UnstageCategoryArgs {
    pub revision_id: i64,
    pub category_id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UnstageCardArgs {
    pub revision_id: i64,
    pub card_id: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct RevisionCreated {
    pub id: i64,
}

/// The staged edit's target id: the placeholder for a brand-new entity,
/// otherwise the target the caller addressed.
#[derive(Clone, Debug, Serialize)]
pub struct StagedEdit {
    pub id: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct RevisionSummary {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    pub state: &'static str,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ApplyReport {
    pub revision_id: i64,
    pub categories_created: usize,
    pub cards_created: usize,
    pub categories_deleted: usize,
    pub cards_deleted: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct CategoryView {
    pub id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CardView {
    pub id: i64,
    pub text: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CategoryCardsView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub cards: Vec<CardView>,
}
