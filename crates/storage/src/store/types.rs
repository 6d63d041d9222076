#![forbid(unsafe_code)]

use deck_core::model::RevisionState;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug)]
pub struct CardRow {
    pub id: i64,
    pub category_id: i64,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct CategoryWithCards {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub cards: Vec<CardRow>,
}

#[derive(Clone, Debug)]
pub struct RevisionRow {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    pub state: RevisionState,
    pub created_at_ms: i64,
}

/// One staged category change, keyed by (revision, target). A non-positive
/// `category_id` is a placeholder local to the revision.
#[derive(Clone, Debug)]
pub struct CategoryEditRow {
    pub revision_id: i64,
    pub category_id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub deleted: bool,
}

#[derive(Clone, Debug)]
pub struct CardEditRow {
    pub revision_id: i64,
    pub card_id: i64,
    pub category_id: i64,
    pub text: Option<String>,
    pub deleted: bool,
}

/// Result of folding a revision into the base corpus. The maps record which
/// persistent id each placeholder resolved to.
#[derive(Clone, Debug)]
pub struct ApplyOutcome {
    pub revision_id: i64,
    pub category_ids: BTreeMap<i64, i64>,
    pub card_ids: BTreeMap<i64, i64>,
    pub categories_deleted: usize,
    pub cards_deleted: usize,
}

#[derive(Clone, Debug)]
pub struct OverlayCard {
    pub id: i64,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct OverlayCategory {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub cards: Vec<OverlayCard>,
}

/// A revision's view of the corpus: base entities with the revision's staged
/// edits overlaid. For a closed revision this degenerates to the base corpus.
#[derive(Clone, Debug)]
pub struct RevisionOverlay {
    pub revision: RevisionRow,
    pub categories: Vec<OverlayCategory>,
}

#[derive(Clone, Debug)]
pub struct EventRow {
    pub seq: i64,
    pub ts_ms: i64,
    pub revision_id: Option<i64>,
    pub event_type: String,
    pub payload_json: String,
}
