#![forbid(unsafe_code)]
#![allow(dead_code)]

use deck_core::ids::{CategoryId, PrincipalId, RevisionId};
use deck_storage::{
    CreateRevisionRequest, SqliteStore, StageCardEditRequest, StageCategoryEditRequest,
};
use std::path::PathBuf;

pub(crate) fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("deck_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

pub(crate) fn open_store(test_name: &str) -> SqliteStore {
    SqliteStore::open(temp_dir(test_name)).expect("open store")
}

pub(crate) fn open_revision(store: &mut SqliteStore, name: &str) -> RevisionId {
    open_revision_for(store, name, 1)
}

pub(crate) fn open_revision_for(store: &mut SqliteStore, name: &str, owner: i64) -> RevisionId {
    let row = store
        .revision_create(CreateRevisionRequest {
            name: name.to_string(),
            owner: PrincipalId::try_new(owner).expect("owner id"),
        })
        .expect("create revision");
    RevisionId::try_new(row.id).expect("revision id")
}

pub(crate) fn stage_new_category(store: &mut SqliteStore, revision: RevisionId, name: &str) -> i64 {
    store
        .stage_category_edit(StageCategoryEditRequest {
            revision,
            target: None,
            name: Some(name.to_string()),
            description: None,
            delete: false,
        })
        .expect("stage new category")
        .category_id
}

pub(crate) fn stage_new_card(
    store: &mut SqliteStore,
    revision: RevisionId,
    category_id: i64,
    text: &str,
) -> i64 {
    store
        .stage_card_edit(StageCardEditRequest {
            revision,
            target: None,
            category: CategoryId::new(category_id),
            text: Some(text.to_string()),
            delete: false,
        })
        .expect("stage new card")
        .card_id
}

/// Builds one committed category through the engine itself and returns its
/// persistent id plus its card ids in staging order.
pub(crate) fn seed_category(store: &mut SqliteStore, name: &str, cards: &[&str]) -> (i64, Vec<i64>) {
    let revision = open_revision(store, &format!("seed {name}"));
    let placeholder = stage_new_category(store, revision, name);
    for text in cards {
        stage_new_card(store, revision, placeholder, text);
    }
    let outcome = store.revision_apply(revision).expect("apply seed revision");
    let category_id = outcome.category_ids[&placeholder];
    let mut card_ids: Vec<i64> = outcome.card_ids.values().copied().collect();
    card_ids.sort();
    (category_id, card_ids)
}
