#![forbid(unsafe_code)]

mod support;

use deck_core::ids::{CardId, CategoryId, RevisionId};
use deck_storage::{StageCardEditRequest, StageCategoryEditRequest, StoreError};
use support::*;

fn edit_category_name(revision: RevisionId, category_id: i64, name: &str) -> StageCategoryEditRequest {
    StageCategoryEditRequest {
        revision,
        target: Some(CategoryId::new(category_id)),
        name: Some(name.to_string()),
        description: None,
        delete: false,
    }
}

fn edit_card_text(revision: RevisionId, category_id: i64, card_id: i64, text: &str) -> StageCardEditRequest {
    StageCardEditRequest {
        revision,
        target: Some(CardId::new(card_id)),
        category: CategoryId::new(category_id),
        text: Some(text.to_string()),
        delete: false,
    }
}

#[test]
fn category_staged_in_one_open_revision_blocks_another() {
    let mut store = open_store("category_staged_in_one_open_revision_blocks_another");
    let (category_id, _) = seed_category(&mut store, "history", &["alpha"]);

    let first = open_revision(&mut store, "first");
    let second = open_revision(&mut store, "second");
    store
        .stage_category_edit(edit_category_name(first, category_id, "ancient history"))
        .expect("stage in first revision");

    let err = store
        .stage_category_edit(edit_category_name(second, category_id, "modern history"))
        .expect_err("second revision must be rejected");
    match err {
        StoreError::EditConflict { revision_id } => assert_eq!(revision_id, first.get()),
        other => panic!("expected EditConflict, got {other:?}"),
    }
}

#[test]
fn apply_releases_the_target_for_other_revisions() {
    let mut store = open_store("apply_releases_the_target_for_other_revisions");
    let (category_id, _) = seed_category(&mut store, "science", &[]);

    let first = open_revision(&mut store, "first");
    let second = open_revision(&mut store, "second");
    store
        .stage_category_edit(edit_category_name(first, category_id, "natural science"))
        .expect("stage in first revision");
    store.revision_apply(first).expect("apply first revision");

    store
        .stage_category_edit(edit_category_name(second, category_id, "applied science"))
        .expect("staging must succeed once the first revision applied");
}

#[test]
fn remove_releases_the_target_for_other_revisions() {
    let mut store = open_store("remove_releases_the_target_for_other_revisions");
    let (category_id, _) = seed_category(&mut store, "music", &[]);

    let first = open_revision(&mut store, "first");
    let second = open_revision(&mut store, "second");
    store
        .stage_category_edit(edit_category_name(first, category_id, "classical music"))
        .expect("stage in first revision");
    assert!(store.revision_remove(first).expect("remove first revision"));

    store
        .stage_category_edit(edit_category_name(second, category_id, "folk music"))
        .expect("staging must succeed once the first revision was removed");
}

#[test]
fn card_staged_in_one_open_revision_blocks_another() {
    let mut store = open_store("card_staged_in_one_open_revision_blocks_another");
    let (category_id, card_ids) = seed_category(&mut store, "geography", &["first card", "second card"]);

    let first = open_revision(&mut store, "first");
    let second = open_revision(&mut store, "second");
    store
        .stage_card_edit(edit_card_text(first, category_id, card_ids[0], "reworded"))
        .expect("stage in first revision");

    let err = store
        .stage_card_edit(edit_card_text(second, category_id, card_ids[0], "another wording"))
        .expect_err("second revision must be rejected");
    match err {
        StoreError::EditConflict { revision_id } => assert_eq!(revision_id, first.get()),
        other => panic!("expected EditConflict, got {other:?}"),
    }

    // Exclusivity is per entity: the sibling card is untouched and free.
    store
        .stage_card_edit(edit_card_text(second, category_id, card_ids[1], "sibling wording"))
        .expect("sibling card must stay editable");
}

#[test]
fn category_and_card_edits_do_not_conflict_across_kinds() {
    let mut store = open_store("category_and_card_edits_do_not_conflict_across_kinds");
    let (category_id, card_ids) = seed_category(&mut store, "art", &["brush"]);

    let first = open_revision(&mut store, "first");
    let second = open_revision(&mut store, "second");
    store
        .stage_category_edit(edit_category_name(first, category_id, "fine art"))
        .expect("stage category edit in first revision");

    // The category being claimed by the first revision does not lock its
    // cards; only the card target itself is guarded.
    store
        .stage_card_edit(edit_card_text(second, category_id, card_ids[0], "palette knife"))
        .expect("card edit in second revision must succeed");
}

#[test]
fn restaging_in_the_same_revision_is_not_a_conflict() {
    let mut store = open_store("restaging_in_the_same_revision_is_not_a_conflict");
    let (category_id, _) = seed_category(&mut store, "games", &[]);

    let revision = open_revision(&mut store, "only");
    store
        .stage_category_edit(edit_category_name(revision, category_id, "board games"))
        .expect("first stage");
    let row = store
        .stage_category_edit(edit_category_name(revision, category_id, "card games"))
        .expect("re-stage in the same revision");
    assert_eq!(row.name.as_deref(), Some("card games"));
}
