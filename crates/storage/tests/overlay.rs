#![forbid(unsafe_code)]

mod support;

use deck_core::ids::{CardId, CategoryId, RevisionId};
use deck_storage::{StageCardEditRequest, StageCategoryEditRequest, StoreError};
use support::*;

#[test]
fn base_rows_group_by_category_in_input_order() {
    let mut store = open_store("base_rows_group_by_category_in_input_order");
    let (first_id, _) = seed_category(&mut store, "letters", &["a", "b"]);
    let (second_id, _) = seed_category(&mut store, "digits", &["c"]);

    let revision = open_revision(&mut store, "viewer");
    let overlay = store.revision_overlay(revision).expect("overlay");

    assert_eq!(overlay.categories.len(), 2, "expected exactly two groups");
    assert_eq!(overlay.categories[0].id, first_id);
    let texts: Vec<&str> = overlay.categories[0]
        .cards
        .iter()
        .map(|card| card.text.as_str())
        .collect();
    assert_eq!(texts, ["a", "b"], "input order must be preserved within a group");
    assert_eq!(overlay.categories[1].id, second_id);
    assert_eq!(overlay.categories[1].cards.len(), 1);
    assert_eq!(overlay.categories[1].cards[0].text, "c");
}

#[test]
fn staged_edits_are_visible_in_the_overlay() {
    let mut store = open_store("staged_edits_are_visible_in_the_overlay");
    let (kept_id, kept_cards) = seed_category(&mut store, "kept", &["original wording"]);
    let (doomed_id, _) = seed_category(&mut store, "doomed", &["collateral"]);

    let revision = open_revision(&mut store, "editor");
    store
        .stage_category_edit(StageCategoryEditRequest {
            revision,
            target: Some(CategoryId::new(kept_id)),
            name: Some("kept and renamed".to_string()),
            description: None,
            delete: false,
        })
        .expect("stage rename");
    store
        .stage_category_edit(StageCategoryEditRequest {
            revision,
            target: Some(CategoryId::new(doomed_id)),
            name: None,
            description: None,
            delete: true,
        })
        .expect("stage deletion");
    store
        .stage_card_edit(StageCardEditRequest {
            revision,
            target: Some(CardId::new(kept_cards[0])),
            category: CategoryId::new(kept_id),
            text: Some("new wording".to_string()),
            delete: false,
        })
        .expect("stage card edit");
    let placeholder = stage_new_category(&mut store, revision, "pending");
    stage_new_card(&mut store, revision, placeholder, "first draft");

    let overlay = store.revision_overlay(revision).expect("overlay");
    assert_eq!(overlay.categories.len(), 2, "deleted category must not render");

    // Placeholders are negative, so the pending category groups first.
    assert_eq!(overlay.categories[0].id, placeholder);
    assert_eq!(overlay.categories[0].name, "pending");
    assert_eq!(overlay.categories[0].cards.len(), 1);
    assert_eq!(overlay.categories[0].cards[0].text, "first draft");

    assert_eq!(overlay.categories[1].id, kept_id);
    assert_eq!(overlay.categories[1].name, "kept and renamed");
    assert_eq!(overlay.categories[1].cards.len(), 1);
    assert_eq!(overlay.categories[1].cards[0].text, "new wording");
}

#[test]
fn moved_card_renders_under_its_target_category() {
    let mut store = open_store("moved_card_renders_under_its_target_category");
    let (from_id, cards) = seed_category(&mut store, "source", &["traveller"]);
    let (to_id, _) = seed_category(&mut store, "target", &[]);

    let revision = open_revision(&mut store, "mover");
    store
        .stage_card_edit(StageCardEditRequest {
            revision,
            target: Some(CardId::new(cards[0])),
            category: CategoryId::new(to_id),
            text: None,
            delete: false,
        })
        .expect("stage move");

    let overlay = store.revision_overlay(revision).expect("overlay");
    let source = overlay
        .categories
        .iter()
        .find(|category| category.id == from_id)
        .expect("source category renders");
    assert!(source.cards.is_empty(), "moved card must leave its source group");
    let target = overlay
        .categories
        .iter()
        .find(|category| category.id == to_id)
        .expect("target category renders");
    assert_eq!(target.cards.len(), 1);
    assert_eq!(target.cards[0].text, "traveller");
}

#[test]
fn overlay_of_a_closed_revision_degenerates_to_the_base_corpus() {
    let mut store = open_store("overlay_of_a_closed_revision_degenerates_to_the_base_corpus");

    let revision = open_revision(&mut store, "builder");
    let placeholder = stage_new_category(&mut store, revision, "published");
    stage_new_card(&mut store, revision, placeholder, "live card");
    let outcome = store.revision_apply(revision).expect("apply");

    let overlay = store.revision_overlay(revision).expect("overlay after apply");
    assert_eq!(overlay.categories.len(), 1);
    assert_eq!(
        overlay.categories[0].id, outcome.category_ids[&placeholder],
        "the applied view must show the persistent id, not the placeholder"
    );
    assert_eq!(overlay.categories[0].cards.len(), 1);
}

#[test]
fn overlay_of_an_unknown_revision_is_rejected() {
    let mut store = open_store("overlay_of_an_unknown_revision_is_rejected");
    let unknown = RevisionId::try_new(777).expect("revision id");
    let err = store.revision_overlay(unknown).expect_err("overlay must fail");
    match err {
        StoreError::UnknownRevision => {}
        other => panic!("expected UnknownRevision, got {other:?}"),
    }
}

#[test]
fn empty_corpus_renders_no_groups() {
    let mut store = open_store("empty_corpus_renders_no_groups");
    let revision = open_revision(&mut store, "empty");
    let overlay = store.revision_overlay(revision).expect("overlay");
    assert!(overlay.categories.is_empty());
}
