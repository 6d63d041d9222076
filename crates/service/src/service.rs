#![forbid(unsafe_code)]

use crate::auth::{SESSION_TOKEN_LEN, Session, SessionAuthority};
use crate::contracts::*;
use crate::error::ApiError;
use crate::support::ts_ms_to_rfc3339;
use deck_core::ids::{CardId, CategoryId, PrincipalId, RevisionId};
use deck_storage::{
    CreateRevisionRequest, ListRevisionsRequest, SqliteStore, StageCardEditRequest,
    StageCategoryEditRequest,
};
use serde_json::{Value, json};

/// The operation surface the request layer talks to: every call resolves the
/// session token, applies the tier/ownership gate, and runs one engine
/// operation against the store.
pub struct DeckService<A> {
    store: SqliteStore,
    authority: A,
}

impl<A: SessionAuthority> DeckService<A> {
    pub fn new(store: SqliteStore, authority: A) -> Self {
        Self { store, authority }
    }

    pub fn revision_create(
        &mut self,
        token: &str,
        args: CreateRevisionArgs,
    ) -> Result<RevisionCreated, ApiError> {
        let session = self.authorize(token)?;
        if !session.access.can_edit() {
            return Err(ApiError::AuthorizationDenied);
        }
        let row = self.store.revision_create(CreateRevisionRequest {
            name: args.name,
            owner: session.principal,
        })?;
        Ok(RevisionCreated { id: row.id })
    }

    /// Editors see their own revisions; administrators see everything.
    pub fn revision_list(&mut self, token: &str) -> Result<Vec<RevisionSummary>, ApiError> {
        let session = self.authorize(token)?;
        if !session.access.can_edit() {
            return Err(ApiError::AuthorizationDenied);
        }
        let owner = if session.access.is_administrator() {
            None
        } else {
            Some(session.principal)
        };
        let rows = self.store.revision_list(ListRevisionsRequest {
            owner,
            limit: 500,
            offset: 0,
        })?;
        Ok(rows
            .into_iter()
            .map(|row| RevisionSummary {
                id: row.id,
                name: row.name,
                owner_id: row.owner_id,
                state: row.state.as_str(),
                created_at: ts_ms_to_rfc3339(row.created_at_ms),
            })
            .collect())
    }

    pub fn stage_category_edit(
        &mut self,
        token: &str,
        args: CategoryEditArgs,
    ) -> Result<StagedEdit, ApiError> {
        let session = self.authorize(token)?;
        let revision = parse_revision(args.revision_id)?;
        self.require_revision_access(&session, revision)?;
        let row = self.store.stage_category_edit(StageCategoryEditRequest {
            revision,
            target: args.category_id.map(CategoryId::new),
            name: args.name,
            description: args.description,
            delete: args.delete,
        })?;
        Ok(StagedEdit {
            id: row.category_id,
        })
    }

    pub fn stage_card_edit(
        &mut self,
        token: &str,
        args: CardEditArgs,
    ) -> Result<StagedEdit, ApiError> {
        let session = self.authorize(token)?;
        let revision = parse_revision(args.revision_id)?;
        self.require_revision_access(&session, revision)?;
        let row = self.store.stage_card_edit(StageCardEditRequest {
            revision,
            target: args.card_id.map(CardId::new),
            category: CategoryId::new(args.category_id),
            text: args.text,
            delete: args.delete,
        })?;
        Ok(StagedEdit { id: row.card_id })
    }

    pub fn remove_category_edit(
        &mut self,
        token: &str,
        args: UnstageCategoryArgs,
    ) -> Result<(), ApiError> {
        let session = self.authorize(token)?;
        let revision = parse_revision(args.revision_id)?;
        self.require_revision_access(&session, revision)?;
        let removed = self
            .store
            .remove_category_edit(revision, CategoryId::new(args.category_id))?;
        if !removed {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    pub fn remove_card_edit(&mut self, token: &str, args: UnstageCardArgs) -> Result<(), ApiError> {
        let session = self.authorize(token)?;
        let revision = parse_revision(args.revision_id)?;
        self.require_revision_access(&session, revision)?;
        let removed = self
            .store
            .remove_card_edit(revision, CardId::new(args.card_id))?;
        if !removed {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    pub fn revision_apply(&mut self, token: &str, revision_id: i64) -> Result<ApplyReport, ApiError> {
        let session = self.authorize(token)?;
        let revision = parse_revision(revision_id)?;
        self.require_revision_access(&session, revision)?;
        let outcome = self.store.revision_apply(revision)?;
        Ok(ApplyReport {
            revision_id: outcome.revision_id,
            categories_created: outcome.category_ids.len(),
            cards_created: outcome.card_ids.len(),
            categories_deleted: outcome.categories_deleted,
            cards_deleted: outcome.cards_deleted,
        })
    }

    /// True when the revision was open and is now removed; false repeats are
    /// harmless.
    pub fn revision_remove(&mut self, token: &str, revision_id: i64) -> Result<bool, ApiError> {
        let session = self.authorize(token)?;
        let revision = parse_revision(revision_id)?;
        self.require_revision_access(&session, revision)?;
        Ok(self.store.revision_remove(revision)?)
    }

    /// Nested projection of one revision:
    /// `{name, created_at, categories: [{id, name, description, cards}]}`.
    pub fn revision_render(&mut self, token: &str, revision_id: i64) -> Result<Value, ApiError> {
        let session = self.authorize(token)?;
        let revision = parse_revision(revision_id)?;
        self.require_revision_access(&session, revision)?;
        let overlay = self.store.revision_overlay(revision)?;
        let categories: Vec<Value> = overlay
            .categories
            .iter()
            .map(|category| {
                json!({
                    "id": category.id,
                    "name": category.name,
                    "description": category.description,
                    "cards": category
                        .cards
                        .iter()
                        .map(|card| json!({ "id": card.id, "text": card.text }))
                        .collect::<Vec<Value>>(),
                })
            })
            .collect();
        Ok(json!({
            "name": overlay.revision.name,
            "created_at": ts_ms_to_rfc3339(overlay.revision.created_at_ms),
            "categories": categories,
        }))
    }

    /// Committed corpus read paths; no session required.
    pub fn categories(&self) -> Result<Vec<CategoryView>, ApiError> {
        let rows = self.store.categories_list()?;
        Ok(rows
            .into_iter()
            .map(|row| CategoryView {
                id: row.id,
                name: row.name,
                description: row.description,
            })
            .collect())
    }

    pub fn category_cards(&self, category_id: i64) -> Result<CategoryCardsView, ApiError> {
        let Some(category) = self.store.category_with_cards(CategoryId::new(category_id))? else {
            return Err(ApiError::NotFound);
        };
        Ok(CategoryCardsView {
            id: category.id,
            name: category.name,
            description: category.description,
            cards: category
                .cards
                .into_iter()
                .map(|card| CardView {
                    id: card.id,
                    text: card.text,
                })
                .collect(),
        })
    }

    fn authorize(&self, token: &str) -> Result<Session, ApiError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ApiError::AuthenticationRequired);
        }
        if token.len() != SESSION_TOKEN_LEN {
            return Err(ApiError::Validation("session token must be 32 characters"));
        }
        Ok(self.authority.resolve(token)?)
    }

    /// Tier gate for mutating operations: editors must own the revision,
    /// administrators are unrestricted. Ownership is queried fresh per
    /// request and never cached.
    fn require_revision_access(
        &mut self,
        session: &Session,
        revision: RevisionId,
    ) -> Result<(), ApiError> {
        if !session.access.can_edit() {
            return Err(ApiError::AuthorizationDenied);
        }
        if session.access.is_administrator() {
            return Ok(());
        }
        if self.owns(session.principal, revision)? {
            Ok(())
        } else {
            Err(ApiError::AuthorizationDenied)
        }
    }

    fn owns(&mut self, principal: PrincipalId, revision: RevisionId) -> Result<bool, ApiError> {
        let Some(row) = self.store.revision_get(revision)? else {
            return Err(ApiError::NotFound);
        };
        Ok(row.owner_id == principal.get())
    }
}

fn parse_revision(value: i64) -> Result<RevisionId, ApiError> {
    RevisionId::try_new(value).map_err(|_| ApiError::Validation("revision id must be positive"))
}
