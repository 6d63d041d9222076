#![forbid(unsafe_code)]

use deck_core::ids::{CardId, CategoryId, PrincipalId, RevisionId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateRevisionRequest {
    pub name: String,
    pub owner: PrincipalId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListRevisionsRequest {
    pub owner: Option<PrincipalId>,
    pub limit: usize,
    pub offset: usize,
}

/// `target: None` stages a brand-new category under a freshly allocated
/// placeholder id. A placeholder target re-stages an edit already held by the
/// same revision; absent optional fields retain the staged values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageCategoryEditRequest {
    pub revision: RevisionId,
    pub target: Option<CategoryId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub delete: bool,
}

/// `category` may reference a sibling placeholder staged in the same
/// revision; it is the card's owning category after apply, so passing a
/// different category than the card's current one moves the card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageCardEditRequest {
    pub revision: RevisionId,
    pub target: Option<CardId>,
    pub category: CategoryId,
    pub text: Option<String>,
    pub delete: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListEventsRequest {
    pub revision: Option<RevisionId>,
    pub since_seq: i64,
    pub limit: usize,
}
