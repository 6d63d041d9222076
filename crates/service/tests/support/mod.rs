#![forbid(unsafe_code)]
#![allow(dead_code)]

use deck_core::access::Access;
use deck_core::ids::PrincipalId;
use deck_service::{
    AuthError, CardEditArgs, CategoryEditArgs, DeckService, Session, SessionAuthority,
};
use deck_storage::SqliteStore;
use std::collections::HashMap;
use std::path::PathBuf;

pub(crate) fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("deck_service_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

/// Fixed token → session table standing in for the external session backend.
pub(crate) struct StaticAuthority {
    sessions: HashMap<String, Session>,
}

impl StaticAuthority {
    pub(crate) fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    pub(crate) fn grant(mut self, token: &str, principal: i64, level: i64) -> Self {
        self.sessions.insert(
            token.to_string(),
            Session {
                principal: PrincipalId::try_new(principal).expect("principal id"),
                access: Access::from_level(level),
            },
        );
        self
    }
}

impl SessionAuthority for StaticAuthority {
    fn resolve(&self, token: &str) -> Result<Session, AuthError> {
        self.sessions
            .get(token)
            .copied()
            .ok_or(AuthError::UnknownToken)
    }
}

pub(crate) fn token(label: char) -> String {
    std::iter::repeat_n(label, 32).collect()
}

pub(crate) fn open_service(
    test_name: &str,
    authority: StaticAuthority,
) -> DeckService<StaticAuthority> {
    let store = SqliteStore::open(temp_dir(test_name)).expect("open store");
    DeckService::new(store, authority)
}

pub(crate) fn new_category_args(revision_id: i64, name: &str) -> CategoryEditArgs {
    CategoryEditArgs {
        revision_id,
        category_id: None,
        name: Some(name.to_string()),
        description: None,
        delete: false,
    }
}

pub(crate) fn new_card_args(revision_id: i64, category_id: i64, text: &str) -> CardEditArgs {
    CardEditArgs {
        revision_id,
        card_id: None,
        category_id,
        text: Some(text.to_string()),
        delete: false,
    }
}
