#![forbid(unsafe_code)]

use deck_core::access::Access;
use deck_core::ids::PrincipalId;

pub const SESSION_TOKEN_LEN: usize = 32;

#[derive(Clone, Copy, Debug)]
pub struct Session {
    pub principal: PrincipalId,
    pub access: Access,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthError {
    UnknownToken,
    Unavailable,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownToken => write!(f, "unknown session token"),
            Self::Unavailable => write!(f, "session backend unavailable"),
        }
    }
}

impl std::error::Error for AuthError {}

/// External authentication collaborator. Implementations look the token up
/// against whatever session backend the deployment uses; the service only
/// checks token shape before asking.
pub trait SessionAuthority {
    /// Resolved fresh on every request; results must not be cached by the
    /// caller, since access levels can change between requests.
    fn resolve(&self, token: &str) -> Result<Session, AuthError>;
}
