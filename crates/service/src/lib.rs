#![forbid(unsafe_code)]

mod auth;
mod contracts;
mod error;
mod service;
mod support;

pub use auth::{AuthError, SESSION_TOKEN_LEN, Session, SessionAuthority};
pub use contracts::*;
pub use error::ApiError;
pub use service::DeckService;
