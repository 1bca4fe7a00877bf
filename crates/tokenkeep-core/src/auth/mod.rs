//! Authentication module for managing the session token.
//!
//! This module provides:
//! - `SessionStore`: login/logout and login status over a storage substrate
//! - `LoginRequest` / `TokenPayload`: the login endpoint's wire types
//!
//! A session is nothing more than a token stored under `TOKEN_KEY`. Tokens
//! do not expire client-side; `logout` is the only way to end a session.

pub mod payload;
pub mod session;

pub use payload::{LoginRequest, TokenPayload};
pub use session::{LoginOutcome, SessionStore, SignIn, LOGIN_PATH, TOKEN_KEY};
