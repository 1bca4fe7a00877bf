//! tokenkeep core - client-side session token management.
//!
//! A `SessionStore` keeps a single authentication token in an injected
//! key-value storage substrate and mediates login/logout against a remote
//! login endpoint through an injected HTTP client.

pub mod api;
pub mod auth;
pub mod config;
pub mod storage;

pub use api::{ApiClient, ApiError, ApiResponse, HttpClient};
pub use auth::{LoginOutcome, LoginRequest, SessionStore, SignIn, TokenPayload};
pub use config::Config;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
