use std::future::Future;

use anyhow::{Context, Result};
use futures::future::{self, Either};
use tracing::{debug, warn};

use super::{LoginRequest, TokenPayload};
use crate::api::{ApiError, ApiResponse, HttpClient};
use crate::storage::{Storage, StorageError};

/// Storage key holding the session token
pub const TOKEN_KEY: &str = "token";

/// Backend login endpoint
pub const LOGIN_PATH: &str = "/login";

/// Result of a login attempt that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Login produced a token, either already stored or freshly issued
    Completed(ApiResponse<TokenPayload>),
    /// No storage substrate is available, so nothing was attempted
    StorageUnavailable,
}

impl LoginOutcome {
    pub fn token(&self) -> Option<&str> {
        match self {
            LoginOutcome::Completed(response) => Some(response.data.token.as_str()),
            LoginOutcome::StorageUnavailable => None,
        }
    }
}

/// Result of `SessionStore::sign_in`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignIn {
    SignedIn(String),
    StorageUnavailable,
}

/// Session token cache backed by a shared storage substrate.
///
/// The presence of a value under `TOKEN_KEY` is the only "logged in" state.
/// `login` never writes that value; `persist` is the single place that does.
pub struct SessionStore<S, H> {
    storage: Option<S>,
    http: H,
}

impl<S: Storage, H: HttpClient> SessionStore<S, H> {
    /// `None` storage means the host has no storage substrate.
    pub fn new(storage: Option<S>, http: H) -> Self {
        Self { storage, http }
    }

    pub fn has_storage(&self) -> bool {
        self.storage.is_some()
    }

    /// Log in with the given credentials.
    ///
    /// If a token is already stored it is returned without contacting the
    /// backend, whatever the credentials. Otherwise the backend's response
    /// (or failure) is passed through unchanged. Both paths resolve to the
    /// same shape.
    pub fn login<'a>(
        &'a self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginOutcome, ApiError>> + Send + 'a
    where
        H: Sync,
    {
        let Some(storage) = self.storage.as_ref() else {
            debug!("No storage substrate, login skipped");
            return Either::Left(future::ready(Ok(LoginOutcome::StorageUnavailable)));
        };

        if let Some(token) = read_token(storage) {
            debug!("Token already stored, skipping login request");
            let response = ApiResponse::new(TokenPayload::new(token));
            return Either::Left(future::ready(Ok(LoginOutcome::Completed(response))));
        }

        let http = &self.http;
        let request = LoginRequest::new(username, password);
        debug!(username = %request.username, "Sending login request");
        Either::Right(async move {
            http.post::<_, TokenPayload>(LOGIN_PATH, &request)
                .await
                .map(LoginOutcome::Completed)
        })
    }

    /// Remove the stored token. Removing an absent token succeeds.
    pub fn logout(&self) -> Result<(), StorageError> {
        match self.storage.as_ref() {
            Some(storage) => storage.remove(TOKEN_KEY),
            None => Ok(()),
        }
    }

    pub fn get_token(&self) -> Option<String> {
        self.storage.as_ref().and_then(read_token)
    }

    pub fn is_logged_in(&self) -> bool {
        self.get_token().is_some()
    }

    /// Write a login response's token into storage, replacing any previous
    /// token. Returns `false` when there is no storage substrate.
    pub fn persist(&self, payload: &TokenPayload) -> Result<bool, StorageError> {
        let Some(storage) = self.storage.as_ref() else {
            return Ok(false);
        };
        storage.set(TOKEN_KEY, &payload.token)?;
        debug!("Session token stored");
        Ok(true)
    }

    /// `login` followed by `persist` of the resulting token
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<SignIn>
    where
        H: Sync,
    {
        let outcome = self
            .login(username, password)
            .await
            .context("Login request failed")?;

        match outcome {
            LoginOutcome::StorageUnavailable => Ok(SignIn::StorageUnavailable),
            LoginOutcome::Completed(response) => {
                self.persist(&response.data)
                    .context("Failed to store session token")?;
                Ok(SignIn::SignedIn(response.into_data().token))
            }
        }
    }
}

/// Read the token, treating an empty value or an unreadable substrate as
/// holding none
fn read_token<S: Storage>(storage: &S) -> Option<String> {
    match storage.get(TOKEN_KEY) {
        Ok(token) => token.filter(|t| !t.is_empty()),
        Err(e) => {
            warn!(error = %e, "Failed to read session token");
            None
        }
    }
}
