//! HTTP collaborator used for login requests.
//!
//! This module provides the `HttpClient` seam the session store talks to,
//! and `ApiClient`, its reqwest implementation against the backend.
//!
//! Responses come back as `ApiResponse { data }`; any failure is an
//! `ApiError`.

pub mod client;
pub mod error;

use std::future::Future;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub use client::ApiClient;
pub use error::ApiError;

/// Successful result of a request: the decoded response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

/// Issues JSON requests against the backend.
pub trait HttpClient {
    /// POST `body` as JSON to `path` and decode the JSON response
    fn post<B, T>(
        &self,
        path: &str,
        body: &B,
    ) -> impl Future<Output = Result<ApiResponse<T>, ApiError>> + Send
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send;
}
