//! REST API client module for the alumni association backend.
//!
//! This module provides the `ApiClient` for communicating with the
//! backend to fetch alumni rosters, shipping lists, and statistics,
//! to mutate shipping state, and to retrieve server-rendered label
//! documents and spreadsheet exports.
//!
//! All authenticated endpoints use JWT bearer tokens obtained from
//! the `/api/auth/login` endpoint.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
