//! REST API client module for the alquran.cloud content service.
//!
//! This module provides the `ApiClient` for fetching the chapter list,
//! a single verse and the verses of one chapter in a given edition.
//! The loader only sees the `ContentSource` trait, so tests can swap the
//! HTTP client for an in-memory source.

pub mod client;
pub mod error;
pub mod source;

pub use client::ApiClient;
pub use error::ApiError;
pub use source::ContentSource;
