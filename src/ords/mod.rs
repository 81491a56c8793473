//! Client and data-shaping layer for the ORDS backend.
//!
//! Everything the route handlers need to talk to the remote REST module
//! lives here: the HTTP client with its token header and URL building,
//! the envelope normalizer, and the field-case projection.

pub mod client;
pub mod fields;
pub mod response;

pub use client::{OrdsClient, OrdsResponse};

use thiserror::Error;

/// Errors from the ORDS client and normalization layer.
#[derive(Error, Debug)]
pub enum OrdsError {
    #[error("backend base URL is not configured")]
    NotConfigured,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend reported a business failure (`success: false`) in an
    /// otherwise successful HTTP response.
    #[error("backend reported failure: {0}")]
    Backend(String),

    /// The deployment answered with an HTML error page instead of JSON,
    /// meaning the endpoint is not installed on this backend.
    #[error("endpoint not available on this deployment")]
    UnsupportedEndpoint,
}
