//! Convenient re-exports of http types that are part of `scriptmock`'s public API.
pub use http::{HeaderName, HeaderValue, StatusCode};
