//! Feature Extraction - Lexical Request & URL Features
//!
//! Pure functions only. No state, no I/O, never fails: malformed input
//! degrades to empty-string/zero defaults instead of erroring the pipeline.

pub mod request;
pub mod url;

pub use request::{extract_request_features, RequestFeatures};
pub use url::{extract_url_features, UrlFeatures};
