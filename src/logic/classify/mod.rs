//! Classification - Remote Verdicts for Intercepted Requests
//!
//! `verdict` is the single canonicalization point for the classifier's
//! labels; `client` is the HTTP bridge to the remote model server.

pub mod client;
pub mod verdict;

pub use client::{Classification, ClassifierClient, ClassifierConfig, ClassifyError};
pub use verdict::{AlertPolicy, Verdict};
