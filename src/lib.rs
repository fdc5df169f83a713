//! Web-Shield Core - Background Engine
//!
//! The persistent background process of the Web-Shield browser extension:
//! intercepts outgoing requests, extracts lexical features, asks the remote
//! classifier for a verdict, keeps bounded rolling logs, and notifies the UI.
//!
//! The browser host stays outside this crate. It drives the engine through
//! the `on_*` handlers on [`logic::engine::Engine`] and receives side effects
//! through [`logic::host::HostBridge`] and the broadcast channel.

pub mod api;
pub mod constants;
pub mod logic;

pub use logic::engine::{Engine, EngineConfig};
pub use logic::host::{HostBridge, NullHost, TabId, WarningBanner};
pub use logic::interceptor::RequestEvent;
