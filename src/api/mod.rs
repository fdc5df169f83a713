//! API Module - Host-Facing Control Surface
//!
//! Messages the UI layer sends into the background engine.

pub mod messages;

pub use messages::ControlMessage;
