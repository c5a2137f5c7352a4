//! Core use-case services.
//!
//! # Responsibility
//! - Narrow the data-access contract into the capability set exposed to
//!   UI/FFI callers.
//! - Keep callers decoupled from the concrete backing store.

pub mod item_service;
