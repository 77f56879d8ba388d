//! Per-call authorization gate.
//!
//! # Responsibility
//! - Classify inbound calls as public or protected.
//! - Resolve the metadata token of protected calls to an account id.
//! - Hand the resolved identity to handlers as an explicit `CallContext`.
//!
//! # Invariants
//! - Public calls never touch storage.
//! - Missing metadata, missing token and invalid token are distinct
//!   rejections.
//! - The gate holds no lock and keeps no per-call state.

mod gate;
mod operation;

pub use gate::{AccessDenied, AuthError, AuthGate, CallContext, CallMetadata, TOKEN_METADATA_KEY};
pub use operation::Operation;
