//! Token domain types: the persisted record, redacted secrets, and lifecycle status.

pub mod record;
pub mod secret;

pub use record::*;
pub use secret::*;
