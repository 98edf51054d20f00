//! Request authorization: credentials, the canonical HMAC signer, and pluggable strategies.

pub mod secret;
pub mod signer;
pub mod strategy;

pub use secret::*;
pub use signer::*;
pub use strategy::*;
