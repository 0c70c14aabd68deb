//! Credential model and the storage slots it lives in.

pub mod credential;
pub mod slot;

pub use credential::*;
pub use slot::*;
