//! OAuth credential provisioning.
//!
//! Prefers a refresh token persisted from an earlier run; falls back to an
//! interactive browser authorization when that token is missing or rejected.

pub mod flow;
pub mod provider;
pub mod secrets;
mod token;

pub use provider::{Credential, CredentialProvider};
pub use secrets::ClientSecrets;
