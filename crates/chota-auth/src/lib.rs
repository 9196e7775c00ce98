//! # chota-auth
//!
//! Gemini API key handling.
//!
//! - **Lookup**: [`CredentialProvider`] implementations for a fixed key, the
//!   process environment, the stored key file, and a chain of those
//! - **Validation**: [`validate_api_key`] for keys typed in by a user
//! - **Storage**: `~/.chota/auth.json` with secure file permissions
//!
//! The chat core only ever asks "is there a credential?". Key shape checks
//! happen where a user supplies a key.

#![deny(unsafe_code)]

pub mod credential;
pub mod errors;
pub mod storage;
pub mod validate;

pub use credential::{
    ChainedCredential, CredentialProvider, EnvCredential, StaticCredential, StoredCredential,
    default_credential_chain,
};
pub use errors::{AuthError, KeyValidationError};
pub use storage::{
    AuthStorage, auth_file_path, clear_api_key, default_auth_path, load_api_key, load_auth_storage,
    save_api_key,
};
pub use validate::validate_api_key;
