//! Credential lookup.
//!
//! The chat core depends only on [`CredentialProvider`]. Where the key comes
//! from is decided by whoever builds the session.

use std::path::PathBuf;

use crate::storage::{default_auth_path, load_api_key};

/// Environment variables consulted by [`EnvCredential`], in order.
pub const ENV_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

/// Source of an opaque API credential.
pub trait CredentialProvider: Send + Sync {
    /// The credential, or `None` when none is available.
    fn credential(&self) -> Option<String>;
}

/// A fixed credential.
#[derive(Clone, Debug, Default)]
pub struct StaticCredential(Option<String>);

impl StaticCredential {
    /// Wrap a known key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(Some(key.into()))
    }

    /// A provider that never yields a credential.
    pub fn none() -> Self {
        Self(None)
    }
}

impl CredentialProvider for StaticCredential {
    fn credential(&self) -> Option<String> {
        self.0.clone().filter(|k| !k.trim().is_empty())
    }
}

/// Reads the first non-empty of [`ENV_KEY_VARS`].
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvCredential;

impl EnvCredential {
    /// Resolve through `lookup` instead of the process environment.
    fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        first_non_empty(ENV_KEY_VARS.iter().map(|var| lookup(var)))
    }
}

impl CredentialProvider for EnvCredential {
    fn credential(&self) -> Option<String> {
        Self::resolve(|var| std::env::var(var).ok())
    }
}

/// Reads the key saved in `auth.json`.
#[derive(Clone, Debug)]
pub struct StoredCredential {
    path: PathBuf,
}

impl StoredCredential {
    /// Read from an explicit file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for StoredCredential {
    fn default() -> Self {
        Self::new(default_auth_path())
    }
}

impl CredentialProvider for StoredCredential {
    fn credential(&self) -> Option<String> {
        load_api_key(&self.path)
    }
}

/// Tries each provider in order and returns the first credential found.
#[derive(Default)]
pub struct ChainedCredential {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ChainedCredential {
    /// Empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider to the end of the chain.
    #[must_use]
    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }
}

impl CredentialProvider for ChainedCredential {
    fn credential(&self) -> Option<String> {
        self.providers.iter().find_map(|p| p.credential())
    }
}

/// Stored key first, then the environment.
pub fn default_credential_chain() -> ChainedCredential {
    ChainedCredential::new()
        .with(StoredCredential::default())
        .with(EnvCredential)
}

fn first_non_empty(values: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    values
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
