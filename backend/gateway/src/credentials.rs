//! Credential Store
//!
//! The configured API keys and the session signing secret. Built once at
//! startup and shared read-only by the admission layer and the token service.

use std::collections::HashSet;

use rand::RngCore;
use sha2::{Digest, Sha256};
use statusgate_config::AuthConfig;
use statusgate_core::GateError;
use tracing::{info, warn};

type KeyDigest = [u8; 32];

fn digest(key: &str) -> KeyDigest {
    Sha256::digest(key.as_bytes()).into()
}

pub struct CredentialStore {
    key_digests: HashSet<KeyDigest>,
    signing_secret: Vec<u8>,
}

impl CredentialStore {
    /// Builds the store. Fails when gated routes are served but neither API
    /// keys nor a signing secret exist. Blank keys are dropped.
    ///
    /// Without a secret (API keys only), a random per-process secret is
    /// generated so sessions work until restart.
    pub fn new<I, S>(
        api_keys: I,
        signing_secret: Option<&str>,
        gated_routes_enabled: bool,
    ) -> Result<Self, GateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key_digests: HashSet<KeyDigest> = api_keys
            .into_iter()
            .filter_map(|k| {
                let k = k.as_ref().trim();
                (!k.is_empty()).then(|| digest(k))
            })
            .collect();

        let secret = signing_secret.filter(|s| !s.is_empty());

        if gated_routes_enabled && key_digests.is_empty() && secret.is_none() {
            return Err(GateError::ConfigError(
                "no API keys and no signing secret configured".into(),
            ));
        }

        let signing_secret = match secret {
            Some(s) => s.as_bytes().to_vec(),
            None => {
                warn!("No signing secret configured; generating an ephemeral one");
                let mut bytes = vec![0u8; 32];
                rand::thread_rng().fill_bytes(&mut bytes);
                bytes
            }
        };

        Ok(Self {
            key_digests,
            signing_secret,
        })
    }

    pub fn from_config(auth: &AuthConfig) -> Result<Self, GateError> {
        let store = Self::new(&auth.api_keys, auth.jwt_secret.as_deref(), true)?;
        info!(api_keys = store.key_count(), "Credential store ready");
        Ok(store)
    }

    /// Exact set membership. Empty and unknown strings are rejected.
    pub fn is_valid_api_key(&self, candidate: &str) -> bool {
        !candidate.is_empty() && self.key_digests.contains(&digest(candidate))
    }

    pub fn signing_secret(&self) -> &[u8] {
        &self.signing_secret
    }

    pub fn key_count(&self) -> usize {
        self.key_digests.len()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("key_count", &self.key_digests.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_membership_only() {
        let store = CredentialStore::new(["alpha-key", "beta-key"], Some("secret"), true).unwrap();
        assert!(store.is_valid_api_key("alpha-key"));
        assert!(store.is_valid_api_key("beta-key"));
        assert!(!store.is_valid_api_key(""));
        assert!(!store.is_valid_api_key("alpha"));
        assert!(!store.is_valid_api_key("alpha-key "));
        assert!(!store.is_valid_api_key("ALPHA-KEY"));
        assert!(!store.is_valid_api_key("gamma-key"));
    }

    #[test]
    fn blank_keys_are_dropped() {
        let store = CredentialStore::new(["", "  ", "k"], Some("secret"), true).unwrap();
        assert_eq!(store.key_count(), 1);
        assert!(!store.is_valid_api_key(""));
    }

    #[test]
    fn nothing_configured_is_a_config_error() {
        let err = CredentialStore::new(Vec::<String>::new(), None, true).unwrap_err();
        assert!(matches!(err, GateError::ConfigError(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn nothing_configured_is_fine_without_gated_routes() {
        assert!(CredentialStore::new(Vec::<String>::new(), None, false).is_ok());
    }

    #[test]
    fn keys_only_gets_an_ephemeral_secret() {
        let store = CredentialStore::new(["k"], None, true).unwrap();
        assert_eq!(store.signing_secret().len(), 32);
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let store = CredentialStore::new(["k"], Some("hunter2-secret"), true).unwrap();
        let shown = format!("{store:?}");
        assert!(!shown.contains("hunter2"));
    }
}
