//! Built-in identity verifier: one admin account backed by an Argon2id hash.

use anyhow::{anyhow, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use rand::RngCore;
use statusgate_config::AuthConfig;
use statusgate_core::{IdentityVerifier, Role};
use tracing::{debug, warn};

/// Hashes a password into a PHC string with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String> {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|e| anyhow!("Failed to encode salt: {e}"))?;

    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

fn verify_password(phc: &str, plain: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub struct AdminVerifier {
    username: String,
    password_hash: Option<String>,
}

impl AdminVerifier {
    /// `password_hash` must be a PHC string. `None` disables login.
    pub fn new(username: impl Into<String>, password_hash: Option<String>) -> Result<Self> {
        if let Some(phc) = &password_hash {
            PasswordHash::new(phc).map_err(|e| anyhow!("Invalid admin password hash: {e}"))?;
        }
        Ok(Self {
            username: username.into(),
            password_hash,
        })
    }

    /// A configured hash wins; otherwise a plaintext password is hashed here
    /// and dropped.
    pub fn from_config(auth: &AuthConfig) -> Result<Self> {
        let hash = match (&auth.admin_password_hash, &auth.admin_password) {
            (Some(hash), _) => Some(hash.clone()),
            (None, Some(plain)) => Some(hash_password(plain)?),
            (None, None) => {
                warn!("No admin password configured; every login will be rejected");
                None
            }
        };
        Self::new(auth.admin_username.clone(), hash)
    }

    pub fn login_enabled(&self) -> bool {
        self.password_hash.is_some()
    }
}

#[async_trait]
impl IdentityVerifier for AdminVerifier {
    fn name(&self) -> &str {
        "admin"
    }

    async fn check_credentials(&self, username: &str, password: &str) -> Option<Role> {
        let phc = self.password_hash.clone()?;
        if username != self.username {
            debug!("Login for unknown user");
            return None;
        }

        let password = password.to_string();
        let ok = tokio::task::spawn_blocking(move || verify_password(&phc, &password))
            .await
            .unwrap_or(false);
        ok.then_some(Role::Admin)
    }
}
