//! Session tokens: HS256 JWTs over [`Claims`], signed with `jsonwebtoken`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use statusgate_core::{Claims, Role};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("signature mismatch")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::UnsupportedAlgorithm(String::new())
            }
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Seconds until expiry.
    pub expires_in: u64,
    pub claims: Claims,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime_secs: u64,
}

impl TokenService {
    pub fn new(secret: &[u8], lifetime_secs: u64) -> Self {
        // Expiry is checked against the caller's clock in `verify`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime_secs,
        }
    }

    pub fn lifetime_secs(&self) -> u64 {
        self.lifetime_secs
    }

    /// Signs a token for `username` valid from `now` for the configured lifetime.
    pub fn issue(&self, username: &str, role: Role, now: DateTime<Utc>) -> Result<IssuedToken> {
        let iat = now.timestamp();
        let lifetime =
            i64::try_from(self.lifetime_secs).context("Token lifetime does not fit a timestamp")?;
        let exp = iat
            .checked_add(lifetime)
            .context("Token expiry overflows the timestamp range")?;
        let claims = Claims {
            username: username.to_string(),
            role,
            iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to sign session token")?;

        Ok(IssuedToken {
            token,
            expires_in: self.lifetime_secs,
            claims,
        })
    }

    /// Checks structure, algorithm, signature and expiry, in that order.
    /// A token is expired from the second `now >= exp`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| match TokenError::from(err) {
                TokenError::UnsupportedAlgorithm(_) => TokenError::UnsupportedAlgorithm(
                    decode_header(token)
                        .map(|h| format!("{:?}", h.alg))
                        .unwrap_or_default(),
                ),
                other => other,
            })?
            .claims;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn service() -> TokenService {
        TokenService::new(b"unit-test-secret", 3600)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn round_trip_within_lifetime() {
        let svc = service();
        let issued = svc.issue("admin", Role::Admin, t0()).unwrap();
        assert_eq!(issued.expires_in, 3600);

        for delta in [0, 1, 1800, 3599] {
            let claims = svc.verify(&issued.token, t0() + Duration::seconds(delta)).unwrap();
            assert_eq!(claims, issued.claims);
            assert_eq!(claims.username, "admin");
            assert_eq!(claims.exp - claims.iat, 3600);
        }
    }

    #[test]
    fn expired_at_and_after_lifetime() {
        let svc = service();
        let issued = svc.issue("admin", Role::Admin, t0()).unwrap();
        for delta in [3600, 3601, 86_400] {
            assert_eq!(
                svc.verify(&issued.token, t0() + Duration::seconds(delta)),
                Err(TokenError::Expired)
            );
        }
    }

    #[test]
    fn issuing_is_deterministic() {
        let svc = service();
        let a = svc.issue("admin", Role::Admin, t0()).unwrap();
        let b = svc.issue("admin", Role::Admin, t0()).unwrap();
        assert_eq!(a.token, b.token);
    }

    #[test]
    fn lifetime_beyond_timestamp_range_fails_to_issue() {
        let svc = TokenService::new(b"unit-test-secret", u64::MAX);
        assert!(svc.issue("admin", Role::Admin, t0()).is_err());

        let svc = TokenService::new(b"unit-test-secret", i64::MAX as u64);
        assert!(svc.issue("admin", Role::Admin, t0()).is_err());
    }

    #[test]
    fn tampered_signature_is_rejected_even_when_expired() {
        let svc = service();
        let issued = svc.issue("admin", Role::Admin, t0()).unwrap();
        let (signed, sig) = issued.token.rsplit_once('.').unwrap();
        let first = if sig.starts_with('A') { 'B' } else { 'A' };
        let tampered = format!("{signed}.{first}{}", &sig[1..]);

        for delta in [0, 7200] {
            let err = svc.verify(&tampered, t0() + Duration::seconds(delta)).unwrap_err();
            assert!(matches!(err, TokenError::BadSignature | TokenError::Malformed));
        }
    }

    #[test]
    fn other_secret_is_rejected() {
        let issued = service().issue("admin", Role::Admin, t0()).unwrap();
        let other = TokenService::new(b"another-secret", 3600);
        assert_eq!(other.verify(&issued.token, t0()), Err(TokenError::BadSignature));
    }

    #[test]
    fn other_algorithms_are_rejected_before_the_signature() {
        let svc = service();
        let claims = svc.issue("admin", Role::Admin, t0()).unwrap().claims;
        let hs384 = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();

        assert_eq!(
            svc.verify(&hs384, t0()),
            Err(TokenError::UnsupportedAlgorithm("HS384".into()))
        );
    }

    #[test]
    fn alg_none_is_rejected() {
        let svc = service();
        let issued = svc.issue("admin", Role::Admin, t0()).unwrap();
        let payload = issued.token.split('.').nth(1).unwrap();
        // base64url of {"alg":"none","typ":"JWT"}
        let header = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0";
        let forged = format!("{header}.{payload}.");

        assert_eq!(svc.verify(&forged, t0()), Err(TokenError::Malformed));
    }

    #[test]
    fn garbage_is_malformed() {
        let svc = service();
        for token in ["", "abc", "a.b", "a.b.c.d", "!!.??.**"] {
            assert_eq!(svc.verify(token, t0()), Err(TokenError::Malformed), "{token}");
        }
    }
}
