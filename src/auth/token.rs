use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

use super::error::TokenError;
use crate::protocol::UserId;

type HmacSha256 = Hmac<Sha256>;

/// The identity a verified token asserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedUser {
    pub user_id: UserId,
    pub role: String,
}

/// Signed claims carried inside a token. Issued by the out-of-scope login
/// service; this crate only needs to verify and read them.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    /// Subject: numeric user id.
    sub: UserId,
    role: String,
    /// Expiry, unix seconds.
    exp: u64,
}

/// Token-verification capability consumed by the upgrade router.
///
/// Async for interface compatibility so that a backend that validates
/// against a session store can replace the HMAC implementation without
/// changing call-sites.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedUser, TokenError>;
}

/// Verifies `payload.signature` bearer tokens: a base64url JSON claims
/// document signed with HMAC-SHA256 under a shared secret.
pub struct HmacTokenVerifier {
    secret: Vec<u8>,
}

impl HmacTokenVerifier {
    #[must_use]
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Issue a token for the given identity. Used by tests and kept as the
    /// reference for the login service's token format.
    #[must_use]
    pub fn issue(&self, user_id: UserId, role: &str, expires_at: u64) -> String {
        let claims = TokenClaims {
            sub: user_id,
            role: role.to_string(),
            exp: expires_at,
        };
        // Serializing a struct of plain fields cannot fail.
        #[allow(clippy::unwrap_used)]
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let tag = URL_SAFE_NO_PAD.encode(self.sign(payload.as_bytes()));
        format!("{payload}.{tag}")
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        // HMAC accepts keys of any length.
        #[allow(clippy::unwrap_used)]
        let mut mac = HmacSha256::new_from_slice(&self.secret).unwrap();
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

#[async_trait]
impl TokenVerifier for HmacTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedUser, TokenError> {
        let (payload, tag) = token.split_once('.').ok_or(TokenError::Malformed)?;
        if payload.is_empty() || tag.is_empty() || tag.contains('.') {
            return Err(TokenError::Malformed);
        }

        let claimed_tag = URL_SAFE_NO_PAD
            .decode(tag)
            .map_err(|_| TokenError::Malformed)?;
        let expected_tag = self.sign(payload.as_bytes());
        if !bool::from(expected_tag.ct_eq(&claimed_tag)) {
            return Err(TokenError::BadSignature);
        }

        // The payload is authenticated at this point; decode failures mean a
        // signer bug, surfaced as Malformed rather than a panic.
        let raw = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: TokenClaims =
            serde_json::from_slice(&raw).map_err(|_| TokenError::Malformed)?;

        if claims.exp <= unix_now() {
            return Err(TokenError::Expired {
                expired_at: claims.exp,
            });
        }

        Ok(VerifiedUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn far_future() -> u64 {
        unix_now() + 3600
    }

    #[tokio::test]
    async fn issued_token_verifies() {
        let verifier = HmacTokenVerifier::new("test-secret");
        let token = verifier.issue(7, "citizen", far_future());
        let user = verifier.verify(&token).await.unwrap();
        assert_eq!(
            user,
            VerifiedUser {
                user_id: 7,
                role: "citizen".to_string()
            }
        );
    }

    #[tokio::test]
    async fn rejects_token_signed_with_other_secret() {
        let signer = HmacTokenVerifier::new("secret-a");
        let verifier = HmacTokenVerifier::new("secret-b");
        let token = signer.issue(7, "citizen", far_future());
        assert_eq!(
            verifier.verify(&token).await.unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[tokio::test]
    async fn rejects_tampered_payload() {
        let verifier = HmacTokenVerifier::new("test-secret");
        let token = verifier.issue(7, "citizen", far_future());
        let (_, tag) = token.split_once('.').unwrap();
        let forged_payload =
            URL_SAFE_NO_PAD.encode(r#"{"sub":8,"role":"admin","exp":9999999999}"#);
        let forged = format!("{forged_payload}.{tag}");
        assert_eq!(
            verifier.verify(&forged).await.unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let verifier = HmacTokenVerifier::new("test-secret");
        let token = verifier.issue(7, "citizen", 1);
        assert_eq!(
            verifier.verify(&token).await.unwrap_err(),
            TokenError::Expired { expired_at: 1 }
        );
    }

    #[tokio::test]
    async fn rejects_malformed_tokens() {
        let verifier = HmacTokenVerifier::new("test-secret");
        for bad in ["", "no-dot", ".leading", "trailing.", "a.b.c", "!!.!!"] {
            assert_eq!(
                verifier.verify(bad).await.unwrap_err(),
                TokenError::Malformed,
                "token {bad:?} should be malformed"
            );
        }
    }
}
