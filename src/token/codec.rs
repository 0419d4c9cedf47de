use super::{LinkClaims, LinkPurpose};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TokenError {
    #[error("token signing failed: {0}")]
    Signing(String),
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("token expired")]
    Expired,
}

/// Signs and verifies claims with one shared HS256 secret.
///
/// `decode` checks signature and structure only. An expired but otherwise
/// well-formed token decodes fine; comparing `exp` with the clock is up to
/// the caller.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn encode<C: Serialize>(&self, claims: &C) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|err| TokenError::Signing(err.to_string()))
    }

    pub fn decode<C: DeserializeOwned>(&self, token: &str) -> Result<C, TokenError> {
        decode::<C>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| TokenError::Invalid(err.to_string()))
    }

    pub fn encode_link(
        &self,
        email: &str,
        purpose: LinkPurpose,
        lifetime: chrono::Duration,
    ) -> Result<String, TokenError> {
        self.encode(&LinkClaims {
            email: email.to_string(),
            purpose,
            exp: (Utc::now() + lifetime).timestamp(),
        })
    }

    /// Decode a link token for `purpose` and hand back the email it names.
    /// Links, unlike session tokens, are dead once expired.
    pub fn decode_link(&self, token: &str, purpose: LinkPurpose) -> Result<String, TokenError> {
        let claims: LinkClaims = self.decode(token)?;
        if claims.purpose != purpose {
            return Err(TokenError::Invalid(format!(
                "link issued for {:?}",
                claims.purpose
            )));
        }
        if claims.exp < Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims.email)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}
