use super::{Claims, TokenCodec, TokenError, TokenKind};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Mints access and refresh tokens. Pure apart from reading the clock.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    codec: Arc<TokenCodec>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(codec: Arc<TokenCodec>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            codec,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    pub fn issue(&self, user_id: &str, email: &str, kind: TokenKind) -> Result<String, TokenError> {
        let exp = (Utc::now() + self.ttl(kind)).timestamp();
        self.codec.encode(&Claims::new(user_id, email, exp))
    }
}
