mod client;
mod mock;

pub use client::{HttpMailer, LogMailer};
pub use mock::{MockMailer, SentMail};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MailerError {
    #[error("mail relay unreachable: {0}")]
    Unavailable(String),
    #[error("mail relay rejected the message: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for MailerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            Self::Unavailable(err.to_string())
        } else {
            Self::Rejected(err.to_string())
        }
    }
}

/// Delivers the links of the email verification and password reset flows.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_link(&self, email: &str, link: &str) -> Result<(), MailerError>;

    async fn send_password_reset_link(&self, email: &str, link: &str)
        -> Result<(), MailerError>;
}
