use super::{Mailer, MailerError};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMail {
    Verification { email: String, link: String },
    PasswordReset { email: String, link: String },
}

impl SentMail {
    pub fn link(&self) -> &str {
        match self {
            SentMail::Verification { link, .. } | SentMail::PasswordReset { link, .. } => link,
        }
    }

    /// The `token` query parameter of the delivered link.
    pub fn token(&self) -> Option<&str> {
        self.link()
            .split_once("token=")
            .map(|(_, token)| token.split('&').next().unwrap_or(token))
    }
}

/// Records deliveries instead of sending them; optionally fails every call.
#[derive(Debug, Default)]
pub struct MockMailer {
    sent: Mutex<Vec<SentMail>>,
    fail: bool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<SentMail> {
        self.sent().pop()
    }

    fn record(&self, mail: SentMail) -> Result<(), MailerError> {
        if self.fail {
            return Err(MailerError::Unavailable("mock relay is down".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(mail);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Mailer for MockMailer {
    async fn send_verification_link(&self, email: &str, link: &str) -> Result<(), MailerError> {
        self.record(SentMail::Verification {
            email: email.to_string(),
            link: link.to_string(),
        })
    }

    async fn send_password_reset_link(
        &self,
        email: &str,
        link: &str,
    ) -> Result<(), MailerError> {
        self.record(SentMail::PasswordReset {
            email: email.to_string(),
            link: link.to_string(),
        })
    }
}
