use super::{Mailer, MailerError};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    to: &'a str,
    subject: &'a str,
    body: String,
}

/// Posts each message as JSON to an HTTP mail relay.
pub struct HttpMailer {
    relay_url: String,
    http_client: reqwest::Client,
}

impl HttpMailer {
    pub fn new(relay_url: String) -> Result<Self, MailerError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| MailerError::Unavailable(err.to_string()))?;

        Ok(Self {
            relay_url,
            http_client,
        })
    }

    async fn send(&self, message: RelayMessage<'_>) -> Result<(), MailerError> {
        let response = self
            .http_client
            .post(&self.relay_url)
            .json(&message)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::error!(
                status = %response.status(),
                "Mail relay returned no success"
            );
            return Err(MailerError::Rejected(format!(
                "relay answered {}",
                response.status()
            )));
        }

        tracing::info!(to = message.to, subject = message.subject, "Mail handed to relay");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Mailer for HttpMailer {
    async fn send_verification_link(&self, email: &str, link: &str) -> Result<(), MailerError> {
        self.send(RelayMessage {
            to: email,
            subject: "Verify your email",
            body: format!("Confirm your address by opening {link}"),
        })
        .await
    }

    async fn send_password_reset_link(
        &self,
        email: &str,
        link: &str,
    ) -> Result<(), MailerError> {
        self.send(RelayMessage {
            to: email,
            subject: "Reset your password",
            body: format!("Choose a new password at {link}"),
        })
        .await
    }
}

/// Writes the links to the structured log instead of sending them. Used
/// when no relay is configured.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send_verification_link(&self, email: &str, link: &str) -> Result<(), MailerError> {
        tracing::info!(to = email, link, "Verification link");
        Ok(())
    }

    async fn send_password_reset_link(
        &self,
        email: &str,
        link: &str,
    ) -> Result<(), MailerError> {
        tracing::info!(to = email, link, "Password reset link");
        Ok(())
    }
}
