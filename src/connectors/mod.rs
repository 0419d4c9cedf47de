//! Outbound collaborators.
//!
//! Every external integration sits behind a trait so services and routes
//! never see the transport, and tests swap in a mock.

pub mod mailer;

pub use mailer::{HttpMailer, LogMailer, Mailer, MailerError, MockMailer, SentMail};
