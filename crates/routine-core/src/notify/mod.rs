//! Email delivery of generated plans.
//!
//! - [`render`]: boilerplate composition and markdown → HTML rendering
//! - [`mailgun`]: HTTP [`Mailer`] for a Mailgun-style API

use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};

use crate::error::Result;

pub mod mailgun;
pub mod render;

pub use mailgun::MailgunMailer;
pub use render::{RenderedBody, FEEDBACK, INTRO, SUBJECT};

/// A single multi-part message ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub plain_body: String,
    pub html_body: String,
}

/// Outbound mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one message. Failures are `RoutineError::Delivery` or
    /// `RoutineError::Transport`.
    async fn send(&self, message: &MailMessage) -> Result<()>;
}

/// Renders plans into the fixed email template and hands them to a
/// [`Mailer`] from a fixed sender identity.
pub struct NotificationDispatcher {
    mailer: Arc<dyn Mailer>,
    sender: String,
}

impl NotificationDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, sender: impl Into<String>) -> Self {
        Self {
            mailer,
            sender: sender.into(),
        }
    }

    /// Builds the message for `address` without sending it.
    pub fn message(&self, address: &str, plan_text: &str) -> MailMessage {
        let RenderedBody { plain, html } = render::render(plan_text);
        MailMessage {
            from: self.sender.clone(),
            to: address.to_string(),
            subject: SUBJECT.to_string(),
            plain_body: plain,
            html_body: html,
        }
    }

    /// Sends the plan to `address`. Returns whether the mail service accepted
    /// it; errors are logged, not raised, and never retried.
    pub async fn dispatch(&self, address: &str, plan_text: &str) -> bool {
        let message = self.message(address, plan_text);
        match self.mailer.send(&message).await {
            Ok(()) => {
                info!("Delivered plan to {address}");
                true
            }
            Err(e) => {
                warn!("Failed to deliver plan to {address}: {e}");
                false
            }
        }
    }
}
