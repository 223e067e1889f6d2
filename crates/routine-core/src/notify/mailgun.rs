//! [`Mailer`] over a Mailgun-style HTTP messages endpoint.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use super::{MailMessage, Mailer};
use crate::{
    config::ResolvedMail,
    error::{Result, RoutineError, TransportResultExt},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct MailgunMailer {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl MailgunMailer {
    pub fn new(config: &ResolvedMail) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .transport_context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: format!("{}/{}/messages", config.base_url, config.domain),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Mailer for MailgunMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        let form = [
            ("from", message.from.as_str()),
            ("to", message.to.as_str()),
            ("subject", message.subject.as_str()),
            ("text", message.plain_body.as_str()),
            ("html", message.html_body.as_str()),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth("api", Some(&self.api_key))
            .form(&form)
            .send()
            .await
            .transport_context("Failed to reach mail service")?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RoutineError::Delivery {
                message: format!("mail service returned {status}: {body}"),
            });
        }

        debug!("Mail service accepted message to {}", message.to);
        Ok(())
    }
}
