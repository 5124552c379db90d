//! Email delivery channel.
//!
//! Supports SMTP (via lettre) and the SendGrid HTTP API; which one is used
//! is decided by how the channel was constructed.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType, transport::smtp::authentication::Credentials,
};
use serde_json::json;

use super::EmailTransport;
use crate::error::{DeliveryError, NotificationError};
use crate::types::EmailMessage;

const SENDGRID_API_BASE: &str = "https://api.sendgrid.com";

/// Email delivery channel.
///
/// One process-wide instance is constructed at startup and injected into the
/// dispatcher; the SMTP transport handle is built once here and reused for
/// every message, never rebuilt per request.
pub struct EmailChannel {
    /// SMTP transport, built once at construction
    smtp: Option<AsyncSmtpTransport<Tokio1Executor>>,
    /// From email address
    from_email: String,
    /// HTTP client for API-based providers
    http_client: reqwest::Client,
    /// SendGrid API key (optional, alternative to SMTP)
    sendgrid_api_key: Option<String>,
    /// SendGrid API base URL, overridable for tests
    api_base: String,
}

impl EmailChannel {
    /// Create a new email channel with SMTP configuration.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::InvalidConfig` if the relay host cannot
    /// be used to build a transport.
    pub fn with_smtp(
        host: String,
        port: u16,
        username: Option<String>,
        password: Option<String>,
        from_email: String,
    ) -> Result<Self, NotificationError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .map_err(|e| NotificationError::InvalidConfig(format!("smtp relay {host}: {e}")))?
            .port(port);
        if let (Some(username), Some(password)) = (username, password) {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            smtp: Some(builder.build()),
            from_email,
            http_client: reqwest::Client::new(),
            sendgrid_api_key: None,
            api_base: SENDGRID_API_BASE.to_string(),
        })
    }

    /// Create a new email channel with SendGrid configuration.
    pub fn with_sendgrid(api_key: String, from_email: String) -> Self {
        Self {
            smtp: None,
            from_email,
            http_client: reqwest::Client::new(),
            sendgrid_api_key: Some(api_key),
            api_base: SENDGRID_API_BASE.to_string(),
        }
    }

    /// Override the SendGrid API base URL (used by tests to point at a mock
    /// server).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    async fn send_via_sendgrid(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        let api_key = self
            .sendgrid_api_key
            .as_ref()
            .ok_or_else(|| DeliveryError::new(&message.to, "SendGrid API key not configured"))?;

        let mut content = vec![json!({"type": "text/plain", "value": message.body})];
        if let Some(ref html) = message.html_body {
            content.push(json!({"type": "text/html", "value": html}));
        }

        let payload = json!({
            "personalizations": [{
                "to": [{"email": message.to}]
            }],
            "from": {"email": self.from_email},
            "subject": message.subject,
            "content": content,
        });

        let response = self
            .http_client
            .post(format!("{}/v3/mail/send", self.api_base))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DeliveryError::new(&message.to, e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            Err(DeliveryError::new(
                &message.to,
                format!("HTTP {status}: {detail}"),
            ))
        }
    }

    async fn send_via_smtp(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        let mailer = self
            .smtp
            .as_ref()
            .ok_or_else(|| DeliveryError::new(&message.to, "SMTP transport not configured"))?;

        let email = Message::builder()
            .from(
                self.from_email
                    .parse()
                    .map_err(|e| DeliveryError::new(&message.to, format!("invalid from: {e}")))?,
            )
            .to(message
                .to
                .parse()
                .map_err(|e| DeliveryError::new(&message.to, format!("invalid to: {e}")))?)
            .subject(&message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| DeliveryError::new(&message.to, e.to_string()))?;

        mailer
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::new(&message.to, e.to_string()))
    }
}

#[async_trait]
impl EmailTransport for EmailChannel {
    fn name(&self) -> &str {
        if self.sendgrid_api_key.is_some() {
            "sendgrid"
        } else {
            "smtp"
        }
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        // Determine provider by available config
        if self.sendgrid_api_key.is_some() {
            self.send_via_sendgrid(message).await
        } else if self.smtp.is_some() {
            self.send_via_smtp(message).await
        } else {
            Err(DeliveryError::new(
                &message.to,
                "no email provider configured",
            ))
        }
    }
}
