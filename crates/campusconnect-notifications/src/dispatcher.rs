//! Notification dispatcher.
//!
//! Invoked only after the triggering CRUD write has committed. Failures in
//! here are logged and aggregated into a `NotificationOutcome`; they never
//! fail or roll back the originating request.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde_json::json;

use campusconnect_core::{Event, MutationKind, Registration};

use crate::channel::EmailTransport;
use crate::error::DeliveryError;
use crate::realtime::RealtimeBroadcast;
use crate::resolver::{RecipientResolver, RecipientScope};
use crate::templates::{self, RenderedContent, TemplateRenderer};
use crate::types::{Announcement, EmailMessage, NotificationOutcome};

const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Orchestrates resolver and channels for one event mutation.
///
/// Constructed once at startup with process-wide transport handles and
/// shared behind an `Arc`; never rebuilt per request.
pub struct NotificationDispatcher {
    resolver: RecipientResolver,
    email: Option<Arc<dyn EmailTransport>>,
    realtime: Arc<dyn RealtimeBroadcast>,
    templates: TemplateRenderer,
    send_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        resolver: RecipientResolver,
        email: Option<Arc<dyn EmailTransport>>,
        realtime: Arc<dyn RealtimeBroadcast>,
    ) -> Self {
        Self {
            resolver,
            email,
            realtime,
            templates: TemplateRenderer::with_defaults(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Bounded per-recipient send timeout; a timeout counts as a
    /// per-recipient delivery failure.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub fn with_templates(mut self, templates: TemplateRenderer) -> Self {
        self.templates = templates;
        self
    }

    /// Dispatch notifications for a committed event mutation.
    ///
    /// - `Created`: email every known user and broadcast a realtime
    ///   announcement.
    /// - `Updated`: email only the event's registrants; no broadcast.
    /// - `Deleted`: nothing is sent.
    pub async fn dispatch(&self, event: &Event, kind: MutationKind) -> NotificationOutcome {
        let outcome = match kind {
            MutationKind::Created => {
                let mut outcome = match self.render_event(templates::EVENT_CREATED, event) {
                    Some(mut content) => {
                        append_optional_details(&mut content.body, event);
                        self.fan_out(RecipientScope::AllUsers, content).await
                    }
                    None => NotificationOutcome::empty(),
                };

                let reached = self.realtime.broadcast(&Announcement::event_added(event));
                outcome.record_broadcast();
                tracing::debug!(
                    event_id = %event.id,
                    reached,
                    "realtime announcement broadcast"
                );
                outcome
            }
            MutationKind::Updated => match self.render_event(templates::EVENT_UPDATED, event) {
                Some(content) => {
                    self.fan_out(RecipientScope::EventRegistrants(event.id.clone()), content)
                        .await
                }
                None => NotificationOutcome::empty(),
            },
            MutationKind::Deleted => {
                // Deletion only cascades registration cleanup; registrants
                // are not notified.
                tracing::debug!(event_id = %event.id, "no notification for deleted events");
                NotificationOutcome::empty()
            }
        };

        tracing::info!(
            event_id = %event.id,
            kind = %kind,
            attempted = outcome.attempted,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            broadcasts = outcome.broadcasts,
            "notification dispatch settled"
        );
        outcome
    }

    /// Best-effort confirmation email after a successful registration.
    pub async fn send_registration_confirmation(
        &self,
        registration: &Registration,
    ) -> NotificationOutcome {
        let mut data = HashMap::new();
        data.insert("user_name".to_string(), json!(registration.user_name));
        data.insert("event_title".to_string(), json!(registration.event_title));

        let content = match self.templates.render(templates::REGISTRATION_CONFIRMED, &data) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(error = %e, "confirmation template rendering failed");
                return NotificationOutcome::empty();
            }
        };

        let recipients = BTreeSet::from([registration.user_email.clone()]);
        let outcome = self.deliver(recipients, content).await;
        tracing::info!(
            event_id = %registration.event_id,
            recipient = %registration.user_email,
            succeeded = outcome.succeeded,
            "registration confirmation settled"
        );
        outcome
    }

    fn render_event(&self, template_id: &str, event: &Event) -> Option<RenderedContent> {
        let mut data = HashMap::new();
        data.insert("title".to_string(), json!(event.title));
        data.insert("date".to_string(), json!(event.date));
        data.insert("time".to_string(), json!(event.time));
        data.insert("location".to_string(), json!(event.location));

        match self.templates.render(template_id, &data) {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::error!(template = template_id, error = %e, "template rendering failed");
                None
            }
        }
    }

    async fn fan_out(&self, scope: RecipientScope, content: RenderedContent) -> NotificationOutcome {
        let recipients = match self.resolver.resolve(&scope).await {
            Ok(recipients) => recipients,
            Err(e) => {
                // The CRUD write already committed; resolution failure only
                // costs the notifications.
                tracing::error!(error = %e, "recipient resolution failed, nothing sent");
                return NotificationOutcome::empty();
            }
        };

        if recipients.is_empty() {
            tracing::debug!("no recipients, nothing to send");
            return NotificationOutcome::empty();
        }

        self.deliver(recipients, content).await
    }

    async fn deliver(
        &self,
        recipients: BTreeSet<String>,
        content: RenderedContent,
    ) -> NotificationOutcome {
        let Some(transport) = self.email.clone() else {
            tracing::warn!(
                recipients = recipients.len(),
                "email transport not configured, skipping sends"
            );
            return NotificationOutcome::empty();
        };

        let subject = content
            .subject
            .unwrap_or_else(|| "Notification".to_string());

        let sends = recipients.into_iter().map(|to| {
            let transport = transport.clone();
            let message = EmailMessage {
                to: to.clone(),
                subject: subject.clone(),
                body: content.body.clone(),
                html_body: content.html_body.clone(),
            };
            let timeout = self.send_timeout;
            async move {
                match tokio::time::timeout(timeout, transport.send(&message)).await {
                    Ok(result) => result,
                    Err(_) => Err(DeliveryError::timed_out(&to, timeout)),
                }
            }
        });

        // Wait for every attempt to settle; one failure never aborts the
        // remaining sends.
        let results = join_all(sends).await;

        let mut outcome = NotificationOutcome::empty();
        for result in results {
            if let Err(ref err) = result {
                tracing::warn!(
                    recipient = %err.recipient,
                    reason = %err.reason,
                    "email delivery failed"
                );
            }
            outcome.record(result);
        }
        outcome
    }
}

/// Appends the optional event fields the base template leaves out.
fn append_optional_details(body: &mut String, event: &Event) {
    if let Some(ref instructions) = event.instructions {
        body.push_str(&format!("\nInstructions: {instructions}\n"));
    }
    if let Some(ref image) = event.image {
        body.push_str(&format!("Image: {image}\n"));
    }
    if let Some(ref link) = event.link {
        body.push_str(&format!("More info: {link}\n"));
    }
}
