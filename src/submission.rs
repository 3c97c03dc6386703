//! Contact Submission - One Attempt In Flight At A Time
//!
//! The controller owns the draft and the state machine; the transport is
//! an injected port. Transitions happen in two phases so a torn-down
//! controller can discard an in-flight result without touching dead state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// In-progress form input. All three fields are required at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl Draft {
    /// First missing required field, checked in form order.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.name.is_empty() {
            return Some("name");
        }
        if self.email.is_empty() {
            return Some("email");
        }
        if self.message.is_empty() {
            return Some("message");
        }
        None
    }

    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// The structured write handed to the persistence service, copied from
/// the draft unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl From<&Draft> for ContactMessage {
    fn from(draft: &Draft) -> Self {
        Self {
            name: draft.name.clone(),
            email: draft.email.clone(),
            message: draft.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "detail")]
pub enum SubmissionState {
    Idle,
    Sending,
    Sent,
    Failed(String),
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Rejected before any external effect; state is unchanged.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("a submission is already in flight")]
    AlreadySending,

    /// The external write failed; the draft is retained for retry.
    #[error("persistence call failed: {0}")]
    Persistence(String),
}

/// Outbound port to the persistence service. The engine treats the call
/// as opaque: it either succeeds or fails with a reason.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn deliver(&self, message: &ContactMessage) -> Result<(), String>;
}

/// State machine for one contact-form session.
///
/// `submit`/`retry` drive the whole cycle against the sink. Hosts that
/// manage their own transport can drive the two phases directly:
/// `begin_submit` snapshots the draft and enters `Sending`;
/// `complete` applies the outcome, and is a no-op once the attempt has
/// been abandoned.
pub struct SubmissionController {
    sink: Arc<dyn MessageSink>,
    timeout: Option<Duration>,
    draft: Draft,
    state: SubmissionState,
    attempt: Option<Uuid>,
}

impl SubmissionController {
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        Self {
            sink,
            timeout: None,
            draft: Draft::default(),
            state: SubmissionState::Idle,
            attempt: None,
        }
    }

    /// Bound the external call. Off by default; expiry completes the
    /// attempt as `Failed("timed out")`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    /// Phase one: presence-check the draft, snapshot it, enter `Sending`.
    ///
    /// At most one attempt is in flight per controller; while `Sending`
    /// this rejects without side effects.
    pub fn begin_submit(&mut self) -> Result<ContactMessage, SubmissionError> {
        if self.state == SubmissionState::Sending {
            return Err(SubmissionError::AlreadySending);
        }
        if let Some(field) = self.draft.missing_field() {
            return Err(SubmissionError::MissingField(field));
        }

        let attempt = Uuid::new_v4();
        tracing::debug!(%attempt, "contact submission started");
        self.attempt = Some(attempt);
        self.state = SubmissionState::Sending;
        Ok(ContactMessage::from(&self.draft))
    }

    /// Phase two: apply the outcome of the external call.
    ///
    /// Success clears the draft; failure keeps it so the user's input
    /// survives into retry. Ignored unless an attempt is in flight.
    pub fn complete(&mut self, outcome: Result<(), String>) {
        if self.state != SubmissionState::Sending {
            return;
        }
        let attempt = self.attempt.take();
        match outcome {
            Ok(()) => {
                tracing::debug!(attempt = ?attempt, "contact submission delivered");
                self.draft.clear();
                self.state = SubmissionState::Sent;
            }
            Err(detail) => {
                tracing::debug!(attempt = ?attempt, %detail, "contact submission failed");
                self.state = SubmissionState::Failed(detail);
            }
        }
    }

    /// Full cycle: begin, deliver through the sink exactly once, complete.
    pub async fn submit(&mut self) -> Result<(), SubmissionError> {
        let message = self.begin_submit()?;
        let sink = Arc::clone(&self.sink);

        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, sink.deliver(&message)).await {
                Ok(result) => result,
                Err(_) => Err("timed out".to_string()),
            },
            None => sink.deliver(&message).await,
        };

        self.complete(outcome.clone());
        outcome.map_err(SubmissionError::Persistence)
    }

    /// Equivalent to re-invoking `submit` with the retained draft.
    pub async fn retry(&mut self) -> Result<(), SubmissionError> {
        self.submit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_reports_in_form_order() {
        let mut draft = Draft::default();
        assert_eq!(draft.missing_field(), Some("name"));
        draft.name = "Ada".to_string();
        assert_eq!(draft.missing_field(), Some("email"));
        draft.email = "ada@example.com".to_string();
        assert_eq!(draft.missing_field(), Some("message"));
        draft.message = "Hello".to_string();
        assert!(draft.is_complete());
    }

    #[test]
    fn clear_resets_every_field() {
        let mut draft = Draft {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hello".to_string(),
        };
        draft.clear();
        assert_eq!(draft, Draft::default());
    }
}
