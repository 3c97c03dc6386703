//! Submission State Machine Tests
//!
//! Drive the controller against a scripted sink and verify the
//! idle -> sending -> sent/failed contract.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use portfolio_core::submission::{
    ContactMessage, MessageSink, SubmissionController, SubmissionError, SubmissionState,
};

/// Records every delivered message; outcome is scripted per test.
struct StubSink {
    delivered: Mutex<Vec<ContactMessage>>,
    fail_next: Mutex<u32>,
    failure: String,
    delay: Option<Duration>,
}

impl StubSink {
    fn accepting() -> Arc<Self> {
        Arc::new(Self {
            delivered: Mutex::new(vec![]),
            fail_next: Mutex::new(0),
            failure: String::new(),
            delay: None,
        })
    }

    fn failing(times: u32, reason: &str) -> Arc<Self> {
        Arc::new(Self {
            delivered: Mutex::new(vec![]),
            fail_next: Mutex::new(times),
            failure: reason.to_string(),
            delay: None,
        })
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delivered: Mutex::new(vec![]),
            fail_next: Mutex::new(0),
            failure: String::new(),
            delay: Some(delay),
        })
    }

    fn deliveries(&self) -> Vec<ContactMessage> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSink for StubSink {
    async fn deliver(&self, message: &ContactMessage) -> Result<(), String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.delivered.lock().unwrap().push(message.clone());
        let mut remaining = self.fail_next.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(self.failure.clone());
        }
        Ok(())
    }
}

fn filled_controller(sink: Arc<StubSink>) -> SubmissionController {
    let mut controller = SubmissionController::new(sink);
    let draft = controller.draft_mut();
    draft.name = "Ada".to_string();
    draft.email = "ada@example.com".to_string();
    draft.message = "Hello".to_string();
    controller
}

#[tokio::test]
async fn successful_submit_clears_draft() {
    let sink = StubSink::accepting();
    let mut controller = filled_controller(sink.clone());

    controller.submit().await.unwrap();

    assert_eq!(*controller.state(), SubmissionState::Sent);
    assert!(controller.draft().name.is_empty());
    assert!(controller.draft().email.is_empty());
    assert!(controller.draft().message.is_empty());

    let deliveries = sink.deliveries();
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].name, "Ada");
    assert_eq!(deliveries[0].email, "ada@example.com");
    assert_eq!(deliveries[0].message, "Hello");
}

#[tokio::test]
async fn failed_submit_keeps_draft() {
    let sink = StubSink::failing(1, "service unavailable");
    let mut controller = filled_controller(sink.clone());

    let result = controller.submit().await;

    assert!(matches!(result, Err(SubmissionError::Persistence(_))));
    assert_eq!(
        *controller.state(),
        SubmissionState::Failed("service unavailable".to_string())
    );
    assert_eq!(controller.draft().name, "Ada");
    assert_eq!(controller.draft().email, "ada@example.com");
    assert_eq!(controller.draft().message, "Hello");
}

#[tokio::test]
async fn retry_reissues_the_same_write() {
    let sink = StubSink::failing(1, "service unavailable");
    let mut controller = filled_controller(sink.clone());

    assert!(controller.submit().await.is_err());
    controller.retry().await.unwrap();

    let deliveries = sink.deliveries();
    assert_eq!(deliveries.len(), 2);
    assert_eq!(deliveries[0], deliveries[1]);
    assert_eq!(*controller.state(), SubmissionState::Sent);
    assert!(controller.draft().name.is_empty());
}

#[tokio::test]
async fn missing_field_rejected_before_any_send() {
    let sink = StubSink::accepting();
    let mut controller = filled_controller(sink.clone());
    controller.draft_mut().email.clear();

    let result = controller.submit().await;

    assert!(matches!(result, Err(SubmissionError::MissingField("email"))));
    assert_eq!(*controller.state(), SubmissionState::Idle);
    assert!(sink.deliveries().is_empty());
}

#[tokio::test]
async fn second_submit_while_sending_issues_no_write() {
    let sink = StubSink::accepting();
    let mut controller = filled_controller(sink.clone());

    // Drive the phases by hand so the attempt stays in flight.
    let message = controller.begin_submit().unwrap();
    assert_eq!(*controller.state(), SubmissionState::Sending);

    assert!(matches!(
        controller.begin_submit(),
        Err(SubmissionError::AlreadySending)
    ));
    assert!(matches!(
        controller.submit().await,
        Err(SubmissionError::AlreadySending)
    ));
    assert!(sink.deliveries().is_empty());

    sink.deliver(&message).await.unwrap();
    controller.complete(Ok(()));
    assert_eq!(*controller.state(), SubmissionState::Sent);
    assert!(controller.draft().name.is_empty());
}

#[tokio::test]
async fn sent_accepts_a_fresh_submission() {
    let sink = StubSink::accepting();
    let mut controller = filled_controller(sink.clone());

    controller.submit().await.unwrap();

    let draft = controller.draft_mut();
    draft.name = "Grace".to_string();
    draft.email = "grace@example.com".to_string();
    draft.message = "Second message".to_string();
    controller.submit().await.unwrap();

    let deliveries = sink.deliveries();
    assert_eq!(deliveries.len(), 2);
    assert_eq!(deliveries[1].name, "Grace");
}

#[tokio::test]
async fn stray_completion_is_discarded() {
    let sink = StubSink::accepting();
    let mut controller = filled_controller(sink);

    // No attempt in flight - the late result must not disturb the state.
    controller.complete(Err("late failure".to_string()));

    assert_eq!(*controller.state(), SubmissionState::Idle);
    assert_eq!(controller.draft().name, "Ada");
}

#[tokio::test]
async fn timeout_completes_as_failed() {
    let sink = StubSink::slow(Duration::from_millis(500));
    let mut controller = filled_controller(sink.clone()).with_timeout(Duration::from_millis(20));

    let result = controller.submit().await;

    assert!(matches!(result, Err(SubmissionError::Persistence(_))));
    assert_eq!(
        *controller.state(),
        SubmissionState::Failed("timed out".to_string())
    );
    // The slow call never finished, so nothing was recorded as delivered.
    assert!(sink.deliveries().is_empty());
    // Draft survives a timeout like any other failure.
    assert_eq!(controller.draft().name, "Ada");
}
