//! Bounded queue between workflow operations and the push transport.
//!
//! `enqueue` never blocks and never fails the caller. When the queue is full
//! the request is handed to a task that waits for space. A background worker
//! drains the queue and delivers each request with bounded retries, so
//! delivery is at-least-once with no ordering across responders.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use aidbridge_core::config::PushConfig;
use aidbridge_core::traits::{PushPayload, PushTransport};

/// Upper bound on the delay between two attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Handle used by services to request push delivery.
#[derive(Debug, Clone)]
pub struct PushDispatcher {
    sender: Option<mpsc::Sender<PushPayload>>,
}

#[derive(Debug, Clone, Copy)]
struct RetryPolicy {
    max_attempts: u32,
    base_backoff: Duration,
}

impl RetryPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.base_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

impl PushDispatcher {
    /// Start the delivery worker. Returns `None` for the handle when push is
    /// disabled by configuration.
    ///
    /// The worker stops after every clone of the dispatcher is dropped and
    /// in-flight deliveries finish.
    pub fn start(
        config: &PushConfig,
        transport: Arc<dyn PushTransport>,
    ) -> (Self, Option<JoinHandle<()>>) {
        if !config.enabled {
            info!("Push delivery disabled");
            return (Self::disabled(), None);
        }

        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let policy = RetryPolicy {
            max_attempts: config.max_attempts.max(1),
            base_backoff: Duration::from_millis(config.retry_backoff_ms),
        };

        info!(
            transport = transport.name(),
            queue_capacity = config.queue_capacity,
            max_attempts = policy.max_attempts,
            "Push dispatcher started"
        );

        let handle = tokio::spawn(run_worker(receiver, transport, policy));
        (
            Self {
                sender: Some(sender),
            },
            Some(handle),
        )
    }

    /// A dispatcher that silently discards every request.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Queue a push request. Returns whether it was accepted.
    ///
    /// Must be called from within a tokio runtime.
    pub fn enqueue(&self, payload: PushPayload) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };
        match sender.try_send(payload) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(payload)) => {
                debug!(
                    responder_id = %payload.responder_id,
                    ticket_id = %payload.ticket_id,
                    "Push queue full, waiting for space"
                );
                let sender = sender.clone();
                tokio::spawn(async move {
                    if let Err(mpsc::error::SendError(payload)) = sender.send(payload).await {
                        warn!(
                            responder_id = %payload.responder_id,
                            ticket_id = %payload.ticket_id,
                            "Push worker stopped, dropping notification"
                        );
                    }
                });
                true
            }
            Err(mpsc::error::TrySendError::Closed(payload)) => {
                warn!(
                    responder_id = %payload.responder_id,
                    ticket_id = %payload.ticket_id,
                    "Push worker stopped, dropping notification"
                );
                false
            }
        }
    }
}

async fn run_worker(
    mut receiver: mpsc::Receiver<PushPayload>,
    transport: Arc<dyn PushTransport>,
    policy: RetryPolicy,
) {
    let mut in_flight = JoinSet::new();

    while let Some(payload) = receiver.recv().await {
        while in_flight.try_join_next().is_some() {}
        in_flight.spawn(deliver_with_retry(Arc::clone(&transport), payload, policy));
    }

    while in_flight.join_next().await.is_some() {}
    info!("Push dispatcher stopped");
}

async fn deliver_with_retry(
    transport: Arc<dyn PushTransport>,
    payload: PushPayload,
    policy: RetryPolicy,
) {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match transport.deliver(&payload).await {
            Ok(()) => {
                debug!(
                    responder_id = %payload.responder_id,
                    ticket_id = %payload.ticket_id,
                    attempt,
                    "Push delivered"
                );
                return;
            }
            Err(e) if attempt < policy.max_attempts => {
                let delay = policy.backoff(attempt);
                warn!(
                    responder_id = %payload.responder_id,
                    ticket_id = %payload.ticket_id,
                    attempt,
                    retry_in_ms = delay.as_millis() as u64,
                    error = %e,
                    "Push delivery failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                warn!(
                    responder_id = %payload.responder_id,
                    ticket_id = %payload.ticket_id,
                    attempt,
                    error = %e,
                    "Push delivery abandoned"
                );
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidbridge_core::AppError;
    use aidbridge_core::result::AppResult;
    use aidbridge_core::types::id::{NeedId, ResponderId, TicketId};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, Default)]
    struct FlakyTransport {
        failures_left: AtomicU32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl PushTransport for FlakyTransport {
        async fn deliver(&self, _payload: &PushPayload) -> AppResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(AppError::external("unavailable"));
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    fn payload() -> PushPayload {
        PushPayload {
            responder_id: ResponderId::new(),
            need_id: NeedId::new(),
            ticket_id: TicketId::new(),
            title: "New need".into(),
            body: "food".into(),
            emergency: false,
        }
    }

    fn config(max_attempts: u32, queue_capacity: usize) -> PushConfig {
        PushConfig {
            max_attempts,
            queue_capacity,
            retry_backoff_ms: 1,
            ..PushConfig::default()
        }
    }

    #[tokio::test]
    async fn test_retries_until_delivered() {
        let transport = Arc::new(FlakyTransport {
            failures_left: AtomicU32::new(2),
            ..Default::default()
        });
        let (dispatcher, handle) = PushDispatcher::start(&config(3, 8), transport.clone());
        assert!(dispatcher.enqueue(payload()));
        drop(dispatcher);
        handle.unwrap().await.unwrap();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let transport = Arc::new(FlakyTransport {
            failures_left: AtomicU32::new(10),
            ..Default::default()
        });
        let (dispatcher, handle) = PushDispatcher::start(&config(2, 8), transport.clone());
        dispatcher.enqueue(payload());
        drop(dispatcher);
        handle.unwrap().await.unwrap();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_full_queue_still_delivers_every_request() {
        let transport = Arc::new(FlakyTransport::default());
        let (dispatcher, handle) = PushDispatcher::start(&config(1, 1), transport.clone());
        for _ in 0..5 {
            assert!(dispatcher.enqueue(payload()));
        }
        drop(dispatcher);
        handle.unwrap().await.unwrap();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_disabled_discards() {
        let config = PushConfig {
            enabled: false,
            ..PushConfig::default()
        };
        let (dispatcher, handle) = PushDispatcher::start(&config, Arc::new(FlakyTransport::default()));
        assert!(handle.is_none());
        assert!(!dispatcher.enqueue(payload()));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_backoff: Duration::from_millis(500),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(3), Duration::from_millis(2000));
        assert_eq!(policy.backoff(20), MAX_BACKOFF);
    }
}
