//! The optimistic presence toggle.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use keliling_core::types::VendorId;

use crate::error::{ToggleError, TransportError};
use crate::notify::{Notice, Notifier};
use crate::presence::state::{ToggleEvent, TogglePhase};
use crate::session::Session;
use crate::transport::PresenceTransport;
use crate::view::VendorListView;

/// How a toggle ended.
#[derive(Debug, Clone)]
pub enum ToggleOutcome {
    /// The server stored `online`; the view shows it.
    Confirmed { online: bool },
    /// The request failed; the view was restored to `online`.
    Reverted { online: bool, error: TransportError },
    /// A later toggle for the same vendor was sent before this one
    /// completed, so the view was left to the later one. A failure is still
    /// reported through the notifier.
    Superseded,
}

impl ToggleOutcome {
    /// The value this outcome left in the view, if it changed it.
    pub fn online(&self) -> Option<bool> {
        match self {
            Self::Confirmed { online } | Self::Reverted { online, .. } => Some(*online),
            Self::Superseded => None,
        }
    }
}

/// Flips a vendor's presence optimistically and reconciles with the
/// server's answer.
#[derive(Debug)]
pub struct PresenceToggle {
    session: Arc<Session>,
    transport: Arc<dyn PresenceTransport>,
    view: Arc<VendorListView>,
    notifier: Arc<dyn Notifier>,
    seq: AtomicU64,
}

impl PresenceToggle {
    pub fn new(
        session: Arc<Session>,
        transport: Arc<dyn PresenceTransport>,
        view: Arc<VendorListView>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            transport,
            view,
            notifier,
            seq: AtomicU64::new(0),
        }
    }

    /// Toggles `vendor_id` away from `current_known`.
    ///
    /// Fails without a request if the session does not own the vendor.
    /// No retry. Every confirmation and every failure emits one notice;
    /// only the latest request decides what the view shows.
    pub async fn toggle(
        &self,
        vendor_id: VendorId,
        current_known: bool,
    ) -> Result<ToggleOutcome, ToggleError> {
        if !self.session.owns(vendor_id) {
            return Err(ToggleError::NotOwner { vendor_id });
        }

        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let desired = !current_known;
        self.view
            .apply(vendor_id, ToggleEvent::Begin { current_known, seq })
            .await;
        debug!(%vendor_id, desired, seq, "Toggle started");

        match self.transport.set_online(vendor_id, desired).await {
            Ok(confirmed) => {
                let event = ToggleEvent::Succeeded { confirmed, seq };
                match self.view.apply(vendor_id, event).await {
                    Some(TogglePhase::Confirmed { value }) => {
                        info!(%vendor_id, online = value, "Presence confirmed");
                        self.notifier
                            .notify(Notice::toggle_confirmed(vendor_id, value));
                        Ok(ToggleOutcome::Confirmed { online: value })
                    }
                    _ => Ok(ToggleOutcome::Superseded),
                }
            }
            Err(error) => {
                self.notifier.notify(Notice::toggle_failed(vendor_id, &error));
                match self.view.apply(vendor_id, ToggleEvent::Failed { seq }).await {
                    Some(TogglePhase::Reverted { value }) => Ok(ToggleOutcome::Reverted {
                        online: value,
                        error,
                    }),
                    _ => {
                        debug!(%vendor_id, seq, "Failure of superseded toggle");
                        Ok(ToggleOutcome::Superseded)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoticeLevel;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::{Notify, oneshot};

    use keliling_core::types::{Principal, UserId};
    use keliling_entity::vendor::VendorSummary;

    #[derive(Debug, Default)]
    struct CollectingNotifier {
        notices: Mutex<Vec<Notice>>,
    }

    impl Notifier for CollectingNotifier {
        fn notify(&self, notice: Notice) {
            self.notices.lock().unwrap().push(notice);
        }
    }

    /// Replies from a scripted queue and records what was sent.
    #[derive(Debug, Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<Option<bool>, TransportError>>>,
        sent: Mutex<Vec<bool>>,
    }

    impl ScriptedTransport {
        fn replying(replies: Vec<Result<Option<bool>, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                sent: Mutex::default(),
            })
        }

        fn sent(&self) -> Vec<bool> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PresenceTransport for ScriptedTransport {
        async fn set_online(&self, _vendor_id: VendorId, online: bool) -> Result<bool, TransportError> {
            self.sent.lock().unwrap().push(online);
            match self.replies.lock().unwrap().pop_front() {
                // `None` echoes the requested value.
                Some(Ok(reply)) => Ok(reply.unwrap_or(online)),
                Some(Err(e)) => Err(e),
                None => Ok(online),
            }
        }
    }

    /// Holds each request until released, so completions can be reordered.
    #[derive(Debug, Default)]
    struct GatedTransport {
        gates: Mutex<VecDeque<oneshot::Receiver<Result<bool, TransportError>>>>,
        started: Notify,
    }

    #[async_trait]
    impl PresenceTransport for GatedTransport {
        async fn set_online(&self, _vendor_id: VendorId, _online: bool) -> Result<bool, TransportError> {
            let gate = self.gates.lock().unwrap().pop_front().expect("gate");
            self.started.notify_one();
            gate.await.expect("gate dropped")
        }
    }

    struct Fixture {
        toggle: Arc<PresenceToggle>,
        view: Arc<VendorListView>,
        notifier: Arc<CollectingNotifier>,
        vendor_id: VendorId,
    }

    async fn fixture(transport: Arc<dyn PresenceTransport>, online: bool) -> Fixture {
        let vendor_id = VendorId::new();
        let session = Arc::new(
            Session::new("http://localhost:4000", "tok", Principal::new(UserId::new()))
                .with_owned_vendor(vendor_id),
        );
        let view = Arc::new(VendorListView::new());
        view.replace(vec![VendorSummary {
            id: vendor_id,
            name: "Es Doger".to_string(),
            description: None,
            photo_url: None,
            location: None,
            online,
        }])
        .await;
        let notifier = Arc::new(CollectingNotifier::default());
        let toggle = Arc::new(PresenceToggle::new(
            session,
            transport,
            view.clone(),
            notifier.clone(),
        ));
        Fixture {
            toggle,
            view,
            notifier,
            vendor_id,
        }
    }

    fn server_error(status: u16) -> TransportError {
        TransportError::Status {
            status,
            message: "Failed to update vendor status".to_string(),
            code: None,
        }
    }

    #[tokio::test]
    async fn test_confirmed_value_wins_over_guess() {
        let transport = ScriptedTransport::replying(vec![Ok(Some(false))]);
        let fx = fixture(transport.clone(), false).await;

        let outcome = fx.toggle.toggle(fx.vendor_id, false).await.unwrap();
        assert!(matches!(outcome, ToggleOutcome::Confirmed { online: false }));
        assert_eq!(transport.sent(), vec![true]);
        assert_eq!(fx.view.online(fx.vendor_id).await, Some(false));
        assert!(!fx.view.is_updating(fx.vendor_id).await);
    }

    #[tokio::test]
    async fn test_success_confirms_desired() {
        let transport = ScriptedTransport::replying(vec![]);
        let fx = fixture(transport, true).await;

        let outcome = fx.toggle.toggle(fx.vendor_id, true).await.unwrap();
        assert_eq!(outcome.online(), Some(false));
        assert_eq!(fx.view.online(fx.vendor_id).await, Some(false));

        let notices = fx.notifier.notices.lock().unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0], Notice::toggle_confirmed(fx.vendor_id, false));
    }

    #[tokio::test]
    async fn test_every_failure_reverts() {
        for error in [
            TransportError::Network("connection refused".to_string()),
            server_error(403),
            server_error(500),
        ] {
            let transport = ScriptedTransport::replying(vec![Err(error.clone())]);
            let fx = fixture(transport, true).await;

            let outcome = fx.toggle.toggle(fx.vendor_id, true).await.unwrap();
            assert!(
                matches!(outcome, ToggleOutcome::Reverted { online: true, .. }),
                "{error}"
            );
            assert_eq!(fx.view.online(fx.vendor_id).await, Some(true));
            assert!(!fx.view.is_updating(fx.vendor_id).await);

            let notices = fx.notifier.notices.lock().unwrap();
            assert_eq!(notices.len(), 1);
            assert_eq!(notices[0].level, NoticeLevel::Error);
            assert_eq!(notices[0].retryable, error.is_retryable());
        }
    }

    #[tokio::test]
    async fn test_not_owner_sends_nothing() {
        let transport = ScriptedTransport::replying(vec![]);
        let fx = fixture(transport.clone(), false).await;
        let other = VendorId::new();

        let err = fx.toggle.toggle(other, false).await.unwrap_err();
        assert_eq!(err, ToggleError::NotOwner { vendor_id: other });
        assert!(transport.sent().is_empty());
        assert_eq!(fx.view.phase(other).await, TogglePhase::Idle);
    }

    #[tokio::test]
    async fn test_view_shows_guess_while_pending() {
        let transport = Arc::new(GatedTransport::default());
        let (tx, rx) = oneshot::channel();
        transport.gates.lock().unwrap().push_back(rx);
        let fx = fixture(transport.clone(), false).await;

        let toggle = fx.toggle.clone();
        let vendor_id = fx.vendor_id;
        let task = tokio::spawn(async move { toggle.toggle(vendor_id, false).await });

        transport.started.notified().await;
        assert_eq!(fx.view.online(fx.vendor_id).await, Some(true));
        assert!(fx.view.is_updating(fx.vendor_id).await);

        tx.send(Ok(true)).unwrap();
        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome.online(), Some(true));
        assert!(!fx.view.is_updating(fx.vendor_id).await);
    }

    #[tokio::test]
    async fn test_last_request_sent_wins() {
        let transport = Arc::new(GatedTransport::default());
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        transport.gates.lock().unwrap().extend([first_rx, second_rx]);
        let fx = fixture(transport.clone(), false).await;
        let vendor_id = fx.vendor_id;

        let toggle = fx.toggle.clone();
        let first = tokio::spawn(async move { toggle.toggle(vendor_id, false).await });
        transport.started.notified().await;

        let toggle = fx.toggle.clone();
        let second = tokio::spawn(async move { toggle.toggle(vendor_id, true).await });
        transport.started.notified().await;

        // Second completes first, then the older response arrives.
        second_tx.send(Ok(false)).unwrap();
        let second = second.await.unwrap().unwrap();
        assert!(matches!(second, ToggleOutcome::Confirmed { online: false }));

        first_tx.send(Err(server_error(500))).unwrap();
        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, ToggleOutcome::Superseded));

        assert_eq!(fx.view.online(vendor_id).await, Some(false));

        let levels: Vec<NoticeLevel> = fx
            .notifier
            .notices
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.level)
            .collect();
        assert_eq!(levels, vec![NoticeLevel::Success, NoticeLevel::Error]);
    }

    #[tokio::test]
    async fn test_overlapping_failures_restore_stored_value() {
        let transport = Arc::new(GatedTransport::default());
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        transport.gates.lock().unwrap().extend([first_rx, second_rx]);
        let fx = fixture(transport.clone(), false).await;
        let vendor_id = fx.vendor_id;

        let toggle = fx.toggle.clone();
        let first = tokio::spawn(async move { toggle.toggle(vendor_id, false).await });
        transport.started.notified().await;

        // Second toggle starts from the guess the first one shows.
        let shown = fx.view.online(vendor_id).await.unwrap();
        assert!(shown);
        let toggle = fx.toggle.clone();
        let second = tokio::spawn(async move { toggle.toggle(vendor_id, shown).await });
        transport.started.notified().await;

        second_tx.send(Err(server_error(500))).unwrap();
        let second = second.await.unwrap().unwrap();
        assert!(matches!(second, ToggleOutcome::Reverted { online: false, .. }));

        first_tx.send(Err(server_error(500))).unwrap();
        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, ToggleOutcome::Superseded));

        assert_eq!(fx.view.online(vendor_id).await, Some(false));
        assert!(!fx.view.is_updating(vendor_id).await);
        let notices = fx.notifier.notices.lock().unwrap();
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|n| n.level == NoticeLevel::Error));
    }
}
