//! User-visible notification capability.
//!
//! # Responsibility
//! - Define the injected `Notifier` the content manager reports failures to.
//! - Provide an in-memory toast queue with expiry and explicit dismiss.
//! - Provide a log-only notifier for headless hosts.
//!
//! # Invariants
//! - Notifying never fails and never blocks on I/O.
//! - Toast ids are unique per queue.
//! - A toast is visible from push until dismissed or its duration elapses.

use log::{error, info, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Default lifetime of a toast before it expires.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Info,
    Error,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

/// One message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: Option<String>,
}

impl Notice {
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            description: Some(description.into()),
        }
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.into(),
            description: None,
        }
    }
}

/// Sink for user-visible notices.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice)
    }
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice)
    }
}

/// Writes notices to the process log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error => error!(
                "event=notice module=notify status=error title={:?}",
                notice.title
            ),
            NoticeKind::Info => info!(
                "event=notice module=notify status=ok kind={} title={:?}",
                notice.kind.as_str(),
                notice.title
            ),
        }
    }
}

pub type ToastId = u64;

/// A notice with its queue identity and expiry deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub notice: Notice,
    pub expires_at: Instant,
}

#[derive(Debug, Default)]
struct ToastState {
    next_id: ToastId,
    toasts: Vec<Toast>,
}

/// In-memory toast list shared between the manager and a presenter.
#[derive(Debug)]
pub struct ToastQueue {
    duration: Duration,
    state: Mutex<ToastState>,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::with_duration(DEFAULT_TOAST_DURATION)
    }

    pub fn with_duration(duration: Duration) -> Self {
        Self {
            duration,
            state: Mutex::new(ToastState::default()),
        }
    }

    /// Enqueues a notice that expires after the queue duration.
    pub fn push(&self, notice: Notice) -> ToastId {
        self.push_at(notice, Instant::now())
    }

    /// Enqueues a notice as if pushed at `now`.
    pub fn push_at(&self, notice: Notice, now: Instant) -> ToastId {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.toasts.push(Toast {
            id,
            notice,
            expires_at: now + self.duration,
        });
        id
    }

    /// Removes one toast; returns whether it was still queued.
    pub fn dismiss(&self, id: ToastId) -> bool {
        let mut state = self.lock();
        let before = state.toasts.len();
        state.toasts.retain(|toast| toast.id != id);
        state.toasts.len() != before
    }

    /// Prunes expired toasts and returns the remaining ones, oldest first.
    pub fn active_at(&self, now: Instant) -> Vec<Toast> {
        let mut state = self.lock();
        state.toasts.retain(|toast| toast.expires_at > now);
        state.toasts.clone()
    }

    pub fn active(&self) -> Vec<Toast> {
        self.active_at(Instant::now())
    }

    /// Removes and returns every queued toast regardless of expiry.
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut self.lock().toasts)
    }

    pub fn len(&self) -> usize {
        self.lock().toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, ToastState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, notice: Notice) {
        if notice.kind == NoticeKind::Error {
            warn!(
                "event=notice module=notify status=error title={:?}",
                notice.title
            );
        }
        self.push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::{LogNotifier, Notice, Notifier, ToastQueue};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[test]
    fn toasts_expire_after_duration() {
        let queue = ToastQueue::with_duration(Duration::from_millis(100));
        let start = Instant::now();
        queue.push_at(Notice::info("saved"), start);

        assert_eq!(queue.active_at(start + Duration::from_millis(50)).len(), 1);
        assert!(queue
            .active_at(start + Duration::from_millis(150))
            .is_empty());
        assert!(queue.is_empty());
    }

    #[test]
    fn dismiss_removes_only_the_target_toast() {
        let queue = ToastQueue::new();
        let first = queue.push(Notice::info("one"));
        let second = queue.push(Notice::info("two"));
        assert_ne!(first, second);

        assert!(queue.dismiss(first));
        assert!(!queue.dismiss(first));
        let remaining = queue.drain();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second);
    }

    #[test]
    fn log_notifier_works_behind_shared_handles() {
        let shared: Arc<dyn Notifier> = Arc::new(LogNotifier);
        shared.notify(Notice::info("synced"));
        shared.notify(Notice::error("Failed to load data", "offline"));
    }

    #[test]
    fn notifier_impl_enqueues_through_references() {
        let queue = ToastQueue::new();
        let by_ref: &dyn Notifier = &queue;
        by_ref.notify(Notice::error("Failed to save changes", "retry"));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain()[0].notice.title, "Failed to save changes");
    }
}
