//! Transient toast notifications.
//!
//! One structured queue of `{id, message, kind, expiry}` entries, pushed
//! by actions and rendered by a single UI path. Entries expire on their
//! own; errors linger longer than confirmations so they can actually be
//! read.

use std::time::{Duration, Instant};

/// How long a success/info toast stays visible
const INFO_TOAST: Duration = Duration::from_secs(3);

/// How long an error toast stays visible
const ERROR_TOAST: Duration = Duration::from_secs(8);

/// At most this many toasts render at once; older ones drop first
const MAX_VISIBLE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>, kind: ToastKind) {
        let ttl = match kind {
            ToastKind::Error => ERROR_TOAST,
            ToastKind::Info | ToastKind::Success => INFO_TOAST,
        };
        self.push_with_ttl(message, kind, ttl);
    }

    fn push_with_ttl(&mut self, message: impl Into<String>, kind: ToastKind, ttl: Duration) {
        self.next_id += 1;
        let toast = Toast {
            id: self.next_id,
            message: message.into(),
            kind,
            expires_at: Instant::now() + ttl,
        };
        tracing::debug!(id = toast.id, kind = ?toast.kind, "Toast: {}", toast.message);
        self.toasts.push(toast);
        if self.toasts.len() > MAX_VISIBLE {
            let overflow = self.toasts.len() - MAX_VISIBLE;
            self.toasts.drain(..overflow);
        }
    }

    /// Drop expired toasts; call once per event-loop tick
    pub fn prune(&mut self) {
        self.prune_at(Instant::now());
    }

    fn prune_at(&mut self, now: Instant) {
        self.toasts.retain(|t| t.expires_at > now);
    }

    /// Currently visible toasts, oldest first
    pub fn visible(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_prune() {
        let mut queue = ToastQueue::new();
        queue.push_with_ttl("saved", ToastKind::Success, Duration::from_secs(60));
        queue.push_with_ttl("failed", ToastKind::Error, Duration::from_secs(0));
        assert_eq!(queue.visible().len(), 2);

        queue.prune_at(Instant::now() + Duration::from_millis(1));
        assert_eq!(queue.visible().len(), 1);
        assert_eq!(queue.visible()[0].message, "saved");
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut queue = ToastQueue::new();
        queue.push("a", ToastKind::Info);
        queue.push("b", ToastKind::Info);
        let ids: Vec<u64> = queue.visible().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut queue = ToastQueue::new();
        for i in 0..6 {
            queue.push(format!("toast {}", i), ToastKind::Info);
        }
        assert_eq!(queue.visible().len(), MAX_VISIBLE);
        assert_eq!(queue.visible()[0].message, "toast 2");
    }
}
