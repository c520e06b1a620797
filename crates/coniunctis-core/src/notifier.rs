//! Side channel for user-facing notices.
//!
//! The controller is handed a notifier at construction; nothing here is
//! global. Every hook has a no-op default so shells only implement what they
//! can surface.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use crate::timer::SessionKind;

pub trait Notifier {
    /// Called once per completion when sound is enabled.
    fn play_completion_sound(&self, _kind: SessionKind) {}

    /// Called once per completion, after persistence was attempted.
    fn session_completed(&self, _kind: SessionKind, _next: SessionKind) {}

    /// A write did not reach the store and was queued for retry.
    fn persistence_failed(&self, _message: &str) {}
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn play_completion_sound(&self, kind: SessionKind) {
        (**self).play_completion_sound(kind)
    }

    fn session_completed(&self, kind: SessionKind, next: SessionKind) {
        (**self).session_completed(kind, next)
    }

    fn persistence_failed(&self, message: &str) {
        (**self).persistence_failed(message)
    }
}

/// Writes every notice to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn play_completion_sound(&self, kind: SessionKind) {
        tracing::debug!(kind = kind.as_str(), "completion sound");
    }

    fn session_completed(&self, kind: SessionKind, next: SessionKind) {
        tracing::info!("{} complete, next: {}", kind.display_name(), next.display_name());
    }

    fn persistence_failed(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum Notice {
    Sound { kind: SessionKind },
    Completed { kind: SessionKind, next: SessionKind },
    PersistenceFailed { message: String },
}

/// Collects notices for a shell to render later.
#[derive(Debug, Default)]
pub struct QueuedNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl QueuedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notice>> {
        self.notices.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Notifier for QueuedNotifier {
    fn play_completion_sound(&self, kind: SessionKind) {
        self.lock().push(Notice::Sound { kind });
    }

    fn session_completed(&self, kind: SessionKind, next: SessionKind) {
        self.lock().push(Notice::Completed { kind, next });
    }

    fn persistence_failed(&self, message: &str) {
        self.lock().push(Notice::PersistenceFailed {
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_notifier_drains_in_order() {
        let n = QueuedNotifier::new();
        n.play_completion_sound(SessionKind::Focus);
        n.session_completed(SessionKind::Focus, SessionKind::ShortBreak);
        assert_eq!(
            n.drain(),
            vec![
                Notice::Sound { kind: SessionKind::Focus },
                Notice::Completed {
                    kind: SessionKind::Focus,
                    next: SessionKind::ShortBreak
                },
            ]
        );
        assert!(n.drain().is_empty());
    }

    #[test]
    fn reference_forwards() {
        fn fail<N: Notifier>(notifier: N) {
            notifier.persistence_failed("offline");
        }
        let n = QueuedNotifier::new();
        fail(&n);
        assert_eq!(
            n.drain(),
            vec![Notice::PersistenceFailed {
                message: "offline".into()
            }]
        );
    }
}
