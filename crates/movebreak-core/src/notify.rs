//! User-facing notices.
//!
//! A notice never blocks the timer. The board holds at most one: a new notice
//! replaces the previous one, and nothing is retried or persisted.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Destination for warnings and errors raised while the timer runs.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);

    fn warn(&self, message: &str) {
        self.notify(Notice {
            level: NoticeLevel::Warning,
            message: message.to_string(),
        });
    }

    fn error(&self, message: &str) {
        self.notify(Notice {
            level: NoticeLevel::Error,
            message: message.to_string(),
        });
    }
}

/// Single-slot notice holder.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    slot: Mutex<Option<Notice>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The notice currently on display, if any.
    pub fn current(&self) -> Option<Notice> {
        self.slot().clone()
    }

    pub fn dismiss(&self) {
        *self.slot() = None;
    }

    fn slot(&self) -> MutexGuard<'_, Option<Notice>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationSink for NoticeBoard {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Warning => tracing::warn!(message = %notice.message, "notice"),
            NoticeLevel::Error => tracing::error!(message = %notice.message, "notice"),
        }
        *self.slot() = Some(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_starts_empty() {
        assert!(NoticeBoard::new().current().is_none());
    }

    #[test]
    fn latest_notice_overwrites_previous() {
        let board = NoticeBoard::new();
        board.warn("first");
        board.error("second");
        assert_eq!(
            board.current(),
            Some(Notice {
                level: NoticeLevel::Error,
                message: "second".into(),
            })
        );
    }

    #[test]
    fn dismiss_clears_slot() {
        let board = NoticeBoard::new();
        board.warn("heads up");
        board.dismiss();
        assert!(board.current().is_none());
        // Dismissing an empty board is harmless.
        board.dismiss();
    }

    #[test]
    fn shared_board_sees_notices_from_trait_object() {
        use std::sync::Arc;

        let board = Arc::new(NoticeBoard::new());
        let sink: Arc<dyn NotificationSink> = board.clone();
        sink.warn("shared");
        assert_eq!(board.current().map(|n| n.message), Some("shared".into()));
    }

    #[test]
    fn poisoned_board_keeps_working() {
        use std::sync::Arc;

        let board = Arc::new(NoticeBoard::new());
        let poisoner = Arc::clone(&board);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.slot.lock().unwrap();
            panic!("poison the slot");
        })
        .join();
        assert!(board.slot.is_poisoned());

        board.error("still here");
        assert_eq!(board.current().map(|n| n.message), Some("still here".into()));
        board.dismiss();
        assert!(board.current().is_none());
    }
}
