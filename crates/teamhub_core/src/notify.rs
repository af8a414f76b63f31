//! Operator-facing transient notices ("toasts").
//!
//! # Responsibility
//! - Give stores one sink for success and failure messages.
//! - Keep presentation out of core: embedders decide how notices render.

use log::{info, warn};
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Sink for operator notices.
pub trait Notifier {
    fn notify(&self, notice: Notice);

    fn success(&self, message: &str) {
        self.notify(Notice {
            level: NoticeLevel::Success,
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

/// Writes notices to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!(
                "event=notice module=notify level=success message={}",
                notice.message
            ),
            NoticeLevel::Error => warn!(
                "event=notice module=notify level=error message={}",
                notice.message
            ),
        }
    }
}

/// Keeps notices in memory until an embedder drains them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn take(&self) -> Vec<Notice> {
        self.notices.take()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(NoticeLevel::Error)
    }

    pub fn successes(&self) -> Vec<String> {
        self.messages(NoticeLevel::Success)
    }

    fn messages(&self, level: NoticeLevel) -> Vec<String> {
        self.notices
            .borrow()
            .iter()
            .filter(|notice| notice.level == level)
            .map(|notice| notice.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}
