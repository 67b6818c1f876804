use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::info;

/// Severity level for user-facing notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A user-facing notification, e.g. a generation error.
#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// How many times the same message was raised back to back.
    pub repeats: u32,
    pub raised_at: Instant,
    pub ttl: Duration,
}

impl Notification {
    fn new(level: NotificationLevel, message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            level,
            message: message.into(),
            repeats: 1,
            raised_at: Instant::now(),
            ttl,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message, Duration::from_secs(5))
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message, Duration::from_secs(8))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message, Duration::from_secs(10))
    }

    pub fn is_expired(&self) -> bool {
        self.raised_at.elapsed() >= self.ttl
    }
}

/// Bounded queue of pending notifications.
///
/// Raising the same message twice in a row bumps `repeats` on the existing
/// entry instead of queueing a duplicate.
#[derive(Debug)]
pub struct NotificationQueue {
    items: VecDeque<Notification>,
    capacity: usize,
}

impl NotificationQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, notification: Notification) {
        self.items.retain(|n| !n.is_expired());
        if let Some(last) = self.items.back_mut() {
            if last.level == notification.level && last.message == notification.message {
                last.repeats += 1;
                last.raised_at = notification.raised_at;
                return;
            }
        }
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(notification);
    }

    /// Remove and return everything pending, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.items.drain(..).filter(|n| !n.is_expired()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(16)
    }
}

/// Receives the bearer token once the host has resolved it.
///
/// Environment-specific integrations (a companion browser extension, a
/// keychain) hook in here instead of inside the streaming core.
pub trait CredentialSink: Send + Sync {
    fn token_available(&self, token: &str);
}

/// Records that a credential was published, without the secret itself.
#[derive(Debug, Default)]
pub struct TracingCredentialSink;

impl CredentialSink for TracingCredentialSink {
    fn token_available(&self, token: &str) {
        info!(token_len = token.len(), "bearer token available");
    }
}
