//! Turns published generation progress into terminal lines.

use forma_common::{Notification, NotificationLevel, NotificationQueue};
use forma_stream::StreamingProgress;

/// Malformed lines tolerated before the user is told about them.
const SKIPPED_LINES_WARNING: u32 = 3;

/// Remembers what has been printed so each observation only yields news.
pub struct ProgressReporter {
    shown_messages: usize,
    lesson_id: Option<String>,
    completed_lessons: Option<u32>,
    error_shown: bool,
    skipped_warned: bool,
    pending: NotificationQueue,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self {
            shown_messages: 0,
            lesson_id: None,
            completed_lessons: None,
            error_shown: false,
            skipped_warned: false,
            pending: NotificationQueue::new(256),
        }
    }
}

impl ProgressReporter {
    pub fn observe(&mut self, progress: &StreamingProgress) -> Vec<String> {
        if progress.messages.len() < self.shown_messages {
            self.shown_messages = 0;
        }
        for message in &progress.messages[self.shown_messages..] {
            self.pending.push(Notification::info(message.clone()));
        }
        self.shown_messages = progress.messages.len();

        if let Some(lesson) = &progress.current_lesson {
            if self.lesson_id.as_deref() != Some(lesson.id.as_str()) {
                self.lesson_id = Some(lesson.id.clone());
                self.pending.push(Notification::info(format!(
                    "lesson {} generated: {} [{}]",
                    lesson.id, lesson.title, lesson.progress
                )));
            }
        }

        if progress.completed_lessons != self.completed_lessons {
            self.completed_lessons = progress.completed_lessons;
            if let Some(done) = progress.completed_lessons {
                let total = progress
                    .total_lessons
                    .map(|t| format!("/{t}"))
                    .unwrap_or_default();
                self.pending
                    .push(Notification::info(format!("progress: {done}{total} lessons")));
            }
        }

        match &progress.error {
            Some(error) if !self.error_shown => {
                self.error_shown = true;
                self.pending.push(Notification::error(error.clone()));
            }
            None => self.error_shown = false,
            _ => {}
        }

        if progress.skipped_lines >= SKIPPED_LINES_WARNING && !self.skipped_warned {
            self.skipped_warned = true;
            self.pending.push(Notification::warning(format!(
                "{} malformed stream lines skipped",
                progress.skipped_lines
            )));
        }

        self.pending.drain().iter().map(render).collect()
    }
}

fn render(notification: &Notification) -> String {
    let prefix = match notification.level {
        NotificationLevel::Info => "",
        NotificationLevel::Warning => "warning: ",
        NotificationLevel::Error => "error: ",
    };
    if notification.repeats > 1 {
        format!(
            "{prefix}{} (x{})",
            notification.message, notification.repeats
        )
    } else {
        format!("{prefix}{}", notification.message)
    }
}
