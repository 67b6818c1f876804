//! The generation accumulator and its fold over [`StreamEvent`]s.
//!
//! [`StreamingProgress::reduce`] is pure: it takes the previous state by value
//! and returns the next one, so the session controller is the only place
//! that publishes state and the fold can be tested without any I/O.

use serde::Serialize;

use crate::event::{StatusPayload, StreamEvent, UpdatesPayload, ValuesPayload};

/// Substrings of an `updates` message that announce the end of a lesson.
pub const LESSON_COMPLETION_MARKERS: [&str; 2] = ["✅ Leçon terminée:", "✅💾 Leçon sauvegardée:"];

/// Whether a log line announces that the lesson in flight is finished.
pub fn is_lesson_completion(content: &str) -> bool {
    LESSON_COMPLETION_MARKERS
        .iter()
        .any(|marker| content.contains(marker))
}

/// The lesson most recently reported by a `values.lesson_generated` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrentLesson {
    pub id: String,
    pub title: String,
    pub progress: String,
    /// Streamed text accumulated when this lesson was reported.
    pub streaming_content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StreamingProgress {
    pub is_generating: bool,
    pub is_completed: bool,
    pub error: Option<String>,
    /// Log of status and update messages in arrival order.
    pub messages: Vec<String>,
    /// Token text of the lesson in flight.
    pub current_streaming_content: String,
    pub current_lesson: Option<CurrentLesson>,
    pub completed_lessons: Option<u32>,
    pub total_lessons: Option<u32>,
    /// Lines dropped because they failed to parse.
    pub skipped_lines: u32,
}

impl StreamingProgress {
    /// Fresh state for a session that has just been started.
    pub fn started() -> Self {
        Self {
            is_generating: true,
            ..Self::default()
        }
    }

    pub fn reduce(self, event: StreamEvent) -> Self {
        if self.is_completed {
            return self.reapply_terminal(event);
        }
        match event {
            StreamEvent::Status(status) => self.on_status(status),
            StreamEvent::Token(token) => self.on_token(&token),
            StreamEvent::Updates(updates) => self.on_updates(updates),
            StreamEvent::Progress(progress) => Self {
                completed_lessons: Some(progress.outputs_count),
                ..self
            },
            StreamEvent::Values(values) => self.on_values(values),
            StreamEvent::Error(err) => Self {
                error: Some(err.message),
                is_generating: false,
                ..self
            },
        }
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    /// Mark a session that ended on any path as no longer generating.
    pub(crate) fn halted(self) -> Self {
        Self {
            is_generating: false,
            ..self
        }
    }

    fn complete(self) -> Self {
        Self {
            is_generating: false,
            is_completed: true,
            ..self
        }
    }

    fn on_status(mut self, status: StatusPayload) -> Self {
        self.messages.push(status.message);
        if status.completed {
            self = self.complete();
        }
        self
    }

    fn on_token(mut self, token: &str) -> Self {
        self.current_streaming_content.push_str(token);
        self
    }

    fn on_updates(mut self, updates: UpdatesPayload) -> Self {
        let mut lesson_done = false;
        for message in updates.messages {
            lesson_done |= is_lesson_completion(&message.content);
            self.messages.push(message.content);
        }
        if lesson_done {
            self.current_streaming_content.clear();
        }
        self
    }

    fn on_values(mut self, values: ValuesPayload) -> Self {
        if let Some(lesson) = values.lesson_generated {
            let is_new = self
                .current_lesson
                .as_ref()
                .map_or(true, |current| current.id != lesson.lesson_id);
            let snapshot = if is_new {
                std::mem::take(&mut self.current_streaming_content)
            } else {
                self.current_streaming_content.clone()
            };
            self.current_lesson = Some(CurrentLesson {
                id: lesson.lesson_id,
                title: lesson.lesson_title,
                progress: lesson.progress,
                streaming_content: Some(snapshot),
            });
        }
        if let Some(done) = values.formation_completed {
            self.total_lessons = Some(done.total_lessons);
            self.current_streaming_content.clear();
            self = self.complete();
        }
        self
    }

    /// After completion only terminal signals are applied again, and they
    /// leave the state as it was.
    fn reapply_terminal(mut self, event: StreamEvent) -> Self {
        match event {
            StreamEvent::Status(status) if status.completed => self.complete(),
            StreamEvent::Values(ValuesPayload {
                formation_completed: Some(done),
                ..
            }) => {
                self.total_lessons = Some(done.total_lessons);
                self.current_streaming_content.clear();
                self.complete()
            }
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::parse_data_line;

    fn feed(progress: StreamingProgress, lines: &[&str]) -> StreamingProgress {
        lines.iter().fold(progress, |acc, line| match parse_data_line(line) {
            Some(Ok(event)) => acc.reduce(event),
            _ => acc,
        })
    }

    fn token(text: &str) -> StreamEvent {
        StreamEvent::Token(text.to_string())
    }

    const LESSON_DONE: &str =
        r#"data: ["updates",{"messages":[{"content":"✅ Leçon terminée: X"}]}]"#;
    const FORMATION_DONE: &str = r#"data: ["values",{"formation_completed":{"total_lessons":12}}]"#;

    #[test]
    fn started_is_generating_and_empty() {
        let progress = StreamingProgress::started();
        assert!(progress.is_generating);
        assert!(!progress.is_completed);
        assert!(progress.messages.is_empty());
        assert!(progress.current_streaming_content.is_empty());
    }

    #[test]
    fn tokens_then_completion_marker_clear_content() {
        let progress = feed(
            StreamingProgress::started(),
            &[
                r#"data: ["messages","Hel"]"#,
                r#"data: ["messages","lo"]"#,
                LESSON_DONE,
            ],
        );
        assert_eq!(progress.current_streaming_content, "");
        assert_eq!(progress.messages.last().unwrap(), "✅ Leçon terminée: X");
    }

    #[test]
    fn tokens_concatenate_including_empty_ones() {
        let progress = [token("Hel"), token(""), token("lo")]
            .into_iter()
            .fold(StreamingProgress::started(), StreamingProgress::reduce);
        assert_eq!(progress.current_streaming_content, "Hello");
    }

    #[test]
    fn formation_completed_is_terminal() {
        let progress = feed(
            StreamingProgress::started(),
            &[r#"data: ["messages","partial"]"#, FORMATION_DONE],
        );
        assert!(!progress.is_generating);
        assert!(progress.is_completed);
        assert_eq!(progress.total_lessons, Some(12));
        assert_eq!(progress.current_streaming_content, "");
    }

    #[test]
    fn duplicate_formation_completed_is_idempotent() {
        let once = feed(StreamingProgress::started(), &[FORMATION_DONE]);
        let twice = feed(StreamingProgress::started(), &[FORMATION_DONE, FORMATION_DONE]);
        assert_eq!(once, twice);
    }

    #[test]
    fn content_resets_after_any_number_of_tokens() {
        for n in 0..20 {
            let progress = (0..n)
                .map(|i| token(&format!("t{i} ")))
                .fold(StreamingProgress::started(), StreamingProgress::reduce);
            let progress = feed(progress, &[LESSON_DONE]);
            assert_eq!(progress.current_streaming_content, "", "after {n} tokens");
        }
    }

    #[test]
    fn saved_marker_also_ends_a_lesson() {
        let progress = feed(
            StreamingProgress::started(),
            &[
                r#"data: ["messages","body"]"#,
                r#"data: ["updates",{"messages":[{"content":"Sauvegarde"},{"content":"✅💾 Leçon sauvegardée: Intro"}]}]"#,
            ],
        );
        assert_eq!(progress.current_streaming_content, "");
        assert_eq!(progress.messages, vec!["Sauvegarde", "✅💾 Leçon sauvegardée: Intro"]);
    }

    #[test]
    fn updates_without_marker_keep_content() {
        let progress = feed(
            StreamingProgress::started(),
            &[
                r#"data: ["messages","body"]"#,
                r#"data: ["updates",{"messages":[{"content":"Génération en cours"}]}]"#,
            ],
        );
        assert_eq!(progress.current_streaming_content, "body");
    }

    #[test]
    fn messages_keep_arrival_order_across_kinds() {
        let progress = feed(
            StreamingProgress::started(),
            &[
                r#"data: ["status",{"message":"one"}]"#,
                r#"data: ["updates",{"messages":[{"content":"two"},{"content":"three"}]}]"#,
                r#"data: ["messages","ignored for the log"]"#,
                r#"data: ["status",{"message":"four"}]"#,
                r#"data: ["updates",{"messages":[{"content":"five"}]}]"#,
            ],
        );
        assert_eq!(progress.messages, vec!["one", "two", "three", "four", "five"]);
    }

    #[test]
    fn status_completed_ends_generation() {
        let progress = feed(
            StreamingProgress::started(),
            &[r#"data: ["status",{"message":"Terminé","completed":true}]"#],
        );
        assert!(progress.is_completed);
        assert!(!progress.is_generating);
        assert_eq!(progress.messages, vec!["Terminé"]);
    }

    #[test]
    fn progress_sets_completed_lessons() {
        let progress = feed(
            StreamingProgress::started(),
            &[r#"data: ["progress",{"outputs_count":3}]"#],
        );
        assert_eq!(progress.completed_lessons, Some(3));
    }

    #[test]
    fn new_lesson_snapshots_and_clears_content() {
        let progress = feed(
            StreamingProgress::started(),
            &[
                r#"data: ["messages","first body"]"#,
                r#"data: ["values",{"lesson_generated":{"lesson_id":"1","lesson_title":"Intro","progress":"1/2"}}]"#,
            ],
        );
        let lesson = progress.current_lesson.as_ref().unwrap();
        assert_eq!(lesson.id, "1");
        assert_eq!(lesson.title, "Intro");
        assert_eq!(lesson.progress, "1/2");
        assert_eq!(lesson.streaming_content.as_deref(), Some("first body"));
        assert_eq!(progress.current_streaming_content, "");
    }

    #[test]
    fn same_lesson_reported_again_keeps_content() {
        let progress = feed(
            StreamingProgress::started(),
            &[
                r#"data: ["values",{"lesson_generated":{"lesson_id":1,"lesson_title":"Intro","progress":1}}]"#,
                r#"data: ["messages","more"]"#,
                r#"data: ["values",{"lesson_generated":{"lesson_id":1,"lesson_title":"Intro","progress":2}}]"#,
            ],
        );
        let lesson = progress.current_lesson.as_ref().unwrap();
        assert_eq!(lesson.progress, "2");
        assert_eq!(lesson.streaming_content.as_deref(), Some("more"));
        assert_eq!(progress.current_streaming_content, "more");
    }

    #[test]
    fn error_event_stops_generating_but_not_the_fold() {
        let progress = feed(
            StreamingProgress::started(),
            &[
                r#"data: ["error",{"message":"quota exceeded"}]"#,
                r#"data: ["status",{"message":"après"}]"#,
            ],
        );
        assert_eq!(progress.error.as_deref(), Some("quota exceeded"));
        assert!(!progress.is_generating);
        assert!(!progress.is_completed);
        assert_eq!(progress.messages, vec!["après"]);
    }

    #[test]
    fn events_after_completion_are_ignored() {
        let done = feed(StreamingProgress::started(), &[FORMATION_DONE]);
        let after = feed(
            done.clone(),
            &[
                r#"data: ["messages","late"]"#,
                r#"data: ["status",{"message":"late"}]"#,
                r#"data: ["progress",{"outputs_count":9}]"#,
                r#"data: ["error",{"message":"late"}]"#,
                r#"data: ["status",{"message":"again","completed":true}]"#,
            ],
        );
        assert_eq!(after, done);
    }

    #[test]
    fn clear_messages_keeps_other_fields() {
        let mut progress = feed(
            StreamingProgress::started(),
            &[r#"data: ["status",{"message":"x"}]"#, r#"data: ["messages","y"]"#],
        );
        progress.clear_messages();
        assert!(progress.messages.is_empty());
        assert_eq!(progress.current_streaming_content, "y");
        assert!(progress.is_generating);
    }

    #[test]
    fn marker_detection() {
        assert!(is_lesson_completion("✅ Leçon terminée: Ownership"));
        assert!(is_lesson_completion("log ✅💾 Leçon sauvegardée: 3"));
        assert!(!is_lesson_completion("Leçon terminée"));
        assert!(!is_lesson_completion(""));
    }
}
