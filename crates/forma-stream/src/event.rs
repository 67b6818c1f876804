//! Typed events of the content-generation stream.
//!
//! Each meaningful line is `data: ` followed by a JSON 2-tuple
//! `[kind, payload]`. The payload is validated against the struct for its
//! kind here, so the reducer can match exhaustively.

use forma_common::json::{
    nullable_string, optional_string_or_number, string_or_number, text_or_json, truthy,
};
use serde::Deserialize;
use serde_json::Value;

pub const DATA_PREFIX: &str = "data: ";

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Status(StatusPayload),
    /// Token fragment of the lesson in flight (wire kind `messages`).
    Token(String),
    Updates(UpdatesPayload),
    Progress(ProgressPayload),
    Values(ValuesPayload),
    Error(ErrorPayload),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusPayload {
    #[serde(default, deserialize_with = "nullable_string")]
    pub message: String,
    #[serde(default, deserialize_with = "truthy")]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdatesPayload {
    #[serde(default)]
    pub messages: Vec<UpdateMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdateMessage {
    #[serde(default, deserialize_with = "text_or_json")]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressPayload {
    pub outputs_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ValuesPayload {
    #[serde(default)]
    pub lesson_generated: Option<LessonGenerated>,
    #[serde(default)]
    pub formation_completed: Option<FormationCompleted>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LessonGenerated {
    #[serde(deserialize_with = "string_or_number")]
    pub lesson_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub lesson_title: String,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub progress: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FormationCompleted {
    pub total_lessons: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorPayload {
    #[serde(default, deserialize_with = "nullable_string")]
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EventParseError {
    #[error("malformed event JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown event kind '{0}'")]
    UnknownKind(String),
    #[error("invalid '{kind}' payload: {source}")]
    Payload {
        kind: String,
        source: serde_json::Error,
    },
}

impl StreamEvent {
    /// Parse the JSON text after the `data: ` prefix.
    pub fn from_json(json: &str) -> Result<Self, EventParseError> {
        let (kind, payload): (String, Value) = serde_json::from_str(json)?;
        Self::from_parts(&kind, payload)
    }

    pub fn from_parts(kind: &str, payload: Value) -> Result<Self, EventParseError> {
        let invalid = |source| EventParseError::Payload {
            kind: kind.to_string(),
            source,
        };
        match kind {
            "status" => serde_json::from_value(payload).map(Self::Status).map_err(invalid),
            "messages" => serde_json::from_value(payload).map(Self::Token).map_err(invalid),
            "updates" => serde_json::from_value(payload).map(Self::Updates).map_err(invalid),
            "progress" => serde_json::from_value(payload).map(Self::Progress).map_err(invalid),
            "values" => serde_json::from_value(payload).map(Self::Values).map_err(invalid),
            "error" => serde_json::from_value(payload).map(Self::Error).map_err(invalid),
            other => Err(EventParseError::UnknownKind(other.to_string())),
        }
    }

    /// Wire name of this event's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Status(_) => "status",
            StreamEvent::Token(_) => "messages",
            StreamEvent::Updates(_) => "updates",
            StreamEvent::Progress(_) => "progress",
            StreamEvent::Values(_) => "values",
            StreamEvent::Error(_) => "error",
        }
    }
}

/// Parse one framed line.
///
/// Returns `None` for lines that carry no event: anything without the
/// `data: ` prefix (comments, keepalives, blank separators) and data lines
/// with a blank payload.
pub fn parse_data_line(line: &str) -> Option<Result<StreamEvent, EventParseError>> {
    let json = line.strip_prefix(DATA_PREFIX)?;
    if json.trim().is_empty() {
        return None;
    }
    Some(StreamEvent::from_json(json))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> StreamEvent {
        parse_data_line(line).unwrap().unwrap()
    }

    #[test]
    fn token_event() {
        assert_eq!(
            parse(r#"data: ["messages","Hel"]"#),
            StreamEvent::Token("Hel".into())
        );
        assert_eq!(parse(r#"data: ["messages",""]"#), StreamEvent::Token(String::new()));
    }

    #[test]
    fn status_event_with_and_without_completion() {
        let StreamEvent::Status(status) = parse(r#"data: ["status",{"message":"Démarrage"}]"#)
        else {
            panic!("expected status");
        };
        assert_eq!(status.message, "Démarrage");
        assert!(!status.completed);

        let StreamEvent::Status(status) =
            parse(r#"data: ["status",{"message":"fini","completed":1}]"#)
        else {
            panic!("expected status");
        };
        assert!(status.completed);
    }

    #[test]
    fn updates_event_collects_contents() {
        let StreamEvent::Updates(updates) = parse(
            r#"data: ["updates",{"messages":[{"content":"a","type":"ai"},{"content":null}]}]"#,
        ) else {
            panic!("expected updates");
        };
        let contents: Vec<_> = updates.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["a", ""]);
    }

    #[test]
    fn values_event_variants() {
        let StreamEvent::Values(values) = parse(
            r#"data: ["values",{"lesson_generated":{"lesson_id":7,"lesson_title":"Ownership","progress":"1/3"}}]"#,
        ) else {
            panic!("expected values");
        };
        let lesson = values.lesson_generated.unwrap();
        assert_eq!(lesson.lesson_id, "7");
        assert_eq!(lesson.lesson_title, "Ownership");
        assert_eq!(lesson.progress, "1/3");
        assert!(values.formation_completed.is_none());

        let StreamEvent::Values(values) = parse(
            r#"data: ["values",{"formation_completed":{"total_lessons":12,"formation_id":4,"status":"completed"}}]"#,
        ) else {
            panic!("expected values");
        };
        assert_eq!(values.formation_completed.unwrap().total_lessons, 12);
    }

    #[test]
    fn values_event_with_unrelated_keys_is_empty() {
        let StreamEvent::Values(values) = parse(r#"data: ["values",{"current_index":2}]"#) else {
            panic!("expected values");
        };
        assert_eq!(values, ValuesPayload::default());
    }

    #[test]
    fn progress_and_error_events() {
        assert_eq!(
            parse(r#"data: ["progress",{"outputs_count":5}]"#),
            StreamEvent::Progress(ProgressPayload { outputs_count: 5 })
        );
        assert_eq!(
            parse(r#"data: ["error",{"message":"quota"}]"#),
            StreamEvent::Error(ErrorPayload {
                message: "quota".into()
            })
        );
    }

    #[test]
    fn non_data_lines_are_ignored() {
        assert!(parse_data_line("").is_none());
        assert!(parse_data_line(": keepalive").is_none());
        assert!(parse_data_line("event: messages").is_none());
        assert!(parse_data_line("data:[\"messages\",\"x\"]").is_none());
        assert!(parse_data_line("data:    ").is_none());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            parse_data_line("data: {not json"),
            Some(Err(EventParseError::Json(_)))
        ));
        assert!(matches!(
            parse_data_line(r#"data: ["messages"]"#),
            Some(Err(EventParseError::Json(_)))
        ));
    }

    #[test]
    fn unknown_kind_is_an_error() {
        assert!(matches!(
            parse_data_line(r#"data: ["debug",{}]"#),
            Some(Err(EventParseError::UnknownKind(kind))) if kind == "debug"
        ));
    }

    #[test]
    fn wrong_payload_shape_is_an_error() {
        let err = parse_data_line(r#"data: ["progress",{"outputs_count":"many"}]"#)
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, EventParseError::Payload { ref kind, .. } if kind == "progress"));
        assert!(err.to_string().starts_with("invalid 'progress' payload"));

        assert!(parse_data_line(r#"data: ["messages",{"text":"x"}]"#)
            .unwrap()
            .is_err());
    }

    #[test]
    fn kind_matches_wire_name() {
        assert_eq!(StreamEvent::Token(String::new()).kind(), "messages");
        assert_eq!(
            StreamEvent::Values(ValuesPayload::default()).kind(),
            "values"
        );
    }
}
