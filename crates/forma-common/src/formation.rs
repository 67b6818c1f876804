//! Formation (course) tree shared by the REST client and the streaming core.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::json::string_or_number;
use crate::FormaError;

/// A course: ordered modules, each with ordered lessons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formation {
    pub title: String,
    #[serde(default)]
    pub has_content: bool,
    #[serde(default)]
    pub modules: Vec<Module>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    #[default]
    Lesson,
    Quiz,
}

impl LessonKind {
    fn is_lesson(&self) -> bool {
        *self == LessonKind::Lesson
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Generated HTML body.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "LessonKind::is_lesson")]
    pub kind: LessonKind,
    #[serde(default, rename = "moduleId", skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
}

impl Formation {
    /// Total number of lessons across all modules.
    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    /// Lessons that have a non-empty generated body.
    pub fn lessons_with_content(&self) -> usize {
        self.modules
            .iter()
            .flat_map(|m| &m.lessons)
            .filter(|l| l.content.as_deref().is_some_and(|c| !c.trim().is_empty()))
            .count()
    }

    pub fn find_lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.modules
            .iter()
            .flat_map(|m| &m.lessons)
            .find(|l| l.id == lesson_id)
    }
}

/// Authoritative read of a formation, used to reconcile after generation.
#[async_trait]
pub trait FormationSource: Send + Sync {
    async fn fetch_formation(&self, formation_id: &str) -> Result<Formation, FormaError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Formation {
        serde_json::from_value(json!({
            "title": "Rust",
            "has_content": true,
            "modules": [
                {"id": "module_1", "title": "Basics", "lessons": [
                    {"id": "lesson_1", "title": "Ownership", "description": "moves", "content": "<p>x</p>"},
                    {"id": 2, "title": "Borrowing", "description": null, "content": null}
                ]},
                {"id": 9, "title": "Async", "lessons": [
                    {"id": "lesson_3", "title": "Futures", "description": "", "content": "  "}
                ]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn deserializes_rest_shape() {
        let f = sample();
        assert_eq!(f.title, "Rust");
        assert!(f.has_content);
        assert_eq!(f.modules[1].id, "9");
        assert_eq!(f.modules[0].lessons[1].id, "2");
        assert_eq!(f.modules[0].lessons[1].description, None);
        assert_eq!(f.modules[0].lessons[0].kind, LessonKind::Lesson);
    }

    #[test]
    fn has_content_defaults_to_false() {
        let f: Formation = serde_json::from_value(json!({"title": "t", "modules": []})).unwrap();
        assert!(!f.has_content);
    }

    #[test]
    fn counts_lessons_and_content() {
        let f = sample();
        assert_eq!(f.lesson_count(), 3);
        assert_eq!(f.lessons_with_content(), 1);
    }

    #[test]
    fn find_lesson_by_id() {
        let f = sample();
        assert_eq!(f.find_lesson("lesson_3").unwrap().title, "Futures");
        assert!(f.find_lesson("lesson_404").is_none());
    }

    #[test]
    fn plain_lesson_omits_type_when_serialized() {
        let f = sample();
        let json = serde_json::to_value(&f.modules[0].lessons[0]).unwrap();
        assert!(json.get("type").is_none());
        assert!(json.get("moduleId").is_none());
    }
}
