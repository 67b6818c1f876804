//! Quiz placeholder lessons.
//!
//! The admin view shows one quiz entry at the end of every module. Quizzes
//! are stored separately on the backend, so these entries are injected for
//! display and filtered out again before a formation is sent back.

use forma_common::{Formation, Lesson, LessonKind};

const QUIZ_ID_PREFIX: &str = "quiz_";

/// Append a quiz lesson to the end of every module.
pub fn inject_quiz_lessons(mut formation: Formation) -> Formation {
    for module in &mut formation.modules {
        module.lessons.push(Lesson {
            id: format!("{QUIZ_ID_PREFIX}{}", module.id),
            title: format!("Quiz - {}", module.title),
            description: Some(format!(
                "Quiz de validation pour le module {}",
                module.title
            )),
            content: Some(String::new()),
            kind: LessonKind::Quiz,
            module_id: Some(module.id.clone()),
        });
    }
    formation
}

/// Drop every quiz lesson, keeping only real lessons.
pub fn filter_quiz_lessons(mut formation: Formation) -> Formation {
    for module in &mut formation.modules {
        module.lessons.retain(|lesson| lesson.kind != LessonKind::Quiz);
    }
    formation
}

pub fn is_quiz_lesson(lesson: &Lesson) -> bool {
    lesson.kind == LessonKind::Quiz || lesson.id.starts_with(QUIZ_ID_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forma_common::Module;

    fn lesson(id: &str) -> Lesson {
        Lesson {
            id: id.into(),
            title: format!("Lesson {id}"),
            description: None,
            content: None,
            kind: LessonKind::Lesson,
            module_id: None,
        }
    }

    fn formation() -> Formation {
        Formation {
            title: "Rust".into(),
            has_content: false,
            modules: vec![
                Module {
                    id: "module_1".into(),
                    title: "Basics".into(),
                    lessons: vec![lesson("lesson_1"), lesson("lesson_2")],
                },
                Module {
                    id: "module_2".into(),
                    title: "Async".into(),
                    lessons: vec![],
                },
            ],
        }
    }

    #[test]
    fn injects_one_quiz_per_module_at_the_end() {
        let with_quiz = inject_quiz_lessons(formation());
        let basics = &with_quiz.modules[0].lessons;
        assert_eq!(basics.len(), 3);
        let quiz = basics.last().unwrap();
        assert_eq!(quiz.id, "quiz_module_1");
        assert_eq!(quiz.title, "Quiz - Basics");
        assert_eq!(
            quiz.description.as_deref(),
            Some("Quiz de validation pour le module Basics")
        );
        assert_eq!(quiz.module_id.as_deref(), Some("module_1"));
        assert!(is_quiz_lesson(quiz));

        assert_eq!(with_quiz.modules[1].lessons.len(), 1);
    }

    #[test]
    fn filter_undoes_injection() {
        let original = formation();
        let restored = filter_quiz_lessons(inject_quiz_lessons(original.clone()));
        assert_eq!(restored, original);
    }

    #[test]
    fn quiz_detected_by_id_prefix() {
        assert!(is_quiz_lesson(&lesson("quiz_12")));
        assert!(!is_quiz_lesson(&lesson("lesson_12")));
    }

    #[test]
    fn injected_quiz_serializes_with_type_and_module_id() {
        let with_quiz = inject_quiz_lessons(formation());
        let json = serde_json::to_value(&with_quiz.modules[0].lessons[2]).unwrap();
        assert_eq!(json["type"], "quiz");
        assert_eq!(json["moduleId"], "module_1");
    }
}
