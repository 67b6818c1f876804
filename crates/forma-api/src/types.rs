//! Request and listing payloads for the REST endpoints.

use serde::{Deserialize, Serialize};

/// Entry of `GET /formations/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationSummary {
    pub id: u64,
    /// Formation title, named `nom` by the backend.
    pub nom: String,
}

/// Partial update for `PUT /modules/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

/// Partial update for `PUT /submodules/{id}` (lessons are "submodules"
/// on the backend).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LessonUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn module_update_omits_unset_fields() {
        let update = ModuleUpdate {
            index: Some(3),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"index": 3}));
    }

    #[test]
    fn lesson_update_uses_backend_names() {
        let update = LessonUpdate {
            titre: Some("Ownership".into()),
            description: Some("moves and copies".into()),
            index: None,
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"titre": "Ownership", "description": "moves and copies"})
        );
    }

    #[test]
    fn summary_parses_listing_entry() {
        let list: Vec<FormationSummary> =
            serde_json::from_value(json!([{"id": 3, "nom": "Rust", "extra": true}])).unwrap();
        assert_eq!(list[0].id, 3);
        assert_eq!(list[0].nom, "Rust");
    }
}
