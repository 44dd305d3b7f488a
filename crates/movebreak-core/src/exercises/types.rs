use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend identifier of an exercise. Opaque to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(pub u64);

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Backend identifier of the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single exercise suggestion as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    pub name: String,
    /// Animated demonstration. Served as `gifUrl`.
    #[serde(rename = "gifUrl", alias = "image_url")]
    pub image_url: String,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Response body of the exercise listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseBatch {
    pub exercises: Vec<Exercise>,
    /// `false` when nothing matched the user's filters and the backend fell
    /// back to its default list.
    #[serde(rename = "exercises_found", default = "default_true")]
    pub exercises_found: bool,
}

fn default_true() -> bool {
    true
}

/// Equipment/target preferences forwarded to the backend on fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterContext {
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub targets: Vec<String>,
}

impl FilterContext {
    pub fn is_empty(&self) -> bool {
        self.equipment.is_empty() && self.targets.is_empty()
    }

    /// Query pairs in the order the backend expects them.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        self.equipment
            .iter()
            .map(|e| ("equipment", e.as_str()))
            .chain(self.targets.iter().map(|t| ("target", t.as_str())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exercise_parses_backend_payload() {
        let json = r#"{
            "id": 7,
            "name": "chin-up",
            "gifUrl": "https://cdn.example/chin-up.gif",
            "instructions": ["Grab the bar", "Pull up"]
        }"#;
        let exercise: Exercise = serde_json::from_str(json).unwrap();
        assert_eq!(exercise.id, ExerciseId(7));
        assert_eq!(exercise.image_url, "https://cdn.example/chin-up.gif");
        assert_eq!(exercise.instructions.len(), 2);
        assert!(exercise.equipment.is_none());
    }

    #[test]
    fn batch_defaults_exercises_found_to_true() {
        let batch: ExerciseBatch = serde_json::from_str(r#"{"exercises": []}"#).unwrap();
        assert!(batch.exercises_found);
    }

    #[test]
    fn filter_query_pairs_list_equipment_then_targets() {
        let filter = FilterContext {
            equipment: vec!["dumbbell".into(), "body weight".into()],
            targets: vec!["biceps".into()],
        };
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("equipment", "dumbbell"),
                ("equipment", "body weight"),
                ("target", "biceps"),
            ]
        );
        assert!(!filter.is_empty());
        assert!(FilterContext::default().is_empty());
    }
}
