use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MetadataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Semester {
    #[serde(rename = "I")]
    First,
    #[serde(rename = "II")]
    Second,
}

impl Semester {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "I" => Some(Semester::First),
            "II" => Some(Semester::Second),
            _ => None,
        }
    }
}

/// Contents of a course's `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseMetadata {
    pub title: String,
    pub code: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_playlist_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moodle_course_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moodle_forum_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moodle_assignments_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departments: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<Semester>,
    /// Keys this service does not interpret, echoed back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const KNOWN_KEYS: &[&str] = &[
    "title",
    "code",
    "description",
    "instructor",
    "youtubePlaylistId",
    "moodleCourseUrl",
    "moodleForumUrl",
    "moodleAssignmentsUrl",
    "departments",
    "level",
    "credits",
    "semester",
];

impl CourseMetadata {
    pub fn new(title: impl Into<String>, code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            code: code.into(),
            description: description.into(),
            instructor: None,
            youtube_playlist_id: None,
            moodle_course_url: None,
            moodle_forum_url: None,
            moodle_assignments_url: None,
            departments: None,
            level: None,
            credits: None,
            semester: None,
            extra: Map::new(),
        }
    }

    /// Parses a metadata document. Required fields must be non-empty strings;
    /// optional fields of the wrong type are dropped rather than rejected.
    pub fn from_json(text: &str) -> Result<Self, MetadataError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| MetadataError::InvalidJson(e.to_string()))?;
        let Value::Object(mut object) = value else {
            return Err(MetadataError::NotAnObject);
        };

        let title = required_text(&object, "title")?;
        let code = required_text(&object, "code")?;
        let description = required_text(&object, "description")?;

        let departments = object.get("departments").and_then(|v| v.as_array()).map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        });

        let metadata = Self {
            title,
            code,
            description,
            instructor: optional_text(&object, "instructor"),
            youtube_playlist_id: optional_text(&object, "youtubePlaylistId"),
            moodle_course_url: optional_text(&object, "moodleCourseUrl"),
            moodle_forum_url: optional_text(&object, "moodleForumUrl"),
            moodle_assignments_url: optional_text(&object, "moodleAssignmentsUrl"),
            departments,
            level: optional_count(&object, "level"),
            credits: optional_count(&object, "credits"),
            semester: object
                .get("semester")
                .and_then(|v| v.as_str())
                .and_then(Semester::parse),
            extra: Map::new(),
        };

        // The directory name is the slug; a `slug` key in the document never overrides it.
        object.retain(|key, _| key != "slug" && !KNOWN_KEYS.contains(&key.as_str()));
        Ok(Self { extra: object, ..metadata })
    }

    pub fn has_department(&self, department: &str) -> bool {
        self.departments
            .as_ref()
            .is_some_and(|depts| depts.iter().any(|d| d == department))
    }
}

fn required_text(object: &Map<String, Value>, key: &'static str) -> Result<String, MetadataError> {
    object
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .ok_or(MetadataError::MissingField(key))
}

fn optional_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn optional_count(object: &Map<String, Value>, key: &str) -> Option<u32> {
    object
        .get(key)
        .and_then(|v| v.as_u64())
        .and_then(|n| u32::try_from(n).ok())
}

/// One catalog entry. Serialized flat: `{ "slug": ..., "title": ..., ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub slug: String,
    #[serde(flatten)]
    pub metadata: CourseMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseFile {
    pub name: String,
    /// Direct download reference, absent when the store offers none.
    pub url: Option<String>,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDetails {
    pub metadata: CourseMetadata,
    pub files: Vec<CourseFile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_full_document() {
        let text = r#"{
            "title": "Data Structures",
            "code": "CS201",
            "description": "Lists, trees and graphs",
            "instructor": "Dr. Ada",
            "youtubePlaylistId": "PL123",
            "departments": ["CS", "EE"],
            "level": 200,
            "credits": 3,
            "semester": "II",
            "syllabus": "week 1: arrays"
        }"#;

        let metadata = CourseMetadata::from_json(text).unwrap();
        assert_eq!(metadata.code, "CS201");
        assert_eq!(metadata.instructor.as_deref(), Some("Dr. Ada"));
        assert_eq!(metadata.youtube_playlist_id.as_deref(), Some("PL123"));
        assert_eq!(metadata.departments, Some(vec!["CS".to_string(), "EE".to_string()]));
        assert_eq!(metadata.level, Some(200));
        assert_eq!(metadata.credits, Some(3));
        assert_eq!(metadata.semester, Some(Semester::Second));
        assert_eq!(metadata.extra.get("syllabus"), Some(&Value::from("week 1: arrays")));
        assert!(metadata.has_department("EE"));
        assert!(!metadata.has_department("ME"));
    }

    #[test]
    fn rejects_missing_or_blank_required_fields() {
        assert_eq!(
            CourseMetadata::from_json(r#"{"title": "T", "code": "C"}"#),
            Err(MetadataError::MissingField("description"))
        );
        assert_eq!(
            CourseMetadata::from_json(r#"{"title": "  ", "code": "C", "description": "D"}"#),
            Err(MetadataError::MissingField("title"))
        );
        assert_eq!(
            CourseMetadata::from_json(r#"{"title": "T", "code": 101, "description": "D"}"#),
            Err(MetadataError::MissingField("code"))
        );
    }

    #[test]
    fn rejects_non_objects_and_bad_json() {
        assert_eq!(CourseMetadata::from_json("[1, 2]"), Err(MetadataError::NotAnObject));
        assert!(matches!(
            CourseMetadata::from_json("{ not json"),
            Err(MetadataError::InvalidJson(_))
        ));
    }

    #[test]
    fn drops_wrong_typed_optional_fields() {
        let text = r#"{
            "title": "T", "code": "C", "description": "D",
            "level": "200", "credits": -1, "semester": "III",
            "departments": ["CS", 7, null],
            "slug": "someone-elses-course"
        }"#;

        let metadata = CourseMetadata::from_json(text).unwrap();
        assert_eq!(metadata.level, None);
        assert_eq!(metadata.credits, None);
        assert_eq!(metadata.semester, None);
        assert_eq!(metadata.departments, Some(vec!["CS".to_string()]));
        assert!(metadata.extra.is_empty());
    }

    #[test]
    fn course_serializes_flat_with_camel_case_keys() {
        let mut metadata = CourseMetadata::new("Signals", "EE301", "Fourier and friends");
        metadata.moodle_forum_url = Some("https://moodle.example/forum".to_string());
        metadata.semester = Some(Semester::First);
        let course = Course { slug: "ee301".to_string(), metadata };

        let json = serde_json::to_value(&course).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "slug": "ee301",
                "title": "Signals",
                "code": "EE301",
                "description": "Fourier and friends",
                "moodleForumUrl": "https://moodle.example/forum",
                "semester": "I"
            })
        );
    }
}
