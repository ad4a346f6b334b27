//! Shared type definitions for the Lectern course client.
//!
//! The entities here mirror the JSON returned by the course content API.
//! They are read-only from the client's point of view: the server owns
//! courses, modules, lectures, assignments and the per-user unlock state.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

pub mod step;

pub use step::{Section, Step, StepKind};

/// Identifier of a module, lecture or assignment.
///
/// The API is not consistent about identifier types: some tables use
/// serial integers and others use text codes. Both are accepted and kept
/// as their textual form so comparisons are uniform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ContentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for ContentId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Signed(number) => Self(number.to_string()),
            RawId::Unsigned(number) => Self(number.to_string()),
        })
    }
}

/// A course as returned by `GET /courses/{courseId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Course code, also used as the course identifier (e.g. `CS101`)
    pub course_code: String,
    pub course_title: String,
    #[serde(default)]
    pub course_description: Option<String>,
    #[serde(default)]
    pub credits: Option<u32>,
}

/// Module metadata from `GET /courses/{courseId}/modules`, without content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub id: ContentId,
    /// Position of the module within its course (1-based in practice)
    #[serde(default)]
    pub module_sequence: Option<u32>,
    pub module_title: String,
    #[serde(default)]
    pub module_description: Option<String>,
}

/// A lecture belonging to a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lecture {
    pub lecture_id: ContentId,
    pub lecture_title: String,
    #[serde(default)]
    pub sequence_number: i64,
    #[serde(default)]
    pub video_link: Option<String>,
}

impl Lecture {
    /// Video link rewritten into its embeddable form.
    ///
    /// YouTube watch and short links are converted to `/embed/` links; any
    /// other link is returned unchanged.
    pub fn embed_url(&self) -> Option<String> {
        let link = self.video_link.as_deref()?;
        if link.contains("youtube.com/watch?v=") {
            Some(link.replacen("watch?v=", "embed/", 1))
        } else if link.contains("youtu.be/") {
            Some(link.replacen("youtu.be/", "www.youtube.com/embed/", 1))
        } else {
            Some(link.to_string())
        }
    }
}

/// An auto-graded assignment belonging to a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub assignment_id: ContentId,
    pub assignment_title: String,
    #[serde(default)]
    pub sequence_number: i64,
    #[serde(default, deserialize_with = "deserialize_optional_score")]
    pub max_score: Option<f64>,
}

/// One entry of `GET /courses/{courseId}/modules/progress/{userId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockStatus {
    pub module_id: ContentId,
    pub unlocked: bool,
}

/// A module together with its sorted content and resolved unlock flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(flatten)]
    pub summary: ModuleSummary,
    pub lectures: Vec<Lecture>,
    pub assignments: Vec<Assignment>,
    pub unlocked: bool,
}

impl Module {
    /// Combine module metadata with its content.
    ///
    /// Lectures and assignments are sorted ascending by `sequence_number`;
    /// the sort is stable so equal sequence numbers keep server order.
    pub fn enrich(summary: ModuleSummary, mut lectures: Vec<Lecture>, mut assignments: Vec<Assignment>, unlocked: bool) -> Self {
        lectures.sort_by_key(|lecture| lecture.sequence_number);
        assignments.sort_by_key(|assignment| assignment.sequence_number);
        Self {
            summary,
            lectures,
            assignments,
            unlocked,
        }
    }

    /// A module with no content attached yet.
    pub fn without_content(summary: ModuleSummary, unlocked: bool) -> Self {
        Self::enrich(summary, Vec::new(), Vec::new(), unlocked)
    }

    pub fn id(&self) -> &ContentId {
        &self.summary.id
    }

    pub fn title(&self) -> &str {
        &self.summary.module_title
    }

    pub fn has_lecture(&self, lecture_id: &ContentId) -> bool {
        self.lectures.iter().any(|lecture| &lecture.lecture_id == lecture_id)
    }

    pub fn has_assignment(&self, assignment_id: &ContentId) -> bool {
        self.assignments.iter().any(|assignment| &assignment.assignment_id == assignment_id)
    }
}

/// A graded submission from `GET /api/grades/{userId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    #[serde(default)]
    pub assignment_id: Option<ContentId>,
    pub assignment_title: String,
    pub course_code: String,
    #[serde(deserialize_with = "deserialize_score")]
    pub score: f64,
    #[serde(deserialize_with = "deserialize_score")]
    pub max_score: f64,
}

impl Grade {
    /// Whether the score clears the passing threshold used by the grades view.
    pub fn is_passing(&self) -> bool {
        self.score >= 80.0
    }
}

/// Scores are stored as NUMERIC and may be serialized either as JSON
/// numbers or as decimal strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawScore {
    Number(f64),
    Text(String),
}

impl RawScore {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            RawScore::Number(number) => Ok(number),
            RawScore::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("invalid score '{text}'"))),
        }
    }
}

fn deserialize_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    RawScore::deserialize(deserializer)?.into_f64()
}

fn deserialize_optional_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawScore>::deserialize(deserializer)?
        .map(RawScore::into_f64)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary(id: i64) -> ModuleSummary {
        ModuleSummary {
            id: ContentId::from(id),
            module_sequence: Some(id as u32),
            module_title: format!("Module {id}"),
            module_description: None,
        }
    }

    #[test]
    fn content_id_accepts_numbers_and_strings() {
        let numeric: ContentId = serde_json::from_value(json!(42)).unwrap();
        let textual: ContentId = serde_json::from_value(json!("42")).unwrap();
        assert_eq!(numeric, textual);
        assert_eq!(numeric.as_str(), "42");
    }

    #[test]
    fn module_summary_ignores_unknown_fields() {
        let module: ModuleSummary = serde_json::from_value(json!({
            "id": 3,
            "course_code": "CS101",
            "module_sequence": 3,
            "module_title": "Loops",
            "module_description": null
        }))
        .unwrap();
        assert_eq!(module.id, ContentId::from(3));
        assert_eq!(module.module_sequence, Some(3));
        assert!(module.module_description.is_none());
    }

    #[test]
    fn enrich_sorts_content_by_sequence_number() {
        let lectures = vec![
            Lecture {
                lecture_id: "L2".into(),
                lecture_title: "Second".into(),
                sequence_number: 2,
                video_link: None,
            },
            Lecture {
                lecture_id: "L1".into(),
                lecture_title: "First".into(),
                sequence_number: 1,
                video_link: None,
            },
        ];
        let assignments = vec![
            Assignment {
                assignment_id: "A9".into(),
                assignment_title: "Late".into(),
                sequence_number: 9,
                max_score: None,
            },
            Assignment {
                assignment_id: "A3".into(),
                assignment_title: "Early".into(),
                sequence_number: 3,
                max_score: Some(10.0),
            },
        ];

        let module = Module::enrich(summary(1), lectures, assignments, true);
        let lecture_ids: Vec<&str> = module.lectures.iter().map(|l| l.lecture_id.as_str()).collect();
        let assignment_ids: Vec<&str> = module.assignments.iter().map(|a| a.assignment_id.as_str()).collect();
        assert_eq!(lecture_ids, vec!["L1", "L2"]);
        assert_eq!(assignment_ids, vec!["A3", "A9"]);
        assert!(module.has_assignment(&"A9".into()));
        assert!(!module.has_lecture(&"A9".into()));
    }

    #[test]
    fn enriched_module_serializes_flat() {
        let module = Module::without_content(summary(7), false);
        let value = serde_json::to_value(&module).unwrap();
        assert_eq!(value["id"], json!("7"));
        assert_eq!(value["module_title"], json!("Module 7"));
        assert_eq!(value["unlocked"], json!(false));
    }

    #[test]
    fn embed_url_rewrites_youtube_links() {
        let mut lecture = Lecture {
            lecture_id: "L1".into(),
            lecture_title: "Intro".into(),
            sequence_number: 1,
            video_link: Some("https://www.youtube.com/watch?v=abc123".into()),
        };
        assert_eq!(lecture.embed_url().as_deref(), Some("https://www.youtube.com/embed/abc123"));

        lecture.video_link = Some("https://youtu.be/abc123".into());
        assert_eq!(lecture.embed_url().as_deref(), Some("https://www.youtube.com/embed/abc123"));

        lecture.video_link = Some("https://cdn.example.com/intro.mp4".into());
        assert_eq!(lecture.embed_url().as_deref(), Some("https://cdn.example.com/intro.mp4"));

        lecture.video_link = None;
        assert!(lecture.embed_url().is_none());
    }

    #[test]
    fn grade_scores_accept_decimal_strings() {
        let grade: Grade = serde_json::from_value(json!({
            "assignment_title": "Quiz 1",
            "course_code": "CS101",
            "score": "85.50",
            "max_score": 100
        }))
        .unwrap();
        assert_eq!(grade.score, 85.5);
        assert_eq!(grade.max_score, 100.0);
        assert!(grade.is_passing());
        assert!(grade.assignment_id.is_none());
    }

    #[test]
    fn assignment_max_score_is_optional() {
        let assignment: Assignment = serde_json::from_value(json!({
            "assignment_id": 12,
            "assignment_title": "Lab",
            "sequence_number": 1
        }))
        .unwrap();
        assert!(assignment.max_score.is_none());

        let scored: Assignment = serde_json::from_value(json!({
            "assignment_id": 12,
            "assignment_title": "Lab",
            "sequence_number": 1,
            "max_score": "20"
        }))
        .unwrap();
        assert_eq!(scored.max_score, Some(20.0));
    }
}
