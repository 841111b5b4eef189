//! The structured CV record produced by upstream extraction.
//!
//! Extraction output is best-effort: keys go missing, lists arrive as single
//! strings, numbers show up where text was expected. Every field here
//! therefore deserializes leniently and falls back to an empty default, so a
//! JSON object always yields a `CvRecord`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub job_title: String,
    #[serde(default, deserialize_with = "lenient_object")]
    pub contact: Contact,
    #[serde(default, deserialize_with = "lenient_string")]
    pub profile_summary: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub skills: Vec<SkillCategory>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub experience: Vec<Experience>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub projects: Vec<Project>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub education: Vec<Education>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub volunteering_and_leadership: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub linkedin: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub github: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub website: String,
}

impl Contact {
    /// Non-empty contact fields in display order.
    pub fn parts(&self) -> Vec<&str> {
        [
            &self.email,
            &self.phone,
            &self.location,
            &self.linkedin,
            &self.github,
            &self.website,
        ]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub responsibilities: Vec<String>,
}

impl Experience {
    /// "Title, Company", omitting whichever half is blank.
    pub fn heading(&self) -> String {
        join_non_empty(&[self.title.as_str(), self.company.as_str()], ", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub technologies: Vec<String>,
}

impl Project {
    /// "Name - Role", omitting whichever half is blank.
    pub fn heading(&self) -> String {
        join_non_empty(&[self.name.as_str(), self.role.as_str()], " - ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default, deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub institution: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
}

impl CvRecord {
    /// Download file name: the candidate name with spaces replaced by
    /// underscores, restricted to header-safe characters.
    pub fn pdf_file_name(&self) -> String {
        let stem: String = self
            .name
            .trim()
            .replace(' ', "_")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            .collect();
        let stem = if stem.is_empty() { "cv".to_string() } else { stem };
        format!("{stem}_CV.pdf")
    }
}

fn join_non_empty(parts: &[&str], sep: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient deserializers
// ────────────────────────────────────────────────────────────────────────────

/// List element types that can be built from a bare scalar.
trait FromScalar: Default {
    fn from_scalar(text: String) -> Self;
}

impl FromScalar for SkillCategory {
    fn from_scalar(text: String) -> Self {
        Self {
            items: vec![text],
            ..Self::default()
        }
    }
}

impl FromScalar for Experience {
    fn from_scalar(text: String) -> Self {
        Self {
            title: text,
            ..Self::default()
        }
    }
}

impl FromScalar for Project {
    fn from_scalar(text: String) -> Self {
        Self {
            name: text,
            ..Self::default()
        }
    }
}

impl FromScalar for Education {
    fn from_scalar(text: String) -> Self {
        Self {
            degree: text,
            ..Self::default()
        }
    }
}

impl FromScalar for Reference {
    fn from_scalar(text: String) -> Self {
        Self {
            name: text,
            ..Self::default()
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Joins the scalar values of an object in key order,
/// e.g. `{"role": "Mentor", "org": "CodeClub"}` → "CodeClub, Mentor".
fn flatten_object(value: &Value) -> String {
    match value {
        Value::Object(map) => map
            .values()
            .map(scalar_text)
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_text(other),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value))
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    };
    Ok(items
        .iter()
        .map(flatten_object)
        .filter(|s| !s.trim().is_empty())
        .collect())
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
        _ => T::default(),
    })
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + FromScalar,
{
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    };
    Ok(items.into_iter().filter_map(lenient_element).collect())
}

fn lenient_element<T>(value: Value) -> Option<T>
where
    T: DeserializeOwned + FromScalar,
{
    match value {
        Value::Null => None,
        Value::Object(_) => Some(serde_json::from_value(value).unwrap_or_default()),
        Value::Array(_) => Some(T::default()),
        scalar => Some(T::from_scalar(scalar_text(&scalar))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_yields_defaults() {
        let cv: CvRecord = serde_json::from_value(json!({})).unwrap();
        assert_eq!(cv, CvRecord::default());
    }

    #[test]
    fn test_full_record_parses() {
        let cv: CvRecord = serde_json::from_value(json!({
            "name": "Jane Doe",
            "job_title": "Data Engineer",
            "contact": {"email": "jane@example.com", "phone": "+44 20 7946 0000"},
            "profile_summary": "Builds pipelines.",
            "skills": [{"category": "Languages", "items": ["Rust", "SQL"]}],
            "experience": [{
                "title": "Engineer",
                "company": "Acme",
                "duration": "2020 - 2024",
                "responsibilities": ["Built things"]
            }],
            "projects": [{"name": "Ledger", "role": "Lead", "description": "d", "technologies": ["Kafka"]}],
            "education": [{"degree": "BSc", "institution": "UCL", "duration": "2016 - 2019", "details": "First"}],
            "volunteering_and_leadership": ["Mentor"],
            "references": [{"name": "Bob", "title": "CTO", "phone": "1", "email": "b@x.io"}]
        }))
        .unwrap();
        assert_eq!(cv.name, "Jane Doe");
        assert_eq!(cv.skills[0].items, vec!["Rust", "SQL"]);
        assert_eq!(cv.experience[0].heading(), "Engineer, Acme");
        assert_eq!(cv.projects[0].heading(), "Ledger - Lead");
        assert_eq!(cv.references[0].email, "b@x.io");
    }

    #[test]
    fn test_malformed_fields_fall_back() {
        let cv: CvRecord = serde_json::from_value(json!({
            "name": null,
            "job_title": 42,
            "contact": "jane@example.com",
            "profile_summary": ["not", "a", "string"],
            "skills": ["Rust", {"category": "Cloud", "items": "AWS"}],
            "experience": {"title": "Solo entry", "responsibilities": "Single duty"},
            "projects": null,
            "education": [null, "MSc Physics"],
            "volunteering_and_leadership": [{"role": "Mentor", "org": "CodeClub"}, 7, null, ""],
            "references": "Available on request"
        }))
        .unwrap();

        assert_eq!(cv.name, "");
        assert_eq!(cv.job_title, "42");
        assert_eq!(cv.contact, Contact::default());
        assert_eq!(cv.profile_summary, "");
        assert_eq!(cv.skills.len(), 2);
        assert_eq!(cv.skills[0].items, vec!["Rust"]);
        assert_eq!(cv.skills[1].items, vec!["AWS"]);
        assert_eq!(cv.experience.len(), 1);
        assert_eq!(cv.experience[0].responsibilities, vec!["Single duty"]);
        assert!(cv.projects.is_empty());
        assert_eq!(cv.education.len(), 1);
        assert_eq!(cv.education[0].degree, "MSc Physics");
        assert_eq!(
            cv.volunteering_and_leadership,
            vec!["CodeClub, Mentor", "7"]
        );
        assert_eq!(cv.references[0].name, "Available on request");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let cv: CvRecord =
            serde_json::from_value(json!({"name": "A", "personal_info": {"x": 1}})).unwrap();
        assert_eq!(cv.name, "A");
    }

    #[test]
    fn test_contact_parts_skip_blank_fields() {
        let contact = Contact {
            email: "a@b.c".into(),
            phone: "  ".into(),
            location: "Leeds".into(),
            github: "github.com/a".into(),
            ..Contact::default()
        };
        assert_eq!(contact.parts(), vec!["a@b.c", "Leeds", "github.com/a"]);
    }

    #[test]
    fn test_heading_omits_blank_half() {
        let exp = Experience {
            title: "Engineer".into(),
            ..Experience::default()
        };
        assert_eq!(exp.heading(), "Engineer");
    }

    #[test]
    fn test_pdf_file_name() {
        let mut cv = CvRecord {
            name: "Jane Q Doe".into(),
            ..CvRecord::default()
        };
        assert_eq!(cv.pdf_file_name(), "Jane_Q_Doe_CV.pdf");
        cv.name = "  ".into();
        assert_eq!(cv.pdf_file_name(), "cv_CV.pdf");
        cv.name = "Zoë \"x\"".into();
        assert_eq!(cv.pdf_file_name(), "Zo_x_CV.pdf");
    }
}
