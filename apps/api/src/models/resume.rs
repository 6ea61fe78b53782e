use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One work-experience block as returned by the extraction service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperience {
    #[serde(deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(deserialize_with = "lenient_string")]
    pub position: String,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: String,
    #[serde(deserialize_with = "lenient_string_list")]
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string_list")]
    pub description: Vec<String>,
}

/// The structured record extracted from one CV.
///
/// Every list field is always present and never null: the extraction service
/// is lenient about what it returns, so deserialization coerces missing,
/// null, and wrongly-typed fields to their empty defaults. Downstream stages
/// (normalization, export) rely on this and never branch on field presence.
///
/// `ParsedResume::default()` is the all-empty record used for documents that
/// could not be extracted or parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParsedResume {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_string")]
    pub github: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub university: String,
    #[serde(deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(deserialize_with = "lenient_string")]
    pub gpa: String,
    #[serde(deserialize_with = "lenient_string")]
    pub graduation_year: String,
    #[serde(deserialize_with = "lenient_string")]
    pub total_experience_years: String,
    pub work_experiences: Vec<WorkExperience>,
    pub projects: Vec<Project>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub certifications: Vec<String>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub designations: Vec<String>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub languages: Vec<String>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub awards: Vec<String>,
}

impl ParsedResume {
    /// A record is considered usable when it carries at least a name.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Response envelope for the upload-and-parse endpoint.
#[derive(Debug, Serialize)]
pub struct ParseListResponse {
    pub success: bool,
    pub data: Vec<ParsedResume>,
    pub message: String,
}

/// Export format accepted by the save-list and export endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Excel,
}

/// Handoff shape for persisting a parsed CV list. Persistence itself lives
/// in the core platform; this service only validates and forwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCvListRequest {
    pub name: String,
    pub format: ExportFormat,
    pub cvs: Vec<ParsedResume>,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedListReceipt {
    pub id: String,
}

/// Accepts a string, coercing null and scalar values (a numeric GPA, say)
/// instead of failing the whole record.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Accepts a list of strings; anything else (null, a bare string, an object)
/// coerces to the empty list.
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_all_empty() {
        let record = ParsedResume::default();
        assert!(record.name.is_empty());
        assert!(record.skills.is_empty());
        assert!(record.work_experiences.is_empty());
        assert!(!record.has_name());
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let record: ParsedResume = serde_json::from_str(r#"{"name": "Alice"}"#).unwrap();
        assert_eq!(record.name, "Alice");
        assert!(record.skills.is_empty());
        assert!(record.projects.is_empty());
    }

    #[test]
    fn test_null_list_coerces_to_empty() {
        let record: ParsedResume =
            serde_json::from_str(r#"{"name": "Bob", "skills": null}"#).unwrap();
        assert!(record.skills.is_empty());
    }

    #[test]
    fn test_non_list_description_coerces_to_empty() {
        let json = r#"{"workExperiences": [{"company": "Acme", "description": "not a list"}]}"#;
        let record: ParsedResume = serde_json::from_str(json).unwrap();
        assert_eq!(record.work_experiences[0].company, "Acme");
        assert!(record.work_experiences[0].description.is_empty());
    }

    #[test]
    fn test_numeric_gpa_coerces_to_string() {
        let record: ParsedResume = serde_json::from_str(r#"{"gpa": 3.6}"#).unwrap();
        assert_eq!(record.gpa, "3.6");
    }

    #[test]
    fn test_camel_case_wire_names() {
        let record: ParsedResume =
            serde_json::from_str(r#"{"graduationYear": "2023", "totalExperienceYears": "2"}"#)
                .unwrap();
        assert_eq!(record.graduation_year, "2023");
        assert_eq!(record.total_experience_years, "2");
    }
}
