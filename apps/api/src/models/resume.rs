use serde::{Deserialize, Deserializer, Serialize};

/// Who the resume is written for. Drives prompt wording and section order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Fresher,
    #[default]
    Experienced,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Fresher => "fresher",
            UserType::Experienced => "experienced",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub degree: String,
    pub school: String,
    pub year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cgpa: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperience {
    pub role: String,
    pub company: String,
    /// Free-text label such as "Jan 2021 - Present". Never parsed as a date.
    pub year: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    pub category: String,
    #[serde(rename = "list", alias = "items", deserialize_with = "null_as_default")]
    pub items: Vec<String>,
}

/// A structured resume. Every transformation step produces a new value.
///
/// List fields are never null: a missing or `null` list deserializes to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub linkedin: String,
    pub github: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
    #[serde(deserialize_with = "null_as_default")]
    pub work_experience: Vec<WorkExperience>,
    #[serde(deserialize_with = "null_as_default")]
    pub projects: Vec<Project>,
    #[serde(deserialize_with = "null_as_default")]
    pub skills: Vec<Skill>,
    #[serde(deserialize_with = "certification_strings")]
    pub certifications: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub achievements: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub extra_curricular_activities: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub languages_known: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_details: Option<String>,
}

impl ResumeDocument {
    /// A document with only the required name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Returns a copy with `projects` replaced.
    pub fn with_projects(&self, projects: Vec<Project>) -> Self {
        Self {
            projects,
            ..self.clone()
        }
    }

    /// All bullets across work experience and projects, in document order.
    pub fn all_bullets(&self) -> impl Iterator<Item = &str> {
        self.work_experience
            .iter()
            .flat_map(|w| w.bullets.iter())
            .chain(self.projects.iter().flat_map(|p| p.bullets.iter()))
            .map(String::as_str)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Certifications come back from the model either as plain strings or as
/// small objects; both collapse to a display string. Anything else (`null`,
/// numbers, booleans, nested lists) carries no certification and is dropped.
#[derive(Deserialize)]
#[serde(untagged)]
enum CertificationValue {
    Text(String),
    Object {
        title: Option<String>,
        issuer: Option<String>,
        description: Option<String>,
        name: Option<String>,
    },
    Other(serde::de::IgnoredAny),
}

impl CertificationValue {
    fn into_display(self) -> String {
        match self {
            CertificationValue::Text(text) => text,
            CertificationValue::Object {
                title,
                issuer,
                description,
                name,
            } => match (title, issuer, description, name) {
                (Some(t), Some(i), _, _) => format!("{t} - {i}"),
                (Some(t), None, Some(d), _) => format!("{t} - {d}"),
                (_, _, _, Some(n)) => n,
                (Some(t), _, _, _) => t,
                (None, _, Some(d), None) => d,
                _ => String::new(),
            },
            CertificationValue::Other(_) => String::new(),
        }
    }
}

fn certification_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Option<Vec<CertificationValue>> = Option::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .map(CertificationValue::into_display)
        .filter(|s| !s.trim().is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_lists_deserialize_to_empty() {
        let doc: ResumeDocument = serde_json::from_value(json!({
            "name": "Ada Lovelace",
            "workExperience": null,
            "projects": null,
            "certifications": null
        }))
        .unwrap();

        assert_eq!(doc.name, "Ada Lovelace");
        assert!(doc.work_experience.is_empty());
        assert!(doc.projects.is_empty());
        assert!(doc.certifications.is_empty());
        assert!(doc.skills.is_empty());
    }

    #[test]
    fn test_certification_objects_normalized() {
        let doc: ResumeDocument = serde_json::from_value(json!({
            "name": "Ada",
            "certifications": [
                "AWS Solutions Architect",
                {"title": "CKA", "issuer": "CNCF"},
                {"title": "Scrum", "description": "Agile training"},
                {"name": "Terraform Associate"}
            ]
        }))
        .unwrap();

        assert_eq!(
            doc.certifications,
            vec![
                "AWS Solutions Architect",
                "CKA - CNCF",
                "Scrum - Agile training",
                "Terraform Associate"
            ]
        );
    }

    #[test]
    fn test_certification_non_text_entries_dropped() {
        let doc: ResumeDocument = serde_json::from_value(json!({
            "name": "Ada",
            "certifications": [null, 5, true, ["nested"], "CKA"]
        }))
        .unwrap();
        assert_eq!(doc.certifications, vec!["CKA"]);

        let doc: ResumeDocument =
            serde_json::from_value(json!({"name": "Ada", "certifications": [null]})).unwrap();
        assert!(doc.certifications.is_empty());
    }

    #[test]
    fn test_skill_accepts_list_or_items() {
        let skill: Skill =
            serde_json::from_value(json!({"category": "Languages", "items": ["Rust"]})).unwrap();
        assert_eq!(skill.items, vec!["Rust"]);

        let serialized = serde_json::to_value(&skill).unwrap();
        assert_eq!(serialized["list"], json!(["Rust"]));
    }

    #[test]
    fn test_with_projects_leaves_original_untouched() {
        let mut original = ResumeDocument::named("Ada");
        original.projects.push(Project {
            title: "Engine".to_string(),
            ..Project::default()
        });

        let updated = original.with_projects(vec![]);
        assert_eq!(original.projects.len(), 1);
        assert!(updated.projects.is_empty());
        assert_eq!(updated.name, "Ada");
    }

    #[test]
    fn test_user_type_serde() {
        let t: UserType = serde_json::from_str(r#""fresher""#).unwrap();
        assert_eq!(t, UserType::Fresher);
        assert_eq!(UserType::default(), UserType::Experienced);
    }
}
