//! Typed shapes of the CV sections. Every field is optional: the stored JSON is
//! whatever the builder form sent, these types only check that it has the
//! right overall structure and give the renderers something to read.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CvSection {
    PersonalInfo,
    Experience,
    Education,
    Skills,
    Languages,
    Certifications,
    Projects,
    Awards,
    References,
}

impl CvSection {
    pub const ALL: [CvSection; 9] = [
        CvSection::PersonalInfo,
        CvSection::Experience,
        CvSection::Education,
        CvSection::Skills,
        CvSection::Languages,
        CvSection::Certifications,
        CvSection::Projects,
        CvSection::Awards,
        CvSection::References,
    ];

    /// Key under which the section is stored in the document.
    pub fn key(self) -> &'static str {
        match self {
            CvSection::PersonalInfo => "personalInfo",
            CvSection::Experience => "experience",
            CvSection::Education => "education",
            CvSection::Skills => "skills",
            CvSection::Languages => "languages",
            CvSection::Certifications => "certifications",
            CvSection::Projects => "projects",
            CvSection::Awards => "awards",
            CvSection::References => "references",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            CvSection::PersonalInfo => "Personal Information",
            CvSection::Experience => "Work Experience",
            CvSection::Education => "Education",
            CvSection::Skills => "Skills",
            CvSection::Languages => "Languages",
            CvSection::Certifications => "Certifications",
            CvSection::Projects => "Projects",
            CvSection::Awards => "Awards",
            CvSection::References => "References",
        }
    }

    /// Checks that `data` has the shape this section expects.
    pub fn validate(self, data: &Value) -> Result<(), AppError> {
        let result = match self {
            CvSection::PersonalInfo => PersonalInfo::deserialize(data).map(|_| ()),
            CvSection::Experience => Vec::<ExperienceItem>::deserialize(data).map(|_| ()),
            CvSection::Education => Vec::<EducationItem>::deserialize(data).map(|_| ()),
            CvSection::Skills => Skills::deserialize(data).map(|_| ()),
            CvSection::Languages => Vec::<LanguageItem>::deserialize(data).map(|_| ()),
            CvSection::Certifications => Vec::<CertificationItem>::deserialize(data).map(|_| ()),
            CvSection::Projects => Vec::<ProjectItem>::deserialize(data).map(|_| ()),
            CvSection::Awards => Vec::<AwardItem>::deserialize(data).map(|_| ()),
            CvSection::References => Vec::<ReferenceItem>::deserialize(data).map(|_| ()),
        };
        result.map_err(|e| AppError::Validation(format!("Invalid {} data: {e}", self.key())))
    }
}

impl fmt::Display for CvSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CvSection {
    type Err = AppError;

    /// Accepts the camelCase key as well as snake_case and kebab-case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        CvSection::ALL
            .into_iter()
            .find(|section| section.key().to_lowercase() == normalized)
            .ok_or_else(|| AppError::Validation(format!("Unknown CV section '{s}'")))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: Option<String>,
    pub job_title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub summary: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceItem {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current: bool,
    pub description: Option<String>,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationItem {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub grade: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Skills {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
}

impl Skills {
    pub fn is_empty(&self) -> bool {
        self.technical.is_empty() && self.soft.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguageItem {
    pub name: Option<String>,
    pub proficiency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CertificationItem {
    pub name: Option<String>,
    pub issuer: Option<String>,
    pub date: Option<String>,
    pub expiry_date: Option<String>,
    pub credential_id: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub technologies: Vec<String>,
    pub url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AwardItem {
    pub title: Option<String>,
    pub issuer: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReferenceItem {
    pub name: Option<String>,
    pub position: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Typed view of a whole stored CV document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CvDocument {
    pub personal_info: PersonalInfo,
    pub experience: Vec<ExperienceItem>,
    pub education: Vec<EducationItem>,
    pub skills: Skills,
    pub languages: Vec<LanguageItem>,
    pub certifications: Vec<CertificationItem>,
    pub projects: Vec<ProjectItem>,
    pub awards: Vec<AwardItem>,
    pub references: Vec<ReferenceItem>,
}

impl CvDocument {
    /// Builds the typed view, treating a malformed section as empty rather than
    /// failing the whole document.
    pub fn from_value(data: &Value) -> Self {
        let mut doc = CvDocument::default();
        let Some(obj) = data.as_object() else {
            return doc;
        };
        fn take<T: serde::de::DeserializeOwned + Default>(
            obj: &serde_json::Map<String, Value>,
            key: &str,
        ) -> T {
            obj.get(key)
                .filter(|v| !v.is_null())
                .and_then(|v| T::deserialize(v).ok())
                .unwrap_or_default()
        }
        doc.personal_info = take(obj, CvSection::PersonalInfo.key());
        doc.experience = take(obj, CvSection::Experience.key());
        doc.education = take(obj, CvSection::Education.key());
        doc.skills = take(obj, CvSection::Skills.key());
        doc.languages = take(obj, CvSection::Languages.key());
        doc.certifications = take(obj, CvSection::Certifications.key());
        doc.projects = take(obj, CvSection::Projects.key());
        doc.awards = take(obj, CvSection::Awards.key());
        doc.references = take(obj, CvSection::References.key());
        doc
    }

    /// Number of items in a section; personal info counts filled fields.
    pub fn item_count(&self, section: CvSection) -> usize {
        match section {
            CvSection::PersonalInfo => {
                let p = &self.personal_info;
                [
                    &p.full_name,
                    &p.job_title,
                    &p.email,
                    &p.phone,
                    &p.location,
                    &p.website,
                    &p.linkedin,
                    &p.github,
                    &p.summary,
                    &p.photo_url,
                ]
                .iter()
                .filter(|f| is_filled(f))
                .count()
            }
            CvSection::Experience => self.experience.len(),
            CvSection::Education => self.education.len(),
            CvSection::Skills => self.skills.technical.len() + self.skills.soft.len(),
            CvSection::Languages => self.languages.len(),
            CvSection::Certifications => self.certifications.len(),
            CvSection::Projects => self.projects.len(),
            CvSection::Awards => self.awards.len(),
            CvSection::References => self.references.len(),
        }
    }
}

pub fn is_filled(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_parsing_accepts_common_spellings() {
        assert_eq!("personalInfo".parse::<CvSection>().unwrap(), CvSection::PersonalInfo);
        assert_eq!("personal_info".parse::<CvSection>().unwrap(), CvSection::PersonalInfo);
        assert_eq!("Personal-Info".parse::<CvSection>().unwrap(), CvSection::PersonalInfo);
        assert_eq!("skills".parse::<CvSection>().unwrap(), CvSection::Skills);
        assert!("hobbies".parse::<CvSection>().is_err());
    }

    #[test]
    fn test_validate_rejects_wrong_shape() {
        assert!(CvSection::Experience
            .validate(&json!({"title": "not a list"}))
            .is_err());
        assert!(CvSection::Skills
            .validate(&json!({"technical": "Rust"}))
            .is_err());
    }

    #[test]
    fn test_validate_accepts_partial_items() {
        let data = json!([{"company": "Acme"}, {}]);
        assert!(CvSection::Experience.validate(&data).is_ok());
        assert!(CvSection::PersonalInfo
            .validate(&json!({"fullName": "Ada Lovelace", "unknownField": 1}))
            .is_ok());
    }

    #[test]
    fn test_from_value_tolerates_malformed_sections() {
        let doc = CvDocument::from_value(&json!({
            "personalInfo": {"fullName": "Ada"},
            "experience": "oops",
            "skills": {"technical": ["Rust", "SQL"]}
        }));
        assert_eq!(doc.personal_info.full_name.as_deref(), Some("Ada"));
        assert!(doc.experience.is_empty());
        assert_eq!(doc.item_count(CvSection::Skills), 2);
        assert_eq!(doc.item_count(CvSection::PersonalInfo), 1);
    }
}
