//! Maps the many field names LinkedIn scrapers use onto one canonical profile.
//!
//! Each canonical field has a priority list of candidate paths. The first
//! candidate holding a non-empty value wins; `null`, blank strings, empty
//! arrays and empty objects count as empty. Paths may be dotted
//! (`location.default`) to reach into nested objects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cv::sections::{
    CertificationItem, CvSection, EducationItem, ExperienceItem, LanguageItem, PersonalInfo, Skills,
};

const FULL_NAME: &[&str] = &["fullName", "full_name", "name", "profileName"];
const FIRST_NAME: &[&str] = &["firstName", "first_name", "firstname"];
const LAST_NAME: &[&str] = &["lastName", "last_name", "lastname"];
const HEADLINE: &[&str] = &["headline", "occupation", "jobTitle", "title", "subTitle"];
const LOCATION: &[&str] = &[
    "location",
    "addressWithCountry",
    "geoLocationName",
    "location.default",
    "locationName",
    "addressWithoutCountry",
    "geo.full",
];
const SUMMARY: &[&str] = &["about", "summary", "description", "bio"];
const EMAIL: &[&str] = &["email", "emailAddress", "contactInfo.email"];
const PHONE: &[&str] = &["mobileNumber", "phone", "phoneNumber", "contactInfo.phone"];
const PHOTO: &[&str] = &[
    "profilePicHighQuality",
    "profilePic",
    "profilePicture",
    "photoUrl",
    "picture",
    "profile_pic_url",
];
const PROFILE_URL: &[&str] = &["linkedinUrl", "profileUrl", "url", "publicProfileUrl"];

const EXPERIENCE_LIST: &[&str] = &["experiences", "experience", "positions", "workExperience"];
const EXP_TITLE: &[&str] = &["title", "position", "role", "jobTitle"];
const EXP_COMPANY: &[&str] = &["companyName", "company", "company.name", "organization", "subtitle"];
const EXP_LOCATION: &[&str] = &["location", "jobLocation", "locationName"];
const EXP_DESCRIPTION: &[&str] = &["description", "summary"];

const EDUCATION_LIST: &[&str] = &["educations", "education", "schools", "educationHistory"];
const EDU_SCHOOL: &[&str] = &["schoolName", "school", "school.name", "institution", "title"];
const EDU_DEGREE: &[&str] = &["degreeName", "degree", "subtitle"];
const EDU_FIELD: &[&str] = &["fieldOfStudy", "field_of_study", "field"];

const START_DATE: &[&str] = &[
    "startDate",
    "start_date",
    "starts_at",
    "dateRange.start",
    "timePeriod.startDate",
    "start",
];
const END_DATE: &[&str] = &[
    "endDate",
    "end_date",
    "ends_at",
    "dateRange.end",
    "timePeriod.endDate",
    "end",
];

const SKILL_LIST: &[&str] = &["skills", "topSkills", "skillsList", "topSkillsByEndorsements"];
const ITEM_NAME: &[&str] = &["name", "title", "skill"];
const LANGUAGE_LIST: &[&str] = &["languages"];
const LANGUAGE_LEVEL: &[&str] = &["proficiency", "subtitle", "level"];
const CERTIFICATION_LIST: &[&str] = &["certifications", "licenseAndCertificates", "licenses"];
const CERT_ISSUER: &[&str] = &["authority", "issuer", "companyName", "subtitle"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInExperience {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInEducation {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInLanguage {
    pub name: String,
    pub proficiency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInCertification {
    pub name: String,
    pub issuer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedInProfile {
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub summary: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub profile_url: Option<String>,
    pub experience: Vec<LinkedInExperience>,
    pub education: Vec<LinkedInEducation>,
    pub skills: Vec<String>,
    pub languages: Vec<LinkedInLanguage>,
    pub certifications: Vec<LinkedInCertification>,
}

/// Resolves a dotted path against nested objects.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| current.get(key))
}

pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// First candidate path holding a non-empty value.
pub fn first_non_empty<'a>(value: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|path| lookup(value, path))
        .find(|v| !is_empty_value(v))
}

/// First candidate holding a non-empty string (numbers are stringified).
/// Candidates holding objects or arrays are passed over.
pub fn first_string(value: &Value, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|path| lookup(value, path))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// Dates arrive as strings, bare years, or `{year, month, day}` objects.
fn date_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => n.as_u64().map(|y| y.to_string()),
        Value::Object(o) => {
            let year = o.get("year").and_then(Value::as_u64)?;
            match o.get("month").and_then(Value::as_u64) {
                Some(month) if (1..=12).contains(&month) => Some(format!("{year:04}-{month:02}")),
                _ => Some(year.to_string()),
            }
        }
        _ => None,
    }
}

fn first_date(value: &Value, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|path| lookup(value, path))
        .find_map(date_string)
}

fn first_list<'a>(value: &'a Value, candidates: &[&str]) -> &'a [Value] {
    first_non_empty(value, candidates)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn item_name(item: &Value) -> Option<String> {
    match item {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(_) => first_string(item, ITEM_NAME),
        _ => None,
    }
}

fn is_present(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "present" | "current" | "now")
}

/// Skills arrive as strings, `{name}` objects, or one comma-separated string.
fn coalesce_skills(raw: &Value) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let candidates = SKILL_LIST.iter().filter_map(|path| lookup(raw, path));
    for candidate in candidates {
        let found: Vec<String> = match candidate {
            Value::Array(items) => items.iter().filter_map(item_name).collect(),
            Value::String(s) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        };
        if !found.is_empty() {
            names = found;
            break;
        }
    }

    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .filter(|n| seen.insert(n.to_lowercase()))
        .collect()
}

fn coalesce_experience(item: &Value) -> Option<LinkedInExperience> {
    let title = first_string(item, EXP_TITLE);
    let company = first_string(item, EXP_COMPANY);
    if title.is_none() && company.is_none() {
        return None;
    }
    let end = first_date(item, END_DATE);
    let current = match &end {
        None => true,
        Some(e) => is_present(e),
    };
    Some(LinkedInExperience {
        title,
        company,
        location: first_string(item, EXP_LOCATION),
        start_date: first_date(item, START_DATE),
        end_date: end.filter(|e| !is_present(e)),
        current,
        description: first_string(item, EXP_DESCRIPTION),
    })
}

fn coalesce_education(item: &Value) -> Option<LinkedInEducation> {
    let school = first_string(item, EDU_SCHOOL);
    let degree = first_string(item, EDU_DEGREE);
    if school.is_none() && degree.is_none() {
        return None;
    }
    Some(LinkedInEducation {
        school,
        degree,
        field_of_study: first_string(item, EDU_FIELD),
        start_date: first_date(item, START_DATE),
        end_date: first_date(item, END_DATE),
    })
}

pub fn coalesce_profile(raw: &Value) -> LinkedInProfile {
    let first_name = first_string(raw, FIRST_NAME);
    let last_name = first_string(raw, LAST_NAME);
    let full_name = first_string(raw, FULL_NAME).or_else(|| {
        let joined = [first_name.as_deref(), last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        (!joined.is_empty()).then_some(joined)
    });

    LinkedInProfile {
        full_name,
        first_name,
        last_name,
        headline: first_string(raw, HEADLINE),
        location: first_string(raw, LOCATION),
        summary: first_string(raw, SUMMARY),
        email: first_string(raw, EMAIL),
        phone: first_string(raw, PHONE),
        profile_picture: first_string(raw, PHOTO),
        profile_url: first_string(raw, PROFILE_URL),
        experience: first_list(raw, EXPERIENCE_LIST)
            .iter()
            .filter_map(coalesce_experience)
            .collect(),
        education: first_list(raw, EDUCATION_LIST)
            .iter()
            .filter_map(coalesce_education)
            .collect(),
        skills: coalesce_skills(raw),
        languages: first_list(raw, LANGUAGE_LIST)
            .iter()
            .filter_map(|item| {
                Some(LinkedInLanguage {
                    name: item_name(item)?,
                    proficiency: first_string(item, LANGUAGE_LEVEL),
                })
            })
            .collect(),
        certifications: first_list(raw, CERTIFICATION_LIST)
            .iter()
            .filter_map(|item| {
                Some(LinkedInCertification {
                    name: item_name(item)?,
                    issuer: first_string(item, CERT_ISSUER),
                })
            })
            .collect(),
    }
}

impl LinkedInProfile {
    /// CV sections filled from the profile. Sections with nothing to say are
    /// left out, and personal info carries only the fields the profile has,
    /// so an import never blanks existing CV data.
    pub fn into_cv_sections(self) -> serde_json::Result<Vec<(CvSection, Value)>> {
        let mut sections = Vec::new();

        let personal = serde_json::to_value(PersonalInfo {
            full_name: self.full_name,
            job_title: self.headline,
            email: self.email,
            phone: self.phone,
            location: self.location,
            linkedin: self.profile_url,
            summary: self.summary,
            photo_url: self.profile_picture,
            ..Default::default()
        })?;
        if let Value::Object(fields) = personal {
            let present: Map<String, Value> =
                fields.into_iter().filter(|(_, v)| !v.is_null()).collect();
            if !present.is_empty() {
                sections.push((CvSection::PersonalInfo, Value::Object(present)));
            }
        }

        if !self.experience.is_empty() {
            let items: Vec<ExperienceItem> = self
                .experience
                .into_iter()
                .map(|e| ExperienceItem {
                    title: e.title,
                    company: e.company,
                    location: e.location,
                    start_date: e.start_date,
                    end_date: e.end_date,
                    current: e.current,
                    description: e.description,
                    achievements: Vec::new(),
                })
                .collect();
            sections.push((CvSection::Experience, serde_json::to_value(items)?));
        }

        if !self.education.is_empty() {
            let items: Vec<EducationItem> = self
                .education
                .into_iter()
                .map(|e| EducationItem {
                    institution: e.school,
                    degree: e.degree,
                    field_of_study: e.field_of_study,
                    start_date: e.start_date,
                    end_date: e.end_date,
                    ..Default::default()
                })
                .collect();
            sections.push((CvSection::Education, serde_json::to_value(items)?));
        }

        if !self.skills.is_empty() {
            let skills = Skills {
                technical: self.skills,
                soft: Vec::new(),
            };
            sections.push((CvSection::Skills, serde_json::to_value(skills)?));
        }

        if !self.languages.is_empty() {
            let items: Vec<LanguageItem> = self
                .languages
                .into_iter()
                .map(|l| LanguageItem {
                    name: Some(l.name),
                    proficiency: l.proficiency,
                })
                .collect();
            sections.push((CvSection::Languages, serde_json::to_value(items)?));
        }

        if !self.certifications.is_empty() {
            let items: Vec<CertificationItem> = self
                .certifications
                .into_iter()
                .map(|c| CertificationItem {
                    name: Some(c.name),
                    issuer: c.issuer,
                    ..Default::default()
                })
                .collect();
            sections.push((CvSection::Certifications, serde_json::to_value(items)?));
        }

        Ok(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_non_empty_respects_priority_order() {
        let raw = json!({"name": "Second", "fullName": "First"});
        assert_eq!(first_string(&raw, FULL_NAME).as_deref(), Some("First"));

        let raw = json!({"fullName": "   ", "full_name": null, "name": "Fallback"});
        assert_eq!(first_string(&raw, FULL_NAME).as_deref(), Some("Fallback"));

        let raw = json!({"experiences": [], "positions": [{"title": "x"}]});
        assert_eq!(
            first_non_empty(&raw, EXPERIENCE_LIST),
            Some(&json!([{"title": "x"}]))
        );
    }

    #[test]
    fn test_dotted_paths_and_object_candidates() {
        let raw = json!({"location": {"default": "Berlin, Germany"}});
        assert_eq!(
            first_string(&raw, LOCATION).as_deref(),
            Some("Berlin, Germany")
        );
        assert_eq!(lookup(&raw, "location.default.missing"), None);
    }

    #[test]
    fn test_full_name_falls_back_to_first_and_last() {
        let profile = coalesce_profile(&json!({"firstName": "Ada", "lastName": "Lovelace"}));
        assert_eq!(profile.full_name.as_deref(), Some("Ada Lovelace"));

        let profile = coalesce_profile(&json!({"lastName": "Lovelace"}));
        assert_eq!(profile.full_name.as_deref(), Some("Lovelace"));

        let profile = coalesce_profile(&json!({}));
        assert_eq!(profile, LinkedInProfile::default());
    }

    #[test]
    fn test_experience_mapping() {
        let raw = json!({
            "positions": [
                {
                    "position": "Staff Engineer",
                    "company": {"name": "Acme"},
                    "timePeriod": {"startDate": {"year": 2021, "month": 3}},
                    "description": "Platform work"
                },
                {
                    "title": "Engineer",
                    "companyName": "Initech",
                    "startDate": "2018-01",
                    "endDate": "2021-02"
                },
                {"description": "no title or company"}
            ]
        });
        let profile = coalesce_profile(&raw);
        assert_eq!(profile.experience.len(), 2);

        let first = &profile.experience[0];
        assert_eq!(first.title.as_deref(), Some("Staff Engineer"));
        assert_eq!(first.company.as_deref(), Some("Acme"));
        assert_eq!(first.start_date.as_deref(), Some("2021-03"));
        assert!(first.current);
        assert_eq!(first.end_date, None);

        let second = &profile.experience[1];
        assert_eq!(second.end_date.as_deref(), Some("2021-02"));
        assert!(!second.current);
    }

    #[test]
    fn test_present_end_date_marks_current() {
        let raw = json!({"experiences": [{"title": "CTO", "endDate": "Present"}]});
        let profile = coalesce_profile(&raw);
        assert!(profile.experience[0].current);
        assert_eq!(profile.experience[0].end_date, None);
    }

    #[test]
    fn test_skills_from_objects_strings_and_csv() {
        let raw = json!({"skills": [{"name": "Rust"}, {"title": "rust"}, "SQL", {"x": 1}]});
        assert_eq!(coalesce_skills(&raw), vec!["Rust".to_string(), "SQL".to_string()]);

        let raw = json!({"skills": [], "topSkillsByEndorsements": "Go, Kubernetes , "});
        assert_eq!(
            coalesce_skills(&raw),
            vec!["Go".to_string(), "Kubernetes".to_string()]
        );
    }

    #[test]
    fn test_into_cv_sections_skips_empty_lists() {
        let profile = coalesce_profile(&json!({
            "fullName": "Ada Lovelace",
            "headline": "Analyst",
            "skills": ["Mathematics"],
            "educations": [{"schoolName": "Home tutoring", "degreeName": "Private study"}]
        }));
        let sections = profile.into_cv_sections().unwrap();
        let keys: Vec<CvSection> = sections.iter().map(|(s, _)| *s).collect();
        assert_eq!(
            keys,
            vec![CvSection::PersonalInfo, CvSection::Education, CvSection::Skills]
        );
        assert_eq!(sections[0].1["fullName"], json!("Ada Lovelace"));
        assert_eq!(sections[0].1["jobTitle"], json!("Analyst"));
        assert_eq!(sections[1].1[0]["institution"], json!("Home tutoring"));
        for (section, data) in &sections {
            assert!(section.validate(data).is_ok());
        }
    }

    #[test]
    fn test_personal_info_carries_only_scraped_fields() {
        let sections = coalesce_profile(&json!({"fullName": "Ada Lovelace"}))
            .into_cv_sections()
            .unwrap();
        assert_eq!(
            sections,
            vec![(CvSection::PersonalInfo, json!({"fullName": "Ada Lovelace"}))]
        );

        let empty = coalesce_profile(&json!({})).into_cv_sections().unwrap();
        assert!(empty.is_empty());
    }
}
