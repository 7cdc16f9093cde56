use serde::{Deserialize, Serialize};

use crate::cv::sections::{is_filled, CvDocument, CvSection};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Strong,
    Moderate,
    Weak,
    Missing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionHealth {
    pub section: CvSection,
    pub score: f64,
    pub item_count: usize,
    pub status: SectionStatus,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessReport {
    pub overall_score: f64,
    pub sections: Vec<SectionHealth>,
    pub missing_sections: Vec<CvSection>,
}

/// (section, weight, item count considered complete)
const SECTION_WEIGHTS: &[(CvSection, f64, usize)] = &[
    (CvSection::PersonalInfo, 0.25, 6),
    (CvSection::Experience, 0.25, 2),
    (CvSection::Education, 0.15, 1),
    (CvSection::Skills, 0.15, 8),
    (CvSection::Projects, 0.08, 2),
    (CvSection::Languages, 0.04, 1),
    (CvSection::Certifications, 0.04, 1),
    (CvSection::Awards, 0.02, 1),
    (CvSection::References, 0.02, 1),
];

pub fn compute_completeness_report(doc: &CvDocument) -> CompletenessReport {
    let mut section_healths = Vec::new();
    let mut weighted_score_sum = 0.0;
    let mut missing_sections = Vec::new();

    for (section, weight, target) in SECTION_WEIGHTS {
        let item_count = doc.item_count(*section);

        if item_count == 0 {
            missing_sections.push(*section);
            section_healths.push(SectionHealth {
                section: *section,
                score: 0.0,
                item_count: 0,
                status: SectionStatus::Missing,
                recommendations: vec![format!("Add your {}", section.title().to_lowercase())],
            });
            continue;
        }

        let coverage = (item_count as f64 / *target as f64).min(1.0);
        let quality = section_quality(doc, *section);
        let score = (coverage * quality).clamp(0.0, 1.0);

        let status = match score {
            s if s >= 0.8 => SectionStatus::Strong,
            s if s >= 0.5 => SectionStatus::Moderate,
            _ => SectionStatus::Weak,
        };

        weighted_score_sum += score * weight;
        section_healths.push(SectionHealth {
            section: *section,
            score,
            item_count,
            status,
            recommendations: recommendations_for(doc, *section, item_count, *target),
        });
    }

    let total_weight: f64 = SECTION_WEIGHTS.iter().map(|(_, w, _)| w).sum();
    let overall_score = if total_weight > 0.0 {
        (weighted_score_sum / total_weight).clamp(0.0, 1.0)
    } else {
        0.0
    };

    CompletenessReport {
        overall_score,
        sections: section_healths,
        missing_sections,
    }
}

/// Share of entries that carry the fields a reader looks for first.
fn section_quality(doc: &CvDocument, section: CvSection) -> f64 {
    fn share<T>(items: &[T], ok: impl Fn(&T) -> bool) -> f64 {
        if items.is_empty() {
            return 0.0;
        }
        items.iter().filter(|i| ok(*i)).count() as f64 / items.len() as f64
    }

    match section {
        CvSection::Experience => share(&doc.experience, |e| {
            is_filled(&e.title)
                && is_filled(&e.company)
                && is_filled(&e.start_date)
                && (is_filled(&e.description) || !e.achievements.is_empty())
        }),
        CvSection::Education => share(&doc.education, |e| {
            is_filled(&e.institution) && is_filled(&e.degree)
        }),
        CvSection::Projects => share(&doc.projects, |p| {
            is_filled(&p.name) && is_filled(&p.description)
        }),
        _ => 1.0,
    }
}

fn recommendations_for(
    doc: &CvDocument,
    section: CvSection,
    item_count: usize,
    target: usize,
) -> Vec<String> {
    let mut recs = Vec::new();
    match section {
        CvSection::PersonalInfo => {
            if !is_filled(&doc.personal_info.summary) {
                recs.push("Write a short professional summary".to_string());
            }
            if !is_filled(&doc.personal_info.email) && !is_filled(&doc.personal_info.phone) {
                recs.push("Add at least one way to contact you".to_string());
            }
        }
        CvSection::Experience => {
            let bare = doc
                .experience
                .iter()
                .filter(|e| !is_filled(&e.description) && e.achievements.is_empty())
                .count();
            if bare > 0 {
                recs.push(format!(
                    "{bare} experience entries have no description or achievements"
                ));
            }
        }
        CvSection::Skills => {
            if doc.skills.soft.is_empty() {
                recs.push("List a few soft skills alongside technical ones".to_string());
            }
        }
        _ => {}
    }
    if item_count < target && section != CvSection::PersonalInfo {
        recs.push(format!(
            "Add more {} to build a complete picture",
            section.title().to_lowercase()
        ));
    }
    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_document_is_all_missing() {
        let report = compute_completeness_report(&CvDocument::default());
        assert_eq!(report.overall_score, 0.0);
        assert_eq!(report.missing_sections.len(), SECTION_WEIGHTS.len());
        assert!(report
            .sections
            .iter()
            .all(|s| s.status == SectionStatus::Missing));
    }

    #[test]
    fn test_filled_experience_scores_strong() {
        let doc = CvDocument::from_value(&json!({
            "experience": [
                {"title": "Engineer", "company": "Acme", "startDate": "2020-01", "description": "Built things"},
                {"title": "Lead", "company": "Initech", "startDate": "2022-05", "achievements": ["Cut costs 20%"]}
            ]
        }));
        let report = compute_completeness_report(&doc);
        let exp = report
            .sections
            .iter()
            .find(|s| s.section == CvSection::Experience)
            .unwrap();
        assert_eq!(exp.status, SectionStatus::Strong);
        assert!((exp.score - 1.0).abs() < f64::EPSILON);
        assert!(report.overall_score > 0.0 && report.overall_score < 1.0);
    }

    #[test]
    fn test_bare_experience_is_weak_with_recommendation() {
        let doc = CvDocument::from_value(&json!({
            "experience": [{"company": "Acme"}]
        }));
        let report = compute_completeness_report(&doc);
        let exp = report
            .sections
            .iter()
            .find(|s| s.section == CvSection::Experience)
            .unwrap();
        assert_eq!(exp.status, SectionStatus::Weak);
        assert!(exp
            .recommendations
            .iter()
            .any(|r| r.contains("no description")));
    }
}
