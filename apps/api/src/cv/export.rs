use crate::cv::render::{date_range, format_month, join_non_empty, non_empty_items};
use crate::cv::sections::{CvDocument, CvSection};

/// Renders the CV as a markdown document. Empty sections are skipped.
pub fn render_markdown(doc: &CvDocument) -> String {
    let p = &doc.personal_info;
    let name = p
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("Curriculum Vitae");
    let mut md = format!("# {name}\n\n");

    if let Some(title) = p.job_title.as_deref().filter(|s| !s.trim().is_empty()) {
        md.push_str(&format!("**{}**\n\n", title.trim()));
    }
    let contact = join_non_empty(
        &[
            p.email.as_deref(),
            p.phone.as_deref(),
            p.location.as_deref(),
            p.website.as_deref(),
            p.linkedin.as_deref(),
            p.github.as_deref(),
        ],
        " | ",
    );
    if !contact.is_empty() {
        md.push_str(&contact);
        md.push_str("\n\n");
    }
    if let Some(summary) = p.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        md.push_str(summary.trim());
        md.push_str("\n\n");
    }

    let mut experience = String::new();
    for e in &doc.experience {
        let heading = join_non_empty(&[e.title.as_deref(), e.company.as_deref()], " — ");
        let dates = date_range(e.start_date.as_deref(), e.end_date.as_deref(), e.current);
        let meta = join_non_empty(&[Some(dates.as_str()), e.location.as_deref()], " · ");
        let mut item = String::new();
        if !heading.is_empty() {
            item.push_str(&format!("### {heading}\n"));
        }
        if !meta.is_empty() {
            item.push_str(&format!("*{meta}*\n"));
        }
        if let Some(desc) = e.description.as_deref().filter(|s| !s.trim().is_empty()) {
            item.push_str(&format!("\n{}\n", desc.trim()));
        }
        for a in non_empty_items(&e.achievements) {
            item.push_str(&format!("- {a}\n"));
        }
        push_entry(&mut experience, item);
    }
    push_section(&mut md, CvSection::Experience, &experience);

    let mut education = String::new();
    for e in &doc.education {
        let degree = join_non_empty(&[e.degree.as_deref(), e.field_of_study.as_deref()], ", ");
        let heading = join_non_empty(&[Some(degree.as_str()), e.institution.as_deref()], " — ");
        let dates = date_range(e.start_date.as_deref(), e.end_date.as_deref(), false);
        let meta = join_non_empty(&[Some(dates.as_str()), e.grade.as_deref()], " · ");
        let mut item = String::new();
        if !heading.is_empty() {
            item.push_str(&format!("### {heading}\n"));
        }
        if !meta.is_empty() {
            item.push_str(&format!("*{meta}*\n"));
        }
        push_entry(&mut education, item);
    }
    push_section(&mut md, CvSection::Education, &education);

    let mut skill_lines = String::new();
    let technical = non_empty_items(&doc.skills.technical);
    if !technical.is_empty() {
        skill_lines.push_str(&format!("- **Technical:** {}\n", technical.join(", ")));
    }
    let soft = non_empty_items(&doc.skills.soft);
    if !soft.is_empty() {
        skill_lines.push_str(&format!("- **Soft:** {}\n", soft.join(", ")));
    }
    let mut skills = String::new();
    push_entry(&mut skills, skill_lines);
    push_section(&mut md, CvSection::Skills, &skills);

    let mut projects = String::new();
    for pr in &doc.projects {
        let name = pr.name.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let url = pr.url.as_deref().map(str::trim).filter(|u| !u.is_empty());
        let desc = pr.description.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let technologies = non_empty_items(&pr.technologies);
        if name.is_none() && url.is_none() && desc.is_none() && technologies.is_empty() {
            continue;
        }
        let name = name.unwrap_or("Untitled project");
        let mut item = match url {
            Some(url) => format!("### [{name}]({url})\n"),
            None => format!("### {name}\n"),
        };
        if let Some(desc) = desc {
            item.push_str(&format!("{desc}\n"));
        }
        if !technologies.is_empty() {
            item.push_str(&format!("*{}*\n", technologies.join(", ")));
        }
        push_entry(&mut projects, item);
    }
    push_section(&mut md, CvSection::Projects, &projects);

    let bullet_sections: [(CvSection, Vec<String>); 4] = [
        (
            CvSection::Languages,
            doc.languages
                .iter()
                .map(|l| join_non_empty(&[l.name.as_deref(), l.proficiency.as_deref()], " — "))
                .collect(),
        ),
        (
            CvSection::Certifications,
            doc.certifications
                .iter()
                .map(|c| {
                    let date = format_month(c.date.as_deref().unwrap_or_default());
                    join_non_empty(&[c.name.as_deref(), c.issuer.as_deref(), Some(date.as_str())], " — ")
                })
                .collect(),
        ),
        (
            CvSection::Awards,
            doc.awards
                .iter()
                .map(|a| {
                    let date = format_month(a.date.as_deref().unwrap_or_default());
                    join_non_empty(&[a.title.as_deref(), a.issuer.as_deref(), Some(date.as_str())], " — ")
                })
                .collect(),
        ),
        (
            CvSection::References,
            doc.references
                .iter()
                .map(|r| {
                    join_non_empty(
                        &[r.name.as_deref(), r.position.as_deref(), r.company.as_deref(), r.email.as_deref()],
                        " — ",
                    )
                })
                .collect(),
        ),
    ];
    for (section, lines) in bullet_sections {
        let bullets: String = lines
            .into_iter()
            .filter(|l| !l.is_empty())
            .map(|l| format!("- {l}\n"))
            .collect();
        let mut body = String::new();
        push_entry(&mut body, bullets);
        push_section(&mut md, section, &body);
    }

    md.trim_end().to_string() + "\n"
}

/// Appends one entry followed by a blank line; empty entries are dropped.
fn push_entry(body: &mut String, entry: String) {
    if !entry.is_empty() {
        body.push_str(&entry);
        body.push('\n');
    }
}

fn push_section(md: &mut String, section: CvSection, body: &str) {
    if !body.is_empty() {
        md.push_str(&format!("## {}\n\n", section.title()));
        md.push_str(body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_markdown_export() {
        let doc = CvDocument::from_value(&json!({
            "personalInfo": {"fullName": "Grace Hopper", "email": "grace@navy.mil"},
            "experience": [{
                "title": "Rear Admiral",
                "company": "US Navy",
                "startDate": "1943-12",
                "endDate": "1986-08",
                "achievements": ["Popularised machine-independent languages"]
            }],
            "languages": [{"name": "English", "proficiency": "Native"}],
            "awards": [{}]
        }));
        let md = render_markdown(&doc);
        assert!(md.starts_with("# Grace Hopper\n"));
        assert!(md.contains("### Rear Admiral — US Navy\n*Dec 1943 – Aug 1986*\n"));
        assert!(md.contains("- Popularised machine-independent languages\n"));
        assert!(md.contains("## Languages\n\n- English — Native\n"));
        // The award has no content, so the section is dropped
        assert!(!md.contains("## Awards"));
    }

    #[test]
    fn test_blank_entries_leave_no_headings() {
        let doc = CvDocument::from_value(&json!({
            "experience": [{}],
            "education": [{"degree": "  "}],
            "skills": {"technical": ["", " "], "soft": ["Patience", ""]},
            "projects": [{}]
        }));
        assert_eq!(
            render_markdown(&doc),
            "# Curriculum Vitae\n\n## Skills\n\n- **Soft:** Patience\n"
        );
    }

    #[test]
    fn test_empty_document_has_placeholder_title() {
        assert_eq!(render_markdown(&CvDocument::default()), "# Curriculum Vitae\n");
    }
}
