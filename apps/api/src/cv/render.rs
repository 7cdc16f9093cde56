//! Turns a CV document into a styled document definition the front end feeds
//! to its PDF library, one layout per template.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cv::sections::{is_filled, CvDocument, CvSection};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CvTemplate {
    #[default]
    Classic,
    Modern,
    Minimal,
}

impl FromStr for CvTemplate {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classic" | "default" => Ok(CvTemplate::Classic),
            "modern" => Ok(CvTemplate::Modern),
            "minimal" => Ok(CvTemplate::Minimal),
            other => Err(AppError::Validation(format!(
                "Unknown template '{other}'. Use classic, modern or minimal"
            ))),
        }
    }
}

impl fmt::Display for CvTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CvTemplate::Classic => "classic",
            CvTemplate::Modern => "modern",
            CvTemplate::Minimal => "minimal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italics: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// [left, top, right, bottom]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<[f32; 4]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    Text { text: String, style: String },
    List { items: Vec<String>, style: String },
    Divider { color: String },
    Columns { widths: Vec<String>, columns: Vec<Vec<Block>> },
}

impl Block {
    fn text(text: impl Into<String>, style: &str) -> Self {
        Block::Text {
            text: text.into(),
            style: style.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDefinition {
    pub template: CvTemplate,
    pub page_size: String,
    pub page_margins: [f32; 4],
    pub default_style: TextStyle,
    pub styles: BTreeMap<String, TextStyle>,
    pub content: Vec<Block>,
}

struct Palette {
    accent: &'static str,
    muted: &'static str,
    base_size: f32,
}

impl CvTemplate {
    fn palette(self) -> Palette {
        match self {
            CvTemplate::Classic => Palette {
                accent: "#1f2937",
                muted: "#4b5563",
                base_size: 10.5,
            },
            CvTemplate::Modern => Palette {
                accent: "#2563eb",
                muted: "#64748b",
                base_size: 10.0,
            },
            CvTemplate::Minimal => Palette {
                accent: "#111111",
                muted: "#6b7280",
                base_size: 10.0,
            },
        }
    }
}

pub fn render_document(doc: &CvDocument, template: CvTemplate) -> DocumentDefinition {
    let palette = template.palette();
    let styles = build_styles(template, &palette);

    let content = match template {
        CvTemplate::Classic | CvTemplate::Minimal => {
            let mut content = header_blocks(doc, template);
            for section in main_sections(template) {
                content.extend(section_blocks(doc, *section, template, &palette));
            }
            for section in side_sections() {
                content.extend(section_blocks(doc, *section, template, &palette));
            }
            content
        }
        CvTemplate::Modern => {
            let mut sidebar = contact_blocks(doc);
            for section in side_sections() {
                sidebar.extend(section_blocks(doc, *section, template, &palette));
            }
            let mut main = Vec::new();
            for section in main_sections(template) {
                main.extend(section_blocks(doc, *section, template, &palette));
            }
            let mut content = header_blocks(doc, template);
            content.push(Block::Columns {
                widths: vec!["32%".to_string(), "*".to_string()],
                columns: vec![sidebar, main],
            });
            content
        }
    };

    DocumentDefinition {
        template,
        page_size: "A4".to_string(),
        page_margins: match template {
            CvTemplate::Minimal => [56.0, 56.0, 56.0, 56.0],
            _ => [40.0, 40.0, 40.0, 40.0],
        },
        default_style: TextStyle {
            font_size: Some(palette.base_size),
            ..Default::default()
        },
        styles,
        content,
    }
}

fn main_sections(template: CvTemplate) -> &'static [CvSection] {
    match template {
        CvTemplate::Minimal => &[
            CvSection::Experience,
            CvSection::Education,
            CvSection::Projects,
        ],
        _ => &[
            CvSection::Experience,
            CvSection::Education,
            CvSection::Projects,
            CvSection::Awards,
            CvSection::References,
        ],
    }
}

fn side_sections() -> &'static [CvSection] {
    &[
        CvSection::Skills,
        CvSection::Languages,
        CvSection::Certifications,
    ]
}

fn build_styles(template: CvTemplate, palette: &Palette) -> BTreeMap<String, TextStyle> {
    let mut styles = BTreeMap::new();
    styles.insert(
        "name".to_string(),
        TextStyle {
            font_size: Some(palette.base_size + 12.0),
            bold: Some(true),
            color: Some(palette.accent.to_string()),
            ..Default::default()
        },
    );
    styles.insert(
        "jobTitle".to_string(),
        TextStyle {
            font_size: Some(palette.base_size + 2.0),
            color: Some(palette.muted.to_string()),
            margin: Some([0.0, 2.0, 0.0, 8.0]),
            ..Default::default()
        },
    );
    styles.insert(
        "sectionHeader".to_string(),
        TextStyle {
            font_size: Some(palette.base_size + 3.0),
            bold: Some(template != CvTemplate::Minimal),
            color: Some(palette.accent.to_string()),
            margin: Some([0.0, 12.0, 0.0, 4.0]),
            ..Default::default()
        },
    );
    styles.insert(
        "itemTitle".to_string(),
        TextStyle {
            bold: Some(true),
            margin: Some([0.0, 6.0, 0.0, 0.0]),
            ..Default::default()
        },
    );
    styles.insert(
        "itemMeta".to_string(),
        TextStyle {
            italics: Some(true),
            color: Some(palette.muted.to_string()),
            font_size: Some(palette.base_size - 1.0),
            ..Default::default()
        },
    );
    styles.insert("body".to_string(), TextStyle::default());
    styles.insert(
        "contact".to_string(),
        TextStyle {
            font_size: Some(palette.base_size - 1.0),
            color: Some(palette.muted.to_string()),
            ..Default::default()
        },
    );
    styles
}

fn header_blocks(doc: &CvDocument, template: CvTemplate) -> Vec<Block> {
    let p = &doc.personal_info;
    let mut blocks = Vec::new();
    if let Some(name) = p.full_name.as_deref().filter(|s| !s.trim().is_empty()) {
        blocks.push(Block::text(name.trim(), "name"));
    }
    if let Some(title) = p.job_title.as_deref().filter(|s| !s.trim().is_empty()) {
        blocks.push(Block::text(title.trim(), "jobTitle"));
    }
    // Modern puts contact details in the sidebar
    if template != CvTemplate::Modern {
        let line = contact_parts(doc).join("  |  ");
        if !line.is_empty() {
            blocks.push(Block::text(line, "contact"));
        }
    }
    if let Some(summary) = p.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        blocks.push(Block::text(summary.trim(), "body"));
    }
    blocks
}

fn contact_parts(doc: &CvDocument) -> Vec<String> {
    let p = &doc.personal_info;
    [
        &p.email,
        &p.phone,
        &p.location,
        &p.website,
        &p.linkedin,
        &p.github,
    ]
    .into_iter()
    .filter(|f| is_filled(f))
    .filter_map(|f| f.as_deref().map(|s| s.trim().to_string()))
    .collect()
}

fn contact_blocks(doc: &CvDocument) -> Vec<Block> {
    let parts = contact_parts(doc);
    if parts.is_empty() {
        return Vec::new();
    }
    let mut blocks = vec![Block::text("Contact", "sectionHeader")];
    blocks.extend(parts.into_iter().map(|p| Block::text(p, "contact")));
    blocks
}

fn section_blocks(
    doc: &CvDocument,
    section: CvSection,
    template: CvTemplate,
    palette: &Palette,
) -> Vec<Block> {
    let mut body = Vec::new();
    match section {
        CvSection::PersonalInfo => {}
        CvSection::Experience => {
            for e in &doc.experience {
                push_item(
                    &mut body,
                    join_non_empty(&[e.title.as_deref(), e.company.as_deref()], " — "),
                    join_non_empty(
                        &[
                            Some(date_range(
                                e.start_date.as_deref(),
                                e.end_date.as_deref(),
                                e.current,
                            ))
                            .as_deref()
                            .filter(|s| !s.is_empty()),
                            e.location.as_deref(),
                        ],
                        " · ",
                    ),
                );
                if let Some(desc) = e.description.as_deref().filter(|s| !s.trim().is_empty()) {
                    body.push(Block::text(desc.trim(), "body"));
                }
                let achievements = non_empty_items(&e.achievements);
                if !achievements.is_empty() {
                    body.push(Block::List {
                        items: achievements,
                        style: "body".to_string(),
                    });
                }
            }
        }
        CvSection::Education => {
            for e in &doc.education {
                let degree = join_non_empty(&[e.degree.as_deref(), e.field_of_study.as_deref()], ", ");
                push_item(
                    &mut body,
                    join_non_empty(&[Some(degree.as_str()), e.institution.as_deref()], " — "),
                    join_non_empty(
                        &[
                            Some(date_range(e.start_date.as_deref(), e.end_date.as_deref(), false))
                                .as_deref()
                                .filter(|s| !s.is_empty()),
                            e.grade.as_deref(),
                        ],
                        " · ",
                    ),
                );
                if let Some(desc) = e.description.as_deref().filter(|s| !s.trim().is_empty()) {
                    body.push(Block::text(desc.trim(), "body"));
                }
            }
        }
        CvSection::Skills => {
            let technical = non_empty_items(&doc.skills.technical);
            let soft = non_empty_items(&doc.skills.soft);
            if template == CvTemplate::Modern {
                if !technical.is_empty() {
                    body.push(Block::List {
                        items: technical,
                        style: "body".to_string(),
                    });
                }
                if !soft.is_empty() {
                    body.push(Block::List {
                        items: soft,
                        style: "body".to_string(),
                    });
                }
            } else {
                if !technical.is_empty() {
                    body.push(Block::text(format!("Technical: {}", technical.join(", ")), "body"));
                }
                if !soft.is_empty() {
                    body.push(Block::text(format!("Soft: {}", soft.join(", ")), "body"));
                }
            }
        }
        CvSection::Languages => {
            let items: Vec<String> = doc
                .languages
                .iter()
                .filter_map(|l| {
                    let name = l.name.as_deref().filter(|s| !s.trim().is_empty())?;
                    Some(match l.proficiency.as_deref().filter(|s| !s.trim().is_empty()) {
                        Some(level) => format!("{} ({})", name.trim(), level.trim()),
                        None => name.trim().to_string(),
                    })
                })
                .collect();
            if !items.is_empty() {
                body.push(Block::List {
                    items,
                    style: "body".to_string(),
                });
            }
        }
        CvSection::Certifications => {
            for c in &doc.certifications {
                push_item(
                    &mut body,
                    c.name.as_deref().unwrap_or_default().trim().to_string(),
                    join_non_empty(
                        &[
                            c.issuer.as_deref(),
                            Some(format_month(c.date.as_deref().unwrap_or_default())).as_deref(),
                        ],
                        " · ",
                    ),
                );
            }
        }
        CvSection::Projects => {
            for p in &doc.projects {
                push_item(
                    &mut body,
                    p.name.as_deref().unwrap_or_default().trim().to_string(),
                    join_non_empty(
                        &[
                            Some(date_range(p.start_date.as_deref(), p.end_date.as_deref(), false))
                                .as_deref()
                                .filter(|s| !s.is_empty()),
                            p.url.as_deref(),
                        ],
                        " · ",
                    ),
                );
                if let Some(desc) = p.description.as_deref().filter(|s| !s.trim().is_empty()) {
                    body.push(Block::text(desc.trim(), "body"));
                }
                let tech = non_empty_items(&p.technologies);
                if !tech.is_empty() {
                    body.push(Block::text(tech.join(", "), "itemMeta"));
                }
            }
        }
        CvSection::Awards => {
            for a in &doc.awards {
                push_item(
                    &mut body,
                    a.title.as_deref().unwrap_or_default().trim().to_string(),
                    join_non_empty(
                        &[
                            a.issuer.as_deref(),
                            Some(format_month(a.date.as_deref().unwrap_or_default())).as_deref(),
                        ],
                        " · ",
                    ),
                );
                if let Some(desc) = a.description.as_deref().filter(|s| !s.trim().is_empty()) {
                    body.push(Block::text(desc.trim(), "body"));
                }
            }
        }
        CvSection::References => {
            for r in &doc.references {
                push_item(
                    &mut body,
                    r.name.as_deref().unwrap_or_default().trim().to_string(),
                    join_non_empty(
                        &[
                            r.position.as_deref(),
                            r.company.as_deref(),
                            r.email.as_deref(),
                            r.phone.as_deref(),
                        ],
                        " · ",
                    ),
                );
            }
        }
    }

    if body.is_empty() {
        return body;
    }

    let mut blocks = vec![Block::text(section.title(), "sectionHeader")];
    if template == CvTemplate::Classic {
        blocks.push(Block::Divider {
            color: palette.accent.to_string(),
        });
    }
    blocks.extend(body);
    blocks
}

fn push_item(body: &mut Vec<Block>, title: String, meta: String) {
    if !title.is_empty() {
        body.push(Block::text(title, "itemTitle"));
    }
    if !meta.is_empty() {
        body.push(Block::text(meta, "itemMeta"));
    }
}

pub(crate) fn non_empty_items(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub(crate) fn join_non_empty(parts: &[Option<&str>], sep: &str) -> String {
    parts
        .iter()
        .filter_map(|p| p.map(str::trim))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// `2021-03-15`, `2021-03` and `2021` become `Mar 2021` / `2021`.
/// Anything else is returned trimmed and unchanged.
pub fn format_month(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%b %Y").to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        return d.format("%b %Y").to_string();
    }
    if let Some(date_part) = raw.get(..10) {
        if raw.len() > 10 && raw.as_bytes()[10] == b'T' {
            if let Ok(d) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
                return d.format("%b %Y").to_string();
            }
        }
    }
    raw.to_string()
}

pub fn date_range(start: Option<&str>, end: Option<&str>, current: bool) -> String {
    let start = start.map(format_month).filter(|s| !s.is_empty());
    let end = if current {
        Some("Present".to_string())
    } else {
        end.map(format_month).filter(|s| !s.is_empty())
    };
    match (start, end) {
        (Some(s), Some(e)) => format!("{s} – {e}"),
        (Some(s), None) => format!("{s} – Present"),
        (None, Some(e)) => e,
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_doc() -> CvDocument {
        CvDocument::from_value(&json!({
            "personalInfo": {
                "fullName": "Ada Lovelace",
                "jobTitle": "Analyst",
                "email": "ada@example.com",
                "location": "London"
            },
            "experience": [{
                "title": "Engineer",
                "company": "Analytical Engines",
                "startDate": "2021-03",
                "current": true,
                "achievements": ["Wrote the first program", "  "]
            }],
            "skills": {"technical": ["Rust", "SQL"], "soft": []},
            "awards": []
        }))
    }

    fn texts(blocks: &[Block]) -> Vec<String> {
        let mut out = Vec::new();
        for b in blocks {
            match b {
                Block::Text { text, .. } => out.push(text.clone()),
                Block::List { items, .. } => out.extend(items.iter().cloned()),
                Block::Columns { columns, .. } => {
                    for col in columns {
                        out.extend(texts(col));
                    }
                }
                Block::Divider { .. } => {}
            }
        }
        out
    }

    #[test]
    fn test_format_month_variants() {
        assert_eq!(format_month("2021-03-15"), "Mar 2021");
        assert_eq!(format_month("2021-03"), "Mar 2021");
        assert_eq!(format_month("2021-03-15T10:00:00Z"), "Mar 2021");
        assert_eq!(format_month(" Summer 2019 "), "Summer 2019");
        assert_eq!(format_month(""), "");
    }

    #[test]
    fn test_date_range() {
        assert_eq!(date_range(Some("2020-01"), Some("2021-06"), false), "Jan 2020 – Jun 2021");
        assert_eq!(date_range(Some("2020-01"), Some("2021-06"), true), "Jan 2020 – Present");
        assert_eq!(date_range(Some("2020-01"), None, false), "Jan 2020 – Present");
        assert_eq!(date_range(None, None, false), "");
    }

    #[test]
    fn test_classic_renders_sections_in_order_and_skips_empty() {
        let def = render_document(&sample_doc(), CvTemplate::Classic);
        let all = texts(&def.content);
        assert_eq!(all[0], "Ada Lovelace");
        assert!(all.contains(&"Work Experience".to_string()));
        assert!(all.contains(&"Mar 2021 – Present".to_string()));
        assert!(all.contains(&"Technical: Rust, SQL".to_string()));
        assert!(!all.contains(&"Awards".to_string()));
        assert!(!all.iter().any(|t| t.trim().is_empty()));
        assert!(def.styles.contains_key("sectionHeader"));
    }

    #[test]
    fn test_modern_uses_two_columns_with_contact_in_sidebar() {
        let def = render_document(&sample_doc(), CvTemplate::Modern);
        let columns = def
            .content
            .iter()
            .find_map(|b| match b {
                Block::Columns { columns, .. } => Some(columns),
                _ => None,
            })
            .expect("modern layout has columns");
        assert_eq!(columns.len(), 2);
        let sidebar = texts(&columns[0]);
        assert!(sidebar.contains(&"ada@example.com".to_string()));
        assert!(sidebar.contains(&"Rust".to_string()));
        let main = texts(&columns[1]);
        assert!(main.contains(&"Engineer — Analytical Engines".to_string()));
    }

    #[test]
    fn test_template_parsing() {
        assert_eq!("Modern".parse::<CvTemplate>().unwrap(), CvTemplate::Modern);
        assert_eq!("default".parse::<CvTemplate>().unwrap(), CvTemplate::Classic);
        assert!("fancy".parse::<CvTemplate>().is_err());
    }

    #[test]
    fn test_serialized_blocks_are_tagged() {
        let value = serde_json::to_value(Block::text("Hi", "body")).unwrap();
        assert_eq!(value, json!({"type": "text", "text": "Hi", "style": "body"}));
    }
}
