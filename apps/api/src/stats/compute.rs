//! Dashboard statistics derived from a roadmap document on every request.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::stats::streak::{
    current_streak, heatmap, longest_streak, normalize_dates, parse_activity_date, streak_ending,
    weekly_activity, DayCount, HeatmapCell, HEATMAP_DAYS,
};

const NEXT_SKILLS_SHOWN: usize = 3;
const RECENT_COMPLETIONS_SHOWN: usize = 5;
const WEEKLY_TARGET_DAYS: usize = 3;

/// Strings and numbers read as text; anything else as absent.
fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// `true` and `"true"` are set; null and everything else are not.
fn loose_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoadmapSkill {
    #[serde(deserialize_with = "loose_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub category: Option<String>,
    #[serde(deserialize_with = "loose_bool")]
    pub completed: bool,
    #[serde(deserialize_with = "loose_string")]
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Goal {
    #[serde(deserialize_with = "loose_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub target_date: Option<String>,
    #[serde(deserialize_with = "loose_bool")]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillCompletion {
    #[serde(deserialize_with = "loose_string")]
    pub skill: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoadmapDocument {
    pub skills: Vec<RoadmapSkill>,
    pub activity_log: Vec<String>,
    pub goals: Vec<Goal>,
    pub skill_completions: Vec<SkillCompletion>,
}

impl RoadmapDocument {
    /// Typed view of a stored document. Lists are read element by element,
    /// so a malformed entry drops only itself.
    pub fn from_value(data: &Value) -> Self {
        fn take<T: DeserializeOwned>(data: &Value, key: &str) -> Vec<T> {
            data.get(key)
                .and_then(Value::as_array)
                .map(|arr| {
                    arr.iter()
                        .filter_map(|item| T::deserialize(item).ok())
                        .collect()
                })
                .unwrap_or_default()
        }
        let activity_log = data
            .get("activityLog")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            skills: take(data, "skills"),
            activity_log,
            goals: take(data, "goals"),
            skill_completions: take(data, "skillCompletions"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProgress {
    pub category: String,
    pub total: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillProgress {
    pub total: usize,
    pub completed: usize,
    pub percent: f64,
    pub by_category: Vec<CategoryProgress>,
    pub next_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub total: usize,
    pub completed: usize,
    pub overdue: usize,
    pub overdue_titles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentCompletion {
    pub skill: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_active_days: usize,
    pub total_activities: u32,
    pub heatmap: Vec<HeatmapCell>,
    pub weekly_activity: Vec<DayCount>,
    pub skills: SkillProgress,
    pub goals: GoalProgress,
    pub recent_completions: Vec<RecentCompletion>,
    pub suggestions: Vec<String>,
}

pub fn compute_stats(doc: &RoadmapDocument, today: NaiveDate) -> DashboardStats {
    let counts = normalize_dates(doc.activity_log.as_slice());
    let current = current_streak(&counts, today);
    let longest = longest_streak(&counts);
    let weekly = weekly_activity(&counts, today);
    let skills = skill_progress(doc);
    let goals = goal_progress(&doc.goals, today);

    let yesterday_streak = today
        .pred_opt()
        .map(|y| streak_ending(&counts, y))
        .unwrap_or(0);
    let active_days_this_week = weekly.iter().filter(|d| d.count > 0).count();

    let suggestions = suggestions(&SuggestionInputs {
        current_streak: current,
        longest_streak: longest,
        yesterday_streak,
        active_days_this_week,
        skills: &skills,
        goals: &goals,
    });

    DashboardStats {
        current_streak: current,
        longest_streak: longest,
        total_active_days: counts.len(),
        total_activities: counts.values().sum(),
        heatmap: heatmap(&counts, today, HEATMAP_DAYS),
        weekly_activity: weekly,
        skills,
        goals,
        recent_completions: recent_completions(&doc.skill_completions),
        suggestions,
    }
}

fn completed_names(doc: &RoadmapDocument) -> HashSet<String> {
    doc.skill_completions
        .iter()
        .filter_map(|c| c.skill.as_deref())
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// A skill counts as completed when flagged on the skill itself or when it
/// appears in the completion log.
pub fn skill_progress(doc: &RoadmapDocument) -> SkillProgress {
    let logged = completed_names(doc);
    let is_done = |s: &RoadmapSkill| {
        s.completed
            || s.name
                .as_deref()
                .is_some_and(|n| logged.contains(&n.trim().to_lowercase()))
    };

    let named: Vec<&RoadmapSkill> = doc
        .skills
        .iter()
        .filter(|s| s.name.as_deref().is_some_and(|n| !n.trim().is_empty()))
        .collect();

    let total = named.len();
    let completed = named.iter().filter(|s| is_done(**s)).count();
    let percent = if total == 0 {
        0.0
    } else {
        ((completed as f64 / total as f64) * 1000.0).round() / 10.0
    };

    let mut categories: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for skill in &named {
        let category = skill
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("General")
            .to_string();
        let entry = categories.entry(category).or_insert((0, 0));
        entry.0 += 1;
        if is_done(*skill) {
            entry.1 += 1;
        }
    }

    let next_skills = named
        .iter()
        .filter(|s| !is_done(**s))
        .filter_map(|s| s.name.as_deref().map(|n| n.trim().to_string()))
        .take(NEXT_SKILLS_SHOWN)
        .collect();

    SkillProgress {
        total,
        completed,
        percent,
        by_category: categories
            .into_iter()
            .map(|(category, (total, completed))| CategoryProgress {
                category,
                total,
                completed,
            })
            .collect(),
        next_skills,
    }
}

pub fn goal_progress(goals: &[Goal], today: NaiveDate) -> GoalProgress {
    let completed = goals.iter().filter(|g| g.completed).count();
    let overdue_titles: Vec<String> = goals
        .iter()
        .filter(|g| !g.completed)
        .filter(|g| {
            g.target_date
                .as_deref()
                .and_then(parse_activity_date)
                .is_some_and(|d| d < today)
        })
        .map(|g| {
            g.title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or("Untitled goal")
                .to_string()
        })
        .collect();

    GoalProgress {
        total: goals.len(),
        completed,
        overdue: overdue_titles.len(),
        overdue_titles,
    }
}

/// Most recent completions first; entries without a parseable date are left out.
fn recent_completions(completions: &[SkillCompletion]) -> Vec<RecentCompletion> {
    let mut dated: Vec<RecentCompletion> = completions
        .iter()
        .filter_map(|c| {
            let skill = c.skill.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
            let date = c.date.as_deref().and_then(parse_activity_date)?;
            Some(RecentCompletion {
                skill: skill.to_string(),
                date,
            })
        })
        .collect();
    dated.sort_by(|a, b| b.date.cmp(&a.date));
    dated.truncate(RECENT_COMPLETIONS_SHOWN);
    dated
}

struct SuggestionInputs<'a> {
    current_streak: u32,
    longest_streak: u32,
    yesterday_streak: u32,
    active_days_this_week: usize,
    skills: &'a SkillProgress,
    goals: &'a GoalProgress,
}

fn suggestions(inputs: &SuggestionInputs<'_>) -> Vec<String> {
    let mut out = Vec::new();

    if inputs.current_streak == 0 {
        if inputs.yesterday_streak > 0 {
            out.push(format!(
                "Log an activity today to keep your {}-day streak alive",
                inputs.yesterday_streak
            ));
        } else {
            out.push("Log an activity today to start a new streak".to_string());
        }
    } else if inputs.current_streak >= 3 && inputs.current_streak == inputs.longest_streak {
        out.push(format!(
            "You're on your longest streak yet: {} days",
            inputs.current_streak
        ));
    }

    if inputs.skills.total == 0 {
        out.push("Add skills to your roadmap to track your progress".to_string());
    } else if let Some(next) = inputs.skills.next_skills.first() {
        out.push(format!("Next up on your roadmap: {next}"));
    } else {
        out.push("Every roadmap skill is complete. Add new ones to keep growing".to_string());
    }

    if inputs.goals.overdue > 0 {
        out.push(format!(
            "{} goal{} past the target date. Review or reschedule",
            inputs.goals.overdue,
            if inputs.goals.overdue == 1 { " is" } else { "s are" }
        ));
    }
    if inputs.goals.total == 0 {
        out.push("Set a goal with a target date to stay focused".to_string());
    }

    if inputs.active_days_this_week < WEEKLY_TARGET_DAYS {
        out.push(format!(
            "Aim for at least {WEEKLY_TARGET_DAYS} active days this week ({} so far)",
            inputs.active_days_this_week
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_empty_document_still_has_suggestions() {
        let stats = compute_stats(&RoadmapDocument::default(), day("2024-05-10"));
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.total_activities, 0);
        assert_eq!(stats.heatmap.len(), HEATMAP_DAYS as usize);
        assert_eq!(
            stats.suggestions[0],
            "Log an activity today to start a new streak"
        );
        assert!(stats
            .suggestions
            .iter()
            .any(|s| s.contains("Add skills")));
    }

    #[test]
    fn test_from_value_reads_camel_case_document() {
        let doc = RoadmapDocument::from_value(&json!({
            "skills": [
                {"name": "Rust", "category": "Languages", "completed": true},
                {"name": "Tokio", "category": "Languages"},
                {"name": "SQL"},
                {"name": "  "}
            ],
            "activityLog": ["2024-05-09", "2024-05-10", 42],
            "goals": [
                {"title": "Ship portfolio", "targetDate": "2024-05-01"},
                {"title": "Apply to 10 jobs", "targetDate": "2024-06-01"},
                {"title": "Done", "targetDate": "2024-01-01", "completed": true}
            ],
            "skillCompletions": [
                {"skill": "sql", "date": "2024-05-08"},
                {"skill": "Rust", "date": "2024-04-01T10:00:00Z"}
            ]
        }));
        let stats = compute_stats(&doc, day("2024-05-10"));

        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.total_activities, 2);
        assert_eq!(stats.skills.total, 3);
        assert_eq!(stats.skills.completed, 2);
        assert!((stats.skills.percent - 66.7).abs() < 1e-9);
        assert_eq!(stats.skills.next_skills, vec!["Tokio".to_string()]);
        assert_eq!(
            stats.skills.by_category,
            vec![
                CategoryProgress {
                    category: "General".into(),
                    total: 1,
                    completed: 1
                },
                CategoryProgress {
                    category: "Languages".into(),
                    total: 2,
                    completed: 1
                },
            ]
        );
        assert_eq!(stats.goals.overdue_titles, vec!["Ship portfolio".to_string()]);
        assert_eq!(stats.recent_completions[0].skill, "sql");
        assert!(stats
            .suggestions
            .contains(&"Next up on your roadmap: Tokio".to_string()));
        assert!(stats
            .suggestions
            .contains(&"1 goal is past the target date. Review or reschedule".to_string()));
    }

    #[test]
    fn test_from_value_tolerates_loose_entries() {
        let doc = RoadmapDocument::from_value(&json!({
            "skills": [
                {"name": "Rust", "completed": true},
                {"name": "Tokio", "completed": false},
                {"name": "SQL", "completed": null},
                {"name": 101, "completed": "true"},
                "not an object"
            ],
            "goals": [
                {"title": "A", "targetDate": "2024-01-01"},
                {"title": "B", "targetDate": null, "completed": null},
                {"title": "C", "targetDate": 5}
            ]
        }));
        let stats = compute_stats(&doc, day("2024-05-10"));

        assert_eq!(stats.skills.total, 4);
        assert_eq!(stats.skills.completed, 2);
        assert_eq!(stats.skills.next_skills, vec!["Tokio", "SQL"]);
        assert_eq!(stats.goals.total, 3);
        assert_eq!(stats.goals.overdue_titles, vec!["A".to_string()]);
        assert!(!stats.suggestions.iter().any(|s| s.contains("Add skills")));
    }

    #[test]
    fn test_streak_at_risk_suggestion() {
        let doc = RoadmapDocument {
            activity_log: vec!["2024-05-08".into(), "2024-05-09".into()],
            ..Default::default()
        };
        let stats = compute_stats(&doc, day("2024-05-10"));
        assert_eq!(stats.current_streak, 0);
        assert_eq!(
            stats.suggestions[0],
            "Log an activity today to keep your 2-day streak alive"
        );
    }

    #[test]
    fn test_longest_streak_milestone() {
        let doc = RoadmapDocument {
            activity_log: vec![
                "2024-05-08".into(),
                "2024-05-09".into(),
                "2024-05-10".into(),
            ],
            ..Default::default()
        };
        let stats = compute_stats(&doc, day("2024-05-10"));
        assert_eq!(stats.suggestions[0], "You're on your longest streak yet: 3 days");
        // three active days this week, so no weekly nudge
        assert!(!stats.suggestions.iter().any(|s| s.starts_with("Aim for")));
    }
}
