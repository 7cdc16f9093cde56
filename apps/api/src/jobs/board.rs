//! Rebuilds the Kanban board from stored applications.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::jobs::{Priority, Stage};
use crate::models::application::JobApplicationRow;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationCard {
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub stage: Stage,
    pub priority: Priority,
    pub job_id: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub applied_at: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl From<JobApplicationRow> for ApplicationCard {
    /// Rows with a stage or priority this version does not know fall back to
    /// `submitted` / `medium` instead of dropping off the board.
    fn from(row: JobApplicationRow) -> Self {
        let stage = row.stage.parse().unwrap_or_else(|_| {
            warn!("Application {} has unknown stage '{}'", row.id, row.stage);
            Stage::Submitted
        });
        let priority = row.priority.parse().unwrap_or_default();
        Self {
            id: row.id,
            company: row.company,
            position: row.position,
            stage,
            priority,
            job_id: row.job_id,
            location: row.location,
            notes: row.notes,
            applied_at: row.applied_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub stage: Stage,
    pub title: &'static str,
    pub count: usize,
    pub cards: Vec<ApplicationCard>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    pub total: usize,
    pub by_stage: BTreeMap<Stage, usize>,
    /// Percentage of applications that moved past `submitted`.
    pub response_rate: u32,
    /// Percentage of applications that reached `offer` or `accepted`.
    pub offer_rate: u32,
}

/// Five columns in pipeline order, present even when empty. Cards are
/// ordered high priority first, then most recently updated.
pub fn build_board(rows: Vec<JobApplicationRow>) -> Vec<BoardColumn> {
    let mut grouped: BTreeMap<Stage, Vec<ApplicationCard>> =
        Stage::ALL.into_iter().map(|s| (s, Vec::new())).collect();
    for card in rows.into_iter().map(ApplicationCard::from) {
        grouped.entry(card.stage).or_default().push(card);
    }

    grouped
        .into_iter()
        .map(|(stage, mut cards)| {
            cards.sort_by_key(|c| (Reverse(c.priority), Reverse(c.updated_at)));
            BoardColumn {
                stage,
                title: stage.title(),
                count: cards.len(),
                cards,
            }
        })
        .collect()
}

fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

pub fn board_summary(columns: &[BoardColumn]) -> BoardSummary {
    let by_stage: BTreeMap<Stage, usize> = columns.iter().map(|c| (c.stage, c.count)).collect();
    let total: usize = by_stage.values().sum();
    let responded: usize = by_stage
        .iter()
        .filter(|(stage, _)| stage.has_response())
        .map(|(_, n)| n)
        .sum();
    let offers = by_stage.get(&Stage::Offer).copied().unwrap_or(0)
        + by_stage.get(&Stage::Accepted).copied().unwrap_or(0);

    BoardSummary {
        total,
        by_stage,
        response_rate: percent(responded, total),
        offer_rate: percent(offers, total),
    }
}
