//! Job application tracker: pipeline stages, priorities and the Kanban board.

pub mod board;
pub mod handlers;
pub mod store;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Pipeline position of an application. Declaration order is column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Submitted,
    Interview,
    Offer,
    Accepted,
    Rejected,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Submitted,
        Stage::Interview,
        Stage::Offer,
        Stage::Accepted,
        Stage::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Submitted => "submitted",
            Stage::Interview => "interview",
            Stage::Offer => "offer",
            Stage::Accepted => "accepted",
            Stage::Rejected => "rejected",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Stage::Submitted => "Submitted",
            Stage::Interview => "Interview",
            Stage::Offer => "Offer",
            Stage::Accepted => "Accepted",
            Stage::Rejected => "Rejected",
        }
    }

    /// Whether the employer has answered the application.
    pub fn has_response(self) -> bool {
        self != Stage::Submitted
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "submitted" | "applied" => Ok(Stage::Submitted),
            "interview" | "interviewing" => Ok(Stage::Interview),
            "offer" => Ok(Stage::Offer),
            "accepted" => Ok(Stage::Accepted),
            "rejected" => Ok(Stage::Rejected),
            _ => Err(AppError::Validation(format!("Unknown stage '{s}'"))),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "normal" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(AppError::Validation(format!("Unknown priority '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_parsing() {
        assert_eq!("Interview".parse::<Stage>().unwrap(), Stage::Interview);
        assert_eq!(" applied ".parse::<Stage>().unwrap(), Stage::Submitted);
        assert!(matches!(
            "ghosted".parse::<Stage>(),
            Err(AppError::Validation(_))
        ));
        for stage in Stage::ALL {
            assert_eq!(stage.as_str().parse::<Stage>().unwrap(), stage);
        }
    }

    #[test]
    fn test_priority_ordering_and_parsing() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(Priority::default(), Priority::Medium);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_stage_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(Stage::Offer).unwrap(),
            serde_json::json!("offer")
        );
    }
}
