// Organization administration and user profile, served by the Java backend.

pub mod handlers;

use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// Moderation action applied to an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgAction {
    Approve,
    Ban,
}

impl OrgAction {
    pub fn as_str(self) -> &'static str {
        match self {
            OrgAction::Approve => "approve",
            OrgAction::Ban => "ban",
        }
    }
}

impl fmt::Display for OrgAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Organization listing filter accepted by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgStatus {
    Pending,
    Approved,
    Banned,
}

impl OrgStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrgStatus::Pending => "pending",
            OrgStatus::Approved => "approved",
            OrgStatus::Banned => "banned",
        }
    }
}

impl FromStr for OrgStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(OrgStatus::Pending),
            "approved" => Ok(OrgStatus::Approved),
            "banned" => Ok(OrgStatus::Banned),
            _ => Err(AppError::Validation(format!(
                "Unknown organization status '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_status_parsing() {
        assert_eq!("PENDING".parse::<OrgStatus>().unwrap(), OrgStatus::Pending);
        assert_eq!(" banned".parse::<OrgStatus>().unwrap().as_str(), "banned");
        assert!("deleted".parse::<OrgStatus>().is_err());
    }
}
