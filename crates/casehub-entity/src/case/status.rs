//! Case status and patient gender enums.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Workflow status of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CaseStatus {
    /// Case is being worked on.
    #[default]
    #[serde(rename = "In Process")]
    InProcess,
    /// Case was cancelled.
    #[serde(rename = "Cancelled")]
    Cancelled,
    /// Case is complete.
    #[serde(rename = "Completed")]
    Completed,
}

impl CaseStatus {
    /// Stored text representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProcess => "In Process",
            Self::Cancelled => "Cancelled",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "In Process" => Ok(Self::InProcess),
            "Cancelled" => Ok(Self::Cancelled),
            "Completed" => Ok(Self::Completed),
            other => Err(format!("Unknown case status: {other}")),
        }
    }
}

/// Patient gender as recorded on the case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Other.
    Other,
}

impl Gender {
    /// Stored text representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            other => Err(format!("Unknown gender: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text_roundtrip() {
        for status in [CaseStatus::InProcess, CaseStatus::Cancelled, CaseStatus::Completed] {
            assert_eq!(status.as_str().parse::<CaseStatus>(), Ok(status));
        }
        assert_eq!(
            serde_json::to_string(&CaseStatus::InProcess).expect("serialize"),
            "\"In Process\""
        );
    }
}
