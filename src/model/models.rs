use std::{fmt, io, str::FromStr};

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::Error;

#[derive(Debug, Clone, FromRow, Deserialize, Serialize)]
pub struct Proposal {
    pub id: i64,
    pub headline: String,
    pub funds_target: BigDecimal,
    /// Last persisted percentage, a cache of reconciliation output.
    pub funds_progress: BigDecimal,
    pub funds_withdrew: BigDecimal,
    /// Assigned once, never rewritten.
    pub addr_donation: Option<String>,
    pub payment_id: Option<String>,
    pub status: i16,
    pub date_added: DateTime<Utc>,
}

impl Proposal {
    pub fn status(&self) -> Result<ProposalStatus, Error> {
        ProposalStatus::try_from(self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProposalStatus {
    Disabled,
    Proposed,
    FundingRequired,
    InProgress,
    Completed,
}

impl ProposalStatus {
    pub fn accepts_donations(&self) -> bool {
        matches!(
            self,
            ProposalStatus::FundingRequired | ProposalStatus::InProgress
        )
    }
}

impl From<ProposalStatus> for i16 {
    fn from(value: ProposalStatus) -> Self {
        match value {
            ProposalStatus::Disabled => 0,
            ProposalStatus::Proposed => 1,
            ProposalStatus::FundingRequired => 2,
            ProposalStatus::InProgress => 3,
            ProposalStatus::Completed => 4,
        }
    }
}

impl TryFrom<i16> for ProposalStatus {
    type Error = Error;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ProposalStatus::Disabled),
            1 => Ok(ProposalStatus::Proposed),
            2 => Ok(ProposalStatus::FundingRequired),
            3 => Ok(ProposalStatus::InProgress),
            4 => Ok(ProposalStatus::Completed),
            _ => Err(Error::InvalidOption {
                option: format!("proposal status {}", value),
            }),
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProposalStatus::Disabled => write!(f, "disabled"),
            ProposalStatus::Proposed => write!(f, "proposed"),
            ProposalStatus::FundingRequired => write!(f, "funding-required"),
            ProposalStatus::InProgress => write!(f, "in-progress"),
            ProposalStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for ProposalStatus {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<ProposalStatus, Self::Err> {
        match value {
            "disabled" => Ok(ProposalStatus::Disabled),
            "proposed" => Ok(ProposalStatus::Proposed),
            "funding-required" => Ok(ProposalStatus::FundingRequired),
            "in-progress" => Ok(ProposalStatus::InProgress),
            "completed" => Ok(ProposalStatus::Completed),
            _ => Err(io::Error::other("Proposal status not supported")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProposal {
    pub headline: String,
    pub funds_target: BigDecimal,
    #[serde(default = "NewProposal::default_status")]
    pub status: ProposalStatus,
}

impl NewProposal {
    fn default_status() -> ProposalStatus {
        ProposalStatus::Proposed
    }

    /// Creation-time guard: reconciliation never sees a non-positive target.
    pub fn validate(&self) -> Result<(), Error> {
        if self.headline.trim().is_empty() {
            return Err(Error::ConfigurationError(String::from(
                "proposal headline is empty",
            )));
        }

        if self.funds_target <= BigDecimal::zero() {
            return Err(Error::ConfigurationError(format!(
                "funds target must be positive, got {}",
                self.funds_target
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_proposal(target: &str) -> NewProposal {
        NewProposal {
            headline: String::from("Fund a node"),
            funds_target: BigDecimal::from_str(target).unwrap(),
            status: ProposalStatus::Proposed,
        }
    }

    #[test]
    fn test_validate_positive_target() {
        assert!(new_proposal("0.5").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_target() {
        assert!(matches!(
            new_proposal("0").validate(),
            Err(Error::ConfigurationError(_))
        ));
        assert!(matches!(
            new_proposal("-10").validate(),
            Err(Error::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_blank_headline() {
        let mut proposal = new_proposal("10");
        proposal.headline = String::from("  ");

        assert!(proposal.validate().is_err());
    }

    #[test]
    fn test_status_codes() {
        for status in [
            ProposalStatus::Disabled,
            ProposalStatus::Proposed,
            ProposalStatus::FundingRequired,
            ProposalStatus::InProgress,
            ProposalStatus::Completed,
        ] {
            let code: i16 = status.into();
            assert_eq!(ProposalStatus::try_from(code).unwrap(), status);
            assert_eq!(
                status.to_string().parse::<ProposalStatus>().unwrap(),
                status
            );
        }
        assert!(ProposalStatus::try_from(9).is_err());
    }

    #[test]
    fn test_new_proposal_defaults_to_proposed() {
        let proposal: NewProposal = serde_json::from_str(
            r#"{"headline": "Fund a node", "funds_target": "100"}"#,
        )
        .unwrap();

        assert_eq!(proposal.status, ProposalStatus::Proposed);
    }
}
