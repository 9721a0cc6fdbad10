use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeactivationReason {
    PlanExpired,
    PlanDowngrade,
    ManualArchive,
    Reported,
}

impl DeactivationReason {
    /// Reasons set by plan enforcement. Only these are restored on upgrade.
    pub const AUTOMATIC: [DeactivationReason; 2] =
        [DeactivationReason::PlanExpired, DeactivationReason::PlanDowngrade];

    pub fn is_automatic(&self) -> bool {
        Self::AUTOMATIC.contains(self)
    }
}

impl Display for DeactivationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            DeactivationReason::PlanExpired => "plan_expired",
            DeactivationReason::PlanDowngrade => "plan_downgrade",
            DeactivationReason::ManualArchive => "manual_archive",
            DeactivationReason::Reported => "reported",
        };
        write!(f, "{}", reason)
    }
}

impl FromStr for DeactivationReason {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "plan_expired" => Ok(DeactivationReason::PlanExpired),
            "plan_downgrade" => Ok(DeactivationReason::PlanDowngrade),
            "manual_archive" => Ok(DeactivationReason::ManualArchive),
            "reported" => Ok(DeactivationReason::Reported),
            other => Err(anyhow::anyhow!("Unknown deactivation reason: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_plan_reasons_are_automatic() {
        assert!(DeactivationReason::PlanExpired.is_automatic());
        assert!(DeactivationReason::PlanDowngrade.is_automatic());
        assert!(!DeactivationReason::ManualArchive.is_automatic());
        assert!(!DeactivationReason::Reported.is_automatic());
    }
}
