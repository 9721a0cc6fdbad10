use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Pro,
    Professional,
    Business,
    Premium,
}

impl PlanTier {
    pub const ALL: [PlanTier; 5] = [
        PlanTier::Free,
        PlanTier::Pro,
        PlanTier::Professional,
        PlanTier::Business,
        PlanTier::Premium,
    ];

    pub fn is_paid(&self) -> bool {
        !matches!(self, PlanTier::Free)
    }

    /// Higher rank means a larger plan. Used to tell upgrades from downgrades.
    pub fn rank(&self) -> u8 {
        match self {
            PlanTier::Free => 0,
            PlanTier::Pro => 1,
            PlanTier::Professional => 2,
            PlanTier::Business => 3,
            PlanTier::Premium => 4,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlanTier::Free => "Free",
            PlanTier::Pro => "Pro",
            PlanTier::Professional => "Profesional",
            PlanTier::Business => "Business",
            PlanTier::Premium => "Premium",
        }
    }

    /// Reads a stored tier. Only the canonical lowercase names match, the same
    /// values the SQL filters compare against. Anything else counts as free.
    pub fn from_db(value: Option<&str>) -> Self {
        value
            .and_then(|raw| PlanTier::ALL.into_iter().find(|tier| tier.to_string() == raw))
            .unwrap_or_default()
    }

    /// Stored `plan_tier` values of every paid tier.
    pub fn paid_db_values() -> Vec<String> {
        PlanTier::ALL
            .iter()
            .filter(|tier| tier.is_paid())
            .map(|tier| tier.to_string())
            .collect()
    }
}

impl Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tier = match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
            PlanTier::Professional => "professional",
            PlanTier::Business => "business",
            PlanTier::Premium => "premium",
        };
        write!(f, "{}", tier)
    }
}

impl FromStr for PlanTier {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(PlanTier::Free),
            "pro" => Ok(PlanTier::Pro),
            "professional" => Ok(PlanTier::Professional),
            "business" => Ok(PlanTier::Business),
            "premium" => Ok(PlanTier::Premium),
            other => Err(anyhow::anyhow!("Unknown plan tier: {other}")),
        }
    }
}
