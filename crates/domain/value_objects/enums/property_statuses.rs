use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStatus {
    #[default]
    Available,
    Rented,
    Sold,
    Maintenance,
    Reserved,
    Expired,
    Suspended,
}

impl PropertyStatus {
    /// Statuses an owner may set. Suspension is reserved for moderation.
    pub fn is_owner_settable(&self) -> bool {
        !matches!(self, PropertyStatus::Suspended)
    }
}

impl Display for PropertyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            PropertyStatus::Available => "AVAILABLE",
            PropertyStatus::Rented => "RENTED",
            PropertyStatus::Sold => "SOLD",
            PropertyStatus::Maintenance => "MAINTENANCE",
            PropertyStatus::Reserved => "RESERVED",
            PropertyStatus::Expired => "EXPIRED",
            PropertyStatus::Suspended => "SUSPENDED",
        };
        write!(f, "{}", status)
    }
}

impl FromStr for PropertyStatus {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "AVAILABLE" => Ok(PropertyStatus::Available),
            "RENTED" => Ok(PropertyStatus::Rented),
            "SOLD" => Ok(PropertyStatus::Sold),
            "MAINTENANCE" => Ok(PropertyStatus::Maintenance),
            "RESERVED" => Ok(PropertyStatus::Reserved),
            "EXPIRED" => Ok(PropertyStatus::Expired),
            "SUSPENDED" => Ok(PropertyStatus::Suspended),
            other => Err(anyhow::anyhow!("Unknown property status: {other}")),
        }
    }
}
