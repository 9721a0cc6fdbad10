use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    Scam,
    FakeImages,
    UnrealisticPrice,
    WrongLocation,
    NotAvailable,
    FalseInfo,
    Duplicate,
    Other,
}

impl Display for ReportReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            ReportReason::Scam => "scam",
            ReportReason::FakeImages => "fake_images",
            ReportReason::UnrealisticPrice => "unrealistic_price",
            ReportReason::WrongLocation => "wrong_location",
            ReportReason::NotAvailable => "not_available",
            ReportReason::FalseInfo => "false_info",
            ReportReason::Duplicate => "duplicate",
            ReportReason::Other => "other",
        };
        write!(f, "{}", reason)
    }
}
