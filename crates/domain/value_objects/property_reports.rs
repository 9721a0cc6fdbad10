use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::enums::report_reasons::ReportReason;

pub const REPORT_DETAILS_MIN_CHARS: usize = 10;
pub const REPORT_DETAILS_MAX_CHARS: usize = 500;

/// Reports at which a listing is suspended without waiting for an admin.
pub const AUTO_SUSPEND_THRESHOLD: i64 = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct ReportPropertyRequest {
    pub reason: ReportReason,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReportPropertyResult {
    pub report_id: Uuid,
    pub total_reports: i64,
    pub auto_suspended: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RemovePropertyResult {
    pub property_id: Uuid,
    pub resolved_reports: usize,
}

/// Returns the trimmed details, or a message describing why they are rejected.
pub fn validate_report_details(details: &str) -> Result<String, String> {
    let trimmed = details.trim();
    let chars = trimmed.chars().count();

    if chars < REPORT_DETAILS_MIN_CHARS {
        return Err(format!(
            "details must be at least {REPORT_DETAILS_MIN_CHARS} characters"
        ));
    }
    if chars > REPORT_DETAILS_MAX_CHARS {
        return Err(format!(
            "details must be at most {REPORT_DETAILS_MAX_CHARS} characters"
        ));
    }

    Ok(trimmed.to_string())
}
