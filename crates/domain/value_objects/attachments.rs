use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    enums::plan_tiers::PlanTier,
    plans::{ALLOWED_ATTACHMENT_MIMES, AttachmentLimits, PlanLimits},
};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AttachmentFileMeta {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateAttachmentsRequest {
    pub files: Vec<AttachmentFileMeta>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachmentViolationCode {
    InvalidFile,
    PlanRequired,
    MaxFiles,
    SizeLimit,
    MimeNotAllowed,
    DailyQuota,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AttachmentViolation {
    pub code: AttachmentViolationCode,
    pub message: String,
    pub details: serde_json::Value,
}

impl std::fmt::Display for AttachmentViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AttachmentValidation {
    pub plan_tier: PlanTier,
    pub accepted_files: usize,
    pub daily_used: i64,
    pub daily_limit: i64,
}

/// Checks that do not need the daily usage count. Returns the tier's attachment limits.
pub fn check_files_against_plan(
    limits: &PlanLimits,
    files: &[AttachmentFileMeta],
) -> Result<AttachmentLimits, AttachmentViolation> {
    if files.is_empty() {
        return Err(violation(
            AttachmentViolationCode::InvalidFile,
            "no files were provided".to_string(),
            serde_json::json!({}),
        ));
    }
    if let Some(empty) = files.iter().find(|f| f.size_bytes == 0) {
        return Err(violation(
            AttachmentViolationCode::InvalidFile,
            format!("file \"{}\" is empty", empty.file_name),
            serde_json::json!({ "file_name": empty.file_name }),
        ));
    }

    let attachment_limits = match AttachmentLimits::for_tier(limits.plan_tier) {
        Some(attachment_limits) if limits.allow_attachments => attachment_limits,
        _ => {
            return Err(violation(
                AttachmentViolationCode::PlanRequired,
                "attachments require a paid plan".to_string(),
                serde_json::json!({ "plan_tier": limits.plan_tier }),
            ));
        }
    };

    if files.len() > attachment_limits.max_files {
        return Err(violation(
            AttachmentViolationCode::MaxFiles,
            format!("at most {} files per message", attachment_limits.max_files),
            serde_json::json!({
                "max_files": attachment_limits.max_files,
                "provided": files.len(),
            }),
        ));
    }

    for file in files {
        if file.size_bytes > attachment_limits.max_size_bytes() {
            return Err(violation(
                AttachmentViolationCode::SizeLimit,
                format!(
                    "file \"{}\" exceeds {}MB",
                    file.file_name, attachment_limits.max_size_mb
                ),
                serde_json::json!({
                    "file_name": file.file_name,
                    "size_bytes": file.size_bytes,
                    "max_size_mb": attachment_limits.max_size_mb,
                }),
            ));
        }

        if !AttachmentLimits::allows_mime(&file.mime_type) {
            return Err(violation(
                AttachmentViolationCode::MimeNotAllowed,
                format!("file type \"{}\" is not allowed", file.mime_type),
                serde_json::json!({
                    "file_name": file.file_name,
                    "mime_type": file.mime_type,
                    "allowed": ALLOWED_ATTACHMENT_MIMES,
                }),
            ));
        }
    }

    Ok(attachment_limits)
}

pub fn check_daily_quota(
    attachment_limits: &AttachmentLimits,
    used_today: i64,
    incoming: usize,
) -> Result<(), AttachmentViolation> {
    let incoming = i64::try_from(incoming).unwrap_or(i64::MAX);
    if used_today.saturating_add(incoming) > attachment_limits.daily_count {
        return Err(violation(
            AttachmentViolationCode::DailyQuota,
            format!(
                "daily attachment limit reached ({used_today}/{})",
                attachment_limits.daily_count
            ),
            serde_json::json!({
                "current": used_today,
                "limit": attachment_limits.daily_count,
                "trying": incoming,
            }),
        ));
    }
    Ok(())
}

fn violation(
    code: AttachmentViolationCode,
    message: String,
    details: serde_json::Value,
) -> AttachmentViolation {
    AttachmentViolation {
        code,
        message,
        details,
    }
}
