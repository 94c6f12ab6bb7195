//! Input validation for activity and registration operations

use crate::contract::ClubError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Longest accepted search keyword
pub const MAX_KEYWORD_LEN: usize = 50;

/// Longest accepted activity title
pub const MAX_TITLE_LEN: usize = 100;

/// Longest accepted registration note
pub const MAX_NOTE_LEN: usize = 200;

/// Validate and normalize a search keyword: trimmed, non-empty, bounded.
pub fn validate_keyword(raw: &str) -> Result<String, ClubError> {
    let keyword = raw.trim();
    if keyword.is_empty() {
        return Err(ClubError::InvalidArgument {
            message: "search keyword cannot be empty".to_string(),
        });
    }
    if keyword.chars().count() > MAX_KEYWORD_LEN {
        return Err(ClubError::InvalidArgument {
            message: format!("search keyword cannot exceed {} characters", MAX_KEYWORD_LEN),
        });
    }
    Ok(keyword.to_string())
}

/// Validate an activity title for publication: present and bounded.
pub fn validate_title(title: &str) -> Result<(), ClubError> {
    if title.trim().is_empty() {
        return Err(ClubError::InvalidArgument {
            message: "title cannot be blank".to_string(),
        });
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ClubError::InvalidArgument {
            message: format!("title cannot exceed {} characters", MAX_TITLE_LEN),
        });
    }
    Ok(())
}

/// Validate a user identifier: non-blank.
pub fn validate_user_id(user_id: &str) -> Result<(), ClubError> {
    if user_id.trim().is_empty() {
        return Err(ClubError::InvalidArgument {
            message: "user id cannot be blank".to_string(),
        });
    }
    Ok(())
}

/// Validate an optional registration note: bounded length.
pub fn validate_note(note: Option<&str>) -> Result<(), ClubError> {
    if let Some(note) = note {
        if note.chars().count() > MAX_NOTE_LEN {
            return Err(ClubError::InvalidArgument {
                message: format!("note cannot exceed {} characters", MAX_NOTE_LEN),
            });
        }
    }
    Ok(())
}

/// Validate the schedule and pricing fields shared by create and update:
/// end after start, non-negative fee, positive participant cap.
pub fn validate_schedule(
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    fee_amount: Decimal,
    max_participants: Option<i32>,
) -> Result<(), ClubError> {
    if end_time <= start_time {
        return Err(ClubError::InvalidArgument {
            message: "end time must be after start time".to_string(),
        });
    }
    if fee_amount < Decimal::ZERO {
        return Err(ClubError::InvalidArgument {
            message: "fee amount cannot be negative".to_string(),
        });
    }
    if let Some(cap) = max_participants {
        if cap < 1 {
            return Err(ClubError::InvalidArgument {
                message: "participant cap must be at least 1".to_string(),
            });
        }
    }
    Ok(())
}
