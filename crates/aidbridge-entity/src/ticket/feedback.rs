//! Requester feedback recorded on a completed ticket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aidbridge_core::AppError;

/// Maximum feedback comment length in characters.
const MAX_COMMENT_LEN: usize = 2000;

/// A one-time rating left by the requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Rating between 1 and 5 inclusive.
    pub rating: u8,
    /// Optional free-text comment.
    pub comment: Option<String>,
    /// When the feedback was submitted.
    pub submitted_at: DateTime<Utc>,
}

impl Feedback {
    /// Validate a raw rating and comment.
    pub fn new(rating: i64, comment: Option<String>) -> Result<Self, AppError> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::validation(format!(
                "Rating must be an integer from 1 to 5, got {rating}"
            )));
        }

        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if comment
            .as_ref()
            .is_some_and(|c| c.chars().count() > MAX_COMMENT_LEN)
        {
            return Err(AppError::validation(format!(
                "Comment must be at most {MAX_COMMENT_LEN} characters"
            )));
        }

        Ok(Self {
            rating: rating as u8,
            comment,
            submitted_at: Utc::now(),
        })
    }
}
