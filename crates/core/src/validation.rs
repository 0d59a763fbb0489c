//! Poll validation.
//!
//! Every mutation entry point runs one of these checks before touching the
//! store, and interactive form layers call the same functions so the rules
//! never drift apart. All checks are pure and the first failure wins, in the
//! order id, title, description, options.

use std::fmt;

use pollbox_common::AppError;
use thiserror::Error;

use crate::model::PollOption;

/// Minimum number of options a poll must carry.
pub const MIN_OPTIONS: usize = 2;

/// Which rule rejected the option list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionRule {
    /// Non-empty texts after trimming (creation).
    NonEmpty,
    /// Raw entry count (update).
    Count,
}

impl fmt::Display for OptionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonEmpty => f.write_str("At least 2 valid options are required"),
            Self::Count => f.write_str("At least 2 options are required"),
        }
    }
}

/// Reason a proposed mutation was rejected.
///
/// The `Display` output is the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is required")]
    MissingTitle,

    #[error("Description is required")]
    MissingDescription,

    #[error("{0}")]
    InsufficientOptions(OptionRule),

    #[error("Poll ID is required")]
    MissingId,

    #[error("Poll ID is required")]
    MissingPollId,

    #[error("Option ID is required")]
    MissingOptionId,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Normalized creation payload, ready for identifier assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCreate {
    pub title: String,
    pub description: String,
    /// Non-empty option texts in their original relative order.
    pub options: Vec<String>,
}

/// Check a creation payload.
///
/// Title and description are trimmed before the emptiness check. Options are
/// trimmed and blank ones dropped; at least two must survive.
pub fn validate_create<S: AsRef<str>>(
    title: &str,
    description: &str,
    option_texts: &[S],
) -> Result<ValidatedCreate, ValidationError> {
    let title = require_text(title, ValidationError::MissingTitle)?;
    let description = require_text(description, ValidationError::MissingDescription)?;

    let options: Vec<String> = option_texts
        .iter()
        .map(|text| text.as_ref().trim())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect();

    if options.len() < MIN_OPTIONS {
        return Err(ValidationError::InsufficientOptions(OptionRule::NonEmpty));
    }

    Ok(ValidatedCreate {
        title: title.to_string(),
        description: description.to_string(),
        options,
    })
}

/// Check an update payload.
///
/// Unlike [`validate_create`], the option count is taken as given: entries
/// with blank text still count towards the minimum.
pub fn validate_update(
    id: &str,
    title: &str,
    description: &str,
    options: &[PollOption],
) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::MissingId);
    }
    require_text(title, ValidationError::MissingTitle)?;
    require_text(description, ValidationError::MissingDescription)?;

    if options.len() < MIN_OPTIONS {
        return Err(ValidationError::InsufficientOptions(OptionRule::Count));
    }

    Ok(())
}

/// Check a delete request.
pub const fn validate_delete(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::MissingId);
    }
    Ok(())
}

/// Check a vote.
///
/// Whether the option belongs to the poll is decided by the store.
pub const fn validate_vote(poll_id: &str, option_id: &str) -> Result<(), ValidationError> {
    if poll_id.is_empty() {
        return Err(ValidationError::MissingPollId);
    }
    if option_id.is_empty() {
        return Err(ValidationError::MissingOptionId);
    }
    Ok(())
}

fn require_text(value: &str, missing: ValidationError) -> Result<&str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(missing)
    } else {
        Ok(trimmed)
    }
}
