//! Task form rules, checked before anything is applied optimistically.

use thiserror::Error;

use crate::model::{TaskChanges, TaskDraft};

pub const TITLE_MIN_CHARS: usize = 3;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is required")]
    TitleRequired,
    #[error("Title must be at least 3 characters")]
    TitleTooShort,
    #[error("Description must be less than 500 characters")]
    DescriptionTooLong,
}

pub fn validate_draft(draft: &TaskDraft) -> Result<(), ValidationError> {
    check_title(&draft.title)?;
    check_description(&draft.description)
}

/// Only the fields being changed are checked.
pub fn validate_changes(changes: &TaskChanges) -> Result<(), ValidationError> {
    if let Some(title) = &changes.title {
        check_title(title)?;
    }
    if let Some(description) = &changes.description {
        check_description(description)?;
    }
    Ok(())
}

fn check_title(title: &str) -> Result<(), ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    if title.chars().count() < TITLE_MIN_CHARS {
        return Err(ValidationError::TitleTooShort);
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), ValidationError> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(ValidationError::DescriptionTooLong);
    }
    Ok(())
}
