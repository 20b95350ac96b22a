//! Tag title validation.

use crate::domain::error::DomainError;

/// Maximum number of characters a tag title may hold.
pub const MAX_TAG_TITLE_CHARS: usize = 20;

/// Normalize a submitted tag title: surrounding whitespace is dropped and the
/// title is lowercased. Empty or over-long titles are rejected.
pub fn normalize_tag_title(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("tag title must not be empty"));
    }

    let normalized = trimmed.to_lowercase();
    let length = normalized.chars().count();
    if length > MAX_TAG_TITLE_CHARS {
        return Err(DomainError::validation(format!(
            "tag title `{normalized}` is {length} characters long; at most {MAX_TAG_TITLE_CHARS} are allowed"
        )));
    }

    Ok(normalized)
}
