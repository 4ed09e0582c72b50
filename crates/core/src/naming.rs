//! Territory display names.

use crate::error::CoreError;

/// Maximum length of a territory name, in characters.
pub const MAX_TERRITORY_NAME_LEN: usize = 64;

/// Validate a user-supplied territory name.
///
/// Surrounding whitespace is trimmed; an absent or blank name yields `None`
/// so the store can assign its default.
pub fn validate_territory_name(name: Option<&str>) -> Result<Option<String>, CoreError> {
    let Some(trimmed) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    if trimmed.chars().count() > MAX_TERRITORY_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Territory name must be at most {MAX_TERRITORY_NAME_LEN} characters"
        )));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(CoreError::Validation(
            "Territory name must not contain control characters".into(),
        ));
    }
    Ok(Some(trimmed.to_string()))
}
