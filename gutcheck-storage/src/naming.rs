//! `{entity_type}_{id}.encrypted` file naming.
//!
//! The entity type never contains `_`, so splitting a file name at the first
//! `_` recovers both parts even when ids contain underscores.

use crate::error::{StorageError, StorageResult};

/// Extension of every stored blob.
pub const FILE_EXTENSION: &str = "encrypted";

/// Longest id accepted; keeps file names under common 255-byte limits.
pub const MAX_ID_LEN: usize = 200;

pub fn validate_entity_type(entity_type: &str) -> StorageResult<()> {
    if entity_type.is_empty() {
        return Err(StorageError::InvalidName("entity type is empty".to_string()));
    }
    if !entity_type
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(StorageError::InvalidName(format!(
            "entity type {entity_type:?} may only contain ASCII letters, digits and '-'"
        )));
    }
    Ok(())
}

pub fn validate_id(id: &str) -> StorageResult<()> {
    if id.is_empty() {
        return Err(StorageError::InvalidName("id is empty".to_string()));
    }
    if id.len() > MAX_ID_LEN {
        return Err(StorageError::InvalidName(format!(
            "id is {} bytes, max {MAX_ID_LEN}",
            id.len()
        )));
    }
    if id.contains(['/', '\\', '\0']) {
        return Err(StorageError::InvalidName(format!(
            "id {id:?} contains a path separator or NUL"
        )));
    }
    if id.chars().all(|c| c == '.') {
        return Err(StorageError::InvalidName(format!("id {id:?} is a dot-only name")));
    }
    Ok(())
}

/// File name for `(entity_type, id)`, validating both parts.
pub fn file_name(entity_type: &str, id: &str) -> StorageResult<String> {
    validate_entity_type(entity_type)?;
    validate_id(id)?;
    Ok(format!("{entity_type}_{id}.{FILE_EXTENSION}"))
}

/// Parses a stored file name back into `(entity_type, id)`.
///
/// Returns `None` for anything that is not a blob written by this store
/// (staging files, foreign files, malformed names).
pub fn parse_file_name(name: &str) -> Option<(&str, &str)> {
    let stem = name.strip_suffix(FILE_EXTENSION)?.strip_suffix('.')?;
    let (entity_type, id) = stem.split_once('_')?;
    if validate_entity_type(entity_type).is_err() || validate_id(id).is_err() {
        return None;
    }
    Some((entity_type, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_parses_names() {
        let name = file_name("symptom", "s1").unwrap();
        assert_eq!(name, "symptom_s1.encrypted");
        assert_eq!(parse_file_name(&name), Some(("symptom", "s1")));
    }

    #[test]
    fn ids_may_contain_underscores() {
        let name = file_name("meal", "2026_10_19_lunch").unwrap();
        assert_eq!(parse_file_name(&name), Some(("meal", "2026_10_19_lunch")));
    }

    #[test]
    fn rejects_unsafe_names() {
        assert!(file_name("meal_log", "m1").is_err());
        assert!(file_name("", "m1").is_err());
        assert!(file_name("meal", "").is_err());
        assert!(file_name("meal", "../escape").is_err());
        assert!(file_name("meal", ".").is_err());
        assert!(file_name("meal", "..").is_err());
        assert!(file_name("meal", ".m1").is_ok());
        assert!(file_name("meal", &"x".repeat(MAX_ID_LEN + 1)).is_err());
    }

    #[test]
    fn ignores_foreign_files() {
        assert_eq!(parse_file_name(".symptom_s1.encrypted.tmp"), None);
        assert_eq!(parse_file_name("symptom_s1.json"), None);
        assert_eq!(parse_file_name("symptoms.encrypted"), None);
        assert_eq!(parse_file_name("_s1.encrypted"), None);
        assert_eq!(parse_file_name("symptom_.encrypted"), None);
        assert_eq!(parse_file_name(".DS_Store"), None);
    }
}
