//! Shared bucket/key validation for store backends.

use crate::traits::{StoreError, StoreResult};

/// Reject names that are empty or could address something outside their bucket
/// when used as a path segment.
pub fn validate_name(kind: &str, name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::InvalidKey(format!("{} must not be empty", kind)));
    }
    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(StoreError::InvalidKey(format!(
            "{} '{}' contains a path separator",
            kind, name
        )));
    }
    if name.starts_with('.') {
        return Err(StoreError::InvalidKey(format!(
            "{} '{}' must not start with '.'",
            kind, name
        )));
    }
    Ok(())
}

pub fn validate_entry(bucket: &str, key: &str) -> StoreResult<()> {
    validate_name("bucket", bucket)?;
    validate_name("key", key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_names() {
        assert!(validate_entry("photo_meta", "5f1c7a9e-1111-4c2a-9a55-0f2b6e2a1b3c").is_ok());
        assert!(validate_entry("gernest", "gernest").is_ok());
    }

    #[test]
    fn test_rejects_traversal_and_separators() {
        for bad in ["", "..", "../etc", "a/b", "a\\b", ".hidden"] {
            assert!(
                matches!(validate_name("key", bad), Err(StoreError::InvalidKey(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }
}
