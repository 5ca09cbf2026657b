//! Hive account name rules.

use crate::error::{EngineError, Result};

/// Check `name` against the Hive account naming rules: 3 to 16 characters,
/// dot separated segments of at least 3 characters, each starting with a
/// letter, ending with a letter or digit and containing only lowercase
/// letters, digits and dashes.
pub fn validate_account_name(name: &str) -> Result<()> {
    let invalid = |reason| {
        Err(EngineError::InvalidAccountName {
            name: name.to_string(),
            reason,
        })
    };

    if name.len() < 3 {
        return invalid("too short");
    }
    if name.len() > 16 {
        return invalid("too long");
    }
    for segment in name.split('.') {
        let bytes = segment.as_bytes();
        if bytes.len() < 3 {
            return invalid("each segment must be at least 3 characters");
        }
        if !bytes[0].is_ascii_lowercase() {
            return invalid("each segment must start with a letter");
        }
        let last = bytes[bytes.len() - 1];
        if !(last.is_ascii_lowercase() || last.is_ascii_digit()) {
            return invalid("each segment must end with a letter or digit");
        }
        if !bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        {
            return invalid("only lowercase letters, digits and dashes are allowed");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_names() {
        for name in ["abc", "hive-engine", "honey-swap", "user.name", "a1b2c3", "x-y.z12"] {
            validate_account_name(name).unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn rejects_invalid_names() {
        for name in [
            "ab",
            "abcdefghijklmnopq",
            "Alice",
            "1abc",
            "abc-",
            "ab.cde",
            "abc..def",
            "abc_def",
            "",
        ] {
            assert!(
                matches!(validate_account_name(name), Err(EngineError::InvalidAccountName { .. })),
                "{name} should be rejected"
            );
        }
    }
}
