//! Identifier rules shared by table and column names.
//!
//! A name is accepted when it is non-empty and made only of ASCII letters,
//! digits, space and `! @ # $ % ^ & - _ + = .`. Path separators are outside
//! that set, so a valid table name is always a single path segment.

use super::{DbError, Result};
use regex::Regex;

lazy_static::lazy_static! {
    static ref NAME_RULE: Regex = Regex::new(r"^[a-zA-Z0-9!@#$%^&\-_+=. ]+$")
        .expect("name rule is a valid regex");
}

pub fn is_valid_name(name: &str) -> bool {
    NAME_RULE.is_match(name)
}

pub fn validate_table_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(DbError::InvalidName(format!("table name '{}' is not allowed", name)))
    }
}

pub fn validate_column_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(DbError::InvalidName(format!("column name '{}' is not allowed", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_allowed_characters() {
        for name in ["users", "user_2024", "a.b-c", "my table", "!@#$%^&-_+=.", "X"] {
            assert!(is_valid_name(name), "{name:?} should be valid");
        }
    }

    #[test]
    fn test_rejects_everything_else() {
        for name in ["", "bad/name", "..\\up", "tab\tname", "new\nline", "홍길동", "a*b", "(x)"] {
            assert!(!is_valid_name(name), "{name:?} should be rejected");
        }
    }

    #[test]
    fn test_validators_report_kind() {
        assert!(matches!(validate_table_name("a/b"), Err(DbError::InvalidName(_))));
        assert!(matches!(validate_column_name(""), Err(DbError::InvalidName(_))));
        assert!(validate_column_name("password").is_ok());
    }
}
