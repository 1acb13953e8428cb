//! Branch name validation following git's ref-format rules.
//!
//! A valid branch name:
//! - is non-empty and is not `HEAD`
//! - contains no whitespace, control characters, `~`, `^`, `:`, `?`, `*`,
//!   `[` or `\`
//! - contains neither `..` nor `@{`
//! - does not start with `-`
//! - does not start or end with `/`, and has no empty path components
//! - has no component that starts with `.` or ends with `.lock`
//! - does not end with `.`

use crate::error::{RefError, Result};

/// Characters that are forbidden anywhere in a branch name.
const FORBIDDEN_CHARS: &[char] = &['~', '^', ':', '?', '*', '[', '\\'];

fn invalid(name: &str, reason: impl Into<String>) -> RefError {
    RefError::InvalidBranchName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Validate a branch name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use sweep_refs::names::validate_branch_name;
///
/// assert!(validate_branch_name("main").is_ok());
/// assert!(validate_branch_name("feature/auth").is_ok());
/// assert!(validate_branch_name("").is_err());
/// assert!(validate_branch_name("bad..name").is_err());
/// ```
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(name, "branch name must not be empty"));
    }
    if name == "HEAD" {
        return Err(invalid(name, "'HEAD' is reserved"));
    }
    if name.starts_with('-') {
        return Err(invalid(name, "must not start with '-'"));
    }

    if let Some(ch) = name
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || FORBIDDEN_CHARS.contains(c))
    {
        return Err(invalid(name, format!("contains forbidden character: {ch:?}")));
    }

    if name.contains("..") {
        return Err(invalid(name, "must not contain '..'"));
    }
    if name.contains("@{") {
        return Err(invalid(name, "must not contain '@{'"));
    }
    if name.ends_with('.') {
        return Err(invalid(name, "must not end with '.'"));
    }

    for component in name.split('/') {
        if component.is_empty() {
            return Err(invalid(name, "path components must not be empty"));
        }
        if component.starts_with('.') {
            return Err(invalid(
                name,
                format!("component must not start with '.': {component:?}"),
            ));
        }
        if component.ends_with(".lock") {
            return Err(invalid(
                name,
                format!("component must not end with '.lock': {component:?}"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_names() {
        for name in ["main", "master", "feature/auth", "fix-123", "user/jo/wip", "v1.2"] {
            assert!(validate_branch_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_empty_and_reserved() {
        assert!(validate_branch_name("").is_err());
        assert!(validate_branch_name("HEAD").is_err());
        assert!(validate_branch_name("-x").is_err());
    }

    #[test]
    fn rejects_forbidden_characters() {
        for name in ["a b", "a~1", "a^", "a:b", "a?", "a*", "a[0]", "a\\b", "tab\there"] {
            assert!(validate_branch_name(name).is_err(), "{name:?} should be invalid");
        }
    }

    #[test]
    fn rejects_bad_sequences() {
        assert!(validate_branch_name("bad..name").is_err());
        assert!(validate_branch_name("at@{1}").is_err());
        assert!(validate_branch_name("trailing.").is_err());
    }

    #[test]
    fn rejects_bad_components() {
        assert!(validate_branch_name("/lead").is_err());
        assert!(validate_branch_name("trail/").is_err());
        assert!(validate_branch_name("a//b").is_err());
        assert!(validate_branch_name("a/.hidden").is_err());
        assert!(validate_branch_name("a.lock").is_err());
        assert!(validate_branch_name("a.lock/b").is_err());
    }

    #[test]
    fn error_carries_reason() {
        let err = validate_branch_name("a b").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("a b"));
        assert!(msg.contains("forbidden"));
    }
}
