//! Environment variable expansion for configuration strings.
//!
//! Supports `${VAR}` (error if unset) and `${VAR:-default}`.
//! Bare `$VAR` is left alone so literal dollar signs in passwords survive.

use crate::ConfigError;

/// Expand `${VAR}` references in a configuration value.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar {
            name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.name),
    })
}

/// Expand an optional value; an empty expansion becomes `None`.
///
/// This lets `token = "${CONFLUENCE_TOKEN:-}"` mean "no token" when the
/// variable is absent.
pub(crate) fn expand_optional(
    value: Option<&str>,
    field: &str,
) -> Result<Option<String>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let expanded = expand_env(value, field)?;
    Ok((!expanded.is_empty()).then_some(expanded))
}

struct UnsetVar {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_value_unchanged() {
        let result = expand_env("DOCS", "confluence.space").unwrap();
        assert_eq!(result, "DOCS");
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_env("pa$$word", "confluence.password").unwrap();
        assert_eq!(result, "pa$$word");
    }

    #[test]
    fn test_expand_set_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MDSYNC_TEST_SPACE", "ENG");
        }
        let result = expand_env("${MDSYNC_TEST_SPACE}", "confluence.space").unwrap();
        assert_eq!(result, "ENG");
        unsafe {
            std::env::remove_var("MDSYNC_TEST_SPACE");
        }
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MDSYNC_TEST_HOST", "wiki.example.com");
        }
        let result = expand_env("https://${MDSYNC_TEST_HOST}/confluence", "confluence.base_url")
            .unwrap();
        assert_eq!(result, "https://wiki.example.com/confluence");
        unsafe {
            std::env::remove_var("MDSYNC_TEST_HOST");
        }
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDSYNC_TEST_UNSET_BRANCH");
        }
        let result = expand_env("${MDSYNC_TEST_UNSET_BRANCH:-main}", "publish.source_branch")
            .unwrap();
        assert_eq!(result, "main");
    }

    #[test]
    fn test_missing_var_names_field_and_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDSYNC_TEST_MISSING");
        }
        let err = expand_env("${MDSYNC_TEST_MISSING}", "confluence.password").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let msg = err.to_string();
        assert!(msg.contains("MDSYNC_TEST_MISSING"));
        assert!(msg.contains("confluence.password"));
    }

    #[test]
    fn test_optional_empty_expansion_is_none() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDSYNC_TEST_NO_TOKEN");
        }
        let result = expand_optional(Some("${MDSYNC_TEST_NO_TOKEN:-}"), "confluence.token").unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_optional_absent_is_none() {
        assert_eq!(expand_optional(None, "confluence.token").unwrap(), None);
    }
}
