// ABOUTME: Input validation for project creation and repository slugs
// ABOUTME: Enforces the owner/repo shape and parses GitHub URLs into slugs

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::constants::MAX_PROJECT_NAME_LEN;
use crate::types::ProjectCreateInput;

static REPO_SLUG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+/[A-Za-z0-9_-]+$").expect("repository slug pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Missing(String),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{0}")]
    InvalidFormat(String),
}

/// A GitHub repository reference split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Check a trimmed value against the `owner/repo` pattern
pub fn is_valid_repo_slug(value: &str) -> bool {
    REPO_SLUG_PATTERN.is_match(value)
}

/// Validate and normalise a project creation request.
///
/// Blank `github_repo` values are treated as absent; present values are
/// trimmed before the shape check.
pub fn validate_project_input(
    name: Option<&str>,
    github_repo: Option<&str>,
) -> Result<ProjectCreateInput, ValidationError> {
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ValidationError::Missing("Project name is required".to_string()))?;

    if name.chars().count() > MAX_PROJECT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "Project name".to_string(),
            max: MAX_PROJECT_NAME_LEN,
        });
    }

    if name.contains('\0') {
        return Err(ValidationError::InvalidFormat(
            "Project name contains invalid null bytes".to_string(),
        ));
    }

    let github_repo = match github_repo.map(str::trim).filter(|r| !r.is_empty()) {
        Some(repo) if is_valid_repo_slug(repo) => Some(repo.to_string()),
        Some(_) => {
            return Err(ValidationError::InvalidFormat(
                "github_repo must be in format \"owner/repo\"".to_string(),
            ))
        }
        None => None,
    };

    Ok(ProjectCreateInput {
        name: name.to_string(),
        github_repo,
    })
}

/// Parse a repository reference into owner and repo.
///
/// Supported forms:
/// - `owner/repo`
/// - `https://github.com/owner/repo` (optionally with `.git` or a username)
/// - `git@github.com:owner/repo.git`
pub fn parse_repo_slug(value: &str) -> Option<RepoSlug> {
    let value = value.trim();

    let path = if let Some(path) = value.strip_prefix("git@github.com:") {
        path
    } else if let Some(pos) = value.find("github.com/") {
        &value[pos + "github.com/".len()..]
    } else {
        value
    };

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut parts = path.split('/');

    let owner = parts.next()?.trim();
    let repo = parts.next()?.trim();

    // Bare slugs must be exactly two segments; URLs may carry extra path
    if value == path && parts.next().is_some() {
        return None;
    }

    if owner.is_empty() || repo.is_empty() {
        return None;
    }

    Some(RepoSlug {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

/// Truncate text to `max_chars` characters, appending an ellipsis when cut
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_project_input_requires_name() {
        let err = validate_project_input(None, None).unwrap_err();
        assert_eq!(err.to_string(), "Project name is required");

        let err = validate_project_input(Some("   "), None).unwrap_err();
        assert_eq!(err.to_string(), "Project name is required");
    }

    #[test]
    fn test_validate_project_input_trims() {
        let input = validate_project_input(Some("  Dashboard "), Some(" o/r ")).unwrap();
        assert_eq!(
            input,
            ProjectCreateInput {
                name: "Dashboard".to_string(),
                github_repo: Some("o/r".to_string()),
            }
        );
    }

    #[test]
    fn test_validate_project_input_rejects_bad_repo() {
        let err = validate_project_input(Some("x"), Some("bad format")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat(_)));
        assert!(err.to_string().contains("owner/repo"));

        assert!(validate_project_input(Some("x"), Some("a/b/c")).is_err());
        assert!(validate_project_input(Some("x"), Some("/repo")).is_err());
    }

    #[test]
    fn test_validate_project_input_blank_repo_is_absent() {
        let input = validate_project_input(Some("x"), Some("  ")).unwrap();
        assert_eq!(input.github_repo, None);
    }

    #[test]
    fn test_validate_project_name_length() {
        let long = "a".repeat(MAX_PROJECT_NAME_LEN + 1);
        assert!(matches!(
            validate_project_input(Some(&long), None),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_repo_slug_pattern() {
        assert!(is_valid_repo_slug("owner/repo"));
        assert!(is_valid_repo_slug("my-org/my_repo-2"));
        assert!(!is_valid_repo_slug("owner/repo.js"));
        assert!(!is_valid_repo_slug("owner"));
    }

    #[test]
    fn test_parse_repo_slug_forms() {
        let expected = Some(RepoSlug {
            owner: "joedanz".to_string(),
            repo: "vibekit".to_string(),
        });

        assert_eq!(parse_repo_slug("joedanz/vibekit"), expected);
        assert_eq!(parse_repo_slug("https://github.com/joedanz/vibekit.git"), expected);
        assert_eq!(parse_repo_slug("https://github.com/joedanz/vibekit"), expected);
        assert_eq!(
            parse_repo_slug("https://joedanz@github.com/joedanz/vibekit.git"),
            expected
        );
        assert_eq!(parse_repo_slug("git@github.com:joedanz/vibekit.git"), expected);
    }

    #[test]
    fn test_parse_repo_slug_rejects_incomplete() {
        assert_eq!(parse_repo_slug("not-a-valid-url"), None);
        assert_eq!(parse_repo_slug("owner/"), None);
        assert_eq!(parse_repo_slug("/repo"), None);
        assert_eq!(parse_repo_slug("a/b/c"), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("observation text", 4), "obse...");
        assert_eq!(truncate("žluťoučký", 3), "žlu...");
    }
}
