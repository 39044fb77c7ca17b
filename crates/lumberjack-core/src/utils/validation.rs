//! Input validation utilities
//!
//! Checks user-supplied values before they reach the HTTP layer.

use crate::error::CliError;

/// Validate that a URL is properly formatted
pub fn validate_url(url: &str) -> crate::Result<()> {
    if url.is_empty() {
        return Err(CliError::InvalidArguments("URL cannot be empty".to_string()).into());
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(CliError::InvalidArguments(format!(
            "Invalid URL '{}': URL must start with http:// or https://",
            url
        ))
        .into());
    }

    Ok(())
}

/// Validate a repository (project) name such as `mozilla-central`
pub fn validate_project(project: &str) -> crate::Result<()> {
    if project.is_empty() {
        return Err(CliError::InvalidArguments("Project cannot be empty".to_string()).into());
    }

    if project.contains('/') || project.chars().any(char::is_whitespace) {
        return Err(CliError::InvalidArguments(format!(
            "Invalid project '{}': must not contain '/' or whitespace",
            project
        ))
        .into());
    }

    Ok(())
}

/// Validate a search pattern for log scanning
pub fn validate_pattern(pattern: &str) -> crate::Result<()> {
    if pattern.is_empty() {
        return Err(
            CliError::InvalidArguments("Search pattern cannot be empty".to_string()).into(),
        );
    }
    Ok(())
}
