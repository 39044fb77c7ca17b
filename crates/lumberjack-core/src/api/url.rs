//! Endpoint path composition.
//!
//! Every Treeherder API path ends with a trailing slash; requests without it
//! are answered with a redirect, so the builder always emits exactly one.

use crate::error::CliError;

/// Query parameters in the order they are sent.
pub type QueryParams = Vec<(String, String)>;

/// A resource path relative to the server's `/api/` root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    resource: String,
    project: Option<String>,
    extra_path: Option<String>,
}

impl Endpoint {
    pub fn new(resource: impl Into<String>) -> Result<Self, CliError> {
        let resource = resource.into();
        if trim_segment(&resource).is_empty() {
            return Err(CliError::InvalidArguments(
                "Endpoint resource cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            resource,
            project: None,
            extra_path: None,
        })
    }

    /// Scope the endpoint under `/api/project/{project}/`.
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Append a sub-path after the resource, e.g. a record id.
    pub fn extra_path(mut self, extra: impl Into<String>) -> Self {
        self.extra_path = Some(extra.into());
        self
    }

    pub fn url(&self, base_url: &str) -> String {
        build_url(
            base_url,
            &self.resource,
            self.project.as_deref(),
            self.extra_path.as_deref(),
        )
    }
}

fn trim_segment(segment: &str) -> &str {
    segment.trim_matches('/')
}

/// Compose `{base}/api/[project/{project}/]{resource}/[{extra}/]`.
pub fn build_url(
    base_url: &str,
    resource: &str,
    project: Option<&str>,
    extra_path: Option<&str>,
) -> String {
    let mut url = String::with_capacity(base_url.len() + resource.len() + 32);
    url.push_str(base_url.trim_end_matches('/'));
    url.push_str("/api/");

    if let Some(project) = project {
        url.push_str("project/");
        url.push_str(trim_segment(project));
        url.push('/');
    }

    url.push_str(trim_segment(resource));
    url.push('/');

    if let Some(extra) = extra_path.map(trim_segment).filter(|e| !e.is_empty()) {
        url.push_str(extra);
        url.push('/');
    }

    url
}
