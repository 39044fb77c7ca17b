//! Log retrieval for a job: resolve the artifact, download it, optionally
//! search it. The async and blocking paths share resolution and search.

use crate::api::client::TreeherderClient;
use crate::core::log_search::{LogMatch, LogReference, SearchOptions, search_lines, select_log};
use crate::error::ApiError;
use crate::utils::validation::validate_pattern;

/// A downloaded log artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLog {
    pub reference: LogReference,
    pub text: String,
}

impl JobLog {
    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }

    pub fn search(&self, pattern: &str, options: SearchOptions) -> Vec<LogMatch> {
        search_lines(&self.text, pattern, options)
    }
}

/// A missing artifact body is a failed fetch, not a missing artifact.
fn artifact_fetch_error(error: ApiError) -> ApiError {
    match error {
        ApiError::NotFound {
            status: Some(status),
            endpoint,
            message,
        } => ApiError::Http {
            status,
            endpoint,
            message: format!("Log artifact could not be fetched: {}", message),
        },
        other => other,
    }
}

/// Log service borrowing a client for either execution mode.
pub struct LogService<'a> {
    client: &'a TreeherderClient,
}

impl<'a> LogService<'a> {
    pub fn new(client: &'a TreeherderClient) -> Self {
        Self { client }
    }

    pub async fn resolve(
        &self,
        project: &str,
        job_id: u64,
        name: Option<&str>,
    ) -> crate::Result<LogReference> {
        let logs = self.client.get_job_log_urls(project, job_id).await?;
        Ok(select_log(job_id, &logs, name)?)
    }

    pub async fn fetch(
        &self,
        project: &str,
        job_id: u64,
        name: Option<&str>,
    ) -> crate::Result<JobLog> {
        let reference = self.resolve(project, job_id, name).await?;
        log::debug!(
            "Fetching log '{}' for job {} from {}",
            reference.artifact_name,
            job_id,
            reference.resolved_url
        );
        let text = self
            .client
            .request_text(&reference.resolved_url)
            .await
            .map_err(artifact_fetch_error)?;
        Ok(JobLog { reference, text })
    }

    pub async fn search(
        &self,
        project: &str,
        job_id: u64,
        pattern: &str,
        name: Option<&str>,
        options: SearchOptions,
    ) -> crate::Result<Vec<LogMatch>> {
        validate_pattern(pattern)?;
        let log = self.fetch(project, job_id, name).await?;
        Ok(log.search(pattern, options))
    }

    pub fn resolve_blocking(
        &self,
        project: &str,
        job_id: u64,
        name: Option<&str>,
    ) -> crate::Result<LogReference> {
        let logs = self.client.blocking().get_job_log_urls(project, job_id)?;
        Ok(select_log(job_id, &logs, name)?)
    }

    pub fn fetch_blocking(
        &self,
        project: &str,
        job_id: u64,
        name: Option<&str>,
    ) -> crate::Result<JobLog> {
        let reference = self.resolve_blocking(project, job_id, name)?;
        log::debug!(
            "Fetching log '{}' for job {} from {} (blocking)",
            reference.artifact_name,
            job_id,
            reference.resolved_url
        );
        let text = self
            .client
            .request_text_blocking(&reference.resolved_url)
            .map_err(artifact_fetch_error)?;
        Ok(JobLog { reference, text })
    }

    pub fn search_blocking(
        &self,
        project: &str,
        job_id: u64,
        pattern: &str,
        name: Option<&str>,
        options: SearchOptions,
    ) -> crate::Result<Vec<LogMatch>> {
        validate_pattern(pattern)?;
        let log = self.fetch_blocking(project, job_id, name)?;
        Ok(log.search(pattern, options))
    }
}

impl TreeherderClient {
    pub fn logs(&self) -> LogService<'_> {
        LogService::new(self)
    }

    pub async fn get_job_log(
        &self,
        project: &str,
        job_id: u64,
        name: Option<&str>,
    ) -> crate::Result<JobLog> {
        self.logs().fetch(project, job_id, name).await
    }

    pub async fn search_job_log(
        &self,
        project: &str,
        job_id: u64,
        pattern: &str,
        name: Option<&str>,
        options: SearchOptions,
    ) -> crate::Result<Vec<LogMatch>> {
        self.logs()
            .search(project, job_id, pattern, name, options)
            .await
    }
}
