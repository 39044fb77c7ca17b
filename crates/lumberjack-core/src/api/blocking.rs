//! Blocking access to the same resources as the async accessors.
//!
//! ```rust,ignore
//! let client = TreeherderClient::default();
//! let repos = client.blocking().get_repositories()?;
//! ```

use crate::api::client::TreeherderClient;
use crate::api::endpoints::{
    AlertSummaryFilter, FailuresByBugFilter, JobFilter, Listing, PushFilter, job_guid_not_found,
    requests,
};
use crate::api::models::{
    BugSuggestion, FailureByBug, FailureClassification, Job, JobLogUrl, OptionCollection,
    PerformanceAlertSummary, PerformanceFramework, Push, Repository, TextLogError,
};
use crate::api::pagination::{PageRequest, aggregate_blocking};
use crate::core::log_search::{LogMatch, SearchOptions};
use crate::core::services::log_service::{JobLog, LogService};
use serde::de::DeserializeOwned;

/// Borrowed view of a [`TreeherderClient`] whose calls block the current
/// thread. Uses the client's blocking transport only.
#[derive(Debug, Clone, Copy)]
pub struct BlockingClient<'a> {
    client: &'a TreeherderClient,
}

impl TreeherderClient {
    pub fn blocking(&self) -> BlockingClient<'_> {
        BlockingClient { client: self }
    }
}

impl<'a> BlockingClient<'a> {
    pub fn fetch_list<T: DeserializeOwned>(&self, listing: Listing) -> crate::Result<Vec<T>> {
        log::debug!(
            "Listing {} (requested: {}, paginated: {}, blocking)",
            listing.url,
            listing.requested,
            listing.paginated
        );

        if listing.requested == 0 || !listing.paginated {
            let page = self
                .client
                .get_page_blocking::<T>(&listing.url, listing.query)?;
            let mut items = page.items;
            if listing.requested > 0 {
                items.truncate(listing.requested);
            }
            return Ok(items);
        }

        let request = PageRequest::new(listing.requested, self.client.config().page_size);
        let items = aggregate_blocking(request, |window| {
            let mut query = listing.query.clone();
            query.extend(window.query());
            self.client.get_page_blocking::<T>(&listing.url, query)
        })?;
        Ok(items)
    }

    pub fn get_repositories(&self) -> crate::Result<Vec<Repository>> {
        self.fetch_list(requests::repositories(self.client)?)
    }

    pub fn get_pushes(&self, project: &str, filter: &PushFilter) -> crate::Result<Vec<Push>> {
        self.fetch_list(requests::pushes(self.client, project, filter)?)
    }

    pub fn get_push(&self, project: &str, push_id: u64) -> crate::Result<Push> {
        let url = requests::push(self.client, project, push_id)?;
        Ok(self.client.get_json_blocking(&url, Vec::new())?)
    }

    pub fn get_jobs(&self, project: &str, filter: &JobFilter) -> crate::Result<Vec<Job>> {
        self.fetch_list(requests::jobs(self.client, project, filter)?)
    }

    pub fn get_job(&self, project: &str, job_id: u64) -> crate::Result<Job> {
        let url = requests::job(self.client, project, job_id)?;
        Ok(self.client.get_json_blocking(&url, Vec::new())?)
    }

    pub fn get_job_by_guid(&self, project: &str, job_guid: &str) -> crate::Result<Job> {
        let listing = requests::job_by_guid(self.client, project, job_guid)?;
        let not_found = job_guid_not_found(&listing, project, job_guid);
        let jobs: Vec<Job> = self.fetch_list(listing)?;
        jobs.into_iter().next().ok_or_else(|| not_found.into())
    }

    pub fn get_job_log_urls(&self, project: &str, job_id: u64) -> crate::Result<Vec<JobLogUrl>> {
        self.fetch_list(requests::job_log_urls(self.client, project, job_id)?)
    }

    pub fn get_performance_alert_summaries(
        &self,
        filter: &AlertSummaryFilter,
    ) -> crate::Result<Vec<PerformanceAlertSummary>> {
        self.fetch_list(requests::alert_summaries(self.client, filter)?)
    }

    pub fn get_performance_frameworks(&self) -> crate::Result<Vec<PerformanceFramework>> {
        self.fetch_list(requests::frameworks(self.client)?)
    }

    pub fn get_option_collection_hash(&self) -> crate::Result<Vec<OptionCollection>> {
        self.fetch_list(requests::option_collection_hash(self.client)?)
    }

    pub fn get_failure_classifications(&self) -> crate::Result<Vec<FailureClassification>> {
        self.fetch_list(requests::failure_classifications(self.client)?)
    }

    pub fn get_failures_by_bug(
        &self,
        filter: &FailuresByBugFilter,
    ) -> crate::Result<Vec<FailureByBug>> {
        self.fetch_list(requests::failures_by_bug(self.client, filter)?)
    }

    pub fn get_text_log_errors(
        &self,
        project: &str,
        job_id: u64,
    ) -> crate::Result<Vec<TextLogError>> {
        self.fetch_list(requests::text_log_errors(self.client, project, job_id)?)
    }

    pub fn get_bug_suggestions(
        &self,
        project: &str,
        job_id: u64,
    ) -> crate::Result<Vec<BugSuggestion>> {
        self.fetch_list(requests::bug_suggestions(self.client, project, job_id)?)
    }

    pub fn get_similar_jobs(
        &self,
        project: &str,
        job_id: u64,
        count: usize,
    ) -> crate::Result<Vec<Job>> {
        self.fetch_list(requests::similar_jobs(self.client, project, job_id, count)?)
    }

    pub fn get_job_log(
        &self,
        project: &str,
        job_id: u64,
        name: Option<&str>,
    ) -> crate::Result<JobLog> {
        LogService::new(self.client).fetch_blocking(project, job_id, name)
    }

    pub fn search_job_log(
        &self,
        project: &str,
        job_id: u64,
        pattern: &str,
        name: Option<&str>,
        options: SearchOptions,
    ) -> crate::Result<Vec<LogMatch>> {
        LogService::new(self.client).search_blocking(project, job_id, pattern, name, options)
    }
}
