//! Typed accessors for the Treeherder resources.
//!
//! Each resource is described once by a [`Listing`] (URL, filters, whether
//! it supports `count`/`offset` paging); the async methods below and the
//! blocking ones in [`crate::api::blocking`] only differ in how they execute
//! it.

use crate::api::client::TreeherderClient;
use crate::api::models::{
    BugSuggestion, FailureByBug, FailureClassification, Job, JobLogUrl, OptionCollection,
    PerformanceAlertSummary, PerformanceFramework, Push, Repository, TextLogError,
};
use crate::api::pagination::{PageRequest, aggregate};
use crate::api::url::{Endpoint, QueryParams};
use crate::error::ApiError;
use crate::utils::validation::validate_project;
use serde::de::DeserializeOwned;

/// Filters for the push listing.
#[derive(Debug, Clone)]
pub struct PushFilter {
    /// Number of pushes wanted; 0 means whatever one unbounded call returns.
    pub count: usize,
    pub revision: Option<String>,
    pub author: Option<String>,
}

impl Default for PushFilter {
    fn default() -> Self {
        Self {
            count: 10,
            revision: None,
            author: None,
        }
    }
}

/// Filters for the job listing.
#[derive(Debug, Clone)]
pub struct JobFilter {
    pub count: usize,
    pub push_id: Option<u64>,
    pub job_guid: Option<String>,
    pub result: Option<String>,
    pub state: Option<String>,
    pub tier: Option<u8>,
}

impl Default for JobFilter {
    fn default() -> Self {
        Self {
            count: 20,
            push_id: None,
            job_guid: None,
            result: None,
            state: None,
            tier: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AlertSummaryFilter {
    pub repository: Option<String>,
    pub framework: Option<u64>,
    pub limit: usize,
}

impl Default for AlertSummaryFilter {
    fn default() -> Self {
        Self {
            repository: None,
            framework: None,
            limit: 20,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FailuresByBugFilter {
    pub bug: u64,
    /// `YYYY-MM-DD`
    pub startday: Option<String>,
    pub endday: Option<String>,
    pub tree: Option<String>,
}

fn push_param(query: &mut QueryParams, key: &str, value: Option<impl ToString>) {
    if let Some(value) = value {
        query.push((key.to_string(), value.to_string()));
    }
}

/// A list call: where it goes and how it may be paged.
#[derive(Debug, Clone)]
pub struct Listing {
    pub url: String,
    pub query: QueryParams,
    /// Accepts `count`/`offset` parameters.
    pub paginated: bool,
    /// Number of results wanted; 0 means no limit.
    pub requested: usize,
}

impl Listing {
    fn new(url: String) -> Self {
        Self {
            url,
            query: Vec::new(),
            paginated: false,
            requested: 0,
        }
    }

    fn paginated(mut self, requested: usize) -> Self {
        self.paginated = true;
        self.requested = requested;
        self
    }

    fn limited(mut self, requested: usize) -> Self {
        self.requested = requested;
        self
    }

    fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }
}

fn endpoint(resource: &str) -> crate::Result<Endpoint> {
    Ok(Endpoint::new(resource)?)
}

fn project_endpoint(project: &str, resource: &str) -> crate::Result<Endpoint> {
    validate_project(project)?;
    Ok(endpoint(resource)?.project(project))
}

/// URL and query definitions of every resource, independent of execution mode.
pub(crate) mod requests {
    use super::*;

    pub fn repositories(client: &TreeherderClient) -> crate::Result<Listing> {
        Ok(Listing::new(client.build_url(&endpoint("repository")?)))
    }

    pub fn pushes(
        client: &TreeherderClient,
        project: &str,
        filter: &PushFilter,
    ) -> crate::Result<Listing> {
        let mut query = Vec::new();
        push_param(&mut query, "revision", filter.revision.as_deref());
        push_param(&mut query, "author", filter.author.as_deref());
        let url = client.build_url(&project_endpoint(project, "push")?);
        Ok(Listing::new(url).query(query).paginated(filter.count))
    }

    pub fn push(client: &TreeherderClient, project: &str, push_id: u64) -> crate::Result<String> {
        let endpoint = project_endpoint(project, "push")?.extra_path(push_id.to_string());
        Ok(client.build_url(&endpoint))
    }

    pub fn jobs(
        client: &TreeherderClient,
        project: &str,
        filter: &JobFilter,
    ) -> crate::Result<Listing> {
        let mut query = Vec::new();
        push_param(&mut query, "push_id", filter.push_id);
        push_param(&mut query, "job_guid", filter.job_guid.as_deref());
        push_param(&mut query, "result", filter.result.as_deref());
        push_param(&mut query, "state", filter.state.as_deref());
        push_param(&mut query, "tier", filter.tier);
        let url = client.build_url(&project_endpoint(project, "jobs")?);
        Ok(Listing::new(url).query(query).paginated(filter.count))
    }

    pub fn job(client: &TreeherderClient, project: &str, job_id: u64) -> crate::Result<String> {
        let endpoint = project_endpoint(project, "jobs")?.extra_path(job_id.to_string());
        Ok(client.build_url(&endpoint))
    }

    pub fn job_by_guid(
        client: &TreeherderClient,
        project: &str,
        job_guid: &str,
    ) -> crate::Result<Listing> {
        let filter = JobFilter {
            count: 1,
            job_guid: Some(job_guid.to_string()),
            ..JobFilter::default()
        };
        jobs(client, project, &filter)
    }

    pub fn job_log_urls(
        client: &TreeherderClient,
        project: &str,
        job_id: u64,
    ) -> crate::Result<Listing> {
        let url = client.build_url(&project_endpoint(project, "job-log-url")?);
        Ok(Listing::new(url).query(vec![("job_id".to_string(), job_id.to_string())]))
    }

    pub fn alert_summaries(
        client: &TreeherderClient,
        filter: &AlertSummaryFilter,
    ) -> crate::Result<Listing> {
        let mut query = Vec::new();
        push_param(&mut query, "repository", filter.repository.as_deref());
        push_param(&mut query, "framework", filter.framework);
        if filter.limit > 0 {
            push_param(&mut query, "limit", Some(filter.limit));
        }
        let url = client.build_url(&endpoint("performance/alertsummary")?);
        Ok(Listing::new(url).query(query).limited(filter.limit))
    }

    pub fn frameworks(client: &TreeherderClient) -> crate::Result<Listing> {
        Ok(Listing::new(
            client.build_url(&endpoint("performance/framework")?),
        ))
    }

    pub fn option_collection_hash(client: &TreeherderClient) -> crate::Result<Listing> {
        Ok(Listing::new(
            client.build_url(&endpoint("optioncollectionhash")?),
        ))
    }

    pub fn failure_classifications(client: &TreeherderClient) -> crate::Result<Listing> {
        Ok(Listing::new(
            client.build_url(&endpoint("failureclassification")?),
        ))
    }

    pub fn failures_by_bug(
        client: &TreeherderClient,
        filter: &FailuresByBugFilter,
    ) -> crate::Result<Listing> {
        let mut query = vec![("bug".to_string(), filter.bug.to_string())];
        push_param(&mut query, "startday", filter.startday.as_deref());
        push_param(&mut query, "endday", filter.endday.as_deref());
        push_param(&mut query, "tree", filter.tree.as_deref());
        let url = client.build_url(&endpoint("failuresbybug")?);
        Ok(Listing::new(url).query(query))
    }

    pub fn text_log_errors(
        client: &TreeherderClient,
        project: &str,
        job_id: u64,
    ) -> crate::Result<Listing> {
        let endpoint =
            project_endpoint(project, "jobs")?.extra_path(format!("{}/text_log_errors", job_id));
        Ok(Listing::new(client.build_url(&endpoint)))
    }

    pub fn bug_suggestions(
        client: &TreeherderClient,
        project: &str,
        job_id: u64,
    ) -> crate::Result<Listing> {
        let endpoint =
            project_endpoint(project, "jobs")?.extra_path(format!("{}/bug_suggestions", job_id));
        Ok(Listing::new(client.build_url(&endpoint)))
    }

    pub fn similar_jobs(
        client: &TreeherderClient,
        project: &str,
        job_id: u64,
        count: usize,
    ) -> crate::Result<Listing> {
        let endpoint =
            project_endpoint(project, "jobs")?.extra_path(format!("{}/similar_jobs", job_id));
        Ok(Listing::new(client.build_url(&endpoint)).paginated(count))
    }
}

pub(crate) fn job_guid_not_found(listing: &Listing, project: &str, job_guid: &str) -> ApiError {
    ApiError::NotFound {
        status: None,
        endpoint: listing.url.clone(),
        message: format!("Job with GUID '{}' not found in {}", job_guid, project),
    }
}

impl TreeherderClient {
    /// Execute a listing: one unbounded call when nothing specific is
    /// requested, otherwise paged through the aggregator.
    pub async fn fetch_list<T: DeserializeOwned>(&self, listing: Listing) -> crate::Result<Vec<T>> {
        log::debug!(
            "Listing {} (requested: {}, paginated: {})",
            listing.url,
            listing.requested,
            listing.paginated
        );

        if listing.requested == 0 || !listing.paginated {
            let page = self.get_page::<T>(&listing.url, listing.query).await?;
            let mut items = page.items;
            if listing.requested > 0 {
                items.truncate(listing.requested);
            }
            return Ok(items);
        }

        let request = PageRequest::new(listing.requested, self.config().page_size);
        let url = listing.url.as_str();
        let base_query = &listing.query;
        let items = aggregate(request, |window| {
            let mut query = base_query.clone();
            query.extend(window.query());
            async move { self.get_page::<T>(url, query).await }
        })
        .await?;
        Ok(items)
    }

    pub async fn get_repositories(&self) -> crate::Result<Vec<Repository>> {
        self.fetch_list(requests::repositories(self)?).await
    }

    pub async fn get_pushes(&self, project: &str, filter: &PushFilter) -> crate::Result<Vec<Push>> {
        self.fetch_list(requests::pushes(self, project, filter)?).await
    }

    pub async fn get_push(&self, project: &str, push_id: u64) -> crate::Result<Push> {
        let url = requests::push(self, project, push_id)?;
        Ok(self.get_json(&url, Vec::new()).await?)
    }

    pub async fn get_jobs(&self, project: &str, filter: &JobFilter) -> crate::Result<Vec<Job>> {
        self.fetch_list(requests::jobs(self, project, filter)?).await
    }

    pub async fn get_job(&self, project: &str, job_id: u64) -> crate::Result<Job> {
        let url = requests::job(self, project, job_id)?;
        Ok(self.get_json(&url, Vec::new()).await?)
    }

    pub async fn get_job_by_guid(&self, project: &str, job_guid: &str) -> crate::Result<Job> {
        let listing = requests::job_by_guid(self, project, job_guid)?;
        let not_found = job_guid_not_found(&listing, project, job_guid);
        let jobs: Vec<Job> = self.fetch_list(listing).await?;
        jobs.into_iter().next().ok_or_else(|| not_found.into())
    }

    pub async fn get_job_log_urls(&self, project: &str, job_id: u64) -> crate::Result<Vec<JobLogUrl>> {
        self.fetch_list(requests::job_log_urls(self, project, job_id)?)
            .await
    }

    pub async fn get_performance_alert_summaries(
        &self,
        filter: &AlertSummaryFilter,
    ) -> crate::Result<Vec<PerformanceAlertSummary>> {
        self.fetch_list(requests::alert_summaries(self, filter)?)
            .await
    }

    pub async fn get_performance_frameworks(&self) -> crate::Result<Vec<PerformanceFramework>> {
        self.fetch_list(requests::frameworks(self)?).await
    }

    pub async fn get_option_collection_hash(&self) -> crate::Result<Vec<OptionCollection>> {
        self.fetch_list(requests::option_collection_hash(self)?)
            .await
    }

    pub async fn get_failure_classifications(&self) -> crate::Result<Vec<FailureClassification>> {
        self.fetch_list(requests::failure_classifications(self)?)
            .await
    }

    pub async fn get_failures_by_bug(
        &self,
        filter: &FailuresByBugFilter,
    ) -> crate::Result<Vec<FailureByBug>> {
        self.fetch_list(requests::failures_by_bug(self, filter)?)
            .await
    }

    pub async fn get_text_log_errors(
        &self,
        project: &str,
        job_id: u64,
    ) -> crate::Result<Vec<TextLogError>> {
        self.fetch_list(requests::text_log_errors(self, project, job_id)?)
            .await
    }

    pub async fn get_bug_suggestions(
        &self,
        project: &str,
        job_id: u64,
    ) -> crate::Result<Vec<BugSuggestion>> {
        self.fetch_list(requests::bug_suggestions(self, project, job_id)?)
            .await
    }

    pub async fn get_similar_jobs(
        &self,
        project: &str,
        job_id: u64,
        count: usize,
    ) -> crate::Result<Vec<Job>> {
        self.fetch_list(requests::similar_jobs(self, project, job_id, count)?)
            .await
    }
}
