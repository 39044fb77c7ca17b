use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Taskcluster deployment used by Mozilla's production Treeherder.
pub const DEFAULT_TC_ROOT_URL: &str = "https://firefox-ci-tc.services.mozilla.com";

/// Stable serialization capability shared by every response record.
pub trait ResultModel: Serialize + DeserializeOwned {
    fn to_json_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Serialize a list of records into a JSON array.
pub fn to_json_array<T: ResultModel>(items: &[T]) -> Value {
    Value::Array(items.iter().map(ResultModel::to_json_value).collect())
}

// Repository models
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RepositoryGroup {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Repository {
    pub id: u64,
    pub repository_group: RepositoryGroup,
    pub name: String,
    pub dvcs_type: String,
    pub url: String,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub codebase: String,
    #[serde(default)]
    pub description: String,
    pub active_status: String,
    #[serde(default)]
    pub life_cycle_order: Option<i64>,
    #[serde(default)]
    pub performance_alerts_enabled: bool,
    #[serde(default)]
    pub expire_performance_data: bool,
    #[serde(default)]
    pub is_try_repo: bool,
    #[serde(default)]
    pub tc_root_url: Option<String>,
}

impl Repository {
    pub fn is_active(&self) -> bool {
        self.active_status == "active"
    }
}

// Push models
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Revision {
    pub revision: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub repository_id: Option<u64>,
    #[serde(default)]
    pub result_set_id: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Push {
    pub id: u64,
    pub revision: String,
    pub author: String,
    #[serde(default)]
    pub revisions: Vec<Revision>,
    #[serde(default)]
    pub revision_count: u64,
    pub push_timestamp: i64,
    pub repository_id: u64,
}

// Job models
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Job {
    pub id: u64,
    pub job_guid: String,
    pub push_id: u64,
    #[serde(default)]
    pub result_set_id: Option<u64>,
    #[serde(default)]
    pub build_architecture: String,
    #[serde(default)]
    pub build_os: String,
    #[serde(default)]
    pub build_platform: String,
    #[serde(default)]
    pub build_platform_id: Option<u64>,
    #[serde(default)]
    pub build_system_type: String,
    #[serde(default)]
    pub job_group_id: Option<u64>,
    #[serde(default)]
    pub job_group_name: String,
    #[serde(default)]
    pub job_group_symbol: String,
    #[serde(default)]
    pub job_group_description: String,
    #[serde(default)]
    pub job_type_id: Option<u64>,
    pub job_type_name: String,
    #[serde(default)]
    pub job_type_symbol: String,
    #[serde(default)]
    pub job_type_description: String,
    #[serde(default)]
    pub machine_name: String,
    #[serde(default)]
    pub machine_platform_architecture: String,
    #[serde(default)]
    pub machine_platform_os: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub platform_option: String,
    #[serde(default)]
    pub option_collection_hash: String,
    pub state: String,
    pub result: String,
    #[serde(default)]
    pub failure_classification_id: Option<u64>,
    #[serde(default)]
    pub tier: u8,
    #[serde(default)]
    pub submit_timestamp: i64,
    #[serde(default)]
    pub start_timestamp: i64,
    #[serde(default)]
    pub end_timestamp: i64,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub who: String,
    #[serde(default)]
    pub ref_data_name: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub retry_id: u32,
}

impl Job {
    /// Wall-clock run time; zero until the job has ended.
    pub fn duration_seconds(&self) -> i64 {
        if self.end_timestamp > 0 && self.start_timestamp > 0 {
            (self.end_timestamp - self.start_timestamp).max(0)
        } else {
            0
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state == "completed"
    }

    /// `B(1)`-style symbol shown in the Treeherder UI.
    pub fn symbol(&self) -> String {
        format!("{}({})", self.job_group_symbol, self.job_type_symbol)
    }

    pub fn task_url(&self, tc_root_url: &str) -> Option<String> {
        self.task_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| format!("{}/tasks/{}", tc_root_url.trim_end_matches('/'), id))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct JobLogUrl {
    pub id: u64,
    pub job_id: u64,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub parse_status: String,
}

// Performance models
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PerformanceFramework {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PerformanceSignature {
    pub id: u64,
    #[serde(default)]
    pub framework_id: Option<u64>,
    #[serde(default)]
    pub signature_hash: String,
    #[serde(default)]
    pub machine_platform: String,
    #[serde(default)]
    pub suite: String,
    #[serde(default)]
    pub test: Option<String>,
    #[serde(default)]
    pub lower_is_better: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PerformanceAlert {
    pub id: u64,
    pub status: i32,
    #[serde(default)]
    pub series_signature: Option<PerformanceSignature>,
    pub is_regression: bool,
    #[serde(default)]
    pub prev_value: f64,
    #[serde(default)]
    pub new_value: f64,
    #[serde(default)]
    pub t_value: Option<f64>,
    #[serde(default)]
    pub amount_abs: f64,
    #[serde(default)]
    pub amount_pct: f64,
    #[serde(default)]
    pub summary_id: Option<u64>,
    #[serde(default)]
    pub related_summary_id: Option<u64>,
    #[serde(default)]
    pub manually_created: bool,
    #[serde(default)]
    pub starred: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PerformanceAlertSummary {
    pub id: u64,
    pub push_id: u64,
    #[serde(default)]
    pub prev_push_id: Option<u64>,
    pub created: NaiveDateTime,
    pub repository: String,
    pub framework: u64,
    #[serde(default)]
    pub alerts: Vec<PerformanceAlert>,
    #[serde(default)]
    pub related_alerts: Vec<PerformanceAlert>,
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub bug_number: Option<u64>,
    #[serde(default)]
    pub revision: Option<String>,
    #[serde(default)]
    pub original_revision: Option<String>,
    #[serde(default)]
    pub assignee_username: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PerformanceAlertSummary {
    pub fn regression_count(&self) -> usize {
        self.alerts.iter().filter(|a| a.is_regression).count()
    }

    pub fn improvement_count(&self) -> usize {
        self.alerts.iter().filter(|a| !a.is_regression).count()
    }
}

// Reference data
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OptionName {
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OptionCollection {
    pub option_collection_hash: String,
    #[serde(default)]
    pub options: Vec<OptionName>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FailureClassification {
    pub id: u64,
    pub name: String,
}

// Failure analysis models
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FailureByBug {
    pub bug_id: u64,
    pub job_id: u64,
    #[serde(default)]
    pub push_time: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub revision: String,
    #[serde(default)]
    pub test_suite: String,
    #[serde(default)]
    pub tree: String,
    #[serde(default)]
    pub build_type: String,
    #[serde(default)]
    pub machine_name: String,
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub task_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TextLogError {
    pub id: u64,
    pub line: String,
    pub line_number: u64,
    #[serde(default)]
    pub new_failure: bool,
    #[serde(default)]
    pub job: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BugMatch {
    pub id: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub resolution: String,
    pub summary: String,
    #[serde(default)]
    pub dupe_of: Option<u64>,
    #[serde(default)]
    pub crash_signature: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub whiteboard: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct BugSuggestionBugs {
    #[serde(default)]
    pub open_recent: Vec<BugMatch>,
    #[serde(default)]
    pub all_others: Vec<BugMatch>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BugSuggestion {
    pub search: String,
    #[serde(default)]
    pub path_end: Option<String>,
    #[serde(default)]
    pub search_terms: Vec<String>,
    #[serde(default)]
    pub bugs: BugSuggestionBugs,
    #[serde(default)]
    pub line_number: u64,
    #[serde(default)]
    pub failure_new_in_rev: bool,
}

impl BugSuggestion {
    pub fn bug_count(&self) -> usize {
        self.bugs.open_recent.len() + self.bugs.all_others.len()
    }
}

impl ResultModel for Repository {}
impl ResultModel for Push {}
impl ResultModel for Job {}
impl ResultModel for JobLogUrl {}
impl ResultModel for PerformanceFramework {}
impl ResultModel for PerformanceAlertSummary {}
impl ResultModel for OptionCollection {}
impl ResultModel for FailureClassification {}
impl ResultModel for FailureByBug {}
impl ResultModel for TextLogError {}
impl ResultModel for BugSuggestion {}
