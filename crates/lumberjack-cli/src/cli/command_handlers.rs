use crate::cli::main_types::{ConfigCommands, FailuresArgs, JobsArgs, LogArgs, PushesArgs};
use lumberjack_core::api::client::TreeherderClient;
use lumberjack_core::api::endpoints::{
    AlertSummaryFilter, FailuresByBugFilter, JobFilter, PushFilter,
};
use lumberjack_core::api::models::{DEFAULT_TC_ROOT_URL, ResultModel, to_json_array};
use lumberjack_core::core::log_search::SearchOptions;
use lumberjack_core::core::services::config_service::{CONFIG_FIELDS, ConfigService};
use lumberjack_core::display::TableDisplay;
use lumberjack_core::error::AppError;
use lumberjack_core::storage::config::Config;
use lumberjack_core::storage::credentials::has_api_key;
use serde_json::Value;
use std::path::PathBuf;

/// Chooses between JSON and table output for every command.
pub struct Output {
    json: bool,
    display: TableDisplay,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            display: TableDisplay::new(),
        }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    fn print_json(&self, value: &Value) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{}", text),
            Err(_) => println!("{}", value),
        }
    }

    /// Print a list either as a JSON array or through `render`.
    fn list<T: ResultModel>(&self, items: &[T], render: impl Fn(&TableDisplay, &[T]) -> String) {
        if self.json {
            self.print_json(&to_json_array(items));
        } else {
            println!("{}", render(&self.display, items));
        }
    }

    fn item<T: ResultModel>(&self, item: &T, render: impl Fn(&TableDisplay, &T) -> String) {
        if self.json {
            self.print_json(&item.to_json_value());
        } else {
            println!("{}", render(&self.display, item));
        }
    }
}

#[derive(Default)]
pub struct PushHandler;

impl PushHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle_repos(
        &self,
        all: bool,
        client: &TreeherderClient,
        output: &Output,
    ) -> Result<(), AppError> {
        let mut repositories = client.get_repositories().await?;
        if !all {
            repositories.retain(|repo| repo.is_active());
        }
        log::debug!("{} repositories after filtering", repositories.len());
        output.list(&repositories, |d, items| d.render_repositories(items));
        Ok(())
    }

    pub async fn handle_pushes(
        &self,
        args: PushesArgs,
        client: &TreeherderClient,
        output: &Output,
    ) -> Result<(), AppError> {
        let filter = PushFilter {
            count: args.count,
            revision: args.revision,
            author: args.author,
        };
        let pushes = client.get_pushes(&args.project, &filter).await?;
        if !output.is_json() {
            println!("Pushes for {}", args.project);
        }
        output.list(&pushes, |d, items| d.render_pushes(items));
        Ok(())
    }
}

#[derive(Default)]
pub struct JobHandler;

impl JobHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle_jobs(
        &self,
        args: JobsArgs,
        client: &TreeherderClient,
        output: &Output,
    ) -> Result<(), AppError> {
        let filter = JobFilter {
            count: args.count,
            push_id: args.push_id,
            job_guid: args.guid,
            result: args.result,
            state: args.state,
            tier: args.tier,
        };
        let jobs = client.get_jobs(&args.project, &filter).await?;
        output.list(&jobs, |d, items| d.render_jobs(items));
        Ok(())
    }

    pub async fn handle_job(
        &self,
        project: &str,
        job_guid: &str,
        show_logs: bool,
        client: &TreeherderClient,
        output: &Output,
    ) -> Result<(), AppError> {
        let job = client.get_job_by_guid(project, job_guid).await?;

        if !show_logs {
            output.item(&job, |d, job| d.render_job_detail(job, DEFAULT_TC_ROOT_URL));
            return Ok(());
        }

        let logs = client.get_job_log_urls(project, job.id).await?;
        if output.is_json() {
            let mut value = job.to_json_value();
            if let Value::Object(map) = &mut value {
                map.insert("logs".to_string(), to_json_array(&logs));
            }
            output.print_json(&value);
        } else {
            output.item(&job, |d, job| d.render_job_detail(job, DEFAULT_TC_ROOT_URL));
            output.list(&logs, |d, items| d.render_log_urls(items));
        }
        Ok(())
    }

    pub async fn handle_errors(
        &self,
        project: &str,
        job_id: u64,
        client: &TreeherderClient,
        output: &Output,
    ) -> Result<(), AppError> {
        let errors = client.get_text_log_errors(project, job_id).await?;
        output.list(&errors, |d, items| d.render_text_log_errors(items));
        Ok(())
    }

    pub async fn handle_suggestions(
        &self,
        project: &str,
        job_id: u64,
        client: &TreeherderClient,
        output: &Output,
    ) -> Result<(), AppError> {
        let suggestions = client.get_bug_suggestions(project, job_id).await?;
        output.list(&suggestions, |d, items| d.render_bug_suggestions(items));
        Ok(())
    }

    pub async fn handle_similar(
        &self,
        project: &str,
        job_id: u64,
        count: usize,
        client: &TreeherderClient,
        output: &Output,
    ) -> Result<(), AppError> {
        let jobs = client.get_similar_jobs(project, job_id, count).await?;
        output.list(&jobs, |d, items| d.render_jobs(items));
        Ok(())
    }
}

#[derive(Default)]
pub struct LogHandler;

impl LogHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        args: LogArgs,
        client: &TreeherderClient,
        output: &Output,
    ) -> Result<(), AppError> {
        let name = args.name.as_deref();

        let Some(pattern) = args.search.as_deref() else {
            let log = client.get_job_log(&args.project, args.job_id, name).await?;
            if output.is_json() {
                let mut value = log.reference.to_json_value();
                if let Value::Object(map) = &mut value {
                    map.insert("text".to_string(), Value::String(log.text));
                }
                output.print_json(&value);
            } else {
                print!("{}", log.text);
            }
            return Ok(());
        };

        let options = SearchOptions {
            context_lines: args.context,
            max_matches: args.max_matches,
        };
        let matches = client
            .search_job_log(&args.project, args.job_id, pattern, name, options)
            .await?;
        log::debug!("{} matches for '{}'", matches.len(), pattern);
        output.list(&matches, |d, items| d.render_log_matches(items));
        Ok(())
    }
}

#[derive(Default)]
pub struct PerfHandler;

impl PerfHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle_alerts(
        &self,
        filter: AlertSummaryFilter,
        client: &TreeherderClient,
        output: &Output,
    ) -> Result<(), AppError> {
        let summaries = client.get_performance_alert_summaries(&filter).await?;
        output.list(&summaries, |d, items| d.render_alert_summaries(items));
        Ok(())
    }

    pub async fn handle_frameworks(
        &self,
        client: &TreeherderClient,
        output: &Output,
    ) -> Result<(), AppError> {
        let frameworks = client.get_performance_frameworks().await?;
        output.list(&frameworks, |d, items| d.render_frameworks(items));
        Ok(())
    }
}

#[derive(Default)]
pub struct ReferenceHandler;

impl ReferenceHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle_classifications(
        &self,
        client: &TreeherderClient,
        output: &Output,
    ) -> Result<(), AppError> {
        let classifications = client.get_failure_classifications().await?;
        output.list(&classifications, |d, items| {
            d.render_failure_classifications(items)
        });
        Ok(())
    }

    pub async fn handle_option_collections(
        &self,
        client: &TreeherderClient,
        output: &Output,
    ) -> Result<(), AppError> {
        let collections = client.get_option_collection_hash().await?;
        output.list(&collections, |d, items| d.render_option_collections(items));
        Ok(())
    }

    pub async fn handle_failures(
        &self,
        args: FailuresArgs,
        client: &TreeherderClient,
        output: &Output,
    ) -> Result<(), AppError> {
        let filter = FailuresByBugFilter {
            bug: args.bug,
            startday: args.startday,
            endday: args.endday,
            tree: args.tree,
        };
        let failures = client.get_failures_by_bug(&filter).await?;
        output.list(&failures, |d, items| d.render_failures_by_bug(items));
        Ok(())
    }
}

#[derive(Default)]
pub struct ConfigHandler;

impl ConfigHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(
        &self,
        command: ConfigCommands,
        config_service: &mut ConfigService,
        effective_server: &str,
        config_path: Option<PathBuf>,
    ) -> Result<(), AppError> {
        match command {
            ConfigCommands::Show => {
                println!("Current Configuration:");
                println!("=====================");
                println!("Effective server: {}", effective_server);

                if has_api_key() {
                    println!("API Key: Set (TREEHERDER_API_KEY)");
                } else {
                    println!("API Key: Not set");
                }

                let path = match config_path {
                    Some(path) => path,
                    None => Config::config_file_path()?,
                };
                println!("\nConfig file: {}", path.display());
                for field in CONFIG_FIELDS {
                    let value = config_service.get_field(field)?;
                    println!("  {}: {}", field, value.as_deref().unwrap_or("(not set)"));
                }
                Ok(())
            }
            ConfigCommands::Set { field, value } => {
                log::debug!("Setting config field {} to {}", field, value);
                config_service.set_field(&field, &value)?;
                config_service.save_config(config_path)?;
                println!("Set {} to {}", field, value);
                Ok(())
            }
        }
    }
}
