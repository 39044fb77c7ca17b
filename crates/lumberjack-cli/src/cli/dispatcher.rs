use crate::cli::command_handlers::{
    ConfigHandler, JobHandler, LogHandler, Output, PerfHandler, PushHandler, ReferenceHandler,
};
use crate::cli::main_types::{Commands, ConfigCommands};
use lumberjack_core::api::client::{ClientConfig, TreeherderClient};
use lumberjack_core::api::endpoints::AlertSummaryFilter;
use lumberjack_core::core::services::config_service::ConfigService;
use lumberjack_core::error::AppError;
use lumberjack_core::storage::config::Config;
use lumberjack_core::storage::credentials::get_api_key;
use std::path::PathBuf;

pub struct Dispatcher {
    config: Config,
    config_path: Option<PathBuf>,
    server: Option<String>,
    api_key: Option<String>,
    json: bool,
}

impl Dispatcher {
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        server: Option<String>,
        api_key: Option<String>,
        json: bool,
    ) -> Self {
        Self {
            config,
            config_path,
            server,
            api_key,
            json,
        }
    }

    // CLI arg > env var
    fn get_effective_api_key(&self) -> Option<String> {
        match &self.api_key {
            Some(key) if !key.is_empty() => Some(key.clone()),
            _ => get_api_key(),
        }
    }

    fn client_config(&self) -> ClientConfig {
        self.config
            .to_client_config(self.server.as_deref(), self.get_effective_api_key())
    }

    fn create_client(&self) -> Result<TreeherderClient, AppError> {
        let client_config = self.client_config();
        log::debug!(
            "Using server {} (authenticated: {})",
            client_config.server_url,
            client_config.api_key.is_some()
        );
        TreeherderClient::with_config(client_config)
    }

    // Needs no client, so a bad stored server_url can still be fixed
    fn handle_config(&self, command: ConfigCommands) -> Result<(), AppError> {
        let client_config = self.client_config();
        let mut config_service = ConfigService::new(self.config.clone());
        ConfigHandler::new().handle(
            command,
            &mut config_service,
            client_config.server_url.trim_end_matches('/'),
            self.config_path.clone(),
        )
    }

    pub async fn dispatch(&self, command: Commands) -> Result<(), AppError> {
        if let Commands::Config { command } = command {
            return self.handle_config(command);
        }

        let client = self.create_client()?;
        let output = Output::new(self.json);

        match command {
            Commands::Repos { all } => PushHandler::new().handle_repos(all, &client, &output).await,
            Commands::Pushes(args) => {
                PushHandler::new()
                    .handle_pushes(args, &client, &output)
                    .await
            }
            Commands::Jobs(args) => JobHandler::new().handle_jobs(args, &client, &output).await,
            Commands::Job {
                project,
                job_guid,
                logs,
            } => {
                JobHandler::new()
                    .handle_job(&project, &job_guid, logs, &client, &output)
                    .await
            }
            Commands::Log(args) => LogHandler::new().handle(args, &client, &output).await,
            Commands::PerfAlerts {
                repository,
                framework,
                limit,
            } => {
                let filter = AlertSummaryFilter {
                    repository,
                    framework,
                    limit,
                };
                PerfHandler::new()
                    .handle_alerts(filter, &client, &output)
                    .await
            }
            Commands::PerfFrameworks => {
                PerfHandler::new()
                    .handle_frameworks(&client, &output)
                    .await
            }
            Commands::Classifications => {
                ReferenceHandler::new()
                    .handle_classifications(&client, &output)
                    .await
            }
            Commands::OptionCollections => {
                ReferenceHandler::new()
                    .handle_option_collections(&client, &output)
                    .await
            }
            Commands::Failures(args) => {
                ReferenceHandler::new()
                    .handle_failures(args, &client, &output)
                    .await
            }
            Commands::Errors { project, job_id } => {
                JobHandler::new()
                    .handle_errors(&project, job_id, &client, &output)
                    .await
            }
            Commands::Suggestions { project, job_id } => {
                JobHandler::new()
                    .handle_suggestions(&project, job_id, &client, &output)
                    .await
            }
            Commands::Similar {
                project,
                job_id,
                count,
            } => {
                JobHandler::new()
                    .handle_similar(&project, job_id, count, &client, &output)
                    .await
            }
            Commands::Config { command } => self.handle_config(command),
        }
    }
}
