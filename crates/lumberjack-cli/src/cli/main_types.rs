use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lumberjack")]
#[command(about = "Query pushes, jobs, logs and performance data from Mozilla Treeherder")]
#[command(version)]
#[command(after_help = "Examples:
  lumberjack repos                              # List active repositories
  lumberjack pushes autoland -n 5               # Latest 5 pushes on autoland
  lumberjack jobs autoland --push-id 123 --result testfailed
  lumberjack job autoland <job-guid> --logs     # Job details with log URLs
  lumberjack log autoland 456 --search TEST-UNEXPECTED --context 3
  lumberjack --json perf-alerts -r autoland     # Alert summaries as JSON

Environment Variables:
  TREEHERDER_URL       Treeherder server URL
  TREEHERDER_API_KEY   API key sent as a bearer token
  RUST_LOG             Log filter (e.g. lumberjack_core=debug)")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Treeherder server URL
    #[arg(short, long, global = true, env = "TREEHERDER_URL")]
    pub server: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Custom configuration directory path
    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    /// API key for authenticated requests
    #[arg(long, global = true, env = "TREEHERDER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available repositories
    Repos {
        /// Include inactive repositories
        #[arg(long)]
        all: bool,
    },
    /// List pushes for a project
    Pushes(PushesArgs),
    /// List jobs for a project
    Jobs(JobsArgs),
    /// Show details for a job by GUID
    Job {
        /// Repository name (e.g. mozilla-central, autoland)
        project: String,
        /// Job GUID
        job_guid: String,
        /// Show log URLs
        #[arg(long)]
        logs: bool,
    },
    /// Fetch a job log, optionally searching it
    Log(LogArgs),
    /// List performance alert summaries
    PerfAlerts {
        /// Filter by repository
        #[arg(short, long)]
        repository: Option<String>,
        /// Filter by framework ID
        #[arg(short, long)]
        framework: Option<u64>,
        /// Number of summaries to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
    /// List performance frameworks
    PerfFrameworks,
    /// List failure classifications
    Classifications,
    /// List option collection hashes
    OptionCollections,
    /// Failures associated with a bug
    Failures(FailuresArgs),
    /// Error lines extracted from a job's log
    Errors {
        project: String,
        job_id: u64,
    },
    /// Bug suggestions for a job's failures
    Suggestions {
        project: String,
        job_id: u64,
    },
    /// Jobs similar to a given job
    Similar {
        project: String,
        job_id: u64,
        /// Number of jobs to show
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },
    /// Configuration management (show, set)
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args, Debug)]
pub struct PushesArgs {
    /// Repository name (e.g. mozilla-central, autoland)
    pub project: String,
    /// Number of pushes to show (0 for a single unbounded request)
    #[arg(short = 'n', long, default_value_t = 10)]
    pub count: usize,
    /// Filter by revision
    #[arg(short, long)]
    pub revision: Option<String>,
    /// Filter by author email
    #[arg(short, long)]
    pub author: Option<String>,
}

#[derive(Args, Debug)]
pub struct JobsArgs {
    /// Repository name (e.g. mozilla-central, autoland)
    pub project: String,
    /// Filter by push ID
    #[arg(long)]
    pub push_id: Option<u64>,
    /// Filter by job GUID
    #[arg(long)]
    pub guid: Option<String>,
    /// Filter by result (success, testfailed, busted, ...)
    #[arg(long)]
    pub result: Option<String>,
    /// Filter by state (pending, running, completed)
    #[arg(long)]
    pub state: Option<String>,
    /// Filter by tier (1, 2 or 3)
    #[arg(long)]
    pub tier: Option<u8>,
    /// Number of jobs to show (0 for a single unbounded request)
    #[arg(short = 'n', long, default_value_t = 20)]
    pub count: usize,
}

#[derive(Args, Debug)]
#[command(after_help = "Examples:
  lumberjack log autoland 456                         # Print the first log artifact
  lumberjack log autoland 456 --name live_backing_log
  lumberjack log autoland 456 --search ERROR --context 2 --max-matches 10")]
pub struct LogArgs {
    /// Repository name
    pub project: String,
    /// Job ID
    pub job_id: u64,
    /// Log artifact name (defaults to the first one listed)
    #[arg(long)]
    pub name: Option<String>,
    /// Print only lines containing this text (case-sensitive)
    #[arg(long)]
    pub search: Option<String>,
    /// Lines of context around each match
    #[arg(short = 'C', long, default_value_t = 0, requires = "search")]
    pub context: usize,
    /// Stop after this many matches
    #[arg(long, requires = "search")]
    pub max_matches: Option<usize>,
}

#[derive(Args, Debug)]
pub struct FailuresArgs {
    /// Bug number
    pub bug: u64,
    /// First day (YYYY-MM-DD)
    #[arg(long)]
    pub startday: Option<String>,
    /// Last day (YYYY-MM-DD)
    #[arg(long)]
    pub endday: Option<String>,
    /// Restrict to a tree (e.g. trunk, autoland)
    #[arg(long)]
    pub tree: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Set a configuration value
    #[command(after_help = "Examples:
  lumberjack config set server_url https://treeherder.allizom.org
  lumberjack config set page_size 500
  lumberjack config set timeout_secs 60")]
    Set {
        /// One of: server_url, page_size, timeout_secs
        field: String,
        value: String,
    },
}
