use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
pub enum KeyCommands {
    #[command(about = "Save an API key to the local credential store (expires after 30 days)")]
    Save {
        #[arg(long)]
        key: Option<String>,
    },
    #[command(about = "Remove the saved API key")]
    Clear,
    #[command(about = "Show where the active API key comes from (masked)")]
    Status,
}

#[derive(Debug, Subcommand)]
pub enum TelemetryCommands {
    #[command(about = "Summarize recovery runs from the telemetry JSONL stream")]
    Report {
        #[arg(long)]
        path: Option<String>,
        #[arg(long, default_value_t = 5000)]
        limit: usize,
    },
}

const CLI_EXAMPLES: &str = "Examples:\n\
  breakup-recovery key save --key <GEMINI_API_KEY>\n\
  breakup-recovery run \"We broke up after 3 years\"\n\
  breakup-recovery run --image chat1.png --image chat2.jpg \"Here are our last messages\"\n\
  breakup-recovery run --text-file story.txt --pace-ms 4000\n\
  breakup-recovery --profile free-tier run \"I miss them\"\n\
  breakup-recovery roles\n\
  breakup-recovery doctor\n\
  breakup-recovery telemetry report --limit 2000\n\
\n\
Key resolution:\n\
  - --api-key (or BREAKUP_RECOVERY_API_KEY) wins over a saved key.\n\
  - A saved key wins over GEMINI_API_KEY.\n\
  - `key clear` removes the saved key; expired keys are ignored.";

#[derive(Debug, Parser)]
#[command(name = "breakup-recovery")]
#[command(about = "Your AI support team: empathy, closure, a 7-day plan, and honest feedback")]
#[command(after_long_help = CLI_EXAMPLES)]
pub struct Cli {
    #[arg(long, env = "BREAKUP_RECOVERY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "BREAKUP_RECOVERY_MODEL")]
    pub model: Option<String>,

    #[arg(long, env = "BREAKUP_RECOVERY_API_BASE_URL")]
    pub api_base_url: Option<String>,

    #[arg(long, env = "BREAKUP_RECOVERY_PROFILE", default_value = "default")]
    pub profile: String,

    #[arg(
        long,
        env = "BREAKUP_RECOVERY_CONFIG",
        default_value = ".breakup-recovery/config.toml"
    )]
    pub config_path: String,

    #[arg(long, env = "BREAKUP_RECOVERY_PACE_MS")]
    pub pace_ms: Option<u64>,

    #[arg(long, env = "BREAKUP_RECOVERY_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    #[arg(long, env = "BREAKUP_RECOVERY_WEB_SEARCH", action = clap::ArgAction::Set)]
    pub web_search: Option<bool>,

    #[arg(long, env = "BREAKUP_RECOVERY_CREDENTIAL_PATH")]
    pub credential_path: Option<String>,

    #[arg(long, env = "BREAKUP_RECOVERY_CREDENTIAL_TTL_DAYS")]
    pub credential_ttl_days: Option<i64>,

    #[arg(long, env = "BREAKUP_RECOVERY_TELEMETRY_ENABLED", action = clap::ArgAction::Set)]
    pub telemetry_enabled: Option<bool>,

    #[arg(long, env = "BREAKUP_RECOVERY_TELEMETRY_PATH")]
    pub telemetry_path: Option<String>,

    #[arg(long, env = "BREAKUP_RECOVERY_SHOW_SENSITIVE_CONFIG", default_value_t = false)]
    pub show_sensitive_config: bool,

    #[arg(long, env = "RUST_LOG", default_value = "error")]
    pub log_filter: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Get a recovery plan from all four agents")]
    Run {
        text: Vec<String>,
        #[arg(long)]
        text_file: Option<String>,
        #[arg(long = "image")]
        images: Vec<String>,
    },
    #[command(about = "Manage the saved API key")]
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },
    #[command(about = "List the four agent roles and their instructions")]
    Roles,
    #[command(about = "Validate credential, model, and storage configuration")]
    Doctor,
    #[command(about = "Telemetry utilities and reporting")]
    Telemetry {
        #[command(subcommand)]
        command: TelemetryCommands,
    },
}

pub fn command_label(command: &Commands) -> String {
    match command {
        Commands::Run { .. } => "run".to_string(),
        Commands::Key { command } => match command {
            KeyCommands::Save { .. } => "key.save".to_string(),
            KeyCommands::Clear => "key.clear".to_string(),
            KeyCommands::Status => "key.status".to_string(),
        },
        Commands::Roles => "roles".to_string(),
        Commands::Doctor => "doctor".to_string(),
        Commands::Telemetry { command } => match command {
            TelemetryCommands::Report { .. } => "telemetry.report".to_string(),
        },
    }
}
