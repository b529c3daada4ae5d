use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::BufReader;

use bodega_bot::application::commands::default_registry;
use bodega_bot::application::errors::{BotError, ConfigError};
use bodega_bot::application::messaging::{InteractionDispatcher, MessageParser};
use bodega_bot::application::scheduler::{announcement_jobs, AnnouncementKind, Scheduler};
use bodega_bot::application::services::CommandService;
use bodega_bot::domain::entities::CommandContext;
use bodega_bot::domain::traits::{Backend, ChatPlatform};
use bodega_bot::infrastructure::adapters::console::{self, ConsoleAdapter, CONSOLE_CHANNEL};
use bodega_bot::infrastructure::adapters::discord::{self, DiscordAdapter, DiscordRest, GatewayConfig};
use bodega_bot::infrastructure::backend::BackendApi;
use bodega_bot::infrastructure::config::Config;
use bodega_bot::infrastructure::heartbeat::Heartbeat;
use bodega_bot::infrastructure::http::HttpClient;
use bodega_bot::infrastructure::relay::{self, RelayState};

#[derive(Parser)]
#[command(name = "bodega-bot")]
#[command(about = "League stats bot for Discord", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Discord bot token (overrides config and DISCORD_TOKEN)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot (console mode when no token is configured)
    Run,
    /// Publish slash commands to Discord and exit
    Register,
    /// Post one announcement now and exit
    Announce {
        #[arg(value_enum)]
        job: Job,
    },
    /// Serve the webhook relay
    Relay,
    /// Show version
    Version,
    /// Generate default config
    InitConfig {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Job {
    Mvp,
    Leaderboard,
}

impl From<Job> for AnnouncementKind {
    fn from(job: Job) -> Self {
        match job {
            Job::Mvp => AnnouncementKind::Mvp,
            Job::Leaderboard => AnnouncementKind::Leaderboard,
        }
    }
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Version => {
            println!("bodega-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig { output } => init_config(output.as_deref()),
        command => {
            let config = load_config(&cli.config, cli.token);
            tokio::runtime::Runtime::new()
                .map_err(|e| BotError::Internal(format!("starting runtime: {}", e)))
                .and_then(|rt| {
                    rt.block_on(async move {
                        match command {
                            Commands::Run => run_bot(config).await,
                            Commands::Register => register(config).await,
                            Commands::Announce { job } => announce(config, job.into()).await,
                            Commands::Relay => relay::serve(
                                &config.relay.listen,
                                RelayState::new(config.relay.webhook_url.clone()),
                            )
                            .await,
                            Commands::Version | Commands::InitConfig { .. } => Ok(()),
                        }
                    })
                })
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "bodega-bot stopped");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: &str, token_override: Option<String>) -> Config {
    let config = if std::path::Path::new(path).exists() {
        Config::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        })
    } else {
        Config::default()
    };

    let mut config = config.with_env_overrides();
    if let Some(token) = token_override {
        config.discord.token = Some(token);
    }
    config
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .ok_or_else(|| ConfigError::MissingField(field.to_string()))
}

fn backend(config: &Config) -> Arc<dyn Backend> {
    Arc::new(BackendApi::new(HttpClient::new(), config.api.base_url.clone()))
}

fn discord_adapter(config: &Config) -> Result<Arc<DiscordAdapter>, ConfigError> {
    let token = required(&config.discord.token, "discord.token")?;
    let app_id = required(&config.discord.application_id, "discord.application-id")?;
    Ok(Arc::new(DiscordAdapter::new(DiscordRest::new(token), app_id)))
}

fn dispatcher(platform: Arc<dyn ChatPlatform>, backend: Arc<dyn Backend>) -> Result<InteractionDispatcher, BotError> {
    let registry = Arc::new(default_registry()?);
    let commands = CommandService::new(registry, CommandContext::new(platform.clone(), backend));
    Ok(InteractionDispatcher::new(commands, platform))
}

fn start_background(config: &Config, channel_id: &str, platform: Arc<dyn ChatPlatform>, backend: Arc<dyn Backend>) -> Result<(), BotError> {
    let platform_name = platform.name().to_string();
    let jobs = announcement_jobs(
        channel_id,
        &config.schedule.mvp,
        &config.schedule.leaderboard,
        backend,
        platform,
    )?;
    let scheduler = Scheduler::new(jobs);
    for job in scheduler.jobs() {
        tracing::info!(job = %job.name, schedule = %job.schedule, platform = %platform_name, "scheduled announcement");
    }
    scheduler.start();

    if let Some(url) = &config.heartbeat.url {
        Heartbeat::new(HttpClient::new(), url.clone(), Duration::from_secs(config.heartbeat.interval_seconds.max(1))).spawn();
    }
    Ok(())
}

async fn run_bot(config: Config) -> Result<(), BotError> {
    tracing::info!("Starting {}", config.bot.name);
    let backend = backend(&config);

    if config.discord.token.is_none() {
        tracing::warn!("no Discord token configured, running in console mode");
        let console = Arc::new(ConsoleAdapter::new());
        let dispatcher = dispatcher(console.clone(), backend.clone())?;
        let channel = config.discord.announce_channel_id.as_deref().unwrap_or(CONSOLE_CHANNEL);
        start_background(&config, channel, console.clone(), backend)?;

        let stdin = BufReader::new(tokio::io::stdin());
        return console::run_console(stdin, console, dispatcher, MessageParser::new(&config.bot.prefix)).await;
    }

    config.validate()?;
    let discord = discord_adapter(&config)?;
    let dispatcher = dispatcher(discord.clone(), backend.clone())?;
    let channel = required(&config.discord.announce_channel_id, "discord.announce-channel-id")?;
    start_background(&config, channel, discord, backend)?;

    let token = required(&config.discord.token, "discord.token")?;
    discord::serve_interactions(GatewayConfig::new(token), dispatcher).await
}

async fn register(config: Config) -> Result<(), BotError> {
    config.validate_registration()?;
    let discord = discord_adapter(&config)?;
    let registry = default_registry()?;

    let guild = if config.discord.register_global {
        None
    } else {
        config.discord.guild_id.as_deref()
    };
    let count = discord.register_commands(&registry, guild).await?;
    println!("Registered {} commands ({})", count, guild.map_or("global".to_string(), |g| format!("guild {}", g)));
    Ok(())
}

async fn announce(config: Config, kind: AnnouncementKind) -> Result<(), BotError> {
    config.validate_api()?;
    let discord = discord_adapter(&config)?;
    let channel = required(&config.discord.announce_channel_id, "discord.announce-channel-id")?;

    let jobs = announcement_jobs(
        channel,
        &config.schedule.mvp,
        &config.schedule.leaderboard,
        backend(&config),
        discord,
    )?;
    let scheduler = Scheduler::new(jobs);
    let job = scheduler
        .job(kind.job_name())
        .ok_or_else(|| BotError::Internal(format!("no job named {}", kind.job_name())))?;
    job.run_once().await?;
    tracing::info!(job = kind.job_name(), "announcement posted");
    Ok(())
}

fn init_config(output: Option<&str>) -> Result<(), BotError> {
    let yaml = Config::default().to_yaml()?;
    match output {
        Some(path) => {
            std::fs::write(path, yaml).map_err(|e| BotError::Internal(format!("writing {}: {}", path, e)))?;
            println!("Wrote default config to {}", path);
        }
        None => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
    }
    Ok(())
}
