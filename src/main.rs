// src/main.rs — weekcoach entry point

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;

use weekcoach::activity::file::JsonlFileSink;
use weekcoach::activity::google_sheets::{GoogleCredentials, GoogleSheetsSink};
use weekcoach::activity::{ActivityLog, LogSink};
use weekcoach::cli::{Cli, Commands, ProfileArgs};
use weekcoach::content::ContentStore;
use weekcoach::infra::config::{ActivityConfig, Config, SinkKind};
use weekcoach::infra::{logger, paths};
use weekcoach::provider::resolver;
use weekcoach::session::{ControllerSettings, SessionController, UserProfile};

#[tokio::main]
async fn main() {
    // Respects WEEKCOACH_LOG / RUST_LOG
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = if let Some(ref path) = cli.config {
        Config::load_from(Path::new(path))?
    } else {
        Config::load()?
    };
    if let Some(dir) = cli.content_dir {
        config.content.dir = PathBuf::from(dir);
    }

    // Missing content is fatal before anything else happens.
    let content = Arc::new(ContentStore::load(&config.content.dir, &config.content.weeks)?);
    let Some(first_week) = content.first().map(|w| w.id) else {
        anyhow::bail!("No weeks configured. Add [[content.weeks]] entries to your config.");
    };

    match cli.command {
        Some(Commands::Weeks) => {
            weekcoach::cli::weeks::show_weeks(&content);
            Ok(())
        }
        Some(Commands::Intro { week, profile }) => {
            let controller = build_controller(&config, content, &profile, None).await?;
            weekcoach::cli::intro::run_intro(&controller, week).await
        }
        Some(Commands::Chat {
            week,
            profile,
            no_log,
        }) => {
            let activity = if no_log {
                None
            } else {
                init_activity(&config.activity).await
            };
            let controller = build_controller(&config, content, &profile, activity).await?;
            weekcoach::cli::chat::run_chat(&controller, week.unwrap_or(first_week)).await
        }
        None => {
            let activity = init_activity(&config.activity).await;
            let controller =
                build_controller(&config, content, &ProfileArgs::default(), activity).await?;
            weekcoach::cli::chat::run_chat(&controller, first_week).await
        }
    }
}

async fn build_controller(
    config: &Config,
    content: Arc<ContentStore>,
    profile: &ProfileArgs,
    activity: Option<ActivityLog>,
) -> anyhow::Result<SessionController> {
    let backend = resolver::build_backend(&config.model).await?;
    let mut controller =
        SessionController::new(backend, content, ControllerSettings::from_config(config))
            .with_profile(UserProfile::new(profile.goal.clone(), profile.why.clone()));
    if let Some(log) = activity {
        controller = controller.with_activity(log);
    }
    Ok(controller)
}

/// Build the configured log sink. Returns None (and warns) when logging is
/// disabled or the sink cannot be set up; logging never blocks a session.
async fn init_activity(config: &ActivityConfig) -> Option<ActivityLog> {
    if !config.enabled {
        return None;
    }

    let sink: Box<dyn LogSink> = match config.sink {
        SinkKind::File => {
            let dir = config.dir.clone().unwrap_or_else(paths::logs_dir);
            Box::new(JsonlFileSink::new(dir))
        }
        SinkKind::Sheets => {
            let Some(ref id) = config.spreadsheet_id else {
                tracing::warn!("[activity] sink = \"sheets\" needs spreadsheet_id. Logging disabled.");
                return None;
            };
            match GoogleSheetsSink::connect(id.clone(), &GoogleCredentials::from_env()).await {
                Ok(s) => Box::new(s),
                Err(e) => {
                    tracing::warn!("Google Sheets logging unavailable: {}. Logging disabled.", e);
                    return None;
                }
            }
        }
    };

    let log = ActivityLog::new(
        sink,
        config.conversation_sheet.clone(),
        config.activity_sheet.clone(),
    );
    tracing::info!("Activity log: {}", log.sink_id());
    Some(log)
}
