//! Diary CLI
//!
//! Command-line interface over the local diary stores:
//! - Record entries with their analysis
//! - Review recent history and pattern analytics
//! - Inspect the prompt context handed to the model
//! - Maintain the embedded and external profiles

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use diary::config::{generate_default_config, Config, LoggingConfig};
use diary::context::{placeholder_template, ContextBuilder};
use diary::report::{analytics_report, history_report};
use diary::storage::{
    now_local, AnalysisResult, DiaryHistory, ExternalProfile, ProfileStore, ProfileUpdate,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "diary")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Journal history and personalised context engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record an entry together with its analysis
    Add {
        title: String,
        content: String,
        /// Overall mood (positive, negative, neutral, ...)
        #[arg(short, long)]
        mood: Option<String>,
        #[arg(short, long, default_value = "")]
        summary: String,
        #[arg(short, long, default_value = "")]
        advice: String,
        /// Backfill the entry on this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// List entries from the last days, newest first
    Recent {
        #[arg(short, long)]
        days: Option<i64>,
    },

    /// Overview of the last days
    Summary {
        #[arg(short, long)]
        days: Option<i64>,
    },

    /// Pattern analysis as JSON
    Patterns,

    /// Analytics report
    Analytics,

    /// Print the prompt context the model would receive
    Context {
        #[arg(short, long)]
        days: Option<i64>,
    },

    /// Profile embedded in the history document
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Hand-edited external profile
    External {
        #[command(subcommand)]
        action: ExternalAction,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    Show,
    /// Update the given fields, leaving the rest unchanged
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        occupation: Option<String>,
        /// Comma-separated
        #[arg(long, value_delimiter = ',')]
        interests: Option<Vec<String>>,
        /// Comma-separated
        #[arg(long, value_delimiter = ',')]
        goals: Option<Vec<String>>,
    },
}

#[derive(Subcommand)]
pub enum ExternalAction {
    Show,
    Context,
    Summary,
    /// Replace the profile with the JSON document at `path`
    Import { path: PathBuf },
    /// Write the placeholder template to fill in
    Template {
        /// Overwrite a profile that already has content
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("diary={}", logging.level)));

    let writer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .init();
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // config problems are reported before the configured subscriber exists
    let bootstrap = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let mut config = tracing::subscriber::with_default(bootstrap, || match &cli.config {
        Some(path) => Config::load_with_env(path),
        None => Ok(Config::load_default()),
    })?;
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Config { output } => write_config(output),
        command => run(command, cli.format, &config),
    }
}

fn write_config(output: Option<PathBuf>) -> anyhow::Result<()> {
    let content = generate_default_config();
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &content)?;
            println!("Config written to {:?}", path);
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn run(command: Commands, format: OutputFormat, config: &Config) -> anyhow::Result<()> {
    let data_dir = config.storage.data_path();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data directory {:?}", data_dir))?;
    tracing::debug!("Data directory: {:?}", data_dir);

    let history = Arc::new(DiaryHistory::open(config.storage.history_path()));
    let profiles = Arc::new(ProfileStore::open(config.storage.profile_path()));
    let context = ContextBuilder::new(Arc::clone(&history), Arc::clone(&profiles));

    match command {
        Commands::Add {
            title,
            content,
            mood,
            summary,
            advice,
            date,
        } => {
            let emotions = match mood {
                Some(mood) => serde_json::json!({ "overall_mood": mood }),
                None => serde_json::json!({}),
            };
            let analysis = AnalysisResult::new(emotions, summary, advice);
            let created_at = match date {
                Some(day) => day.and_time(now_local().time()),
                None => now_local(),
            };

            let entry = history
                .try_append_entry_at(&title, &content, analysis, created_at)
                .context("failed to record entry")?;
            match format {
                OutputFormat::Json => print_json(&entry)?,
                OutputFormat::Text => println!(
                    "Recorded #{} 「{}」 ({} chars)",
                    entry.sequence_id, entry.title, entry.length
                ),
            }
        }

        Commands::Recent { days } => {
            let days = days.unwrap_or(config.context.history_days);
            let entries = history.try_recent_entries(days)?;
            match format {
                OutputFormat::Json => print_json(&entries)?,
                OutputFormat::Text if entries.is_empty() => {
                    println!("No entries in the last {} days", days)
                }
                OutputFormat::Text => {
                    for entry in &entries {
                        println!(
                            "#{} {} 「{}」 [{}] {}",
                            entry.sequence_id,
                            entry.created_at.format("%Y-%m-%d %H:%M"),
                            entry.title,
                            entry.mood().unwrap_or(diary::storage::UNKNOWN_MOOD),
                            entry.summary_or_default()
                        );
                    }
                }
            }
        }

        Commands::Summary { days } => {
            let days = days.unwrap_or(config.context.summary_days);
            let summary = history.history_summary(days);
            match format {
                OutputFormat::Json => print_json(&summary)?,
                OutputFormat::Text => print!("{}", history_report(summary.as_ref(), days)),
            }
        }

        Commands::Patterns => print_json(&history.analyze_patterns())?,

        Commands::Analytics => {
            let profile = history.get_profile();
            let patterns = history.analyze_patterns();
            print!("{}", analytics_report(profile.as_ref(), &patterns));
        }

        Commands::Context { days } => {
            let days = days.unwrap_or(config.context.history_days);
            let text = context.build_full_context(days);
            if text.is_empty() {
                println!("(no context)");
            } else {
                println!("{}", text);
            }
        }

        Commands::Profile { action } => match action {
            ProfileAction::Show => match format {
                OutputFormat::Json => print_json(&history.try_profile()?)?,
                OutputFormat::Text => {
                    let text = context.build_embedded_profile_context();
                    if text.is_empty() {
                        println!("(profile is empty)");
                    } else {
                        println!("{}", text);
                    }
                }
            },
            ProfileAction::Set {
                name,
                age,
                occupation,
                interests,
                goals,
            } => {
                let update = ProfileUpdate {
                    name,
                    age,
                    occupation,
                    interests,
                    goals,
                };
                history
                    .try_update_profile(&update)
                    .context("failed to update profile")?;
                println!("Profile updated");
            }
        },

        Commands::External { action } => match action {
            ExternalAction::Show => print_json(&profiles.try_load()?)?,
            ExternalAction::Context => {
                let text = context.build_profile_context();
                if text.is_empty() {
                    println!("(nothing set)");
                } else {
                    println!("{}", text);
                }
            }
            ExternalAction::Summary => println!("{}", profiles.summary()),
            ExternalAction::Import { path } => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {:?}", path))?;
                let profile: ExternalProfile = serde_json::from_str(&raw)
                    .with_context(|| format!("parsing {:?}", path))?;
                profiles.try_save(&profile)?;
                println!("Imported profile from {:?}", path);
            }
            ExternalAction::Template { force } => {
                let template = placeholder_template();
                if force {
                    profiles.try_save(&template)?;
                } else if !profiles.try_save_if_empty(&template)? {
                    anyhow::bail!(
                        "{:?} already has content; pass --force to overwrite it",
                        profiles.path()
                    );
                }
                println!("Template written to {:?}", profiles.path());
            }
        },

        Commands::Config { output } => write_config(output)?,
    }

    Ok(())
}
