//! # people
//!
//! A small admin tool for people, their countries, and their pets, built on
//! formwork forms and stored in SQLite.
//!
//! ## Running
//!
//! ```bash
//! cargo run --package people-demo -- --database people.db add \
//!     --first-name Ada --last-name Lovelace --gender f \
//!     --date-of-birth 1815-12-10 --country "United Kingdom" --country-code GB \
//!     --pet Puck:dog
//! cargo run --package people-demo -- --database people.db list
//! cargo run --package people-demo -- nav /people
//! ```
//!
//! Settings come from an optional TOML file (`--config`), then the
//! `FORMWORK_*` environment variables, then the command-line flags.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use formwork_core::logging::setup_logging;
use formwork_core::{settings_loader, Settings};
use formwork_db_backends::SqliteBackend;

use commands::{AddOutcome, NewPerson};

#[derive(Debug, Parser)]
#[command(name = "people", version, about = "Manage people, their countries, and their pets")]
struct Cli {
    /// TOML settings file.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// SQLite database path; overrides the settings.
    #[arg(long)]
    database: Option<String>,

    /// Log filter directive; overrides the settings.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a person with their country and pets.
    Add(AddArgs),
    /// List stored people.
    List,
    /// Print the navigation HTML for a request path.
    Nav {
        #[arg(default_value = "/people")]
        path: String,
    },
}

#[derive(Debug, Args)]
struct AddArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    /// m, f, or o.
    #[arg(long)]
    gender: String,
    /// YYYY-MM-DD.
    #[arg(long)]
    date_of_birth: String,
    #[arg(long)]
    country: String,
    /// Two-letter code, used when the country is new.
    #[arg(long, default_value = "")]
    country_code: String,
    /// A pet as `name:species`; repeatable.
    #[arg(long = "pet", value_parser = parse_pet)]
    pets: Vec<(String, String)>,
}

impl From<AddArgs> for NewPerson {
    fn from(args: AddArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            gender: args.gender,
            date_of_birth: args.date_of_birth,
            country: args.country,
            country_code: args.country_code,
            pets: args.pets,
        }
    }
}

fn parse_pet(raw: &str) -> Result<(String, String), String> {
    let (name, species) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected name:species, got '{raw}'"))?;
    Ok((name.trim().to_string(), species.trim().to_string()))
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => settings_loader::from_toml_file_with_env(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => settings_loader::from_env(),
    };
    if let Some(database) = &cli.database {
        settings.database.name.clone_from(database);
    }
    if let Some(level) = &cli.log_level {
        settings.log_level.clone_from(level);
    }
    Ok(settings)
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = load_settings(&cli)?;
    setup_logging(&settings);
    formwork_forms::config::configure(&settings.forms);

    if let Command::Nav { path } = &cli.command {
        println!("{}", commands::render_navigation(path)?);
        return Ok(ExitCode::SUCCESS);
    }

    let db = SqliteBackend::from_settings(&settings.database)
        .with_context(|| format!("opening database '{}'", settings.database.name))?;
    commands::migrate(&db)?;
    tracing::debug!(database = %db.path().display(), "database ready");

    match cli.command {
        Command::Add(args) => match commands::add_person(&db, &args.into())? {
            AddOutcome::Saved { id, full_name } => {
                println!("added {full_name} (#{id})");
                Ok(ExitCode::SUCCESS)
            }
            AddOutcome::Rejected(report) => {
                eprintln!("{}", serde_json::to_string_pretty(&report)?);
                Ok(ExitCode::FAILURE)
            }
        },
        Command::List => {
            for line in commands::list_people(&db)? {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Nav { .. } => Ok(ExitCode::SUCCESS),
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
