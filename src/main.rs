//! vly-ability command line tool
//!
//! Evaluates abilities against fixture data: instance checks, compiled query
//! filters and status transitions.

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use vly_ability::{
    ability::{Action, Record, ResourceType, Role, TransitionGuard},
    builders::standard_compiler,
    config::{AppConfig, LogFormat, load_config},
    store::{Fixtures, MemoryStore},
};

/// Role-based ability engine for volunteer interests
#[derive(Parser, Debug)]
#[command(name = "vly-ability")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "VLY_ABILITY_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true, env = "VLY_ABILITY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Fixture file (JSON or TOML); overrides store.fixtures
    #[arg(short, long, global = true, env = "VLY_ABILITY_FIXTURES")]
    fixtures: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a session may perform an action on a stored interest
    Can {
        /// Session name from the fixtures (`anonymous` always exists)
        #[arg(short, long)]
        session: String,

        /// Resource type (interest, interest_archive)
        #[arg(short, long, default_value = "interest")]
        resource: String,

        /// Action (list, read, create, update, delete)
        #[arg(short, long)]
        action: String,

        /// Interest id
        #[arg(long)]
        id: String,
    },

    /// Print the query filter a session gets for an action
    Filter {
        #[arg(short, long)]
        session: String,

        #[arg(short, long, default_value = "interest")]
        resource: String,

        #[arg(short, long)]
        action: String,
    },

    /// Check a status transition against the transition tables
    Transition {
        #[arg(short, long, default_value = "interest")]
        resource: String,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Acting role
        #[arg(long)]
        role: String,
    },
}

fn init_logging(config: &AppConfig, level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or(&config.logging.level)));

    match config.logging.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init(),
    }
}

fn parse_resource(s: &str) -> anyhow::Result<ResourceType> {
    ResourceType::try_parse(s).ok_or_else(|| anyhow!("unknown resource: {}", s))
}

fn parse_action(s: &str) -> anyhow::Result<Action> {
    Action::try_parse(s).ok_or_else(|| anyhow!("unknown action: {}", s))
}

fn load_fixtures(args: &Args, config: &AppConfig) -> anyhow::Result<Fixtures> {
    let path = args
        .fixtures
        .as_deref()
        .or(config.store.fixtures.as_deref())
        .context("no fixture file given (use --fixtures or store.fixtures)")?;

    let expanded = shellexpand::tilde(path);
    let fixtures = Fixtures::load(expanded.into_owned())
        .with_context(|| format!("failed to load fixtures from {}", path))?;

    debug!(
        interests = fixtures.interests.len(),
        sessions = fixtures.sessions.len(),
        "Loaded fixtures"
    );
    Ok(fixtures)
}

fn verdict(granted: bool) -> ExitCode {
    if granted {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    init_logging(&config, args.log_level.as_deref());

    info!(version = env!("CARGO_PKG_VERSION"), "Starting vly-ability");

    let guard = TransitionGuard::from_config(&config.transitions)
        .inspect_err(|e| error!(error = %e, "Invalid transition tables"))?;

    match &args.command {
        Command::Transition {
            resource,
            from,
            to,
            role,
        } => {
            let resource = parse_resource(resource)?;
            let role = Role::try_parse(role).ok_or_else(|| anyhow!("unknown role: {}", role))?;

            let governed = guard.applies_to(resource, role);
            let allowed = guard.allowed_transition(resource, from, to, role);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "resource": resource.as_str(),
                    "from": from,
                    "to": to,
                    "role": role.as_str(),
                    "governed": governed,
                    "allowed": allowed,
                }))?
            );
            Ok(verdict(allowed))
        }

        Command::Can {
            session,
            resource,
            action,
            id,
        } => {
            let resource = parse_resource(resource)?;
            let action = parse_action(action)?;
            let fixtures = load_fixtures(&args, &config)?;
            let session = fixtures
                .session(session)
                .ok_or_else(|| anyhow!("unknown session: {}", session))?;

            let store = Arc::new(MemoryStore::from_fixtures(&fixtures));
            let compiler = standard_compiler(&config.engine, store.clone());
            let ability = compiler.compile(&session, resource).await?;

            let interest = store
                .find_by_id(resource, id)
                .await
                .ok_or_else(|| anyhow!("no {} with id {}", resource, id))?;
            let record = Record::from_value(resource, serde_json::to_value(&interest)?)
                .context("interest did not serialise to an object")?;

            let granted = ability.can(action, &record);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "resource": resource.as_str(),
                    "action": action.as_str(),
                    "id": id,
                    "granted": granted,
                    "categorical": !ability.has_grant(action),
                }))?
            );
            Ok(verdict(granted))
        }

        Command::Filter {
            session,
            resource,
            action,
        } => {
            let resource = parse_resource(resource)?;
            let action = parse_action(action)?;
            let fixtures = load_fixtures(&args, &config)?;
            let session = fixtures
                .session(session)
                .ok_or_else(|| anyhow!("unknown session: {}", session))?;

            let store = Arc::new(MemoryStore::from_fixtures(&fixtures));
            let compiler = standard_compiler(&config.engine, store);
            let ability = compiler.compile(&session, resource).await?;

            println!(
                "{}",
                serde_json::to_string_pretty(&ability.filter_for(action).to_query())?
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}
