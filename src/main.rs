mod cli;
mod config;
mod db;
mod insights;
mod models;
mod tracking;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::migrations::run_migrations;
use db::repository::MetaRepo;
use models::{HabitUpdate, NewHabit, User};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    // Run migrations on every startup
    run_migrations(&conn)?;

    match cli.command {
        Some(Commands::Setup { reset }) => {
            handlers::handle_setup(&conn, &mut config, reset)?;
        }

        // Everything else acts on the active profile
        Some(cmd) => {
            let user = ensure_setup(&conn, &mut config)?;
            run_command(&conn, &mut config, &user, cmd)?;
        }

        // No subcommand → launch TUI
        None => {
            let user = ensure_setup(&conn, &mut config)?;
            tui::app::run(conn, config, user)?;
        }
    }

    Ok(())
}

fn run_command(conn: &Connection, config: &mut AppConfig, user: &User, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Setup { reset } => {
            handlers::handle_setup(conn, config, reset)?;
        }
        Commands::Add {
            name,
            category,
            description,
            frequency,
            color,
            icon,
        } => {
            let new = NewHabit {
                name,
                description,
                category,
                frequency: None,
                color,
                icon,
            };
            handlers::handle_add(conn, user, new, frequency.as_deref())?;
        }
        Commands::List { all } => {
            handlers::handle_list(conn, user, config, all)?;
        }
        Commands::Show { habit } => {
            handlers::handle_show(conn, user, config, &habit)?;
        }
        Commands::Edit {
            habit,
            name,
            description,
            category,
            frequency,
            color,
            icon,
            active,
        } => {
            let update = HabitUpdate {
                name,
                description,
                category,
                frequency: None,
                color,
                icon,
                is_active: active,
            };
            handlers::handle_edit(conn, user, &habit, update, frequency.as_deref())?;
        }
        Commands::Remove { habit } => {
            handlers::handle_remove(conn, user, &habit)?;
        }
        Commands::Done {
            habit,
            date,
            undo,
            note,
        } => {
            handlers::handle_done(conn, user, &habit, date.as_deref(), undo, note.as_deref())?;
        }
        Commands::Calendar { year, month, json } => {
            handlers::handle_calendar(conn, user, year, month, json)?;
        }
        Commands::Stats { json } => {
            handlers::handle_stats(conn, user, config, json)?;
        }
        Commands::Achievements => {
            handlers::handle_achievements(conn, user)?;
        }
        Commands::Insights => {
            handlers::handle_insights(conn, user, config)?;
        }
        Commands::Suggest { goals, add } => {
            handlers::handle_suggest(conn, user, config, goals.as_deref(), add)?;
        }
        Commands::User { action } => {
            handlers::handle_user(conn, user, action.as_ref())?;
        }
        Commands::Seed => {
            handlers::handle_seed(conn, user)?;
        }
        Commands::Export => {
            handlers::handle_export(conn, user)?;
        }
    }
    Ok(())
}

/// Resolve the active profile, running the setup wizard when there is none.
fn ensure_setup(conn: &Connection, config: &mut AppConfig) -> Result<User> {
    let done = MetaRepo::get(conn, "setup_done")?;
    if done.as_deref() == Some("1") {
        if let Some(user) = handlers::current_user(conn, config)? {
            return Ok(user);
        }
    }
    eprintln!("No profile found. Running setup...");
    eprintln!();
    handlers::handle_setup(conn, config, true)
}
