//! Todocache - a terminal front end for a cached todo list.
//!
//! Reads are served from the local cache when one exists; edits and
//! deletes go to the remote API first.

mod app;
mod cli;
mod render;
mod session;

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use cli::{Cli, Command};
use todocache_core::view::ListQuery;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_tracing();
    info!("Todocache starting");

    let mut app = App::new(cli.api_url)?;

    let result = match cli.command.unwrap_or(Command::List {
        search: String::new(),
        status: Default::default(),
        page: 1,
        remote: false,
    }) {
        Command::List {
            search,
            status,
            page,
            remote,
        } => {
            if remote {
                app.list_remote(page).await
            } else {
                app.list(ListQuery {
                    search,
                    status,
                    page,
                })
                .await
            }
        }
        Command::Show { id } => app.show(id).await,
        Command::Add { title, completed } => app.add(title, completed).await,
        Command::Edit {
            id,
            title,
            completed,
        } => app.edit(id, title, completed).await,
        Command::Delete { id, yes } => app.delete(id, yes).await,
        Command::Signup { email } => app.sign_up(email),
        Command::Signin { email } => app.sign_in(email).await,
        Command::Signout => app.sign_out(),
        Command::Dashboard => app.dashboard().await,
        Command::Open { path } => app.open(&path).await,
    };

    app.shutdown();
    info!("Todocache shutting down");
    result
}
