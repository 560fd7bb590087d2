//! Command line definitions. Each subcommand stands in for one page of
//! the web application.

use clap::{Parser, Subcommand};
use todocache_core::view::StatusFilter;

#[derive(Debug, Parser)]
#[command(name = "todocache", version, about = "Browse and edit todos from a local cache of a REST API")]
pub struct Cli {
    /// Base URL of the todo API
    #[arg(long, global = true, env = "TODOCACHE_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List todos (page `/`)
    List {
        /// Only show todos whose title contains this text
        #[arg(short, long, default_value = "")]
        search: String,

        /// all, completed or incomplete
        #[arg(long, default_value_t = StatusFilter::All)]
        status: StatusFilter,

        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Show a page straight from the server instead of the cache
        #[arg(long)]
        remote: bool,
    },

    /// Show one todo (page `/todos/{id}`)
    Show { id: i64 },

    /// Create a todo in the local cache
    Add {
        title: String,

        #[arg(long)]
        completed: bool,
    },

    /// Edit a todo
    Edit {
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        completed: Option<bool>,
    },

    /// Delete a todo
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Create an account (page `/signup`)
    Signup { email: Option<String> },

    /// Sign in (page `/signin`)
    Signin { email: Option<String> },

    /// Sign out of the current session
    Signout,

    /// Show the signed-in dashboard (page `/dashboard`)
    Dashboard,

    /// Open a page by path, e.g. `/todos/3`
    Open { path: String },
}
