//! Command-line interface for Warrantree.

mod commands;

use clap::{Parser, Subcommand};

/// Warrantree - warranty tracker for shared household vaults
#[derive(Parser)]
#[command(name = "warrantree")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web API server
    #[command(alias = "daemon", alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// List warranty categories
    #[command(alias = "cats")]
    Categories,

    /// Create a user account
    AddUser {
        /// Login email
        email: String,
        /// Display name
        name: String,
        /// Initial password
        password: String,
        /// Grant the ADMIN role
        #[arg(long)]
        admin: bool,
    },
}

pub use commands::*;
