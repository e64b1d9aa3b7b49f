// src/cli/mod.rs — CLI definition (clap derive)

pub mod chat;
pub mod intro;
pub mod weeks;

use clap::{Args, Parser, Subcommand};

use crate::content::WeekId;

#[derive(Parser)]
#[command(name = "weekcoach", about = "Week-by-week mindfulness coaching chat", version)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Override the content directory from config
    #[arg(long, global = true)]
    pub content_dir: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive coaching chat (default)
    Chat {
        /// Week to start in (defaults to the first week)
        #[arg(short, long)]
        week: Option<WeekId>,

        #[command(flatten)]
        profile: ProfileArgs,

        /// Do not write conversation or activity logs
        #[arg(long)]
        no_log: bool,
    },
    /// List the weeks of the program
    Weeks,
    /// Print the generated introduction for a week
    Intro {
        #[arg(short, long)]
        week: WeekId,

        #[command(flatten)]
        profile: ProfileArgs,
    },
}

#[derive(Args, Clone, Default)]
pub struct ProfileArgs {
    /// Your goal, used to personalise the week intro
    #[arg(long)]
    pub goal: Option<String>,

    /// Your real why behind the goal
    #[arg(long)]
    pub why: Option<String>,
}
