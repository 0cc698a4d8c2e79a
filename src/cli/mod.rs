pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "imgmotion")]
#[command(about = "imgMotionMagic CLI - tool catalogue, tool generator and API helpers")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Browse the generation tool catalogue")]
    Tools {
        #[command(subcommand)]
        cmd: commands::tools::ToolsCommands,
    },

    #[command(about = "Parse FAL.ai documentation and generate tool code")]
    Toolgen {
        #[command(subcommand)]
        cmd: commands::toolgen::ToolgenCommands,
    },

    #[command(about = "Inspect generation outputs the way the asset library does")]
    Assets {
        #[command(subcommand)]
        cmd: commands::assets::AssetsCommands,
    },

    #[command(about = "Client route table and guard decisions")]
    Routes {
        #[command(subcommand)]
        cmd: commands::routes::RoutesCommands,
    },

    #[command(about = "Mint access tokens for local testing")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "Follow generation changes from a running server")]
    Watch(commands::watch::WatchArgs),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Tools { cmd } => commands::tools::handle(cmd, output_format).await,
        Commands::Toolgen { cmd } => commands::toolgen::handle(cmd, output_format).await,
        Commands::Assets { cmd } => commands::assets::handle(cmd, output_format).await,
        Commands::Routes { cmd } => commands::routes::handle(cmd, output_format).await,
        Commands::Token { cmd } => commands::token::handle(cmd, output_format).await,
        Commands::Watch(args) => commands::watch::handle(args, output_format).await,
    }
}
