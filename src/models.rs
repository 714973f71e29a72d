use clap::{ArgAction, Parser, Subcommand};
use serde::{Deserialize, Serialize};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install binaries from GitHub repos, URLs, a Stewfile or a Stewfile.lock.json [Ex: stew install junegunn/fzf]
    #[command(visible_alias = "i")]
    Install {
        /// owner/repo[@tag][::asset][!!binary], a URL[!!binary], or a path to a Stewfile / Stewfile.lock.json
        #[arg(required = true)]
        inputs: Vec<String>,
        /// Never prompt: pick defaults or fail
        #[arg(short = 'y', long = "yes")]
        batch: bool,
    },
    /// Upgrade a binary to the latest release of its GitHub repo [Ex: stew upgrade fzf]
    #[command(visible_alias = "up")]
    Upgrade {
        /// Name of the installed binary
        binary: Option<String>,
        /// Upgrade all binaries, except those excluded in the config
        #[arg(long)]
        all: bool,
        /// Never prompt: pick defaults or fail
        #[arg(short = 'y', long = "yes")]
        batch: bool,
    },
    /// Uninstall a binary [Ex: stew uninstall fzf]
    #[command(visible_alias = "un")]
    Uninstall {
        /// Name of the installed binary
        binary: Option<String>,
        /// Uninstall all binaries
        #[arg(long)]
        all: bool,
    },
    /// Rename an installed binary [Ex: stew rename fzf]
    #[command(visible_alias = "re")]
    Rename {
        /// Name of the installed binary
        binary: String,
    },
    /// List installed binaries
    #[command(visible_alias = "ls")]
    List {
        /// Include the version tags
        #[arg(long)]
        tags: bool,
    },
    /// Configure the stew paths and upgrade exclusions
    Config,
}

/// GitHub release information
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

/// GitHub release asset information
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
}
