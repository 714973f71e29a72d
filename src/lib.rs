//! stew: install precompiled binaries from GitHub releases or URLs and keep
//! track of them in `Stewfile.lock.json`.

pub mod archive;
pub mod asset;
pub mod cli;
pub mod commands;
pub mod config;
pub mod crypto;
pub mod download;
pub mod errors;
pub mod input;
pub mod install;
pub mod lockfile;
pub mod models;
pub mod prompt;
pub mod render;
pub mod utils;

pub use errors::StewError;
pub use models::*;
