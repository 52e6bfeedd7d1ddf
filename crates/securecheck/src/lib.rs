#![forbid(unsafe_code)]

pub mod catalog;
pub mod cli;
pub mod config;
pub mod matcher;
pub mod models;
pub mod render;
pub mod reports;
pub mod snapshot;
pub mod sqlite;

pub use cli::app::{Cli, Command};
