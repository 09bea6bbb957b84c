#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

pub mod agent;
pub mod app;
pub mod cli;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod gateway;
pub mod oracle;
pub mod providers;
pub mod tools;
pub mod world;

pub use config::Config;
pub use error::{ArtificerError, Result};
