//! qaflow CLI
//!
//! Terminal front end for the qaflow pipeline: an HTTP client for the
//! backend, configuration, session persistence and the command surface.

pub mod client;
pub mod commands;
pub mod config;
pub mod output;
pub mod progress;
pub mod samples;
pub mod session;

pub use client::HttpBackend;
pub use config::CliConfig;
