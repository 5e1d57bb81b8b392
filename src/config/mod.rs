//! Configuration module for Rank-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use rank_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Pulling {} search terms", config.pull.search_terms.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, DirectoryConfig, OutputConfig, PullConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
