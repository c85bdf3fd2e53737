//! Application configuration
//!
//! This module provides centralized configuration management using the
//! `config` crate. Configuration can be loaded from environment variables
//! and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sources: SourcesConfig,
    pub pipeline: PipelineConfig,
    pub external_sink: ExternalSinkConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    30
}

/// Upstream source endpoints and pagination settings
#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    /// Calls source endpoint (e.g. "http://datasources:8000/calls")
    pub calls_url: String,

    /// Connections source endpoint
    pub connections_url: String,

    /// Call events source endpoint
    pub call_events_url: String,

    /// Operators source endpoint
    pub operators_url: String,

    /// Page size requested from each source
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: i64,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Attempts per page before the fetch (and the run) fails
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Base backoff between attempts in milliseconds; grows linearly
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

fn default_fetch_limit() -> i64 {
    100
}

fn default_request_timeout() -> u64 {
    10
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    200
}

/// Pipeline run behavior
#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Overall deadline for one run in seconds
    #[serde(default = "default_run_timeout")]
    pub run_timeout_secs: u64,

    /// Whether external-eligible calls whose connection was never answered
    /// are emitted with null timing fields (true) or excluded (false)
    #[serde(default = "default_include_unanswered")]
    pub include_unanswered: bool,

    /// Concurrent upserts issued against the persistent store
    #[serde(default = "default_upsert_concurrency")]
    pub upsert_concurrency: usize,
}

fn default_run_timeout() -> u64 {
    30
}

fn default_include_unanswered() -> bool {
    true
}

fn default_upsert_concurrency() -> usize {
    8
}

/// External CDR webhook configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ExternalSinkConfig {
    /// Batch delivery endpoint (e.g. "http://cdrclient:8001/records")
    pub upload_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.max_connections", 10)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("sources.fetch_limit", 100)?
            .set_default("sources.request_timeout_secs", 10)?
            .set_default("sources.retry_attempts", 3)?
            .set_default("sources.retry_backoff_ms", 200)?
            .set_default("pipeline.run_timeout_secs", 30)?
            .set_default("pipeline.include_unanswered", true)?
            .set_default("pipeline.upsert_concurrency", 8)?
            .set_default("external_sink.request_timeout_secs", 10)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with CALLFLOW_ prefix
            .add_source(
                Environment::with_prefix("CALLFLOW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("CALLFLOW").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            run_timeout_secs: 30,
            include_unanswered: true,
            upsert_concurrency: 8,
        }
    }
}
