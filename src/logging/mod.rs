/*!
 * Logging Module
 * Centralized logging configuration and utilities
 */
pub mod middleware;

use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the logging system.
///
/// The returned guards keep the non-blocking writer threads alive; the
/// caller must hold them for the program's lifetime or buffered log lines
/// are lost on shutdown.
#[must_use]
pub fn init() -> Vec<WorkerGuard> {
    let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
    let is_production = environment == "production";

    std::fs::create_dir_all("logs").ok();

    let (file_writer, file_guard) = non_blocking(rolling::daily("logs", "vault.log"));
    let (error_writer, error_guard) = non_blocking(rolling::daily("logs", "error.log"));
    let (console_writer, console_guard) = non_blocking(io::stdout());
    let guards = vec![file_guard, error_guard, console_guard];

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
        if is_production {
            "info".to_string()
        } else {
            "debug".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("vault_backend={log_level},tower_http=info"))
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    if is_production {
        // JSON everywhere in production so the lines are machine-ingestible.
        let file_layer = fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        let error_layer = fmt::layer()
            .json()
            .with_writer(error_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

        let console_layer = fmt::layer()
            .json()
            .with_writer(console_writer)
            .with_target(false);

        registry
            .with(file_layer)
            .with(error_layer)
            .with(console_layer)
            .init();
    } else {
        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_ansi(false);

        let console_layer = fmt::layer()
            .pretty()
            .with_writer(console_writer)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false);

        registry.with(file_layer).with(console_layer).init();
    }

    tracing::info!("logging initialized for {} environment", environment);
    guards
}
