//! CyberLens — application entry point.
//!
//! This is the shell that wires together all domains and commands.
//! No business logic lives here, only module declarations, env loading,
//! logger setup and command dispatch.
//!
//! Commands are split across:
//!   - commands.rs      — one handler per CLI subcommand
//!   - pipeline.rs      — image scan orchestration (preprocess → OCR → classify)
//!   - pipeline_text.rs — text-only classification
//!   - settings.rs      — analyzer resolution + API key storage

pub mod analysis;
pub mod capture;
pub mod cli;
mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod ocr;
pub mod pipeline;
pub mod pipeline_text;
pub mod preprocess;
pub mod report;
pub mod settings;

use clap::Parser;
use cli::{Cli, Command};
use config::AppConfig;

/// Parse arguments, run one command and return the process exit code.
pub fn run() -> i32 {
    // Load .env.local → .env from the working directory.
    'env_load: for env_file in [".env.local", ".env"] {
        let path = std::path::Path::new(env_file);
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            break 'env_load;
        }
    }

    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {}", e);
            return 1;
        }
    };

    let outcome = runtime.block_on(async move {
        match cli.command {
            Command::Scan {
                image,
                mode,
                local,
                no_history,
                json,
            } => commands::scan(config, &image, mode.as_deref(), local, no_history, json).await,
            Command::Analyze {
                text,
                local,
                no_history,
                json,
            } => commands::analyze(config, text, local, no_history, json).await,
            Command::Preprocess {
                input,
                output,
                mode,
            } => commands::preprocess_image(config, &input, &output, mode.as_deref()),
            Command::History { limit, clear, json } => {
                commands::history(config, limit, clear, json)
            }
            Command::SetKey { key } => commands::set_key(&key),
            Command::TestRemote => commands::test_remote(config).await,
            Command::Status => commands::status(config),
        }
    });

    match outcome {
        Ok(()) => 0,
        Err(message) => {
            log::error!("[CLI] {}", message);
            eprintln!("Error: {}", message);
            1
        }
    }
}
