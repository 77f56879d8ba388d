//! CLI bootstrap check.
//!
//! # Responsibility
//! - Resolve configuration from the environment and open the configured
//!   storage backend exactly as a server process would at startup.
//! - Exit non-zero when the backend cannot be opened.

use log::info;
use pages_core::{core_version, init_logging_from_config, open_service, ping, CoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = CoreConfig::from_env();

    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("pages_cli logging init failed: {err}");
        return ExitCode::FAILURE;
    }

    let service = match open_service(&config) {
        Ok(service) => service,
        Err(err) => {
            eprintln!("pages_cli backend={} open failed: {err}", config.backend);
            return ExitCode::FAILURE;
        }
    };
    info!(
        "event=cli_bootstrap module=cli status=ok backend={}",
        service.backend()
    );

    println!("pages_core ping={}", ping());
    println!("pages_core version={}", core_version());
    println!("pages_core backend={}", service.backend());
    ExitCode::SUCCESS
}
