//! Write every stored order into the consolidated export file.
//!
//! Usage: `flooring-export [CONFIG_JSON]`. Without an argument the path in
//! `FLOORING_CONFIG` is used; without that, defaults plus `FLOORING_*`
//! overrides.

use std::process::ExitCode;

use flooring_infra::{AppConfig, ConfigError, FileAuditLog, FileOrderStore, OrderService};

const CONFIG_VAR: &str = "FLOORING_CONFIG";

fn load_config() -> Result<AppConfig, ConfigError> {
    let path = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os(CONFIG_VAR));
    match path {
        Some(path) => Ok(AppConfig::from_json_file(path)?
            .with_overrides(|key| std::env::var(key).ok())),
        None => Ok(AppConfig::from_env()),
    }
}

fn main() -> ExitCode {
    flooring_observability::init();

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "failed to load config");
            return ExitCode::FAILURE;
        }
    };

    let store = FileOrderStore::new(&config.orders_dir);
    let audit = FileAuditLog::new(&config.audit_file);
    let service = OrderService::new(config, store, audit);

    match service.export_all() {
        Ok(summary) => {
            tracing::info!(
                partitions = summary.partitions,
                orders = summary.orders,
                "export complete"
            );
            match serde_json::to_string_pretty(&summary) {
                Ok(json) => println!("{json}"),
                Err(err) => {
                    tracing::error!(error = %err, "failed to render summary");
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "export failed");
            ExitCode::FAILURE
        }
    }
}
