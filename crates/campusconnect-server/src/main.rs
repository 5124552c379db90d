use std::env;

use campusconnect_server::ServerBuilder;
use campusconnect_server::config::loader::load_config;

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From CAMPUSCONNECT_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (campusconnect.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (CAMPUSCONNECT_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env if present; optional for local development
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    campusconnect_server::observability::init_tracing();

    let (config_path, source) = resolve_config_path();

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );

    campusconnect_server::observability::apply_logging_level(&cfg.logging.level);

    let server = ServerBuilder::new().with_config(cfg).build();
    if let Err(err) = server.run().await {
        eprintln!("Server error: {err}");
    }
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: CAMPUSCONNECT_CONFIG
/// 3. Default: campusconnect.toml
fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return (path, ConfigSource::CliArgument);
            }
        }
    }

    if let Ok(path) = env::var("CAMPUSCONNECT_CONFIG") {
        if !path.is_empty() {
            return (path, ConfigSource::EnvironmentVariable);
        }
    }

    ("campusconnect.toml".to_string(), ConfigSource::Default)
}
