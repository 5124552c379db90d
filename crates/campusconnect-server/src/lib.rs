pub mod config;
pub mod error;
pub mod handlers;
pub mod live;
pub mod observability;
pub mod server;

pub use config::{AppConfig, EmailConfig, EmailProvider, LoggingConfig, ServerConfig};
pub use error::ApiError;
pub use live::LiveFeed;
pub use observability::{apply_logging_level, init_tracing};
pub use server::{AppState, CampusConnectServer, ServerBuilder, build_app};
