use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        match self.email.provider {
            EmailProvider::Smtp => {
                if self.email.smtp_host.trim().is_empty() {
                    return Err("email.provider=smtp requires email.smtp_host".into());
                }
                if self.email.from_email.trim().is_empty() {
                    return Err("email.provider=smtp requires email.from_email".into());
                }
            }
            EmailProvider::Sendgrid => {
                if self.email.sendgrid_api_key.as_deref().unwrap_or("").is_empty() {
                    return Err("email.provider=sendgrid requires email.sendgrid_api_key".into());
                }
                if self.email.from_email.trim().is_empty() {
                    return Err("email.provider=sendgrid requires email.from_email".into());
                }
            }
            EmailProvider::None => {}
        }
        if self.notifications.send_timeout_ms == 0 {
            return Err("notifications.send_timeout_ms must be > 0".into());
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.notifications.send_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    5001
}
fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// Which outbound email transport to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    Smtp,
    Sendgrid,
    /// No outbound email; notifications are still broadcast over the live
    /// feed and dispatch outcomes report zero attempts.
    #[default]
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EmailConfig {
    #[serde(default)]
    pub provider: EmailProvider,
    #[serde(default)]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_username: Option<String>,
    #[serde(default)]
    pub smtp_password: Option<String>,
    #[serde(default)]
    pub sendgrid_api_key: Option<String>,
    #[serde(default)]
    pub from_email: String,
}

fn default_smtp_port() -> u16 {
    587
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Upper bound on each recipient send, in milliseconds.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
}

fn default_send_timeout_ms() -> u64 {
    10_000
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            send_timeout_ms: default_send_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                let default_path = PathBuf::from("campusconnect.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g. CAMPUSCONNECT__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("CAMPUSCONNECT")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.server.port, 5001);
        assert_eq!(cfg.email.provider, EmailProvider::None);
        assert_eq!(cfg.notifications.send_timeout_ms, 10_000);
    }

    #[test]
    fn test_smtp_requires_host_and_from() {
        let mut cfg = AppConfig::default();
        cfg.email.provider = EmailProvider::Smtp;
        assert!(cfg.validate().is_err());

        cfg.email.smtp_host = "smtp.example.com".into();
        cfg.email.from_email = "noreply@example.com".into();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_sendgrid_requires_api_key() {
        let mut cfg = AppConfig::default();
        cfg.email.provider = EmailProvider::Sendgrid;
        cfg.email.from_email = "noreply@example.com".into();
        assert!(cfg.validate().is_err());

        cfg.email.sendgrid_api_key = Some("SG.test".into());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut cfg = AppConfig::default();
        cfg.logging.level = "verbose".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_toml_parsing() {
        let raw = r#"
            [server]
            port = 8080

            [email]
            provider = "sendgrid"
            sendgrid_api_key = "SG.key"
            from_email = "events@campus.edu"

            [notifications]
            send_timeout_ms = 5000
        "#;
        let cfg: AppConfig = toml::from_str(raw).unwrap();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.email.provider, EmailProvider::Sendgrid);
        assert_eq!(cfg.send_timeout(), std::time::Duration::from_millis(5000));
    }
}
