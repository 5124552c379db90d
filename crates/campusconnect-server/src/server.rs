use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use campusconnect_db_memory::create_store;
use campusconnect_notifications::{
    EmailChannel, EmailTransport, NotificationDispatcher, RecipientResolver,
};
use campusconnect_storage::{EventStore, RegistrationStore, UserStore};

use crate::config::{AppConfig, EmailProvider};
use crate::handlers;
use crate::live::{LiveFeed, live_handler};

/// Shared application state, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventStore>,
    pub users: Arc<dyn UserStore>,
    pub registrations: Arc<dyn RegistrationStore>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub live: LiveFeed,
}

impl AppState {
    /// Wires stores, email transport, and dispatcher from configuration.
    ///
    /// The dispatcher is built once here and lives for the whole process.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let store = create_store();
        let events: Arc<dyn EventStore> = store.clone();
        let users: Arc<dyn UserStore> = store.clone();
        let registrations: Arc<dyn RegistrationStore> = store;

        let live = LiveFeed::new();
        let email = build_email_transport(cfg);
        let resolver = RecipientResolver::new(users.clone(), registrations.clone());
        let dispatcher = Arc::new(
            NotificationDispatcher::new(resolver, email, Arc::new(live.clone()))
                .with_send_timeout(cfg.send_timeout()),
        );

        Self {
            events,
            users,
            registrations,
            dispatcher,
            live,
        }
    }
}

fn build_email_transport(cfg: &AppConfig) -> Option<Arc<dyn EmailTransport>> {
    match cfg.email.provider {
        EmailProvider::Smtp => match EmailChannel::with_smtp(
            cfg.email.smtp_host.clone(),
            cfg.email.smtp_port,
            cfg.email.smtp_username.clone(),
            cfg.email.smtp_password.clone(),
            cfg.email.from_email.clone(),
        ) {
            Ok(channel) => {
                tracing::info!(host = %cfg.email.smtp_host, "email transport: SMTP");
                Some(Arc::new(channel))
            }
            Err(e) => {
                tracing::error!(error = %e, "SMTP transport setup failed, email disabled");
                None
            }
        },
        EmailProvider::Sendgrid => {
            tracing::info!("email transport: SendGrid");
            let api_key = cfg.email.sendgrid_api_key.clone().unwrap_or_default();
            Some(Arc::new(EmailChannel::with_sendgrid(
                api_key,
                cfg.email.from_email.clone(),
            )))
        }
        EmailProvider::None => {
            tracing::warn!("email transport not configured, only realtime announcements go out");
            None
        }
    }
}

pub fn build_app(cfg: &AppConfig, state: AppState) -> Router {
    let body_limit = cfg.server.body_limit_bytes;
    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        // Events
        .route("/events", get(handlers::list_events))
        .route("/events/{id}", get(handlers::get_event))
        .route("/add-event", post(handlers::add_event))
        .route("/update-event/{id}", put(handlers::update_event))
        .route("/delete-event/{id}", delete(handlers::delete_event))
        .route("/send-notification/{id}", post(handlers::send_notification))
        // Registrations and accounts
        .route("/register-event", post(handlers::register_event))
        .route("/signup", post(handlers::signup))
        .route("/signin", post(handlers::signin))
        // Realtime announcement feed
        .route("/live", get(live_handler))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http.request",
                    http.method = %req.method(),
                    http.target = %req.uri(),
                )
            }),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub struct CampusConnectServer {
    addr: SocketAddr,
    app: Router,
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn build(self) -> CampusConnectServer {
        let state = AppState::from_config(&self.config);
        let app = build_app(&self.config, state);
        CampusConnectServer {
            addr: self.addr,
            app,
        }
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CampusConnectServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
