//! Notekeeper HTTP server.
//!
//! Serves passwordless sign-in and owner-scoped notes over a JSON API, backed
//! by PostgreSQL or, without a database URL, by in-memory storage.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use log::{info, warn};
use nk_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging, metrics,
};
use notekeeper::{
    auth::{AuthManager, GoogleVerifier, InMemoryOtpStore, SessionIssuer},
    db::{Database, MemoryNoteRepository, MemoryUserRepository, NoteRepository, UserRepository},
    mail::{LogMailer, MailTransport, SmtpMailer},
    notes::NoteManager,
};
use pico_args::Arguments;

const HELP: &str = "\
Run the notekeeper server

USAGE:
  nk_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:5000]
  --db-url     URL         Database connection string  [default: env DATABASE_URL, in-memory if unset]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  JWT_SECRET               Session signing secret (required, 32+ characters)
  GOOGLE_CLIENT_ID         Google OAuth client ID (required)
  EMAIL_USER, EMAIL_PASS   SMTP credentials; passcodes are logged when unset
  SMTP_HOST, SMTP_PORT     SMTP relay [default: smtp.gmail.com:465]
  EMAIL_FROM_NAME          Sender display name [default: NoteKeeper]
  OTP_TTL_SECS             Passcode lifetime, 0 for none [default: 0]
  CLIENT_URL               Allowed CORS origin [default: http://localhost:5173]
  METRICS_BIND             Prometheus exporter address
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;

    logging::init();

    let config = ServerConfig::from_env(bind, database_url)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(anyhow::Error::msg)?;
        info!("Prometheus metrics exposed at http://{}/metrics", addr);
    }

    // Storage
    let (database, users, notes): (
        Option<Database>,
        Arc<dyn UserRepository>,
        Arc<dyn NoteRepository>,
    ) = match &config.database {
        Some(db_config) => {
            info!("Connecting to database");
            let db = Database::open(db_config)
                .await
                .context("Failed to open database")?;
            info!("Database connected and migrated");

            (Some(db.clone()), db.user_repository(), db.note_repository())
        }
        None => {
            warn!("DATABASE_URL not set; users and notes are kept in memory");
            (
                None,
                Arc::new(MemoryUserRepository::new()),
                Arc::new(MemoryNoteRepository::new()),
            )
        }
    };

    // Mail
    let mailer: Arc<dyn MailTransport> = match &config.mail {
        Some(smtp) => {
            info!("Sending mail through {}:{}", smtp.host, smtp.port);
            Arc::new(SmtpMailer::new(smtp).context("Failed to configure SMTP")?)
        }
        None => {
            warn!("EMAIL_USER not set; passcodes are written to the log");
            Arc::new(LogMailer)
        }
    };

    let otp_store = match config.otp_ttl {
        Some(ttl) => InMemoryOtpStore::with_ttl(ttl),
        None => InMemoryOtpStore::new(),
    };

    let auth_manager = AuthManager::new(
        users,
        Arc::new(otp_store),
        mailer,
        Arc::new(GoogleVerifier::new(config.security.google_client_id.clone())),
        SessionIssuer::new(&config.security.jwt_secret),
    )
    .with_advertised_otp_ttl(config.otp_ttl);

    let note_manager = NoteManager::new(notes);

    let state = AppState::new(auth_manager, note_manager, database.clone());
    let cors = api::cors_layer(&config.client_url).context("Invalid CLIENT_URL")?;
    let app = api::create_router(state, cors);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
