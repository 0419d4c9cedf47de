use anyhow::Context;
use loan_tracker::configuration::{get_configuration, Settings};
use loan_tracker::connectors::{HttpMailer, LogMailer, Mailer};
use loan_tracker::db;
use loan_tracker::helpers::Argon2Hasher;
use loan_tracker::startup::{run, Backends, Components};
use loan_tracker::telemetry::{get_subscriber, init_subscriber};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("loan-tracker".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let settings = get_configuration().context("Failed to read configuration.")?;

    let mailer: Arc<dyn Mailer> = match &settings.mailer.relay_url {
        Some(relay_url) => Arc::new(HttpMailer::new(relay_url.clone())?),
        None => {
            tracing::warn!("No mail relay configured, links will only be logged");
            Arc::new(LogMailer)
        }
    };

    let backends = if settings.database.in_memory {
        tracing::warn!("Running with in-memory storage, nothing survives a restart");
        Backends {
            users: Arc::new(db::MemoryUserStore::new()),
            loans: Arc::new(db::MemoryLoanStore::new()),
            logs: Arc::new(db::MemoryLogStore::new()),
            hasher: Arc::new(Argon2Hasher),
            mailer,
        }
    } else {
        let pg_pool = connect(&settings).await?;
        Backends {
            users: Arc::new(db::PgUserStore::new(pg_pool.clone())),
            loans: Arc::new(db::PgLoanStore::new(pg_pool.clone())),
            logs: Arc::new(db::PgLogStore::new(pg_pool)),
            hasher: Arc::new(Argon2Hasher),
            mailer,
        }
    };

    let components = Components::build(&settings.auth, backends);

    let address = format!("{}:{}", settings.app_host, settings.app_port);
    tracing::info!("Start server at {:?}", &address);
    let listener =
        TcpListener::bind(&address).with_context(|| format!("failed to bind to {address}"))?;

    run(listener, components)?.await?;
    Ok(())
}

async fn connect(settings: &Settings) -> anyhow::Result<sqlx::PgPool> {
    tracing::info!(
        db_host = %settings.database.host,
        db_port = settings.database.port,
        db_name = %settings.database.database_name,
        "Connecting to PostgreSQL"
    );

    let connect_options = PgConnectOptions::new()
        .host(&settings.database.host)
        .port(settings.database.port)
        .username(&settings.database.username)
        .password(&settings.database.password)
        .database(&settings.database.database_name)
        .ssl_mode(PgSslMode::Disable);

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(connect_options)
        .await
        .context("Failed to connect to database.")?;

    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .context("Failed to run migrations.")?;

    Ok(pg_pool)
}
