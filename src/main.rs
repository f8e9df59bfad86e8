use meeting_dialer::application::MeetingService;
use meeting_dialer::config::Config;
use meeting_dialer::domain::call_control::CallControl;
use meeting_dialer::domain::meeting::{MeetingProvisioning, OutboundDialer};
use meeting_dialer::domain::session::SessionDirectory;
use meeting_dialer::domain::shared::value_objects::PhoneNumber;
use meeting_dialer::infrastructure::persistence::InMemorySessionDirectory;
use meeting_dialer::infrastructure::provisioning::{InMemoryMeetingService, LoggingDialer};
use meeting_dialer::interface::api::{build_router, init_metrics, AppState};
use meeting_dialer::interface::telephony::EventDispatcher;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "postgres")]
use meeting_dialer::infrastructure::persistence::{
    create_pool, run_migrations, PgSessionDirectory, PoolConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_directive()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Meeting Dialer");
    info!(
        "Configuration loaded (session ttl {}s, voice {})",
        config.session.ttl_secs, config.voice.voice_id
    );

    let sessions = session_directory(&config).await?;

    let meetings: Arc<dyn MeetingProvisioning> =
        Arc::new(InMemoryMeetingService::new(config.meeting.media_region.clone()));
    let dialer: Arc<dyn OutboundDialer> = {
        let dialer = LoggingDialer::new();
        match &config.meeting.from_number {
            Some(from) => Arc::new(dialer.with_from_number(PhoneNumber::new(from.as_str()))),
            None => Arc::new(dialer),
        }
    };
    info!(
        "Meeting provisioning initialized (media region {})",
        config.meeting.media_region
    );

    let control = Arc::new(CallControl::new(
        sessions.clone(),
        meetings.clone(),
        config.voice.clone(),
    ));
    let state = AppState {
        meetings: Arc::new(MeetingService::new(
            sessions,
            meetings,
            dialer,
            config.session_ttl(),
        )),
        dispatcher: Arc::new(EventDispatcher::new(control)),
    };

    let prometheus_handle = init_metrics()?;
    let app = build_router(state, prometheus_handle);

    let bind_addr = config.bind_address();
    info!("Starting API server on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down Meeting Dialer");
    Ok(())
}

#[cfg(feature = "postgres")]
async fn session_directory(config: &Config) -> anyhow::Result<Arc<dyn SessionDirectory>> {
    let Some(url) = config.database.url.as_deref() else {
        warn!("No database configured, session records are kept in memory");
        return Ok(Arc::new(InMemorySessionDirectory::new()));
    };

    info!("Initializing database connection...");
    let pool = create_pool(&PoolConfig::new(url)).await?;
    info!("Database connection pool created");

    info!("Running database migrations...");
    run_migrations(&pool).await?;
    info!("Database migrations completed");

    let directory = Arc::new(PgSessionDirectory::new(pool));

    // Reclaim rows of expired sessions
    let purger = directory.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            match purger.purge_expired().await {
                Ok(0) => {}
                Ok(count) => info!("Purged {} expired session records", count),
                Err(e) => warn!("Failed to purge expired session records: {}", e),
            }
        }
    });

    Ok(directory as Arc<dyn SessionDirectory>)
}

#[cfg(not(feature = "postgres"))]
async fn session_directory(config: &Config) -> anyhow::Result<Arc<dyn SessionDirectory>> {
    if config.database.url.is_some() {
        warn!("database.url is set but the postgres feature is disabled");
    }
    Ok(Arc::new(InMemorySessionDirectory::new()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Received Ctrl+C, shutting down...");
}
