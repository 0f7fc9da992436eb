use std::net::TcpListener;
use std::sync::Arc;

use anyhow::Context;

use sqlx::postgres::PgPoolOptions;

use remindr::app;
use remindr::client::EmailClient;
use remindr::clock::{Clock, SystemClock};
use remindr::notification::{EmailNotifier, NotificationEmitter, NotificationEngine};
use remindr::repo::Repos;
use remindr::settings::Settings;
use remindr::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = telemetry::create_subscriber("info", std::io::stdout);
    telemetry::set_subscriber(subscriber)?;

    let settings = Settings::load()?;

    let repos = match &settings.database {
        Some(database) => {
            let pool = PgPoolOptions::new()
                .acquire_timeout(std::time::Duration::from_secs(2))
                .connect_lazy_with(database.with_db());
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            Repos::postgres(pool)
        }
        None => {
            tracing::warn!("No database configured, reminders are kept in memory only");
            Repos::in_memory()
        }
    };

    let notifier = match settings.email.api_auth_token() {
        Some(api_auth_token) => {
            let email_client = EmailClient::new(
                settings.email.sender()?,
                settings.email.api_timeout(),
                settings.email.api_base_url()?,
                api_auth_token,
            )?;
            Arc::new(EmailNotifier::new(email_client))
        }
        None => {
            tracing::warn!("No email API token configured, notifications will not be delivered");
            Arc::new(EmailNotifier::disabled())
        }
    };
    let emitter: Arc<dyn NotificationEmitter> = notifier.clone();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let engine = NotificationEngine::with_interval(
        repos.clone(),
        emitter,
        clock.clone(),
        settings.notifications.interval(),
    );
    if settings.notifications.autostart {
        engine.start();
    }

    let listener = TcpListener::bind(settings.app.addr())?;
    tracing::info!(addr = %listener.local_addr()?, "Listening");

    app::run(listener, repos, engine, notifier, clock)?
        .await
        .context("Failed to run app")
}
