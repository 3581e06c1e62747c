use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atria_api::{
    app,
    state::{AppState, AuthConfig},
    worker,
};
use atria_core::gateway::{MockGateway, PaymentGateway, RazorpayGateway};
use atria_core::holds::{HoldRules, HoldService};
use atria_core::payments::PaymentService;
use atria_domain::{BookingStore, Room, RoomStore};
use atria_store::{DbClient, MemoryStore, PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atria_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = atria_store::app_config::Config::load()?;
    tracing::info!("Starting Atria API on port {}", config.server.port);

    // Storage: Postgres when configured, in-memory otherwise
    let (rooms, bookings): (Arc<dyn RoomStore>, Arc<dyn BookingStore>) =
        match &config.database.url {
            Some(url) => {
                let db = DbClient::new(url).await?;
                db.migrate().await?;
                let store = Arc::new(PgStore::new(db.pool.clone()));
                (
                    store.clone() as Arc<dyn RoomStore>,
                    store as Arc<dyn BookingStore>,
                )
            }
            None => {
                tracing::warn!("No database configured, using in-memory store");
                let store = Arc::new(MemoryStore::new());
                seed_rooms(store.as_ref()).await?;
                (
                    store.clone() as Arc<dyn RoomStore>,
                    store as Arc<dyn BookingStore>,
                )
            }
        };

    // Payment gateway: test mode when the key pair is absent
    let gateway: Arc<dyn PaymentGateway> = match config.gateway.credentials() {
        Some((key_id, key_secret)) => Arc::new(RazorpayGateway::new(
            key_id,
            key_secret,
            config.gateway.api_url.clone(),
        )),
        None => {
            tracing::warn!("Gateway credentials absent, payments run in test mode");
            Arc::new(MockGateway)
        }
    };

    let holds = Arc::new(HoldService::new(
        rooms.clone(),
        bookings.clone(),
        HoldRules {
            clock_skew: chrono::Duration::seconds(config.business_rules.clock_skew_seconds),
            allowed_durations_hours: config.business_rules.allowed_durations_hours.clone(),
        },
    ));
    let payments = Arc::new(PaymentService::new(
        rooms.clone(),
        bookings.clone(),
        gateway,
        config.gateway.key_secret.clone(),
        config.gateway.currency.clone(),
    ));

    let app_state = AppState {
        rooms,
        bookings: bookings.clone(),
        holds,
        payments,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        rules: config.business_rules.clone(),
    };

    // Background sweep keeps rooms live even with no request traffic
    tokio::spawn(worker::start_expiry_worker(
        bookings,
        app_state.grace(),
        std::time::Duration::from_secs(config.business_rules.sweep_interval_seconds),
    ));

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn seed_rooms(store: &MemoryStore) -> anyhow::Result<()> {
    for (name, capacity, price) in [
        ("Boardroom", 12, 800),
        ("Focus Pod", 2, 300),
        ("Studio", 6, 500),
    ] {
        let room = Room::new(name, capacity, price);
        tracing::info!(room_id = %room.id, name, "seeded room");
        store.insert_room(&room).await?;
    }
    Ok(())
}
