#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the jeepney fleet engine.
//!
//! Exposes the engine contracts over REST: fare resolution and matrix
//! writes, trip booking and checkpoint scans, earnings summaries, shift
//! bracketing, and conflict queries. Each request is an independent,
//! short-lived operation; all state lives in the database.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use jeepney_database::{db, run_migrations};
use jeepney_earnings::BusinessCalendar;
use jeepney_fare_models::FareTiers;
use jeepney_trips_models::TripEngineConfig;
use std::sync::Arc;
use switchy_database::Database;

/// Shared application state.
pub struct AppState {
    /// Database connection.
    pub db: Arc<dyn Database>,
    /// Fare tier scale.
    pub tiers: FareTiers,
    /// Trip lifecycle tunables.
    pub trip_config: TripEngineConfig,
    /// Business-day calendar.
    pub calendar: BusinessCalendar,
}

/// Starts the jeepney fleet API server.
///
/// Connects to the database, runs migrations, and serves until stopped.
/// This is a regular async function — the caller provides the runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if the database connection or migrations fail.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    log::info!("Connecting to database...");
    let db_conn = db::connect_from_env()
        .await
        .expect("Failed to connect to database");

    log::info!("Running migrations...");
    run_migrations(db_conn.as_ref())
        .await
        .expect("Failed to run migrations");

    let state = web::Data::new(AppState {
        db: Arc::from(db_conn),
        tiers: FareTiers::default(),
        trip_config: TripEngineConfig::default(),
        calendar: BusinessCalendar::default(),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route(
                        "/routes/{route_id}/checkpoints",
                        web::get().to(handlers::route_checkpoints),
                    )
                    .route("/fare", web::get().to(handlers::fare_resolve))
                    .route("/fare", web::post().to(handlers::fare_upsert))
                    .route("/fare/generate", web::post().to(handlers::fare_generate))
                    .route("/trips", web::post().to(handlers::book_trip))
                    .route("/trips/{trip_id}/cancel", web::post().to(handlers::cancel_trip))
                    .route("/scans", web::post().to(handlers::checkpoint_scan))
                    .route(
                        "/earnings/{driver_id}",
                        web::get().to(handlers::earnings_summary),
                    )
                    .route(
                        "/earnings/{driver_id}",
                        web::post().to(handlers::record_earning),
                    )
                    .route("/shifts/{driver_id}/start", web::post().to(handlers::start_shift))
                    .route("/shifts/{driver_id}/end", web::post().to(handlers::end_shift))
                    .route("/conflicts/{checkpoint_id}", web::get().to(handlers::conflicts)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
