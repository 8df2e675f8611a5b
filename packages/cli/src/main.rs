#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive operator CLI for the jeepney fleet toolchain.
//!
//! Unified entry point for fleet operators: regenerate a route's fare
//! matrix after a tariff change, sanity-check a fare ad hoc, or start the
//! API server.

use chrono::Utc;
use dialoguer::{Input, Select};
use jeepney_fare_models::FareTiers;

/// Top-level tool selection.
enum Tool {
    GenerateMatrix,
    ResolveFare,
    Server,
}

impl Tool {
    const ALL: &[Self] = &[Self::GenerateMatrix, Self::ResolveFare, Self::Server];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::GenerateMatrix => "Regenerate fare matrix for a route",
            Self::ResolveFare => "Resolve a fare",
            Self::Server => "Start API server",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    println!("Jeepney Fleet Toolchain");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::GenerateMatrix => generate_matrix().await?,
        Tool::ResolveFare => resolve_fare().await?,
        Tool::Server => {
            // The server uses actix-web's runtime, so run it in a
            // blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(jeepney_server::run_server())
            })
            .await??;
        }
    }

    Ok(())
}

/// Prompts for a route and base fare, then regenerates its matrix.
async fn generate_matrix() -> Result<(), Box<dyn std::error::Error>> {
    let db = jeepney_database::db::connect_from_env().await?;
    jeepney_database::run_migrations(db.as_ref()).await?;

    let routes = jeepney_database::queries::list_routes(db.as_ref()).await?;
    if routes.is_empty() {
        println!("No routes configured.");
        return Ok(());
    }

    let labels: Vec<String> = routes
        .iter()
        .map(|r| format!("{} — {}", r.id, r.name))
        .collect();
    let idx = Select::new()
        .with_prompt("Route")
        .items(&labels)
        .default(0)
        .interact()?;
    let route = &routes[idx];

    let base_fare: f64 = Input::new()
        .with_prompt("Base fare (pesos)")
        .default(FareTiers::default().base_fare)
        .interact_text()?;

    let tiers = FareTiers {
        base_fare,
        ..FareTiers::default()
    };

    let generation = jeepney_fare::matrix::generate_matrix_for_route(
        db.as_ref(),
        route.id,
        &tiers,
        Utc::now(),
    )
    .await?;

    println!(
        "Route {}: wrote {} entries ({} previous entries deactivated)",
        route.id, generation.entries_written, generation.entries_deactivated
    );

    Ok(())
}

/// Prompts for a route and endpoint names, then prints the resolved fare.
async fn resolve_fare() -> Result<(), Box<dyn std::error::Error>> {
    let db = jeepney_database::db::connect_from_env().await?;

    let route_id: i32 = Input::new().with_prompt("Route id").interact_text()?;
    let from: String = Input::new().with_prompt("From checkpoint").interact_text()?;
    let to: String = Input::new().with_prompt("To checkpoint").interact_text()?;

    match jeepney_fare::engine::resolve_fare(
        db.as_ref(),
        route_id,
        &from,
        &to,
        &FareTiers::default(),
        Utc::now(),
    )
    .await
    {
        Ok(resolution) => {
            println!(
                "₱{:.2} via {}{}",
                resolution.amount,
                resolution.method,
                if resolution.is_base_fare {
                    " (base fare)"
                } else {
                    ""
                }
            );
        }
        Err(e) => println!("Could not resolve fare: {e}"),
    }

    Ok(())
}
