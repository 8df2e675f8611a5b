//! Fare matrix writes: mirrored upserts and bulk generation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use jeepney_database::queries;
use jeepney_database_models::{CheckpointRow, find_checkpoint_by_name};
use jeepney_fare_models::{FareTiers, MatrixGeneration, UpsertKind, UpsertOutcome, round_to_centavo};
use switchy_database::Database;

use crate::FareError;
use crate::engine::{resolve_endpoints, tiered_amount};

/// Amounts closer than half a centavo are the same price.
const AMOUNT_EPSILON: f64 = 0.005;

/// Creates or updates the active fare entry for a checkpoint pair, then
/// mirrors the write onto the route's opposite direction.
///
/// Re-applying the amount already in force is detected before any write
/// and reported as [`UpsertKind::Unchanged`]. A successful primary write
/// whose opposite checkpoints cannot be located by name reports
/// `mirrored: false` — a degraded success, not a failure.
///
/// # Errors
///
/// Returns [`FareError::RouteNotFound`] for an unknown route,
/// [`FareError::Unresolvable`] when an endpoint is not a checkpoint of
/// the primary route, or [`FareError::Db`] if a write fails.
pub async fn upsert_fare_entry(
    db: &dyn Database,
    route_id: i32,
    from: &str,
    to: &str,
    amount: f64,
    effective_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<UpsertOutcome, FareError> {
    let checkpoints = queries::list_checkpoints(db, route_id).await?;
    if checkpoints.is_empty() {
        return Err(FareError::RouteNotFound { route_id });
    }

    let aliases =
        jeepney_alias::build_alias_map(queries::list_checkpoint_aliases(db).await?);
    let (from_cp, to_cp) = resolve_endpoints(route_id, &checkpoints, from, to, &aliases)?;

    let amount = round_to_centavo(amount);

    let kind =
        write_entry(db, route_id, from_cp.id, to_cp.id, from_cp.id == to_cp.id, amount, effective_date, now)
            .await?;

    if kind == UpsertKind::Unchanged {
        // The mirror was written alongside the entry now in force.
        return Ok(UpsertOutcome {
            kind,
            mirrored: true,
        });
    }

    let mirrored =
        mirror_entry(db, route_id, &from_cp.name, &to_cp.name, amount, effective_date, now, &aliases)
            .await?;

    Ok(UpsertOutcome { kind, mirrored })
}

/// Writes one entry (insert or update), detecting the no-op case first.
#[allow(clippy::too_many_arguments)]
async fn write_entry(
    db: &dyn Database,
    route_id: i32,
    from_checkpoint_id: i32,
    to_checkpoint_id: i32,
    is_base_fare: bool,
    amount: f64,
    effective_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<UpsertKind, FareError> {
    let existing =
        queries::find_active_fare_entry(db, route_id, from_checkpoint_id, to_checkpoint_id, now)
            .await?;

    match existing {
        Some(entry) if (entry.amount - amount).abs() < AMOUNT_EPSILON => Ok(UpsertKind::Unchanged),
        Some(entry) => {
            queries::update_fare_entry(db, entry.id, amount, effective_date).await?;
            Ok(UpsertKind::Updated)
        }
        None => {
            queries::insert_fare_entry(
                db,
                route_id,
                from_checkpoint_id,
                to_checkpoint_id,
                amount,
                is_base_fare,
                effective_date,
            )
            .await?;
            Ok(UpsertKind::Created)
        }
    }
}

/// Mirrors a fare write onto the opposite-direction route.
///
/// The mirrored entry prices the reverse traversal: (opposite, to, from),
/// located by matching checkpoint names through the alias pipeline.
/// Returns `false` when the opposite route or its checkpoints cannot be
/// found.
#[allow(clippy::too_many_arguments)]
async fn mirror_entry(
    db: &dyn Database,
    route_id: i32,
    from_name: &str,
    to_name: &str,
    amount: f64,
    effective_date: DateTime<Utc>,
    now: DateTime<Utc>,
    aliases: &BTreeMap<String, String>,
) -> Result<bool, FareError> {
    let Some(route) = queries::get_route(db, route_id).await? else {
        return Ok(false);
    };
    let Some(opposite_id) = route.opposite_route_id else {
        log::warn!("Route {route_id} has no opposite route; fare mirror skipped");
        return Ok(false);
    };

    let opposite_checkpoints = queries::list_checkpoints(db, opposite_id).await?;
    let mirror_from = find_checkpoint_by_name(&opposite_checkpoints, to_name, aliases);
    let mirror_to = find_checkpoint_by_name(&opposite_checkpoints, from_name, aliases);

    let (Some(mirror_from), Some(mirror_to)) = (mirror_from, mirror_to) else {
        log::warn!(
            "Opposite route {opposite_id} has no checkpoints matching '{to_name}'/'{from_name}'; \
             fare mirror skipped"
        );
        return Ok(false);
    };

    write_entry(
        db,
        opposite_id,
        mirror_from.id,
        mirror_to.id,
        mirror_from.id == mirror_to.id,
        amount,
        effective_date,
        now,
    )
    .await?;

    Ok(true)
}

/// Regenerates the full fare matrix for one route.
///
/// Marks the route's current active entries inactive, then writes the
/// complete cross product of its checkpoints through the tiered formula.
/// Same-checkpoint pairs are flagged `is_base_fare`. Each direction of a
/// line is generated separately; running both keeps the pair of routes
/// mirrored since the tier scale is symmetric in distance.
///
/// # Errors
///
/// Returns [`FareError::RouteNotFound`] for an unknown or empty route, or
/// [`FareError::Db`] if a write fails.
pub async fn generate_matrix_for_route(
    db: &dyn Database,
    route_id: i32,
    tiers: &FareTiers,
    effective_date: DateTime<Utc>,
) -> Result<MatrixGeneration, FareError> {
    let checkpoints: Vec<CheckpointRow> = queries::list_checkpoints(db, route_id).await?;
    if checkpoints.is_empty() {
        return Err(FareError::RouteNotFound { route_id });
    }

    let entries_deactivated = queries::deactivate_fare_entries(db, route_id).await?;

    let mut entries_written = 0usize;
    for from_cp in &checkpoints {
        for to_cp in &checkpoints {
            let segments = (to_cp.sequence_position - from_cp.sequence_position).abs();
            queries::insert_fare_entry(
                db,
                route_id,
                from_cp.id,
                to_cp.id,
                tiered_amount(tiers, segments),
                from_cp.id == to_cp.id,
                effective_date,
            )
            .await?;
            entries_written += 1;
        }
    }

    log::info!(
        "Regenerated fare matrix for route {route_id}: {entries_written} entries written, \
         {entries_deactivated} deactivated"
    );

    Ok(MatrixGeneration {
        entries_written,
        entries_deactivated,
    })
}
