mod config;
pub mod builder;
pub mod export;
pub mod ledger;
pub mod manual;

use log::{debug, info};
use rand::Rng;
use snafu::prelude::*;

use std::collections::HashSet;

pub use crate::builder::ParticipantSet;
pub use crate::config::*;
pub use crate::ledger::Ledger;

use crate::config::{CapacitySnafu, ZeroCountSnafu};

/// The rows a draw may select from.
///
/// Without exclusion, or while the ledger is empty, this is every participant.
/// With exclusion, every participant equal to a previous winner is removed.
/// Equality compares all the columns, so two participants with identical
/// values are treated as the same person.
pub fn eligible_pool<'a>(
    participants: &'a ParticipantSet,
    ledger: &Ledger,
    exclude_previous: bool,
) -> Vec<&'a Row> {
    if !exclude_previous || ledger.is_empty() {
        return participants.rows().iter().collect();
    }
    let previous: HashSet<&Row> = ledger.previous_winners().collect();
    let pool: Vec<&Row> = participants
        .rows()
        .iter()
        .filter(|row| !previous.contains(row))
        .collect();
    debug!(
        "eligible_pool: {} of {} participants remain after excluding {} previous winners",
        pool.len(),
        participants.len(),
        previous.len()
    );
    pool
}

/// Selects `count` distinct rows uniformly at random, using the thread-local
/// generator.
pub fn draw(pool: &[&Row], count: usize) -> Result<Vec<Row>, DrawErrors> {
    draw_with(pool, count, &mut rand::thread_rng())
}

/// Selects `count` distinct rows from the pool, every subset of that size
/// being equally likely. The rows come back in the order they were picked.
///
/// The pool is taken as given: capacity errors report [`Pool::Given`]. Use
/// [`perform_draw`] to get errors that say whether previous winners were
/// excluded.
pub fn draw_with<R: Rng + ?Sized>(
    pool: &[&Row],
    count: usize,
    rng: &mut R,
) -> Result<Vec<Row>, DrawErrors> {
    sample_rows(pool, count, Pool::Given, rng)
}

fn sample_rows<R: Rng + ?Sized>(
    pool: &[&Row],
    count: usize,
    pool_kind: Pool,
    rng: &mut R,
) -> Result<Vec<Row>, DrawErrors> {
    ensure!(count >= 1, ZeroCountSnafu);
    ensure!(
        count <= pool.len(),
        CapacitySnafu {
            requested: count,
            available: pool.len(),
            pool: pool_kind,
        }
    );
    // Partial Fisher-Yates on the indices: no replacement, uniform subsets.
    let picked = rand::seq::index::sample(rng, pool.len(), count);
    Ok(picked.into_iter().map(|idx| pool[idx].clone()).collect())
}

/// Runs one draw against the session state and records its winners.
///
/// This is the authoritative call: whatever a user interface shows before,
/// the winners are the ones returned here. On error the ledger is unchanged.
pub fn perform_draw<R: Rng + ?Sized>(
    participants: &ParticipantSet,
    ledger: &mut Ledger,
    request: &DrawRequest,
    rng: &mut R,
) -> Result<Draw, DrawErrors> {
    info!(
        "perform_draw: {:?}: {} winners out of {} participants, exclude previous: {}",
        request.name.as_str(),
        request.count,
        participants.len(),
        request.exclude_previous
    );
    let pool_kind = if request.exclude_previous && !ledger.is_empty() {
        Pool::ExcludingPrevious
    } else {
        Pool::Everyone
    };
    let pool = eligible_pool(participants, ledger, request.exclude_previous);
    let pool_size = pool.len();
    let winners = sample_rows(&pool, request.count, pool_kind, rng)?;
    ledger.record(&request.name, &winners)?;
    info!(
        "perform_draw: {:?}: drew {} winners from a pool of {}",
        request.name.as_str(),
        winners.len(),
        pool_size
    );
    Ok(Draw {
        name: request.name.clone(),
        winners,
        pool_size,
        pool: pool_kind,
    })
}
