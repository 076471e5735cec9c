use log::{debug, warn};
use snafu::prelude::*;

use std::collections::BTreeMap;

use crate::config::*;

/// The history of every winner drawn during a session.
///
/// Entries are only ever appended, one batch per successful draw. The only way
/// to remove entries is [`Ledger::clear`], which resets the whole history.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Ledger {
        Ledger::default()
    }

    /// Appends the winners of one draw, in the order they were drawn.
    ///
    /// An empty batch is refused and leaves the ledger unchanged. Reusing a
    /// draw name is allowed: the batches are then grouped together.
    pub fn record(&mut self, draw: &DrawName, rows: &[Row]) -> Result<(), DrawErrors> {
        ensure!(!rows.is_empty(), EmptyDrawSnafu);
        if self.entries.iter().any(|e| e.draw == *draw) {
            warn!(
                "Ledger::record: draw name {:?} already used, its winners will be merged",
                draw.as_str()
            );
        }
        debug!(
            "Ledger::record: {} winners under {:?}",
            rows.len(),
            draw.as_str()
        );
        self.entries.extend(rows.iter().map(|row| LedgerEntry {
            draw: draw.clone(),
            row: row.clone(),
        }));
        Ok(())
    }

    /// All the rows that have won so far, in ledger order.
    pub fn previous_winners(&self) -> impl Iterator<Item = &Row> {
        self.entries.iter().map(|e| &e.row)
    }

    /// The winners grouped by draw name. Names are enumerated in sorted order,
    /// rows keep their append order within a name.
    pub fn by_draw(&self) -> BTreeMap<&DrawName, Vec<&Row>> {
        let mut res: BTreeMap<&DrawName, Vec<&Row>> = BTreeMap::new();
        for e in self.entries.iter() {
            res.entry(&e.draw).or_default().push(&e.row);
        }
        res
    }

    /// Every entry sorted by draw name. The sort is stable, so entries with the
    /// same name stay in append order.
    pub fn all(&self) -> Vec<&LedgerEntry> {
        let mut res: Vec<&LedgerEntry> = self.entries.iter().collect();
        res.sort_by(|a, b| a.draw.cmp(&b.draw));
        res
    }

    /// Entries in append order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn draw_names(&self) -> Vec<&DrawName> {
        self.by_draw().into_keys().collect()
    }

    pub fn winners_of(&self, draw: &DrawName) -> Vec<&Row> {
        self.entries
            .iter()
            .filter(|e| e.draw == *draw)
            .map(|e| &e.row)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        debug!("Ledger::clear: dropping {} entries", self.entries.len());
        self.entries.clear();
    }
}
