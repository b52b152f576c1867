//! Optional change statistics for tuning field order.

use std::collections::BTreeMap;

/// Receives per-field events while a field table delta is written.
///
/// All methods default to no-ops.
pub trait DeltaObserver {
    /// A field inside the sent prefix changed and its value was transmitted.
    fn field_changed(&mut self, table: &'static str, index: usize, name: &'static str) {
        let _ = (table, index, name);
    }

    /// A field inside the sent prefix was unchanged and cost one bit.
    fn field_unchanged(&mut self, table: &'static str, index: usize) {
        let _ = (table, index);
    }
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DeltaObserver for NoopObserver {}

impl<O: DeltaObserver + ?Sized> DeltaObserver for &mut O {
    fn field_changed(&mut self, table: &'static str, index: usize, name: &'static str) {
        (**self).field_changed(table, index, name);
    }

    fn field_unchanged(&mut self, table: &'static str, index: usize) {
        (**self).field_unchanged(table, index);
    }
}

/// One row of a change report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCount {
    pub index: usize,
    pub name: &'static str,
    pub count: u64,
}

#[derive(Debug, Default, Clone)]
struct TableCounts {
    names: Vec<&'static str>,
    changes: Vec<u64>,
    wasted_bits: u64,
}

/// Counts how often each field changes, per table.
#[derive(Debug, Default, Clone)]
pub struct ChangeStats {
    tables: BTreeMap<&'static str, TableCounts>,
}

impl ChangeStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows for every field of `table` that changed at least once, in table
    /// order.
    #[must_use]
    pub fn report(&self, table: &str) -> Vec<FieldCount> {
        let Some(counts) = self.tables.get(table) else {
            return Vec::new();
        };
        counts
            .changes
            .iter()
            .zip(&counts.names)
            .enumerate()
            .filter(|(_, (count, _))| **count > 0)
            .map(|(index, (count, name))| FieldCount {
                index,
                name: *name,
                count: *count,
            })
            .collect()
    }

    /// Change bits spent on unchanged fields in `table`.
    #[must_use]
    pub fn wasted_bits(&self, table: &str) -> u64 {
        self.tables.get(table).map_or(0, |counts| counts.wasted_bits)
    }

    /// Names of the tables seen so far.
    pub fn tables(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tables.keys().copied()
    }
}

impl DeltaObserver for ChangeStats {
    fn field_changed(&mut self, table: &'static str, index: usize, name: &'static str) {
        let counts = self.tables.entry(table).or_default();
        if counts.changes.len() <= index {
            counts.changes.resize(index + 1, 0);
            counts.names.resize(index + 1, "");
        }
        counts.changes[index] += 1;
        counts.names[index] = name;
    }

    fn field_unchanged(&mut self, table: &'static str, _index: usize) {
        self.tables.entry(table).or_default().wasted_bits += 1;
    }
}
