//! Ordered polygonal outputs of a slice view.
//!
//! Each refresh rebuilds the collections from scratch in a fixed order:
//!
//! 1. slice model mesh (if it exists)
//! 2. background glyphs (if any)
//! 3. foreground glyphs (if any)
//!
//! Entry `i` of [`poly_data_collection`](PolyDataAggregator::poly_data_collection)
//! is coloured by entry `i` of
//! [`lookup_table_collection`](PolyDataAggregator::lookup_table_collection).

use slice_core::{LookupTable, PolyData};
use tracing::trace;

/// Paired mesh and colour table sequences.
#[derive(Debug, Clone, Default)]
pub struct PolyDataAggregator {
    poly_data: Vec<PolyData>,
    lookup_tables: Vec<LookupTable>,
}

impl PolyDataAggregator {
    /// Empty collections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces both collections with `entries`, keeping their order.
    pub fn rebuild<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (PolyData, LookupTable)>,
    {
        self.poly_data.clear();
        self.lookup_tables.clear();
        for (poly, lut) in entries {
            self.poly_data.push(poly);
            self.lookup_tables.push(lut);
        }
        trace!(entries = self.poly_data.len(), "poly data collection rebuilt");
    }

    /// Meshes in display order.
    pub fn poly_data_collection(&self) -> &[PolyData] {
        &self.poly_data
    }

    /// Colour tables, parallel to [`poly_data_collection`](Self::poly_data_collection).
    pub fn lookup_table_collection(&self) -> &[LookupTable] {
        &self.lookup_tables
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.poly_data.len()
    }

    /// True without entries.
    pub fn is_empty(&self) -> bool {
        self.poly_data.is_empty()
    }
}
