//! Chooses between full scan and index seek for a filtered query (§4.5).

use crate::schema::{Index, Table};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    FullScan,
    IndexSeek { index_root_page: crate::pager::PageNum, value: Value },
}

/// Finds the first filter column for which `table` has a matching
/// single-column index; if found, plans an index seek on it, otherwise a
/// full scan with post-filtering (§4.5).
pub fn choose(table: &Table, filters: &[(String, Value)]) -> Plan {
    for (col, value) in filters {
        if let Some(index) = matching_index(table, col) {
            return Plan::IndexSeek { index_root_page: index.root_page, value: value.clone() };
        }
    }
    Plan::FullScan
}

fn matching_index<'a>(table: &'a Table, col: &str) -> Option<&'a Index> {
    table.find_index_for(col)
}
