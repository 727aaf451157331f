//! Applies filters and projections to a row stream (§4.6).

use crate::btree::{self, table as btree_table};
use crate::planner::{self, Plan};
use crate::record::{self, Record};
use crate::schema::{Error as SchemaError, Schema};
use crate::value::Value;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("b-tree error: {0}")]
    Btree(#[from] btree::Error),
    #[error("record error: {0}")]
    Record(#[from] record::Error),
}

/// The shape the (external, out-of-scope) SQL parser hands to the executor
/// (§6).
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub table_name: String,
    pub columns_to_select: Vec<String>,
    pub aggregations: Vec<String>,
    pub filter_clauses: Vec<(String, String)>,
    pub columns_used_in_filter_clauses: Vec<String>,
}

/// Runs `query` against `schema`, returning one formatted output line per
/// surviving row (or a single line for a `COUNT` aggregation).
pub fn execute(pager: &crate::pager::Pager, schema: &Schema, query: &SelectQuery) -> Result<Vec<String>, Error> {
    let table = schema.find_table(&query.table_name)?;

    let filters: Vec<(String, Value)> = query
        .filter_clauses
        .iter()
        .map(|(col, literal)| (col.clone(), Value::Text(literal.clone())))
        .collect();

    let records = match planner::choose(table, &filters) {
        Plan::FullScan => {
            let rows = btree_table::full_scan(pager, table.root_page)?;
            let mut records = Vec::with_capacity(rows.len());
            for (rowid, payload) in rows {
                let record = record::decode_table_row(&payload, table, rowid)?;
                if matches_filters(&record, &filters) {
                    records.push(record);
                }
            }
            records
        }
        Plan::IndexSeek { index_root_page, value } => btree::index::seek(pager, index_root_page, &value)?
            .into_iter()
            .map(Record::with_rowid_only)
            .collect(),
    };

    if !query.aggregations.is_empty() {
        return Ok(vec![records.len().to_string()]);
    }

    Ok(records.iter().map(|r| project(r, &query.columns_to_select)).collect())
}

/// Equality of a column's UTF-8-decoded value to the filter literal (§4.6).
/// An absent column formats as empty string per `Record::get`'s NULL
/// contract, so a filter against a missing column simply never matches
/// unless the literal is itself empty.
fn matches_filters(record: &Record, filters: &[(String, Value)]) -> bool {
    filters.iter().all(|(col, value)| {
        let actual = record.get(col).cloned().unwrap_or(Value::Null);
        actual.format() == value.format()
    })
}

fn project(record: &Record, columns: &[String]) -> String {
    columns
        .iter()
        .map(|col| record.get(col).cloned().unwrap_or(Value::Null).format())
        .collect::<Vec<_>>()
        .join("|")
}
