//! Resolves table and index metadata from `sqlite_schema`, the implicit
//! table stored at root page 1 (§4.5).

use crate::btree::table as btree_table;
use crate::btree::{self, RowId};
use crate::pager::{PageNum, Pager};
use crate::record;
use crate::value::Value;

pub const SCHEMA_ROOT_PAGE: PageNum = 1;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("b-tree error while reading sqlite_schema: {0}")]
    Btree(#[from] btree::Error),
    #[error("record error while reading sqlite_schema: {0}")]
    Record(#[from] record::Error),
    #[error("sqlite_schema row is missing its {0} column")]
    MissingColumn(&'static str),
    #[error("table {0} not found")]
    TableNotFound(String),
    #[error("could not parse a column list out of: {0}")]
    UnparsableColumns(String),
}

/// One column of a `Table`, as derived from its `create_sql` (§3, §9).
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub declared_type: String,
    pub is_primary_key: bool,
}

/// A single-column index (§3: multi-column indexes are out of scope).
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub name: String,
    pub root_page: PageNum,
    pub create_sql: String,
    pub column_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub root_page: PageNum,
    pub create_sql: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
}

impl Table {
    /// Returns the index whose sole indexed column is `col`, if any. The
    /// planner uses this to decide between index seek and full scan (§4.5).
    pub fn find_index_for(&self, col: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.column_name == col)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub tables: Vec<Table>,
    /// `tbl_name` of every non-`sqlite_sequence` `sqlite_schema` row (tables,
    /// indexes, views, triggers alike), duplicates included. `.dbinfo` and
    /// `.tables` are driven off this, not off `tables`, per §4.6: the dot
    /// commands count and list every schema row, not just table rows.
    pub(crate) schema_row_tbl_names: Vec<String>,
}

impl Schema {
    pub fn find_table(&self, name: &str) -> Result<&Table, Error> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// The count `.dbinfo` reports (§4.6): every non-`sqlite_sequence`
    /// schema row, regardless of `type`.
    pub fn table_count(&self) -> usize {
        self.schema_row_tbl_names.len()
    }

    /// The names `.tables` lists (§4.6): one `tbl_name` per non-
    /// `sqlite_sequence` schema row, in schema order, duplicates included.
    pub fn table_names(&self) -> Vec<&str> {
        self.schema_row_tbl_names.iter().map(String::as_str).collect()
    }
}

struct SchemaRow {
    kind: String,
    name: String,
    tbl_name: String,
    root_page: PageNum,
    sql: String,
}

/// Full-scans root page 1 and decodes every row of `sqlite_schema`,
/// skipping housekeeping rows for `sqlite_sequence` (§4.5).
fn read_schema_rows(pager: &Pager) -> Result<Vec<SchemaRow>, Error> {
    let raw_rows = btree_table::full_scan(pager, SCHEMA_ROOT_PAGE)?;
    let mut rows = Vec::with_capacity(raw_rows.len());
    for (rowid, payload) in raw_rows {
        let values = record::decode_values(&payload, 5)?;
        let row = schema_row_from_values(values, rowid)?;
        if row.tbl_name == "sqlite_sequence" {
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}

fn schema_row_from_values(values: Vec<Value>, rowid: RowId) -> Result<SchemaRow, Error> {
    let mut it = values.into_iter();
    let kind = text_column(it.next(), "type")?;
    let name = text_column(it.next(), "name")?;
    let tbl_name = text_column(it.next(), "tbl_name")?;
    let root_page = match it.next() {
        Some(Value::Integer(n)) => n as PageNum,
        _ => return Err(Error::MissingColumn("rootpage")),
    };
    let sql = match it.next() {
        Some(Value::Text(s)) => s,
        Some(Value::Null) => String::new(),
        _ => return Err(Error::MissingColumn("sql")),
    };
    let _ = rowid;
    Ok(SchemaRow { kind, name, tbl_name, root_page, sql })
}

fn text_column(value: Option<Value>, field: &'static str) -> Result<String, Error> {
    match value {
        Some(Value::Text(s)) => Ok(s),
        _ => Err(Error::MissingColumn(field)),
    }
}

/// Reads `sqlite_schema` and assembles every table together with the
/// indexes that reference it (§4.5).
pub fn load(pager: &Pager) -> Result<Schema, Error> {
    let rows = read_schema_rows(pager)?;

    let mut tables = Vec::new();
    for row in &rows {
        if row.kind != "table" {
            continue;
        }
        let columns = parse_columns(&row.sql)?;
        let indexes = rows
            .iter()
            .filter(|r| r.kind == "index" && r.tbl_name == row.tbl_name)
            .map(|r| Index {
                name: r.name.clone(),
                root_page: r.root_page,
                create_sql: r.sql.clone(),
                column_name: parse_indexed_column(&r.sql).unwrap_or_default(),
            })
            .collect();
        tables.push(Table {
            name: row.tbl_name.clone(),
            root_page: row.root_page,
            create_sql: row.sql.clone(),
            columns,
            indexes,
        });
    }
    let schema_row_tbl_names = rows.iter().map(|r| r.tbl_name.clone()).collect();
    Ok(Schema { tables, schema_row_tbl_names })
}

/// Isolates the outermost parenthesized body of `create_sql` and splits it
/// on commas that are not nested inside a further pair of parentheses, so
/// `DECIMAL(10,2)`-style declared types survive intact (§9).
fn outer_parens(sql: &str) -> Result<&str, Error> {
    let open = sql.find('(').ok_or_else(|| Error::UnparsableColumns(sql.to_string()))?;
    let close = sql.rfind(')').ok_or_else(|| Error::UnparsableColumns(sql.to_string()))?;
    if close <= open {
        return Err(Error::UnparsableColumns(sql.to_string()));
    }
    Ok(&sql[open + 1..close])
}

fn split_top_level_commas(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(body[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(body[start..].trim());
    parts
}

fn parse_columns(create_sql: &str) -> Result<Vec<Column>, Error> {
    let body = outer_parens(create_sql)?;
    Ok(split_top_level_commas(body)
        .into_iter()
        .filter(|def| !def.is_empty())
        .map(|def| {
            let mut tokens = def.split_whitespace();
            let name = tokens.next().unwrap_or_default().to_string();
            let declared_type = tokens.collect::<Vec<_>>().join(" ");
            let is_primary_key = def.to_lowercase().contains("primary key");
            Column { name, declared_type, is_primary_key }
        })
        .collect())
}

/// The indexed column name is the content between the parentheses of the
/// `CREATE INDEX` statement (§3); multi-column indexes are out of scope,
/// so only the first comma-separated token is taken.
fn parse_indexed_column(create_sql: &str) -> Option<String> {
    let body = outer_parens(create_sql).ok()?;
    split_top_level_commas(body).first().map(|s| s.trim().to_string())
}
