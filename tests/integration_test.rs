//! End-to-end coverage: builds small SQLite-format files byte-by-byte (no
//! external fixture binaries, no sqlite3 dependency) and drives them through
//! the public API the same way `main` does — open, parse a statement,
//! execute, format.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use sqlite_read_engine::executor;
use sqlite_read_engine::sqlparser::{self, Statement};

// --- Minimal SQLite-file byte builders -------------------------------------
//
// These mirror the record/page layout described in the format (varint
// header, serial-type tags, cell pointer arrays growing from the end of the
// page) but are deliberately small and special-cased for what the tests
// below need: single-page tables, one schema page, optional single-page
// leaf indexes. They do not reuse the crate's own (test-only, private)
// varint encoder since integration tests only see its public surface.

enum TestValue {
    Null,
    Int(i64),
    Text(&'static str),
}

fn write_varint(out: &mut Vec<u8>, value: u64) {
    assert!(value < (1 << 28), "test helper only supports small varints");
    let mut groups = vec![
        ((value >> 21) & 0x7f) as u8,
        ((value >> 14) & 0x7f) as u8,
        ((value >> 7) & 0x7f) as u8,
        (value & 0x7f) as u8,
    ];
    while groups.len() > 1 && groups[0] == 0 {
        groups.remove(0);
    }
    let last = groups.len() - 1;
    for (i, g) in groups.iter_mut().enumerate() {
        if i != last {
            *g |= 0x80;
        }
    }
    out.extend(groups);
}

fn encode_value(value: &TestValue) -> (u64, Vec<u8>) {
    match value {
        TestValue::Null => (0, vec![]),
        TestValue::Int(i) if *i >= i8::MIN as i64 && *i <= i8::MAX as i64 => (1, vec![*i as i8 as u8]),
        TestValue::Int(i) => (4, (*i as i32).to_be_bytes().to_vec()),
        TestValue::Text(s) => (13 + 2 * s.len() as u64, s.as_bytes().to_vec()),
    }
}

/// Builds a record payload: `header_size` varint, one serial-type varint per
/// value, then the packed value bytes. Assumes the header stays under 128
/// bytes, true for every fixture below.
fn build_record(values: &[TestValue]) -> Vec<u8> {
    let mut header_body = Vec::new();
    let mut body = Vec::new();
    for value in values {
        let (serial_type, bytes) = encode_value(value);
        write_varint(&mut header_body, serial_type);
        body.extend(bytes);
    }
    let header_size = 1 + header_body.len() as u64;
    let mut out = Vec::new();
    write_varint(&mut out, header_size);
    out.extend(header_body);
    out.extend(body);
    out
}

fn leaf_table_cell(rowid: i64, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    write_varint(&mut out, payload.len() as u64);
    write_varint(&mut out, rowid as u64);
    out.extend_from_slice(payload);
    out
}

fn leaf_index_cell(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    write_varint(&mut out, payload.len() as u64);
    out.extend_from_slice(payload);
    out
}

/// Packs `cells` (already-encoded cell bodies) into a `page_size`-byte leaf
/// page of the given `page_type` byte, with its b-tree header starting at
/// `body_offset` (100 for page 1, 0 otherwise). Cell data is laid out
/// growing down from the end of the page, cell pointers growing up from the
/// header, exactly as real SQLite pages are packed.
fn leaf_page(page_size: usize, body_offset: usize, page_type: u8, cells: &[Vec<u8>]) -> Vec<u8> {
    let mut page = vec![0u8; page_size];
    let mut offsets = Vec::with_capacity(cells.len());
    let mut end = page_size;
    for cell in cells {
        end -= cell.len();
        page[end..end + cell.len()].copy_from_slice(cell);
        offsets.push(end as u16);
    }
    page[body_offset] = page_type;
    page[body_offset + 3..body_offset + 5].copy_from_slice(&(cells.len() as u16).to_be_bytes());
    page[body_offset + 5..body_offset + 7].copy_from_slice(&(end as u16).to_be_bytes());
    for (i, offset) in offsets.iter().enumerate() {
        let at = body_offset + 8 + i * 2;
        page[at..at + 2].copy_from_slice(&offset.to_be_bytes());
    }
    page
}

/// Builds page 1: the 100-byte database header followed by a leaf-table
/// `sqlite_schema` page occupying the rest of the same physical page.
fn schema_page(page_size: usize, cells: &[Vec<u8>]) -> Vec<u8> {
    let mut page = leaf_page(page_size, 100, 0x0d, cells);
    page[0..16].copy_from_slice(b"SQLite format 3\0");
    page[16..18].copy_from_slice(&(page_size as u16).to_be_bytes());
    page
}

fn schema_row(values: &[TestValue]) -> Vec<u8> {
    build_record(values)
}

/// Writes `pages` (each already exactly `page_size` bytes) to a temp file
/// and returns its path. The caller is responsible for cleanup via
/// `cleanup`.
fn write_db(name: &str, pages: &[Vec<u8>]) -> PathBuf {
    let mut bytes = Vec::new();
    for page in pages {
        bytes.extend_from_slice(page);
    }
    let path = std::env::temp_dir().join(format!("{name}_{}_{}.db", std::process::id(), name.len()));
    std::fs::write(&path, &bytes).unwrap();
    path
}

fn cleanup(path: &PathBuf) {
    std::fs::remove_file(path).ok();
}

// --- Fixture: apples/oranges, mirrors spec.md §8's sample.db --------------

fn sample_db() -> PathBuf {
    const PAGE_SIZE: usize = 512;

    let apples_sql = "CREATE TABLE apples (id integer primary key, name text, color text)";
    let oranges_sql = "CREATE TABLE oranges (id integer primary key, name text, description text)";

    let page1 = schema_page(
        PAGE_SIZE,
        &[
            leaf_table_cell(
                1,
                &schema_row(&[
                    TestValue::Text("table"),
                    TestValue::Text("apples"),
                    TestValue::Text("apples"),
                    TestValue::Int(2),
                    TestValue::Text(apples_sql),
                ]),
            ),
            leaf_table_cell(
                2,
                &schema_row(&[
                    TestValue::Text("table"),
                    TestValue::Text("oranges"),
                    TestValue::Text("oranges"),
                    TestValue::Int(3),
                    TestValue::Text(oranges_sql),
                ]),
            ),
        ],
    );

    let apples_rows: &[(i64, &str, &str)] = &[
        (1, "Fuji", "Red"),
        (2, "Gala", "Red"),
        (3, "Honeycrisp", "Pink"),
        (4, "Golden Delicious", "Yellow"),
    ];
    let apples_cells: Vec<Vec<u8>> = apples_rows
        .iter()
        .map(|(rowid, name, color)| {
            leaf_table_cell(*rowid, &build_record(&[TestValue::Null, TestValue::Text(name), TestValue::Text(color)]))
        })
        .collect();
    let page2 = leaf_page(PAGE_SIZE, 0, 0x0d, &apples_cells);

    let oranges_rows: &[(i64, &str, &str)] = &[
        (1, "Valencia", "sweet"),
        (2, "Navel", "seedless"),
        (3, "Blood", "tart"),
        (4, "Cara Cara", "pink flesh"),
        (5, "Seville", "bitter"),
        (6, "Mandarin", "easy peel"),
    ];
    let oranges_cells: Vec<Vec<u8>> = oranges_rows
        .iter()
        .map(|(rowid, name, description)| {
            leaf_table_cell(
                *rowid,
                &build_record(&[TestValue::Null, TestValue::Text(name), TestValue::Text(description)]),
            )
        })
        .collect();
    let page3 = leaf_page(PAGE_SIZE, 0, 0x0d, &oranges_cells);

    write_db("sample", &[page1, page2, page3])
}

// --- Fixture: companies + a single-column index on `country` --------------

fn indexed_db() -> PathBuf {
    const PAGE_SIZE: usize = 512;

    let companies_sql = "CREATE TABLE companies (id integer primary key, name text, country text)";
    let index_sql = "CREATE INDEX idx_companies_country ON companies (country)";

    let page1 = schema_page(
        PAGE_SIZE,
        &[
            leaf_table_cell(
                1,
                &schema_row(&[
                    TestValue::Text("table"),
                    TestValue::Text("companies"),
                    TestValue::Text("companies"),
                    TestValue::Int(2),
                    TestValue::Text(companies_sql),
                ]),
            ),
            leaf_table_cell(
                2,
                &schema_row(&[
                    TestValue::Text("index"),
                    TestValue::Text("idx_companies_country"),
                    TestValue::Text("companies"),
                    TestValue::Int(3),
                    TestValue::Text(index_sql),
                ]),
            ),
        ],
    );

    let companies_rows: &[(i64, &str, &str)] = &[
        (1, "Acme", "micronesia"),
        (2, "Globex", "palau"),
        (3, "Initech", "micronesia"),
    ];
    let companies_cells: Vec<Vec<u8>> = companies_rows
        .iter()
        .map(|(rowid, name, country)| {
            leaf_table_cell(
                *rowid,
                &build_record(&[TestValue::Null, TestValue::Text(name), TestValue::Text(country)]),
            )
        })
        .collect();
    let page2 = leaf_page(PAGE_SIZE, 0, 0x0d, &companies_cells);

    let index_cells: Vec<Vec<u8>> = companies_rows
        .iter()
        .map(|(rowid, _, country)| leaf_index_cell(&build_record(&[TestValue::Text(country), TestValue::Int(*rowid)])))
        .collect();
    let page3 = leaf_page(PAGE_SIZE, 0, 0x0a, &index_cells);

    write_db("indexed", &[page1, page2, page3])
}

// --- Helpers to drive a query the way `main` does --------------------------

fn run(path: &PathBuf, statement: &str) -> Vec<String> {
    let (pager, schema) = sqlite_read_engine::open(path).expect("should open constructed db");
    match sqlparser::parse(statement).expect("should parse statement") {
        Statement::Select(query) => executor::execute(&pager, &schema, &query).expect("query should execute"),
        Statement::DbInfo => vec![format!("number of tables: {}", schema.table_count())],
        Statement::Tables => vec![schema.table_names().join(" ")],
    }
}

#[test]
fn dbinfo_counts_non_housekeeping_tables() {
    let path = sample_db();
    let lines = run(&path, ".dbinfo");
    cleanup(&path);
    assert_eq!(lines, vec!["number of tables: 2".to_string()]);
}

#[test]
fn tables_lists_every_table_name() {
    let path = sample_db();
    let lines = run(&path, ".tables");
    cleanup(&path);
    let names: std::collections::HashSet<&str> = lines[0].split(' ').collect();
    assert_eq!(names, ["apples", "oranges"].into_iter().collect());
}

#[test]
fn dbinfo_and_tables_count_index_rows_too() {
    // §4.6: the dot commands count/list every non-sqlite_sequence schema
    // row, not just `type = table` rows, so a table with one index reports
    // 2 and lists its tbl_name twice.
    let path = indexed_db();
    let dbinfo = run(&path, ".dbinfo");
    let tables = run(&path, ".tables");
    cleanup(&path);
    assert_eq!(dbinfo, vec!["number of tables: 2".to_string()]);
    assert_eq!(tables, vec!["companies companies".to_string()]);
}

#[test]
fn count_aggregation_over_a_table() {
    let path = sample_db();
    let lines = run(&path, "select count(*) from apples");
    cleanup(&path);
    assert_eq!(lines, vec!["4".to_string()]);
}

#[test]
fn full_scan_select_preserves_rowid_order() {
    let path = sample_db();
    let lines = run(&path, "select name from apples");
    cleanup(&path);
    assert_eq!(lines, vec!["Fuji", "Gala", "Honeycrisp", "Golden Delicious"]);
}

#[test]
fn where_clause_filters_by_equality() {
    let path = sample_db();
    let lines = run(&path, "select name, color from apples where color = 'Yellow'");
    cleanup(&path);
    assert_eq!(lines, vec!["Golden Delicious|Yellow".to_string()]);
}

#[test]
fn where_clause_with_no_match_yields_no_rows() {
    let path = sample_db();
    let lines = run(&path, "select name from apples where color = 'Purple'");
    cleanup(&path);
    assert!(lines.is_empty());
}

#[test]
fn second_table_full_scan_also_works() {
    let path = sample_db();
    let lines = run(&path, "select count(*) from oranges");
    cleanup(&path);
    assert_eq!(lines, vec!["6".to_string()]);
}

#[test]
fn filter_on_indexed_column_uses_index_seek_and_projects_only_id() {
    let path = indexed_db();
    let mut lines = run(&path, "select id, name from companies where country = 'micronesia'");
    cleanup(&path);
    lines.sort();
    // §4.6/§9: an index seek can only synthesize the rowid, so `name`
    // always renders empty here even though the full scan below fills it.
    assert_eq!(lines, vec!["1|".to_string(), "3|".to_string()]);
}

#[test]
fn filter_on_unindexed_column_falls_back_to_full_scan_and_projects_fully() {
    let path = indexed_db();
    let lines = run(&path, "select id, name from companies where name = 'Globex'");
    cleanup(&path);
    assert_eq!(lines, vec!["2|Globex".to_string()]);
}

#[test]
fn index_seek_and_full_scan_agree_on_matching_rowids() {
    // §8 property 3: indexSeek(v) == { rowid | fullScan.filter(col == v).rowid }
    let path = indexed_db();
    let mut via_index = run(&path, "select id from companies where country = 'micronesia'");
    let via_scan = run(&path, "select id from companies where name = 'Acme'");
    cleanup(&path);
    via_index.sort();
    assert_eq!(via_index, vec!["1".to_string(), "3".to_string()]);
    assert_eq!(via_scan, vec!["1".to_string()]);
}

#[test]
fn unknown_table_is_a_schema_resolution_failure() {
    let path = sample_db();
    let (pager, schema) = sqlite_read_engine::open(&path).unwrap();
    let Statement::Select(query) = sqlparser::parse("select * from pears").unwrap() else {
        panic!("expected a select statement");
    };
    let result = executor::execute(&pager, &schema, &query);
    cleanup(&path);
    assert!(result.is_err());
}

#[test]
fn unknown_dot_command_is_rejected_by_the_parser() {
    assert!(sqlparser::parse(".frobnicate").is_err());
}
