//! Minimal hand-rolled parser for the narrow statement family this engine
//! answers: `SELECT ... FROM t [WHERE col = 'literal']`, `SELECT COUNT(*)
//! FROM t [WHERE ...]`, and the two dot commands (§6). Out of scope per
//! §1: a general SQL tokenizer. The supported grammar is small enough that
//! pulling in a parser-combinator crate (or the teacher's `pest` grammar)
//! would buy nothing a few `str::split` calls don't already give.

use crate::executor::SelectQuery;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unknown dot command: {0}")]
    UnknownDotCommand(String),
    #[error("unsupported statement: {0}")]
    UnsupportedStatement(String),
    #[error("unknown aggregation function: {0}")]
    UnknownAggregation(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectQuery),
    DbInfo,
    Tables,
}

/// Parses a dot command or a `SELECT` statement (§6: the second CLI
/// argument is a dot command if it starts with `.`, otherwise SQL).
pub fn parse(input: &str) -> Result<Statement, Error> {
    let trimmed = input.trim();
    if let Some(command) = trimmed.strip_prefix('.') {
        return match command {
            "dbinfo" => Ok(Statement::DbInfo),
            "tables" => Ok(Statement::Tables),
            other => Err(Error::UnknownDotCommand(format!(".{other}"))),
        };
    }
    parse_select(trimmed)
}

fn parse_select(statement: &str) -> Result<Statement, Error> {
    let lower = statement.to_lowercase();
    if !lower.starts_with("select ") {
        return Err(Error::UnsupportedStatement(statement.to_string()));
    }
    let rest = &statement[7..];

    let from_pos = find_keyword(rest, "from").ok_or_else(|| Error::UnsupportedStatement(statement.to_string()))?;
    let select_list = rest[..from_pos].trim();
    let after_from = rest[from_pos + 4..].trim();

    let (table_name, where_clause) = match find_keyword(after_from, "where") {
        Some(where_pos) => (after_from[..where_pos].trim(), Some(after_from[where_pos + 5..].trim())),
        None => (after_from.trim(), None),
    };
    let table_name = table_name.trim_end_matches(';').trim().to_string();

    let (aggregations, columns_to_select) = parse_select_list(select_list)?;

    let filter_clauses = match where_clause {
        Some(clause) => vec![parse_comparison(clause)?],
        None => Vec::new(),
    };
    let columns_used_in_filter_clauses = filter_clauses.iter().map(|(c, _)| c.clone()).collect();

    Ok(Statement::Select(SelectQuery {
        table_name,
        columns_to_select,
        aggregations,
        filter_clauses,
        columns_used_in_filter_clauses,
    }))
}

fn parse_select_list(select_list: &str) -> Result<(Vec<String>, Vec<String>), Error> {
    let lower = select_list.to_lowercase();
    if let Some(inner) = lower.strip_prefix("count(").and_then(|s| s.strip_suffix(')')) {
        let _ = inner;
        return Ok((vec!["COUNT".to_string()], Vec::new()));
    }
    if let Some(name_end) = select_list.find('(') {
        let function_name = select_list[..name_end].trim();
        return Err(Error::UnknownAggregation(function_name.to_string()));
    }
    let columns = select_list
        .split(',')
        .map(|c| c.trim().trim_end_matches(';').to_string())
        .filter(|c| !c.is_empty())
        .collect();
    Ok((Vec::new(), columns))
}

/// `col = 'literal'`, surrounding single quotes stripped (§6).
fn parse_comparison(clause: &str) -> Result<(String, String), Error> {
    let clause = clause.trim().trim_end_matches(';');
    let eq_pos = clause.find('=').ok_or_else(|| Error::UnsupportedStatement(clause.to_string()))?;
    let column = clause[..eq_pos].trim().to_string();
    let literal = clause[eq_pos + 1..].trim().trim_matches('\'').to_string();
    Ok((column, literal))
}

/// Finds `keyword` as a whole word (case-insensitive), not as a substring
/// of a longer identifier.
fn find_keyword(haystack: &str, keyword: &str) -> Option<usize> {
    let lower = haystack.to_lowercase();
    let mut search_from = 0;
    while let Some(rel) = lower[search_from..].find(keyword) {
        let at = search_from + rel;
        let before_ok = at == 0 || !lower.as_bytes()[at - 1].is_ascii_alphanumeric();
        let after = at + keyword.len();
        let after_ok = after >= lower.len() || !lower.as_bytes()[after].is_ascii_alphanumeric();
        if before_ok && after_ok {
            return Some(at);
        }
        search_from = at + keyword.len();
    }
    None
}
