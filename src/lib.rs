pub mod btree;
pub mod executor;
pub mod pager;
pub mod planner;
pub mod record;
pub mod schema;
pub mod serial_type;
pub mod sqlparser;
pub mod value;
pub mod varint;
pub mod vfs;

/// Composes every layer's error into the four kinds §7 of the spec names
/// (`MalformedFile`, `SchemaResolutionFailure`, `UnsupportedStatement`,
/// `DecodeMismatch`), while still carrying the lower-level cause for
/// display. `main` converts every fallible call's error through this enum
/// before widening to `anyhow::Error` at the process boundary, so all four
/// kinds are real, matchable paths rather than unreachable scaffolding.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("malformed database file: {0}")]
    MalformedFile(#[from] MalformedFileError),
    #[error("schema resolution failed: {0}")]
    SchemaResolutionFailure(#[from] schema::Error),
    #[error("unsupported statement: {0}")]
    UnsupportedStatement(#[from] sqlparser::Error),
    #[error("record decode mismatch: {0}")]
    DecodeMismatch(#[from] record::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum MalformedFileError {
    #[error(transparent)]
    Pager(#[from] pager::Error),
    #[error(transparent)]
    Btree(#[from] btree::Error),
}

/// `executor::execute` bundles schema/btree/record failures into one enum;
/// unbundle it back into the matching top-level kind rather than adding a
/// fifth catch-all variant.
impl From<executor::Error> for Error {
    fn from(err: executor::Error) -> Error {
        match err {
            executor::Error::Schema(e) => Error::SchemaResolutionFailure(e),
            executor::Error::Btree(e) => Error::MalformedFile(MalformedFileError::Btree(e)),
            executor::Error::Record(e) => Error::DecodeMismatch(e),
        }
    }
}

/// Opens `path` and resolves its schema; the one entry point `main` needs
/// before dispatching a dot command or a `SELECT` (§6).
pub fn open(path: &std::path::Path) -> Result<(pager::Pager, schema::Schema), Error> {
    let pager = pager::Pager::open(path).map_err(MalformedFileError::from)?;
    let schema = schema::load(&pager)?;
    Ok((pager, schema))
}
