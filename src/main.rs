use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use sqlite_read_engine::executor;
use sqlite_read_engine::sqlparser::{self, Statement};
use sqlite_read_engine::Error as EngineError;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    match args.len() {
        0 | 1 => bail!("Missing <database path> and <command>"),
        2 => bail!("Missing <command-or-statement>"),
        _ => {}
    }

    let path = PathBuf::from(&args[1]);
    let (pager, schema) = sqlite_read_engine::open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let statement = sqlparser::parse(&args[2])
        .map_err(EngineError::from)
        .context("failed to parse statement")?;
    match statement {
        Statement::DbInfo => {
            println!("number of tables: {}", schema.table_count());
        }
        Statement::Tables => {
            println!("{}", schema.table_names().join(" "));
        }
        Statement::Select(query) => {
            log::debug!("executing select against table {}", query.table_name);
            let lines = executor::execute(&pager, &schema, &query)
                .map_err(EngineError::from)
                .context("query execution failed")?;
            for line in lines {
                println!("{line}");
            }
        }
    }

    Ok(())
}
