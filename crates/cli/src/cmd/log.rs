//! One-shot history query

use anyhow::Result;
use cli_lib::query::Query;
use cli_lib::util;
use journal::HistoryLog;
use std::path::Path;

pub fn run(log_dir: &Path, query: Query) -> Result<()> {
    let history = HistoryLog::open(log_dir)?;
    let output = query.run(&history)?;
    util::print_framed(&output);
    Ok(())
}
