use std::io::Write;

use anyhow::Result;
use votemap::{load_layer, summary_table, summary_to_csv, write_summary};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::SummaryArgs) -> Result<()> {
    let config = cli.resolve_config()?;
    let villages = load_layer(&config)?.into_logged("load");

    let rows = args.rows.unwrap_or(config.map.summary_rows);
    let mut table = summary_table(&args.view.state(), &villages, rows)?;

    match &args.output {
        Some(path) => write_summary(&mut table, path)?,
        None => std::io::stdout().write_all(summary_to_csv(&mut table)?.as_bytes())?,
    }
    Ok(())
}
