use anyhow::Result;
use votemap::{fetch_sheet, SheetSource};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::FetchArgs) -> Result<()> {
    let config = cli.resolve_config()?;
    fetch_sheet(&SheetSource::parse(&config.sheet), &args.output, args.force)?;
    log::info!("[fetch] saved {}", args.output.display());
    Ok(())
}
