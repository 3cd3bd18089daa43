use anyhow::Result;
use votemap::describe_shapefile;

pub fn run(cli: &crate::cli::Cli, _args: &crate::cli::InspectArgs) -> Result<()> {
    let config = cli.resolve_config()?;
    print!("{}", describe_shapefile(&config.shapefile)?);
    Ok(())
}
