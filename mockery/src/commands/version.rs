use clap::Args;
use eyre::Result;

#[derive(Args)]
pub struct VersionCommand {}

impl VersionCommand {
    pub fn run(&self) -> Result<()> {
        println!("mockery v{}", env!("CARGO_PKG_VERSION"));
        Ok(())
    }
}
